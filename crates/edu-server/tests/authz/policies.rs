// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization and behaviour tests for the policy management routes.

use axum::http::{Method, StatusCode};
use edu_server_abac::{Policy, Role};
use serde_json::{json, Value};

use super::support::{read_json, run_authz_cases, AuthzCase, TestApp, TestUser};

fn night_freeze() -> Value {
	json!({
		"id": "night_freeze",
		"name": "No course deletes overnight",
		"target": { "resource": "course", "action": "delete" },
		"conditions": [
			{ "attribute": "env.hour", "operator": "lt", "value": 24 }
		],
		"effect": "deny",
		"priority": 2000
	})
}

#[tokio::test]
async fn policy_routes_are_admin_only_by_default() {
	let app = TestApp::new().await;
	let f = app.fixtures;

	let cases = vec![
		AuthzCase {
			name: "admin lists policies",
			method: Method::GET,
			path: "/api/policies".to_string(),
			user: Some(f.admin),
			body: None,
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "teacher lists policies",
			method: Method::GET,
			path: "/api/policies".to_string(),
			user: Some(f.teacher_a),
			body: None,
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "student creates policy",
			method: Method::POST,
			path: "/api/policies".to_string(),
			user: Some(f.student),
			body: Some(night_freeze()),
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "anonymous lists policies",
			method: Method::GET,
			path: "/api/policies".to_string(),
			user: None,
			body: None,
			expected_status: StatusCode::UNAUTHORIZED,
		},
	];

	run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn list_is_sorted_by_priority() {
	let app = TestApp::new().await;

	let response = app.get("/api/policies", Some(&app.fixtures.admin)).await;
	assert_eq!(response.status(), StatusCode::OK);

	let policies: Vec<Policy> = read_json(response).await;
	assert_eq!(policies.len(), 16);
	assert_eq!(policies[0].id, "admin_full_access");
	assert!(policies
		.windows(2)
		.all(|w| (w[0].priority, &w[1].id) >= (w[1].priority, &w[0].id)));
}

#[tokio::test]
async fn created_deny_policy_takes_effect_immediately() {
	let app = TestApp::new().await;
	let admin = app.fixtures.admin;
	let teacher = app.fixtures.teacher_a;
	let path = format!("/api/courses/{}", super::support::COURSE_BY_TEACHER_A);

	assert_eq!(
		app.delete(&path, Some(&teacher)).await.status(),
		StatusCode::NO_CONTENT
	);

	let response = app.post("/api/policies", Some(&admin), night_freeze()).await;
	assert_eq!(response.status(), StatusCode::CREATED);
	let created: Policy = read_json(response).await;
	assert_eq!(created.id, "night_freeze");

	assert_eq!(
		app.delete(&path, Some(&teacher)).await.status(),
		StatusCode::FORBIDDEN,
		"Deny at priority 2000 should outrank ownership"
	);
	assert_eq!(
		app.delete(&path, Some(&admin)).await.status(),
		StatusCode::FORBIDDEN,
		"Deny at priority 2000 should outrank admin access"
	);
}

#[tokio::test]
async fn created_policy_is_persisted() {
	let app = TestApp::new().await;
	let admin = app.fixtures.admin;

	let response = app.post("/api/policies", Some(&admin), night_freeze()).await;
	assert_eq!(response.status(), StatusCode::CREATED);

	let app = app.restart().await;
	let store = app.state.engine.store();

	// The defaults were seeded at first startup and survive alongside the addition.
	assert_eq!(store.len(), 17);
	assert!(store.get("night_freeze").is_some());
	assert!(store.get("admin_full_access").is_some());
}

#[tokio::test]
async fn admin_keeps_access_after_restart_with_added_policy() {
	let app = TestApp::new().await;
	let admin = app.fixtures.admin;
	let teacher = app.fixtures.teacher_b;

	let grant = json!({
		"id": "teachers_read_policies",
		"name": "Teachers may read policies",
		"target": { "resource": "abac_policy", "action": "read" },
		"conditions": [
			{ "attribute": "user.role", "operator": "eq", "value": "teacher" }
		],
		"effect": "allow",
		"priority": 10
	});
	assert_eq!(
		app.post("/api/policies", Some(&admin), grant).await.status(),
		StatusCode::CREATED
	);

	let app = app.restart().await;

	assert_eq!(
		app.get("/api/policies", Some(&admin)).await.status(),
		StatusCode::OK
	);
	assert_eq!(
		app.get("/api/policies", Some(&teacher)).await.status(),
		StatusCode::OK
	);
	let path = format!("/api/courses/{}", super::support::COURSE_BY_TEACHER_A);
	assert_eq!(
		app.delete(&path, Some(&app.fixtures.teacher_a)).await.status(),
		StatusCode::NO_CONTENT,
		"Ownership defaults should still apply after restart"
	);
}

#[tokio::test]
async fn duplicate_policy_id_conflicts() {
	let app = TestApp::new().await;
	let admin = app.fixtures.admin;

	let mut duplicate = night_freeze();
	duplicate["id"] = json!("admin_full_access");

	let response = app.post("/api/policies", Some(&admin), duplicate).await;
	assert_eq!(response.status(), StatusCode::CONFLICT);
	let body: Value = read_json(response).await;
	assert_eq!(body["error"], "conflict");

	assert_eq!(app.state.engine.store().len(), 16);
}

#[tokio::test]
async fn invalid_policy_is_rejected() {
	let app = TestApp::new().await;
	let admin = app.fixtures.admin;

	let mut scalar_in = night_freeze();
	scalar_in["conditions"] = json!([
		{ "attribute": "user.role", "operator": "in", "value": "admin" }
	]);

	let response = app.post("/api/policies", Some(&admin), scalar_in).await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	let body: Value = read_json(response).await;
	assert_eq!(body["error"], "invalid_policy");

	let mut unknown_operator = night_freeze();
	unknown_operator["conditions"] = json!([
		{ "attribute": "user.role", "operator": "contains", "value": "admin" }
	]);
	let response = app.post("/api/policies", Some(&admin), unknown_operator).await;
	assert!(response.status().is_client_error());

	assert_eq!(app.state.engine.store().len(), 16);
}

#[tokio::test]
async fn teacher_granted_policy_management_by_new_policy() {
	let app = TestApp::with_default_policies().await;
	let admin = app.fixtures.admin;
	let teacher: TestUser = app.fixtures.teacher_b;
	assert_eq!(teacher.role, Role::Teacher);

	let grant = json!({
		"id": "teachers_read_policies",
		"name": "Teachers may read policies",
		"target": { "resource": "abac_policy", "action": "read" },
		"conditions": [
			{ "attribute": "user.role", "operator": "eq", "value": "teacher" }
		],
		"effect": "allow",
		"priority": 10
	});

	assert_eq!(
		app.get("/api/policies", Some(&teacher)).await.status(),
		StatusCode::FORBIDDEN
	);
	assert_eq!(
		app.post("/api/policies", Some(&admin), grant).await.status(),
		StatusCode::CREATED
	);
	assert_eq!(
		app.get("/api/policies", Some(&teacher)).await.status(),
		StatusCode::OK
	);
}
