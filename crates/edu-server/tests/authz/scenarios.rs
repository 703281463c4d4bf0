// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization tests for course routes under the default policy set.

use axum::http::{Method, StatusCode};
use serde_json::json;

use super::support::{
	read_json, run_authz_cases, AuthzCase, TestApp, COURSE_BY_TEACHER_A, COURSE_BY_TEACHER_B,
	SESSION_OF_STUDENT,
};

// ============================================================================
// Default Policy Scenarios
// ============================================================================

#[tokio::test]
async fn admin_can_delete_any_course() {
	let app = TestApp::new().await;
	let admin = &app.fixtures.admin;

	let response = app
		.delete(&format!("/api/courses/{COURSE_BY_TEACHER_A}"), Some(admin))
		.await;

	assert_eq!(
		response.status(),
		StatusCode::NO_CONTENT,
		"Admin should be able to delete any course"
	);
}

#[tokio::test]
async fn student_cannot_create_course() {
	let app = TestApp::new().await;
	let student = &app.fixtures.student;

	let response = app.post("/api/courses", Some(student), json!({})).await;

	assert_eq!(
		response.status(),
		StatusCode::FORBIDDEN,
		"Students have no create policy for courses"
	);
	let body: serde_json::Value = read_json(response).await;
	assert_eq!(body["error"], "forbidden");
	assert_eq!(body["message"], "Insufficient permissions");
}

#[tokio::test]
async fn teacher_can_update_own_course() {
	let app = TestApp::new().await;
	let teacher = &app.fixtures.teacher_a;

	let response = app
		.put(&format!("/api/courses/{COURSE_BY_TEACHER_A}"), Some(teacher))
		.await;

	assert_eq!(
		response.status(),
		StatusCode::NO_CONTENT,
		"Author should be able to update their own course"
	);
}

#[tokio::test]
async fn teacher_cannot_update_other_teachers_course() {
	let app = TestApp::new().await;
	let teacher = &app.fixtures.teacher_a;

	let response = app
		.put(&format!("/api/courses/{COURSE_BY_TEACHER_B}"), Some(teacher))
		.await;

	assert_eq!(
		response.status(),
		StatusCode::FORBIDDEN,
		"Teacher should not be able to update a course authored by someone else"
	);
}

#[tokio::test]
async fn unknown_course_has_no_owner() {
	let app = TestApp::new().await;
	let teacher = &app.fixtures.teacher_a;

	let response = app.put("/api/courses/course-missing", Some(teacher)).await;

	assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn sessions_are_revocable_by_their_owner() {
	let app = TestApp::new().await;
	let f = app.fixtures;
	let path = format!("/api/sessions/{SESSION_OF_STUDENT}");

	let cases = vec![
		AuthzCase {
			name: "student revokes own session",
			method: Method::DELETE,
			path: path.clone(),
			user: Some(f.student),
			body: None,
			expected_status: StatusCode::NO_CONTENT,
		},
		AuthzCase {
			name: "teacher revokes student's session",
			method: Method::DELETE,
			path: path.clone(),
			user: Some(f.teacher_a),
			body: None,
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "admin revokes any session",
			method: Method::DELETE,
			path,
			user: Some(f.admin),
			body: None,
			expected_status: StatusCode::NO_CONTENT,
		},
		AuthzCase {
			name: "student revokes unknown session",
			method: Method::DELETE,
			path: "/api/sessions/session-missing".to_string(),
			user: Some(f.student),
			body: None,
			expected_status: StatusCode::FORBIDDEN,
		},
	];

	run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn course_access_matrix() {
	let app = TestApp::new().await;
	let f = app.fixtures;
	let own = format!("/api/courses/{COURSE_BY_TEACHER_A}");
	let other = format!("/api/courses/{COURSE_BY_TEACHER_B}");

	let cases = vec![
		AuthzCase {
			name: "student reads course",
			method: Method::GET,
			path: own.clone(),
			user: Some(f.student),
			body: None,
			expected_status: StatusCode::NO_CONTENT,
		},
		AuthzCase {
			name: "teacher creates course",
			method: Method::POST,
			path: "/api/courses".to_string(),
			user: Some(f.teacher_a),
			body: Some(json!({})),
			expected_status: StatusCode::NO_CONTENT,
		},
		AuthzCase {
			name: "teacher deletes own course",
			method: Method::DELETE,
			path: own.clone(),
			user: Some(f.teacher_a),
			body: None,
			expected_status: StatusCode::NO_CONTENT,
		},
		AuthzCase {
			name: "teacher deletes other course",
			method: Method::DELETE,
			path: other.clone(),
			user: Some(f.teacher_a),
			body: None,
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "student updates course",
			method: Method::PUT,
			path: own.clone(),
			user: Some(f.student),
			body: None,
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "admin updates other course",
			method: Method::PUT,
			path: other.clone(),
			user: Some(f.admin),
			body: None,
			expected_status: StatusCode::NO_CONTENT,
		},
		AuthzCase {
			name: "anonymous reads course",
			method: Method::GET,
			path: own,
			user: None,
			body: None,
			expected_status: StatusCode::UNAUTHORIZED,
		},
		AuthzCase {
			name: "anonymous deletes course",
			method: Method::DELETE,
			path: other,
			user: None,
			body: None,
			expected_status: StatusCode::UNAUTHORIZED,
		},
	];

	run_authz_cases(&app, &cases).await;
}

// ============================================================================
// Identity Header Tests
// ============================================================================

#[tokio::test]
async fn malformed_identity_is_unauthenticated() {
	let app = TestApp::new().await;
	let path = format!("/api/courses/{COURSE_BY_TEACHER_A}");
	let id = app.fixtures.teacher_a.id.to_string();

	for headers in [
		vec![("x-user-id", "not-a-uuid"), ("x-user-role", "teacher")],
		vec![("x-user-id", id.as_str()), ("x-user-role", "principal")],
		vec![("x-user-id", id.as_str())],
	] {
		let response = app.get_with_headers(&path, &headers).await;
		assert_eq!(
			response.status(),
			StatusCode::UNAUTHORIZED,
			"headers {headers:?} should not authenticate"
		);
		let body: serde_json::Value = read_json(response).await;
		assert_eq!(body["error"], "unauthorized");
	}
}

#[tokio::test]
async fn health_is_public() {
	let app = TestApp::new().await;

	let response = app.get("/health", None).await;

	assert_eq!(response.status(), StatusCode::OK);
	let body: serde_json::Value = read_json(response).await;
	assert_eq!(body["status"], "ok");
	assert_eq!(body["policies"], 16);
}

#[tokio::test]
async fn defaults_source_behaves_like_empty_database() {
	let app = TestApp::with_default_policies().await;
	let f = app.fixtures;

	assert!(app.state.policy_source.is_none());
	assert_eq!(app.state.engine.store().len(), 16);

	let response = app.post("/api/courses", Some(&f.student), json!({})).await;
	assert_eq!(response.status(), StatusCode::FORBIDDEN);

	let response = app
		.put(&format!("/api/courses/{COURSE_BY_TEACHER_A}"), Some(&f.teacher_a))
		.await;
	assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
