// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tests for the decision endpoint.

use axum::http::StatusCode;
use serde_json::{json, Value};

use super::support::TestApp;

async fn evaluate(app: &TestApp, context: Value) -> bool {
	let response = app
		.post("/api/authz/evaluate", Some(&app.fixtures.admin), context)
		.await;
	assert_eq!(response.status(), StatusCode::OK);
	let body: Value = super::support::read_json(response).await;
	body["allowed"].as_bool().unwrap()
}

#[tokio::test]
async fn evaluates_submitted_contexts() {
	let app = TestApp::new().await;
	let teacher = app.fixtures.teacher_a;
	let other = app.fixtures.teacher_b;

	let own_course = json!({
		"user": { "id": teacher.id, "role": "teacher" },
		"resource": { "type": "course", "author_id": teacher.id },
		"action": "update"
	});
	assert!(evaluate(&app, own_course).await);

	let other_course = json!({
		"user": { "id": teacher.id, "role": "teacher" },
		"resource": { "type": "course", "author_id": other.id },
		"action": "update"
	});
	assert!(!evaluate(&app, other_course).await);

	let student_create = json!({
		"user": { "id": app.fixtures.student.id, "role": "student" },
		"resource": { "type": "course" },
		"action": "create"
	});
	assert!(!evaluate(&app, student_create).await);
}

#[tokio::test]
async fn anonymous_context_is_denied() {
	let app = TestApp::new().await;

	let anonymous = json!({
		"resource": { "type": "course", "author_id": "anyone" },
		"action": "read"
	});
	assert!(!evaluate(&app, anonymous).await);
}

#[tokio::test]
async fn unknown_resource_type_is_denied() {
	let app = TestApp::new().await;

	let context = json!({
		"user": { "id": app.fixtures.student.id, "role": "student" },
		"resource": { "type": "gradebook" },
		"action": "read"
	});
	assert!(!evaluate(&app, context).await);
}

#[tokio::test]
async fn evaluate_requires_admin_under_defaults() {
	let app = TestApp::new().await;
	let context = json!({ "resource": { "type": "course" }, "action": "read" });

	let response = app
		.post("/api/authz/evaluate", Some(&app.fixtures.student), context.clone())
		.await;
	assert_eq!(response.status(), StatusCode::FORBIDDEN);

	let response = app.post("/api/authz/evaluate", None, context).await;
	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
