// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use axum::{
	body::Body,
	http::{Method, Request, StatusCode},
	middleware::from_fn_with_state,
	response::Response,
	routing::{delete, get, post, put},
	Extension, Router,
};
use edu_server_abac::{Role, UserId};
use edu_server_config::PolicySourceKind;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use edu_server::{
	abac_middleware::RequireAccess,
	api::{create_app_state, create_router, AppState},
	auth_middleware::identity_layer,
	ownership::{resource_author_layer, ResourceAuthor, ResourceAuthorLookup},
	ServerConfig, ServerError,
};

pub const COURSE_BY_TEACHER_A: &str = "course-a";
pub const COURSE_BY_TEACHER_B: &str = "course-b";
pub const SESSION_OF_STUDENT: &str = "session-student";

#[derive(Clone, Copy)]
pub struct TestUser {
	pub id: UserId,
	pub role: Role,
}

impl TestUser {
	pub fn new(role: Role) -> Self {
		Self {
			id: UserId::generate(),
			role,
		}
	}

	pub fn identity_headers(&self) -> [(&'static str, String); 2] {
		[
			("x-user-id", self.id.to_string()),
			("x-user-role", self.role.as_str().to_string()),
		]
	}
}

#[derive(Clone, Copy)]
pub struct Fixtures {
	pub admin: TestUser,
	pub teacher_a: TestUser,
	pub teacher_b: TestUser,
	pub student: TestUser,
}

impl Fixtures {
	fn new() -> Self {
		Self {
			admin: TestUser::new(Role::Admin),
			teacher_a: TestUser::new(Role::Teacher),
			teacher_b: TestUser::new(Role::Teacher),
			student: TestUser::new(Role::Student),
		}
	}
}

/// Resource owners known to the fixture routes.
struct OwnerIndex {
	owners: HashMap<String, UserId>,
}

#[async_trait]
impl ResourceAuthorLookup for OwnerIndex {
	async fn author_of(&self, _resource_type: &str, id: &str) -> Result<Option<String>, ServerError> {
		Ok(self.owners.get(id).map(UserId::to_string))
	}
}

async fn no_content() -> StatusCode {
	StatusCode::NO_CONTENT
}

/// Stand-in course and session routes guarded the way a content service guards its handlers.
fn course_routes(state: &AppState, fixtures: &Fixtures) -> Router {
	let catalog = Arc::new(OwnerIndex {
		owners: HashMap::from([
			(COURSE_BY_TEACHER_A.to_string(), fixtures.teacher_a.id),
			(COURSE_BY_TEACHER_B.to_string(), fixtures.teacher_b.id),
		]),
	});
	let authors = ResourceAuthor::new("course", catalog);

	let create = Router::new()
		.route("/api/courses", post(no_content))
		.route_layer(RequireAccess::new("course", "create"));
	let read = Router::new()
		.route("/api/courses/{id}", get(no_content))
		.route_layer(RequireAccess::new("course", "read"));
	let update = Router::new()
		.route("/api/courses/{id}", put(no_content))
		.route_layer(RequireAccess::new("course", "update"))
		.route_layer(from_fn_with_state(authors.clone(), resource_author_layer));
	let remove = Router::new()
		.route("/api/courses/{id}", delete(no_content))
		.route_layer(RequireAccess::new("course", "delete"))
		.route_layer(from_fn_with_state(authors, resource_author_layer));

	let sessions = Arc::new(OwnerIndex {
		owners: HashMap::from([(SESSION_OF_STUDENT.to_string(), fixtures.student.id)]),
	});
	let revoke_session = Router::new()
		.route("/api/sessions/{id}", delete(no_content))
		.route_layer(RequireAccess::new("user_sessions", "delete"))
		.route_layer(from_fn_with_state(
			ResourceAuthor::new("user_sessions", sessions).with_attribute("user_id"),
			resource_author_layer,
		));

	Router::new()
		.merge(create)
		.merge(read)
		.merge(update)
		.merge(remove)
		.merge(revoke_session)
		.layer(from_fn_with_state(state.clone(), identity_layer))
		.layer(Extension(state.engine.clone()))
}

pub struct TestApp {
	pub router: Router,
	pub fixtures: Fixtures,
	pub state: AppState,
	db_path: PathBuf,
	_temp_dir: TempDir,
}

impl TestApp {
	/// App backed by a fresh database, which starts from the default policies.
	pub async fn new() -> Self {
		let temp_dir = tempfile::tempdir().unwrap();
		let db_path = temp_dir.path().join("test_authz.db");
		Self::build(temp_dir, db_path, PolicySourceKind::Database, Fixtures::new()).await
	}

	/// App running from the built-in defaults with no database.
	pub async fn with_default_policies() -> Self {
		let temp_dir = tempfile::tempdir().unwrap();
		let db_path = temp_dir.path().join("unused.db");
		Self::build(temp_dir, db_path, PolicySourceKind::Defaults, Fixtures::new()).await
	}

	/// Rebuild the app from the same database, as a server restart would.
	pub async fn restart(self) -> Self {
		let TestApp {
			fixtures,
			db_path,
			_temp_dir,
			..
		} = self;
		Self::build(_temp_dir, db_path, PolicySourceKind::Database, fixtures).await
	}

	async fn build(
		temp_dir: TempDir,
		db_path: PathBuf,
		policy_source: PolicySourceKind,
		fixtures: Fixtures,
	) -> Self {
		let mut config = ServerConfig::default();
		config.database.url = format!("sqlite:{}?mode=rwc", db_path.display());
		config.abac.policy_source = policy_source;

		let state = create_app_state(&config).await.unwrap();
		let router = create_router(state.clone()).merge(course_routes(&state, &fixtures));

		Self {
			router,
			fixtures,
			state,
			db_path,
			_temp_dir: temp_dir,
		}
	}

	pub async fn get(&self, path: &str, user: Option<&TestUser>) -> Response<Body> {
		self
			.request(Method::GET, path, user, Option::<()>::None)
			.await
	}

	pub async fn post(
		&self,
		path: &str,
		user: Option<&TestUser>,
		body: impl Serialize,
	) -> Response<Body> {
		self.request(Method::POST, path, user, Some(body)).await
	}

	pub async fn put(&self, path: &str, user: Option<&TestUser>) -> Response<Body> {
		self
			.request(Method::PUT, path, user, Option::<()>::None)
			.await
	}

	pub async fn delete(&self, path: &str, user: Option<&TestUser>) -> Response<Body> {
		self
			.request(Method::DELETE, path, user, Option::<()>::None)
			.await
	}

	/// GET with raw header pairs, for malformed identity tests.
	pub async fn get_with_headers(&self, path: &str, headers: &[(&str, &str)]) -> Response<Body> {
		let mut builder = Request::builder().method(Method::GET).uri(path);
		for (name, value) in headers {
			builder = builder.header(*name, *value);
		}
		let request = builder.body(Body::empty()).unwrap();

		self.router.clone().oneshot(request).await.unwrap()
	}

	async fn request<T: Serialize>(
		&self,
		method: Method,
		path: &str,
		user: Option<&TestUser>,
		body: Option<T>,
	) -> Response<Body> {
		let mut builder = Request::builder().method(method).uri(path);

		if let Some(test_user) = user {
			for (name, value) in test_user.identity_headers() {
				builder = builder.header(name, value);
			}
		}

		let request_body = match body {
			Some(b) => {
				builder = builder.header("content-type", "application/json");
				Body::from(serde_json::to_string(&b).unwrap())
			}
			None => Body::empty(),
		};

		let request = builder.body(request_body).unwrap();

		self.router.clone().oneshot(request).await.unwrap()
	}
}

pub async fn read_json<T: DeserializeOwned>(response: Response<Body>) -> T {
	let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
		.await
		.unwrap();
	serde_json::from_slice(&bytes).unwrap()
}

pub struct AuthzCase {
	pub name: &'static str,
	pub method: Method,
	pub path: String,
	pub user: Option<TestUser>,
	pub body: Option<serde_json::Value>,
	pub expected_status: StatusCode,
}

pub async fn run_authz_cases(app: &TestApp, cases: &[AuthzCase]) {
	for case in cases {
		let response = match (&case.method, &case.body) {
			(m, Some(body)) if *m == Method::POST => {
				app.post(&case.path, case.user.as_ref(), body.clone()).await
			}
			(m, _) if *m == Method::PUT => app.put(&case.path, case.user.as_ref()).await,
			(m, _) if *m == Method::DELETE => app.delete(&case.path, case.user.as_ref()).await,
			_ => app.get(&case.path, case.user.as_ref()).await,
		};

		if response.status() != case.expected_status {
			let (parts, body) = response.into_parts();
			let body_bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
			let body_str = String::from_utf8_lossy(&body_bytes);
			panic!(
				"Case '{}': {} {} - expected {}, got {}\nResponse body: {}",
				case.name, case.method, case.path, case.expected_status, parts.status, body_str
			);
		}
	}
}
