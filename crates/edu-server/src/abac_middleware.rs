// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! ABAC (Attribute-Based Access Control) enforcement for routes and handlers.
//!
//! # Route-Level Authorization
//!
//! - [`RequireAccess`] - Evaluates the policy set for a declared resource type and action
//!
//! # Handler-Level Authorization
//!
//! - [`check_authorization`] - Evaluates a context built inside a handler
//! - [`environment_attributes`] - Ambient facts (`hour`, `weekday`, `ip`) for a request
//!
//! # Security Properties
//!
//! - Unauthenticated requests are rejected with 401 Unauthorized before the engine is consulted
//! - Denied requests are rejected with 403 Forbidden
//! - Error responses do not leak permission details beyond "Insufficient permissions"
//! - Decisions are logged with user_id, action and resource type (never tokens)
//!
//! # Example
//!
//! ```ignore
//! use edu_server::abac_middleware::RequireAccess;
//!
//! Router::new()
//!     .route("/api/courses", post(create_course))
//!     .route_layer(RequireAccess::new("course", "create"))
//!     .layer(Extension(engine));
//! ```

use std::{
	future::Future,
	net::SocketAddr,
	pin::Pin,
	sync::Arc,
	task::{Context, Poll},
};

use axum::{
	body::Body,
	extract::ConnectInfo,
	http::{HeaderMap, Request, StatusCode},
	response::{IntoResponse, Response},
	Json,
};
use chrono::{DateTime, Datelike, Timelike, Utc};
use edu_server_abac::{AccessContext, AttrValue, Attributes, AuthContext, PolicyEngine};
use pin_project_lite::pin_project;
use serde::Serialize;
use tower::{Layer, Service};
use tracing::instrument;

use crate::error::ErrorResponse;
use crate::ownership::ResourceAttributes;

/// Environment attribute names populated for every request.
pub const ENV_HOUR: &str = "hour";
pub const ENV_WEEKDAY: &str = "weekday";
pub const ENV_IP: &str = "ip";

const FORWARDED_FOR: &str = "x-forwarded-for";

// =============================================================================
// Route-Level Authorization Layer
// =============================================================================

/// Route layer that asks the [`PolicyEngine`] whether the caller may perform
/// `action` on a resource of `resource_type`.
///
/// The engine is read from request extensions, so the router must install it
/// with `.layer(Extension(engine))` outside this layer. Any
/// [`ResourceAttributes`] already in extensions (see
/// [`crate::ownership::resource_author_layer`]) are copied into the context; the
/// declared resource type always wins over a `type` entry there.
///
/// # Security
///
/// - Rejects unauthenticated requests with 401
/// - Rejects denied requests with 403
/// - A missing engine is a server misconfiguration and fails closed with 500
#[derive(Clone)]
pub struct RequireAccess {
	resource_type: Arc<str>,
	action: Arc<str>,
}

impl RequireAccess {
	pub fn new(resource_type: impl Into<Arc<str>>, action: impl Into<Arc<str>>) -> Self {
		Self {
			resource_type: resource_type.into(),
			action: action.into(),
		}
	}
}

impl<S> Layer<S> for RequireAccess {
	type Service = RequireAccessService<S>;

	fn layer(&self, inner: S) -> Self::Service {
		RequireAccessService {
			inner,
			resource_type: self.resource_type.clone(),
			action: self.action.clone(),
		}
	}
}

/// Service wrapper for [`RequireAccess`] layer.
#[derive(Clone)]
pub struct RequireAccessService<S> {
	inner: S,
	resource_type: Arc<str>,
	action: Arc<str>,
}

impl<S> Service<Request<Body>> for RequireAccessService<S>
where
	S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
	S::Future: Send,
{
	type Response = Response;
	type Error = S::Error;
	type Future = RequireAccessFuture<S::Future>;

	fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
		self.inner.poll_ready(cx)
	}

	fn call(&mut self, req: Request<Body>) -> Self::Future {
		let auth_ctx = req
			.extensions()
			.get::<AuthContext>()
			.cloned()
			.unwrap_or_else(AuthContext::unauthenticated);

		let Some(current_user) = auth_ctx.current_user else {
			tracing::debug!(
				action = %self.action,
				resource_type = %self.resource_type,
				"ABAC denied: not authenticated"
			);
			return RequireAccessFuture::Rejected {
				resp: Some(unauthorized_response()),
			};
		};

		let Some(engine) = req.extensions().get::<PolicyEngine>() else {
			tracing::error!(
				action = %self.action,
				resource_type = %self.resource_type,
				"ABAC engine missing from request extensions"
			);
			return RequireAccessFuture::Rejected {
				resp: Some(internal_error_response()),
			};
		};

		let mut ctx = AccessContext::new(&*self.resource_type, &*self.action)
			.with_user(current_user.subject());
		if let Some(ResourceAttributes(attrs)) = req.extensions().get::<ResourceAttributes>() {
			for (key, value) in attrs {
				ctx.resource.entry(key.clone()).or_insert_with(|| value.clone());
			}
		}
		ctx.environment = environment_attributes(
			req.headers(),
			req.extensions().get::<ConnectInfo<SocketAddr>>().map(|c| c.0),
			Utc::now(),
		);

		if !engine.is_allowed(&ctx) {
			tracing::info!(
				user_id = %current_user.id,
				action = %self.action,
				resource_type = %self.resource_type,
				"ABAC denied: access check failed"
			);
			return RequireAccessFuture::Rejected {
				resp: Some(forbidden_response()),
			};
		}

		tracing::debug!(
			user_id = %current_user.id,
			action = %self.action,
			resource_type = %self.resource_type,
			"ABAC allowed: access check passed"
		);

		RequireAccessFuture::Inner {
			fut: self.inner.call(req),
		}
	}
}

pin_project! {
	/// Future for [`RequireAccessService`].
	#[project = RequireAccessFutureProj]
	pub enum RequireAccessFuture<F> {
		Inner { #[pin] fut: F },
		Rejected { resp: Option<Response> },
	}
}

impl<F, E> Future for RequireAccessFuture<F>
where
	F: Future<Output = Result<Response, E>>,
{
	type Output = Result<Response, E>;

	fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		match self.project() {
			RequireAccessFutureProj::Inner { fut } => fut.poll(cx),
			RequireAccessFutureProj::Rejected { resp } => {
				Poll::Ready(Ok(resp.take().expect("polled after completion")))
			}
		}
	}
}

/// Ambient facts for a request at `now`.
///
/// `hour` is 0-23 and `weekday` 0-6 starting Sunday, both in UTC. `ip` is the
/// first `x-forwarded-for` entry, else the peer address, else absent.
pub fn environment_attributes(
	headers: &HeaderMap,
	peer: Option<SocketAddr>,
	now: DateTime<Utc>,
) -> Attributes {
	let mut env = Attributes::new();
	env.insert(ENV_HOUR.to_string(), AttrValue::from(now.hour()));
	env.insert(
		ENV_WEEKDAY.to_string(),
		AttrValue::from(now.weekday().num_days_from_sunday()),
	);

	let forwarded = headers
		.get(FORWARDED_FOR)
		.and_then(|v| v.to_str().ok())
		.and_then(|v| v.split(',').next())
		.map(str::trim)
		.filter(|v| !v.is_empty())
		.map(str::to_string);

	if let Some(ip) = forwarded.or_else(|| peer.map(|addr| addr.ip().to_string())) {
		env.insert(ENV_IP.to_string(), AttrValue::String(ip));
	}

	env
}

fn unauthorized_response() -> Response {
	(
		StatusCode::UNAUTHORIZED,
		Json(ErrorResponse::new("unauthorized", "Authentication required")),
	)
		.into_response()
}

fn forbidden_response() -> Response {
	(
		StatusCode::FORBIDDEN,
		Json(ErrorResponse::new("forbidden", "Insufficient permissions")),
	)
		.into_response()
}

fn internal_error_response() -> Response {
	(
		StatusCode::INTERNAL_SERVER_ERROR,
		Json(ErrorResponse::new("internal_error", "An internal error occurred")),
	)
		.into_response()
}

// =============================================================================
// Handler-level authorization helpers
// =============================================================================

/// Error type for authorization failures that implements IntoResponse as 403 Forbidden.
///
/// The message is intentionally generic to avoid leaking permission details.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationError {
	/// Error code, always "forbidden"
	pub error: String,
	/// Human-readable message
	pub message: String,
}

impl AuthorizationError {
	/// Create a forbidden error with a custom message.
	pub fn forbidden(message: impl Into<String>) -> Self {
		Self {
			error: "forbidden".to_string(),
			message: message.into(),
		}
	}
}

impl std::fmt::Display for AuthorizationError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}: {}", self.error, self.message)
	}
}

impl std::error::Error for AuthorizationError {}

impl IntoResponse for AuthorizationError {
	fn into_response(self) -> Response {
		(StatusCode::FORBIDDEN, Json(self)).into_response()
	}
}

/// Check a fully built context inside a handler.
///
/// Returns `Ok(())` if allowed, `Err(AuthorizationError)` if denied.
///
/// # Example
///
/// ```ignore
/// let ctx = AccessContext::new("course", "update")
///     .with_user(user.subject())
///     .with_resource_attr("author_id", course.author_id);
/// check_authorization(&engine, &ctx)?;
/// ```
#[instrument(
	skip(engine, ctx),
	fields(
		user_id = ?ctx.user.as_ref().map(|u| u.id.to_string()),
		action = %ctx.action,
		resource_type = ?ctx.resource_type(),
	)
)]
pub fn check_authorization(
	engine: &PolicyEngine,
	ctx: &AccessContext,
) -> Result<(), AuthorizationError> {
	if engine.is_allowed(ctx) {
		tracing::debug!("Authorization check passed");
		Ok(())
	} else {
		tracing::info!("ABAC denied: handler authorization check failed");
		Err(AuthorizationError::forbidden("Insufficient permissions"))
	}
}
