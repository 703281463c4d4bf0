// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Identity extraction middleware.
//!
//! Authentication happens upstream: the gateway forwards the caller's user id
//! and role as request headers. This layer turns those headers into an
//! [`AuthContext`] request extension for the enforcement layer and handlers.
//!
//! A request whose headers are missing or malformed is marked unauthenticated
//! rather than rejected; rejecting is left to the enforcement layer so public
//! routes keep working.
//!
//! ```ignore
//! use axum::middleware::from_fn_with_state;
//!
//! let app = Router::new()
//!     .route("/api/policies", get(list_policies))
//!     .layer(from_fn_with_state(state.clone(), identity_layer));
//! ```

use axum::{
	body::Body,
	extract::State,
	http::{HeaderMap, Request},
	middleware::Next,
	response::Response,
};
use edu_server_abac::{AuthContext, CurrentUser, Role, UserId};
use edu_server_config::AuthConfig;
use tracing::instrument;

use crate::api::AppState;

/// Identity middleware that stores an [`AuthContext`] in request extensions.
#[instrument(
	name = "identity_layer",
	skip(state, request, next),
	fields(user_id = tracing::field::Empty)
)]
pub async fn identity_layer(
	State(state): State<AppState>,
	mut request: Request<Body>,
	next: Next,
) -> Response {
	let auth_ctx = match identify(request.headers(), &state.auth_config) {
		Some(current_user) => {
			tracing::Span::current().record("user_id", tracing::field::display(&current_user.id));
			AuthContext::authenticated(current_user)
		}
		None => AuthContext::unauthenticated(),
	};

	request.extensions_mut().insert(auth_ctx);
	next.run(request).await
}

/// Reads the gateway identity headers.
///
/// Returns `None` when either header is absent, not valid UTF-8, the id is not a
/// UUID, or the role is unknown.
pub fn identify(headers: &HeaderMap, config: &AuthConfig) -> Option<CurrentUser> {
	let id_value = header_str(headers, &config.user_id_header)?;
	let role_value = header_str(headers, &config.user_role_header)?;

	let id = match id_value.parse::<UserId>() {
		Ok(id) => id,
		Err(_) => {
			tracing::debug!("identity header is not a valid user id");
			return None;
		}
	};
	let role = match role_value.parse::<Role>() {
		Ok(role) => role,
		Err(e) => {
			tracing::debug!(error = %e, "identity header has unknown role");
			return None;
		}
	};

	Some(CurrentUser::new(id, role))
}

fn header_str<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
	headers
		.get(name)
		.and_then(|value| value.to_str().ok())
		.map(str::trim)
		.filter(|value| !value.is_empty())
}
