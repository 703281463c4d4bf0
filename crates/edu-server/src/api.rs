// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! HTTP API router and shared application state.

use std::sync::Arc;

use axum::{
	middleware::from_fn_with_state,
	routing::{get, post},
	Extension, Router,
};
use edu_server_abac::{PolicyEngine, PolicyStore};
use edu_server_config::{AuthConfig, PolicySourceKind, ServerConfig};
use edu_server_db::{
	create_pool, default_policy_store, load_policy_store, run_migrations, PolicyRepository,
	PolicySource,
};

use crate::{
	abac_middleware::RequireAccess, auth_middleware::identity_layer, error::ServerError, routes,
};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
	pub engine: PolicyEngine,
	/// Durable policy storage; `None` when running from the built-in defaults.
	pub policy_source: Option<Arc<dyn PolicySource>>,
	pub auth_config: AuthConfig,
}

impl AppState {
	pub fn new(
		engine: PolicyEngine,
		policy_source: Option<Arc<dyn PolicySource>>,
		auth_config: AuthConfig,
	) -> Self {
		Self {
			engine,
			policy_source,
			auth_config,
		}
	}
}

/// Load the policy set selected by `config.abac` and assemble the application state.
///
/// With the database source the schema is created if needed and every persisted
/// row must decode; an empty table is seeded with the built-in defaults.
pub async fn create_app_state(config: &ServerConfig) -> Result<AppState, ServerError> {
	let (store, policy_source): (PolicyStore, Option<Arc<dyn PolicySource>>) =
		match config.abac.policy_source {
			PolicySourceKind::Database => {
				let pool = create_pool(&config.database.url).await?;
				run_migrations(&pool).await?;
				let source: Arc<dyn PolicySource> = Arc::new(PolicyRepository::new(pool));
				let store = load_policy_store(source.as_ref()).await?;
				(store, Some(source))
			}
			PolicySourceKind::Defaults => (default_policy_store()?, None),
		};

	tracing::info!(
		policies = store.len(),
		source = %config.abac.policy_source,
		"ABAC policy store ready"
	);

	Ok(AppState::new(
		PolicyEngine::new(Arc::new(store)),
		policy_source,
		config.auth.clone(),
	))
}

/// Create the API router with all routes.
pub fn create_router(state: AppState) -> Router {
	let policies = Router::new()
		.route("/api/policies", get(routes::policies::list_policies))
		.route_layer(RequireAccess::new("abac_policy", "read"));

	let create_policy = Router::new()
		.route("/api/policies", post(routes::policies::create_policy))
		.route_layer(RequireAccess::new("abac_policy", "create"));

	let authz = Router::new()
		.route("/api/authz/evaluate", post(routes::authz::evaluate))
		.route_layer(RequireAccess::new("abac_decision", "read"));

	Router::new()
		.route("/health", get(routes::health::health_check))
		.merge(policies)
		.merge(create_policy)
		.merge(authz)
		.layer(from_fn_with_state(state.clone(), identity_layer))
		.layer(Extension(state.engine.clone()))
		.with_state(state)
}
