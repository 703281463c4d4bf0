// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Policy management HTTP handlers.
//!
//! Policies can be listed and added; there is no update or delete.

use axum::{extract::State, http::StatusCode, Extension, Json};
use edu_server_abac::{AuthContext, Policy};

use crate::{api::AppState, error::ServerError};

/// GET /api/policies - The live policy set, by priority descending then id.
pub async fn list_policies(State(state): State<AppState>) -> Json<Vec<Policy>> {
	Json(state.engine.store().snapshot())
}

/// POST /api/policies - Add a policy to the live set.
///
/// Requires an authenticated caller, whose id is logged. The policy is validated
/// and checked for a duplicate id before anything is written. With a database source it is persisted first, so a
/// failed write leaves the live set unchanged.
#[tracing::instrument(skip(state, auth, policy), fields(policy_id = %policy.id))]
pub async fn create_policy(
	State(state): State<AppState>,
	Extension(auth): Extension<AuthContext>,
	Json(policy): Json<Policy>,
) -> Result<(StatusCode, Json<Policy>), ServerError> {
	let user = auth
		.require_user()
		.map_err(|e| ServerError::Unauthorized(e.to_string()))?;
	policy.validate()?;

	let store = state.engine.store();
	if store.get(&policy.id).is_some() {
		return Err(ServerError::Conflict(format!(
			"Policy already exists: {}",
			policy.id
		)));
	}

	if let Some(source) = &state.policy_source {
		source.insert_policy(&policy).await?;
	}
	store.add(policy.clone())?;

	tracing::info!(
		user_id = %user.id,
		effect = %policy.effect,
		priority = policy.priority,
		"ABAC policy created"
	);

	Ok((StatusCode::CREATED, Json(policy)))
}
