// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Startup policy loading.

use edu_server_abac::{default_policies, PolicyStore};

use crate::error::DbError;
use crate::policy::PolicySource;

/// Build the live policy store from persistent storage.
///
/// An empty table is seeded with the built-in defaults, so the table stays the
/// authoritative policy set and later additions extend the defaults instead of
/// replacing them. Any load, seed or validation failure is returned; callers are
/// expected to abort startup rather than run with a partial policy set.
#[tracing::instrument(skip(source))]
pub async fn load_policy_store(source: &dyn PolicySource) -> Result<PolicyStore, DbError> {
	let policies = source.load_policies().await?;

	if policies.is_empty() {
		tracing::info!("no persisted ABAC policies, seeding defaults");
		let defaults = default_policies();
		for policy in &defaults {
			source.insert_policy(policy).await?;
		}
		let store = PolicyStore::with_policies(defaults)?;
		tracing::info!(count = store.len(), "ABAC default policies persisted");
		return Ok(store);
	}

	let count = policies.len();
	let store = PolicyStore::with_policies(policies)?;
	tracing::info!(count, "ABAC policies loaded from database");
	Ok(store)
}

/// A store holding only the built-in default policies.
pub fn default_policy_store() -> Result<PolicyStore, DbError> {
	let store = PolicyStore::with_policies(default_policies())?;
	tracing::info!(count = store.len(), "ABAC default policies installed");
	Ok(store)
}
