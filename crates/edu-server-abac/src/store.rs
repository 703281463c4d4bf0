// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Thread-safe in-memory policy store.

use parking_lot::RwLock;

use crate::error::{AbacError, Result};
use crate::policy::Policy;

/// The live policy set shared by the engine and the enforcement layer.
///
/// Reads take a shared lock and may run concurrently; [`PolicyStore::add`] takes
/// the exclusive lock. Evaluation never performs I/O while holding the lock.
#[derive(Debug, Default)]
pub struct PolicyStore {
	policies: RwLock<Vec<Policy>>,
}

impl PolicyStore {
	/// Create an empty store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Create a store from a bulk-loaded policy set.
	///
	/// Every policy is validated and ids must be unique. The set is kept ordered
	/// by priority descending, then id; evaluation does not depend on that order.
	pub fn with_policies(policies: Vec<Policy>) -> Result<Self> {
		let store = Self::new();
		{
			let mut guard = store.policies.write();
			for policy in policies {
				policy.validate()?;
				if guard.iter().any(|p| p.id == policy.id) {
					return Err(AbacError::DuplicatePolicyId(policy.id));
				}
				guard.push(policy);
			}
			sort_by_priority(&mut guard);
		}
		Ok(store)
	}

	/// Register a new policy at runtime.
	pub fn add(&self, policy: Policy) -> Result<()> {
		policy.validate()?;

		let mut guard = self.policies.write();
		if guard.iter().any(|p| p.id == policy.id) {
			return Err(AbacError::DuplicatePolicyId(policy.id));
		}
		tracing::info!(
			policy_id = %policy.id,
			effect = %policy.effect,
			priority = policy.priority,
			resource = %policy.target.resource,
			action = %policy.target.action,
			"ABAC policy added"
		);
		guard.push(policy);
		Ok(())
	}

	/// Run `f` over the current policy set under a shared lock.
	pub fn read<R>(&self, f: impl FnOnce(&[Policy]) -> R) -> R {
		let guard = self.policies.read();
		f(&guard)
	}

	/// A copy of the current policy set ordered by priority descending, then id.
	pub fn snapshot(&self) -> Vec<Policy> {
		let mut policies = self.policies.read().clone();
		sort_by_priority(&mut policies);
		policies
	}

	/// Look up a policy by id.
	pub fn get(&self, id: &str) -> Option<Policy> {
		self.policies.read().iter().find(|p| p.id == id).cloned()
	}

	pub fn len(&self) -> usize {
		self.policies.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.policies.read().is_empty()
	}
}

fn sort_by_priority(policies: &mut [Policy]) {
	policies.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.id.cmp(&b.id)));
}
