// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! ABAC policy evaluation engine.
//!
//! Evaluation runs in three steps:
//!
//! 1. **Filter**: a policy is a candidate when its target matches
//!    ([`crate::target::matches`]) and all of its conditions hold
//!    ([`crate::condition::evaluate_all`])
//! 2. **Rank**: the highest-priority candidate is picked per effect; equal
//!    priorities fall back to the lexically smallest policy id
//! 3. **Resolve**: deny wins when its priority is greater than or equal to the best
//!    allow; allow wins otherwise; nothing matched means deny
//!
//! Evaluation is a pure function of the policy set and the context.

use std::sync::Arc;

use tracing::instrument;

use crate::condition::evaluate_all;
use crate::policy::{Effect, Policy};
use crate::store::PolicyStore;
use crate::target;
use crate::types::AccessContext;

/// Final authorization outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
	Allow,
	Deny,
}

impl Decision {
	pub fn is_allowed(&self) -> bool {
		matches!(self, Decision::Allow)
	}
}

/// Returns true if the policy applies to the context.
pub fn policy_matches(policy: &Policy, ctx: &AccessContext) -> bool {
	target::matches(&policy.target, ctx) && evaluate_all(&policy.conditions, ctx)
}

/// Evaluates a policy set against a context.
pub fn evaluate_policies(policies: &[Policy], ctx: &AccessContext) -> Decision {
	resolve(policies, ctx).0
}

/// Resolves the decision and the policy that determined it, if any.
fn resolve<'p>(policies: &'p [Policy], ctx: &AccessContext) -> (Decision, Option<&'p Policy>) {
	let mut best_allow: Option<&Policy> = None;
	let mut best_deny: Option<&Policy> = None;

	for policy in policies.iter().filter(|p| policy_matches(p, ctx)) {
		let slot = match policy.effect {
			Effect::Allow => &mut best_allow,
			Effect::Deny => &mut best_deny,
		};
		if outranks(policy, *slot) {
			*slot = Some(policy);
		}
	}

	match (best_allow, best_deny) {
		(allow, Some(deny)) if allow.map_or(true, |a| deny.priority >= a.priority) => {
			(Decision::Deny, Some(deny))
		}
		(Some(allow), _) => (Decision::Allow, Some(allow)),
		_ => (Decision::Deny, None),
	}
}

fn outranks(candidate: &Policy, current: Option<&Policy>) -> bool {
	match current {
		None => true,
		Some(current) => {
			candidate.priority > current.priority
				|| (candidate.priority == current.priority && candidate.id < current.id)
		}
	}
}

/// Evaluates contexts against a shared [`PolicyStore`].
#[derive(Debug, Clone)]
pub struct PolicyEngine {
	store: Arc<PolicyStore>,
}

impl PolicyEngine {
	pub fn new(store: Arc<PolicyStore>) -> Self {
		Self { store }
	}

	/// The store this engine reads from.
	pub fn store(&self) -> &Arc<PolicyStore> {
		&self.store
	}

	/// Evaluates the context against the current policy set.
	///
	/// The decision and deciding policy id are logged; denials at info level,
	/// allows at debug level.
	#[instrument(
		level = "debug",
		skip(self, ctx),
		fields(
			user_id = ?ctx.user.as_ref().map(|u| u.id.to_string()),
			action = %ctx.action,
			resource_type = ?ctx.resource_type(),
		)
	)]
	pub fn evaluate(&self, ctx: &AccessContext) -> Decision {
		self.store.read(|policies| {
			let (decision, deciding) = resolve(policies, ctx);
			let policy_id = deciding.map(|p| p.id.as_str());
			match decision {
				Decision::Allow => tracing::debug!(policy_id, "ABAC allowed"),
				Decision::Deny => tracing::info!(policy_id, "ABAC denied"),
			}
			decision
		})
	}

	/// The decision primitive: true when the context is allowed.
	pub fn is_allowed(&self, ctx: &AccessContext) -> bool {
		self.evaluate(ctx).is_allowed()
	}
}
