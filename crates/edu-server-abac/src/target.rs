// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Target matching: does a policy apply to this `(resource type, action)`?

use crate::policy::{Target, WILDCARD};
use crate::types::AccessContext;

/// Returns true if the target's resource and action both match the context.
///
/// Matching is exact and case-sensitive; `*` matches anything, including a
/// context without a resource type.
pub fn matches(target: &Target, ctx: &AccessContext) -> bool {
	let resource_matches =
		target.resource == WILDCARD || ctx.resource_type() == Some(target.resource.as_str());
	let action_matches = target.action == WILDCARD || target.action == ctx.action;
	resource_matches && action_matches
}
