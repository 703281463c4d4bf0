// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Condition evaluation.
//!
//! [`evaluate`] resolves a condition's attribute against an [`AccessContext`] and
//! applies its operator. Every failure path (unknown attribute, missing user,
//! mismatched value shapes, non-numeric operands) yields `false`; the evaluator
//! never errors.

use std::borrow::Cow;

use crate::policy::{Condition, ConditionValue, Operator};
use crate::types::{AccessContext, AttrValue};

/// A parsed attribute path such as `user.id` or `resource.author_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributePath<'a> {
	UserId,
	UserRole,
	Resource(&'a str),
	Environment(&'a str),
}

impl<'a> AttributePath<'a> {
	/// Parses a dotted path. Anything other than exactly two non-empty segments
	/// with a known root is rejected.
	pub fn parse(path: &'a str) -> Option<Self> {
		match path {
			"user.id" => return Some(AttributePath::UserId),
			"user.role" => return Some(AttributePath::UserRole),
			_ => {}
		}

		let (root, field) = path.split_once('.')?;
		if field.is_empty() || field.contains('.') {
			return None;
		}

		match root {
			"resource" => Some(AttributePath::Resource(field)),
			"env" | "environment" => Some(AttributePath::Environment(field)),
			_ => None,
		}
	}

	/// Looks the attribute up in the context.
	pub fn resolve<'c>(&self, ctx: &'c AccessContext) -> Option<Cow<'c, AttrValue>> {
		match self {
			AttributePath::UserId => ctx
				.user
				.as_ref()
				.map(|user| Cow::Owned(AttrValue::from(user.id))),
			AttributePath::UserRole => ctx
				.user
				.as_ref()
				.map(|user| Cow::Owned(AttrValue::from(user.role.as_str()))),
			AttributePath::Resource(field) => ctx.resource.get(*field).map(Cow::Borrowed),
			AttributePath::Environment(field) => ctx.environment.get(*field).map(Cow::Borrowed),
		}
	}
}

/// Resolves an attribute path string against the context.
pub fn resolve_attribute<'c>(path: &str, ctx: &'c AccessContext) -> Option<Cow<'c, AttrValue>> {
	AttributePath::parse(path)?.resolve(ctx)
}

/// Evaluates a single condition against the context.
pub fn evaluate(condition: &Condition, ctx: &AccessContext) -> bool {
	let Some(actual) = resolve_attribute(&condition.attribute, ctx) else {
		return false;
	};

	match (condition.operator, &condition.value) {
		(Operator::In, ConditionValue::List(members)) => {
			let actual = actual.canonical();
			members.iter().any(|member| *member == actual)
		}
		(Operator::In, ConditionValue::Scalar(_)) => false,
		(_, ConditionValue::List(_)) => false,
		(op, ConditionValue::Scalar(declared)) => {
			let Some(expected) = resolve_declared(declared, ctx) else {
				return false;
			};
			compare(op, &actual, &expected)
		}
	}
}

/// Returns true when every condition holds. An empty list is vacuously true.
pub fn evaluate_all(conditions: &[Condition], ctx: &AccessContext) -> bool {
	conditions.iter().all(|condition| evaluate(condition, ctx))
}

/// A declared string naming another attribute (`"user.id"`) is a reference and is
/// resolved against the same context; everything else is a literal.
fn resolve_declared<'c>(declared: &'c AttrValue, ctx: &'c AccessContext) -> Option<Cow<'c, AttrValue>> {
	match declared.as_str().and_then(AttributePath::parse) {
		Some(path) => path.resolve(ctx),
		None => Some(Cow::Borrowed(declared)),
	}
}

fn compare(op: Operator, actual: &AttrValue, expected: &AttrValue) -> bool {
	match op {
		Operator::Eq => actual.canonical() == expected.canonical(),
		Operator::In => false,
		Operator::Gt | Operator::Lt | Operator::Gte | Operator::Lte => {
			let (Some(a), Some(b)) = (actual.as_number(), expected.as_number()) else {
				return false;
			};
			match op {
				Operator::Gt => a > b,
				Operator::Lt => a < b,
				Operator::Gte => a >= b,
				_ => a <= b,
			}
		}
	}
}
