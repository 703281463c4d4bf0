// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Policy model: targets, conditions, effects and priorities.
//!
//! A [`Policy`] is pure data. It is loaded from the `abac_policies` table or from
//! [`crate::defaults`], and serialized as JSON in the same shape either way:
//!
//! ```json
//! {
//!   "id": "course_create",
//!   "name": "Create Courses",
//!   "target": { "resource": "course", "action": "create" },
//!   "conditions": [
//!     { "attribute": "user.role", "operator": "in", "value": ["teacher", "admin"] }
//!   ],
//!   "effect": "allow",
//!   "priority": 100
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AbacError;
use crate::types::AttrValue;

/// Target wildcard matching any resource type or action.
pub const WILDCARD: &str = "*";

/// Outcome of a policy when it matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
	Allow,
	Deny,
}

impl Effect {
	pub fn as_str(&self) -> &'static str {
		match self {
			Effect::Allow => "allow",
			Effect::Deny => "deny",
		}
	}
}

impl fmt::Display for Effect {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Comparison applied between the resolved attribute and the declared value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
	Eq,
	In,
	Gt,
	Lt,
	Gte,
	Lte,
}

impl Operator {
	/// Returns true for `gt`, `lt`, `gte` and `lte`.
	pub fn is_numeric(&self) -> bool {
		matches!(
			self,
			Operator::Gt | Operator::Lt | Operator::Gte | Operator::Lte
		)
	}
}

/// The `(resource type, action)` pair a policy applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
	pub resource: String,
	pub action: String,
}

impl Target {
	pub fn new(resource: impl Into<String>, action: impl Into<String>) -> Self {
		Self {
			resource: resource.into(),
			action: action.into(),
		}
	}

	/// Target matching every resource and every action.
	pub fn any() -> Self {
		Self::new(WILDCARD, WILDCARD)
	}
}

/// Declared value of a condition: a scalar, or a set of strings for `in`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
	List(Vec<String>),
	Scalar(AttrValue),
}

impl ConditionValue {
	/// Builds a string set value for the `in` operator.
	pub fn list<I, S>(items: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		ConditionValue::List(items.into_iter().map(Into::into).collect())
	}
}

impl From<AttrValue> for ConditionValue {
	fn from(value: AttrValue) -> Self {
		ConditionValue::Scalar(value)
	}
}

impl From<&str> for ConditionValue {
	fn from(value: &str) -> Self {
		ConditionValue::Scalar(value.into())
	}
}

impl From<String> for ConditionValue {
	fn from(value: String) -> Self {
		ConditionValue::Scalar(value.into())
	}
}

impl From<i64> for ConditionValue {
	fn from(value: i64) -> Self {
		ConditionValue::Scalar(value.into())
	}
}

impl From<f64> for ConditionValue {
	fn from(value: f64) -> Self {
		ConditionValue::Scalar(value.into())
	}
}

impl From<bool> for ConditionValue {
	fn from(value: bool) -> Self {
		ConditionValue::Scalar(value.into())
	}
}

/// One testable predicate over the request context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
	pub attribute: String,
	pub operator: Operator,
	pub value: ConditionValue,
}

impl Condition {
	pub fn new(
		attribute: impl Into<String>,
		operator: Operator,
		value: impl Into<ConditionValue>,
	) -> Self {
		Self {
			attribute: attribute.into(),
			operator,
			value: value.into(),
		}
	}

	pub fn eq(attribute: impl Into<String>, value: impl Into<AttrValue>) -> Self {
		Self::new(attribute, Operator::Eq, ConditionValue::Scalar(value.into()))
	}

	pub fn is_in<I, S>(attribute: impl Into<String>, values: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self::new(attribute, Operator::In, ConditionValue::list(values))
	}
}

/// An authorization rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
	pub id: String,
	pub name: String,
	pub target: Target,
	#[serde(default)]
	pub conditions: Vec<Condition>,
	pub effect: Effect,
	pub priority: i64,
}

impl Policy {
	/// Checks the structural rules that deserialization alone cannot express.
	pub fn validate(&self) -> Result<(), AbacError> {
		let invalid = |message: String| AbacError::InvalidPolicy {
			id: self.id.clone(),
			message,
		};

		if self.id.trim().is_empty() {
			return Err(invalid("policy id must not be empty".to_string()));
		}
		if self.target.resource.is_empty() || self.target.action.is_empty() {
			return Err(invalid(
				"target resource and action must not be empty".to_string(),
			));
		}

		for condition in &self.conditions {
			match (condition.operator, &condition.value) {
				(Operator::In, ConditionValue::Scalar(_)) => {
					return Err(invalid(format!(
						"condition on '{}' uses 'in' with a scalar value",
						condition.attribute
					)));
				}
				(op, ConditionValue::List(_)) if op != Operator::In => {
					return Err(invalid(format!(
						"condition on '{}' uses a list value with a scalar operator",
						condition.attribute
					)));
				}
				(op, ConditionValue::Scalar(value)) if op.is_numeric() => {
					let is_reference = value
						.as_str()
						.is_some_and(|s| crate::condition::AttributePath::parse(s).is_some());
					if value.as_number().is_none() && !is_reference {
						return Err(invalid(format!(
							"condition on '{}' compares numerically against non-numeric '{}'",
							condition.attribute, value
						)));
					}
				}
				_ => {}
			}
		}

		Ok(())
	}
}
