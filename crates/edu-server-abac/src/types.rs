// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Type definitions for ABAC request contexts.
//!
//! This module defines the per-request data the engine evaluates against:
//!
//! - [`Subject`]: The authenticated user making a request (id and role)
//! - [`AttrValue`]: A typed attribute value (string, integer, float, boolean)
//! - [`AccessContext`]: Who is asking, what resource, what action, what environment
//!
//! # Design Principles
//!
//! 1. **Immutable evaluation**: All attributes are collected before policy evaluation
//! 2. **No database access**: Evaluation is pure; ownership facts are pre-resolved
//! 3. **Absent is a missing key**: There is no null variant; lookups return `Option`
//! 4. **Serializable**: Contexts can be submitted and logged as JSON

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
	/// Create a new ID from a UUID.
	pub fn new(id: Uuid) -> Self {
		Self(id)
	}

	/// Generate a new random ID.
	pub fn generate() -> Self {
		Self(Uuid::new_v4())
	}

	/// Get the inner UUID value.
	pub fn into_inner(self) -> Uuid {
		self.0
	}
}

impl fmt::Display for UserId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<Uuid> for UserId {
	fn from(id: Uuid) -> Self {
		Self(id)
	}
}

impl FromStr for UserId {
	type Err = uuid::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Uuid::parse_str(s).map(Self)
	}
}

/// Platform-wide user roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
	Student,
	Teacher,
	Admin,
}

impl Role {
	/// Returns all available roles.
	pub fn all() -> &'static [Role] {
		&[Role::Student, Role::Teacher, Role::Admin]
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Role::Student => "student",
			Role::Teacher => "teacher",
			Role::Admin => "admin",
		}
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Error returned when a role string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
	type Err = UnknownRole;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"student" => Ok(Role::Student),
			"teacher" => Ok(Role::Teacher),
			"admin" => Ok(Role::Admin),
			other => Err(UnknownRole(other.to_string())),
		}
	}
}

/// Attributes describing the subject (user) requesting access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
	pub id: UserId,
	pub role: Role,
}

impl Subject {
	pub fn new(id: UserId, role: Role) -> Self {
		Self { id, role }
	}
}

/// A typed attribute value held in a resource or environment map.
///
/// Serialized untagged, so JSON `"x"`, `3`, `2.5` and `true` map directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
	Bool(bool),
	Int(i64),
	Float(f64),
	String(String),
}

impl AttrValue {
	/// Canonical string rendering used by the `eq` and `in` operators.
	pub fn canonical(&self) -> String {
		match self {
			AttrValue::Bool(b) => b.to_string(),
			AttrValue::Int(i) => i.to_string(),
			AttrValue::Float(f) => f.to_string(),
			AttrValue::String(s) => s.clone(),
		}
	}

	/// Numeric interpretation used by the ordering operators.
	///
	/// Strings count when they parse as a finite number; booleans never do.
	pub fn as_number(&self) -> Option<f64> {
		let n = match self {
			AttrValue::Int(i) => *i as f64,
			AttrValue::Float(f) => *f,
			AttrValue::String(s) => s.trim().parse::<f64>().ok()?,
			AttrValue::Bool(_) => return None,
		};
		n.is_finite().then_some(n)
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			AttrValue::String(s) => Some(s),
			_ => None,
		}
	}
}

impl fmt::Display for AttrValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.canonical())
	}
}

impl From<&str> for AttrValue {
	fn from(value: &str) -> Self {
		AttrValue::String(value.to_string())
	}
}

impl From<String> for AttrValue {
	fn from(value: String) -> Self {
		AttrValue::String(value)
	}
}

impl From<i64> for AttrValue {
	fn from(value: i64) -> Self {
		AttrValue::Int(value)
	}
}

impl From<u32> for AttrValue {
	fn from(value: u32) -> Self {
		AttrValue::Int(i64::from(value))
	}
}

impl From<f64> for AttrValue {
	fn from(value: f64) -> Self {
		AttrValue::Float(value)
	}
}

impl From<bool> for AttrValue {
	fn from(value: bool) -> Self {
		AttrValue::Bool(value)
	}
}

impl From<UserId> for AttrValue {
	fn from(value: UserId) -> Self {
		AttrValue::String(value.to_string())
	}
}

/// Attribute map keyed by field name.
pub type Attributes = BTreeMap<String, AttrValue>;

/// Resource attribute key holding the resource type tag.
pub const RESOURCE_TYPE_KEY: &str = "type";

/// Everything the engine knows about one authorization request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessContext {
	#[serde(default)]
	pub user: Option<Subject>,
	#[serde(default)]
	pub resource: Attributes,
	pub action: String,
	#[serde(default)]
	pub environment: Attributes,
}

impl AccessContext {
	/// Creates a context for `action` on a resource of the given type.
	pub fn new(resource_type: impl Into<String>, action: impl Into<String>) -> Self {
		let mut resource = Attributes::new();
		resource.insert(
			RESOURCE_TYPE_KEY.to_string(),
			AttrValue::String(resource_type.into()),
		);
		Self {
			user: None,
			resource,
			action: action.into(),
			environment: Attributes::new(),
		}
	}

	/// The resource type tag, if present and a string.
	pub fn resource_type(&self) -> Option<&str> {
		self.resource.get(RESOURCE_TYPE_KEY).and_then(AttrValue::as_str)
	}

	/// Builder: set the requesting user.
	pub fn with_user(mut self, subject: Subject) -> Self {
		self.user = Some(subject);
		self
	}

	/// Builder: set a resource attribute.
	pub fn with_resource_attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
		self.resource.insert(key.into(), value.into());
		self
	}

	/// Builder: set an environment attribute.
	pub fn with_env_attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
		self.environment.insert(key.into(), value.into());
		self
	}
}
