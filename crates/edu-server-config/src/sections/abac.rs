// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Access-control configuration.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Where the policy set is loaded from at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicySourceKind {
	/// The `abac_policies` table, falling back to the built-in set when empty.
	#[default]
	Database,
	/// The built-in set only; runtime additions are not persisted.
	Defaults,
}

impl PolicySourceKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			PolicySourceKind::Database => "database",
			PolicySourceKind::Defaults => "defaults",
		}
	}
}

impl fmt::Display for PolicySourceKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for PolicySourceKind {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"database" | "db" => Ok(PolicySourceKind::Database),
			"defaults" | "default" => Ok(PolicySourceKind::Defaults),
			other => Err(format!("unknown policy source '{other}'")),
		}
	}
}

/// Access-control configuration (runtime, fully resolved).
#[derive(Debug, Clone, Default)]
pub struct AbacConfig {
	pub policy_source: PolicySourceKind,
}

/// Access-control configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AbacConfigLayer {
	#[serde(default)]
	pub policy_source: Option<PolicySourceKind>,
}

impl AbacConfigLayer {
	pub fn merge(&mut self, other: AbacConfigLayer) {
		if other.policy_source.is_some() {
			self.policy_source = other.policy_source;
		}
	}

	pub fn finalize(self) -> AbacConfig {
		AbacConfig {
			policy_source: self.policy_source.unwrap_or_default(),
		}
	}
}
