// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication configuration.
//!
//! Identity is established by the upstream gateway and forwarded as request
//! headers; this section names those headers.

use serde::Deserialize;

const DEFAULT_USER_ID_HEADER: &str = "x-user-id";
const DEFAULT_USER_ROLE_HEADER: &str = "x-user-role";

/// Authentication configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct AuthConfig {
	pub user_id_header: String,
	pub user_role_header: String,
}

impl Default for AuthConfig {
	fn default() -> Self {
		Self {
			user_id_header: DEFAULT_USER_ID_HEADER.to_string(),
			user_role_header: DEFAULT_USER_ROLE_HEADER.to_string(),
		}
	}
}

/// Authentication configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfigLayer {
	#[serde(default)]
	pub user_id_header: Option<String>,
	#[serde(default)]
	pub user_role_header: Option<String>,
}

impl AuthConfigLayer {
	pub fn merge(&mut self, other: AuthConfigLayer) {
		if other.user_id_header.is_some() {
			self.user_id_header = other.user_id_header;
		}
		if other.user_role_header.is_some() {
			self.user_role_header = other.user_role_header;
		}
	}

	/// Header names are matched case-insensitively, so they are stored lowercased.
	pub fn finalize(self) -> AuthConfig {
		AuthConfig {
			user_id_header: self
				.user_id_header
				.unwrap_or_else(|| DEFAULT_USER_ID_HEADER.to_string())
				.to_ascii_lowercase(),
			user_role_header: self
				.user_role_header
				.unwrap_or_else(|| DEFAULT_USER_ROLE_HEADER.to_string())
				.to_ascii_lowercase(),
		}
	}
}
