// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AbacError {
	#[error("Invalid policy '{id}': {message}")]
	InvalidPolicy { id: String, message: String },

	#[error("Policy already exists: {0}")]
	DuplicatePolicyId(String),
}

pub type Result<T> = std::result::Result<T, AbacError>;
