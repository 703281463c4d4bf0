// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request authentication state.
//!
//! The identity layer stores an [`AuthContext`] in request extensions; the
//! enforcement layer reads it back to build the subject of an [`AccessContext`].
//!
//! [`AccessContext`]: crate::types::AccessContext

use crate::types::{Role, Subject, UserId};

/// The authenticated caller of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
	pub id: UserId,
	pub role: Role,
}

impl CurrentUser {
	pub fn new(id: UserId, role: Role) -> Self {
		Self { id, role }
	}

	/// The ABAC subject for this user.
	pub fn subject(&self) -> Subject {
		Subject::new(self.id, self.role)
	}
}

/// Authentication context for request processing.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
	/// Whether the request is authenticated.
	pub is_authenticated: bool,
	/// The current user, if authenticated.
	pub current_user: Option<CurrentUser>,
}

impl AuthContext {
	/// Create a new unauthenticated context.
	pub fn unauthenticated() -> Self {
		Self {
			is_authenticated: false,
			current_user: None,
		}
	}

	/// Create a new authenticated context.
	pub fn authenticated(current_user: CurrentUser) -> Self {
		Self {
			is_authenticated: true,
			current_user: Some(current_user),
		}
	}

	/// Get the current user, if authenticated.
	pub fn user(&self) -> Option<&CurrentUser> {
		self.current_user.as_ref()
	}

	/// Require authentication, returning the current user or an error.
	pub fn require_user(&self) -> Result<&CurrentUser, AuthRequired> {
		self.current_user.as_ref().ok_or(AuthRequired)
	}
}

/// Error returned when authentication is required but not present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("authentication required")]
pub struct AuthRequired;
