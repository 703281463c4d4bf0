// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Server error types and HTTP response conversions.

use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use edu_server_abac::AbacError;
use edu_server_db::DbError;
use serde::{Deserialize, Serialize};

/// Server error types for request handling.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	/// Database error from edu-server-db.
	#[error("Database error: {0}")]
	Db(#[from] DbError),

	/// Policy rejected by the store.
	#[error("Policy error: {0}")]
	Policy(#[from] AbacError),

	/// Resource already exists.
	#[error("Conflict: {0}")]
	Conflict(String),

	/// Internal server error.
	#[error("Internal error: {0}")]
	Internal(String),

	/// Unauthorized (no authenticated identity).
	#[error("Unauthorized: {0}")]
	Unauthorized(String),
}

/// Error response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
	pub error: String,
	pub message: String,
}

impl ErrorResponse {
	pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			error: error.into(),
			message: message.into(),
		}
	}
}

impl IntoResponse for ServerError {
	fn into_response(self) -> Response {
		let (status, error_response) = match &self {
			ServerError::Db(DbError::Conflict(msg)) => (
				StatusCode::CONFLICT,
				ErrorResponse::new("conflict", msg.clone()),
			),
			ServerError::Db(DbError::Policy(e)) | ServerError::Policy(e) => match e {
				AbacError::DuplicatePolicyId(id) => (
					StatusCode::CONFLICT,
					ErrorResponse::new("conflict", format!("Policy already exists: {id}")),
				),
				AbacError::InvalidPolicy { .. } => (
					StatusCode::BAD_REQUEST,
					ErrorResponse::new("invalid_policy", e.to_string()),
				),
			},
			ServerError::Db(e) => {
				tracing::error!(error = %e, "database error");
				(
					StatusCode::INTERNAL_SERVER_ERROR,
					ErrorResponse::new("database_error", "A database error occurred"),
				)
			}
			ServerError::Conflict(msg) => (
				StatusCode::CONFLICT,
				ErrorResponse::new("conflict", msg.clone()),
			),
			ServerError::Internal(msg) => {
				tracing::error!(error = %msg, "internal error");
				(
					StatusCode::INTERNAL_SERVER_ERROR,
					ErrorResponse::new("internal_error", "An internal error occurred"),
				)
			}
			ServerError::Unauthorized(msg) => (
				StatusCode::UNAUTHORIZED,
				ErrorResponse::new("unauthorized", msg.clone()),
			),
		};

		(status, Json(error_response)).into_response()
	}
}
