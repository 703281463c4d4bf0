// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Decision endpoint for out-of-process enforcement points.

use axum::{extract::State, Json};
use edu_server_abac::AccessContext;
use serde::{Deserialize, Serialize};

use crate::api::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluateResponse {
	pub allowed: bool,
}

/// POST /api/authz/evaluate - Evaluate a submitted context against the live policy set.
///
/// The caller's own identity only gates access to this endpoint; the decision is
/// made for the `user` in the submitted context, which may be absent.
#[tracing::instrument(skip(state, ctx), fields(action = %ctx.action))]
pub async fn evaluate(
	State(state): State<AppState>,
	Json(ctx): Json<AccessContext>,
) -> Json<EvaluateResponse> {
	Json(EvaluateResponse {
		allowed: state.engine.is_allowed(&ctx),
	})
}
