// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Education platform server.
//!
//! This crate provides the HTTP surface around the ABAC engine: identity
//! extraction from gateway headers, route-level enforcement, resource ownership
//! resolution, and policy management endpoints.

pub mod abac_middleware;
pub mod api;
pub mod auth_middleware;
pub mod error;
pub mod ownership;
pub mod routes;

pub use api::{create_app_state, create_router, AppState};
pub use edu_server_config::ServerConfig;
pub use error::ServerError;
