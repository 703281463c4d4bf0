// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections for edu-server.

pub mod abac;
pub mod auth;
pub mod database;
pub mod http;
pub mod logging;

pub use abac::{AbacConfig, AbacConfigLayer, PolicySourceKind};
pub use auth::{AuthConfig, AuthConfigLayer};
pub use database::{DatabaseConfig, DatabaseConfigLayer};
pub use http::{HttpConfig, HttpConfigLayer};
pub use logging::{LoggingConfig, LoggingConfigLayer};
