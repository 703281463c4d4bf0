// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Database layer for the education platform server.
//!
//! SQLite via `sqlx`: pool creation, schema bootstrap, and the ABAC policy
//! repository used to build the engine's policy store at startup.

pub mod error;
pub mod loader;
pub mod policy;
pub mod pool;
pub mod schema;
pub mod testing;

pub use error::{DbError, Result};
pub use loader::{default_policy_store, load_policy_store};
pub use policy::{PolicyRepository, PolicySource};
pub use pool::create_pool;
pub use schema::run_migrations;
