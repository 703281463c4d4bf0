// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Schema bootstrap.

use sqlx::sqlite::SqlitePool;

use crate::error::DbError;

const CREATE_ABAC_POLICIES: &str = r#"
	CREATE TABLE IF NOT EXISTS abac_policies (
		id TEXT PRIMARY KEY,
		name TEXT NOT NULL,
		target_resource TEXT NOT NULL,
		target_action TEXT NOT NULL,
		conditions TEXT NOT NULL DEFAULT '[]',
		effect TEXT NOT NULL CHECK (effect IN ('allow', 'deny')),
		priority INTEGER NOT NULL DEFAULT 0,
		created_at TEXT NOT NULL
	)
"#;

const CREATE_ABAC_POLICIES_PRIORITY_INDEX: &str = r#"
	CREATE INDEX IF NOT EXISTS idx_abac_policies_priority
	ON abac_policies (priority DESC, id)
"#;

/// Create the tables this crate owns. Safe to run on every startup.
#[tracing::instrument(skip(pool))]
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), DbError> {
	sqlx::query(CREATE_ABAC_POLICIES).execute(pool).await?;
	sqlx::query(CREATE_ABAC_POLICIES_PRIORITY_INDEX)
		.execute(pool)
		.await?;

	tracing::debug!("database migrations applied");
	Ok(())
}
