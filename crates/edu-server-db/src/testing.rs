// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use sqlx::sqlite::SqlitePool;

use crate::policy::PolicyRepository;

pub async fn create_test_pool() -> SqlitePool {
	SqlitePool::connect(":memory:").await.unwrap()
}

pub async fn create_abac_policies_table(pool: &SqlitePool) {
	crate::schema::run_migrations(pool).await.unwrap();
}

/// In-memory repository with the schema applied.
pub async fn create_policy_repository() -> PolicyRepository {
	let pool = create_test_pool().await;
	create_abac_policies_table(&pool).await;
	PolicyRepository::new(pool)
}
