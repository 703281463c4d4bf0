// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! ABAC policy repository.
//!
//! Policies live in the `abac_policies` table with their conditions stored as a
//! JSON array. Rows are decoded and validated on load; a row that does not
//! describe a valid policy is an error rather than being skipped.

use async_trait::async_trait;
use chrono::Utc;
use edu_server_abac::{Condition, Effect, Policy, Target};
use sqlx::{sqlite::SqlitePool, Row};

use crate::error::DbError;

/// Where the policy set is loaded from and persisted to.
#[async_trait]
pub trait PolicySource: Send + Sync {
	/// All persisted policies, ordered by priority descending, then id.
	async fn load_policies(&self) -> Result<Vec<Policy>, DbError>;
	async fn insert_policy(&self, policy: &Policy) -> Result<(), DbError>;
}

#[async_trait]
impl PolicySource for PolicyRepository {
	async fn load_policies(&self) -> Result<Vec<Policy>, DbError> {
		self.load_policies().await
	}

	async fn insert_policy(&self, policy: &Policy) -> Result<(), DbError> {
		self.insert_policy(policy).await
	}
}

/// Repository for ABAC policy database operations.
#[derive(Clone)]
pub struct PolicyRepository {
	pool: SqlitePool,
}

impl PolicyRepository {
	/// Create a new policy repository with the given pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Load every persisted policy.
	///
	/// # Errors
	/// Fails if a row has malformed conditions, an unknown effect, or does not
	/// pass [`Policy::validate`].
	#[tracing::instrument(skip(self))]
	pub async fn load_policies(&self) -> Result<Vec<Policy>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id, name, target_resource, target_action, conditions, effect, priority
			FROM abac_policies
			ORDER BY priority DESC, id ASC
			"#,
		)
		.fetch_all(&self.pool)
		.await?;

		let mut policies = Vec::with_capacity(rows.len());
		for row in rows {
			policies.push(parse_policy_row(&row)?);
		}

		tracing::debug!(count = policies.len(), "ABAC policies loaded");
		Ok(policies)
	}

	/// Persist a new policy.
	///
	/// # Errors
	/// Returns `DbError::Conflict` if a policy with the same id already exists.
	#[tracing::instrument(skip(self, policy), fields(policy_id = %policy.id))]
	pub async fn insert_policy(&self, policy: &Policy) -> Result<(), DbError> {
		policy.validate()?;
		let conditions_json = serde_json::to_string(&policy.conditions)?;

		sqlx::query(
			r#"
			INSERT INTO abac_policies (
				id, name, target_resource, target_action, conditions, effect, priority, created_at
			) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(&policy.id)
		.bind(&policy.name)
		.bind(&policy.target.resource)
		.bind(&policy.target.action)
		.bind(&conditions_json)
		.bind(policy.effect.as_str())
		.bind(policy.priority)
		.bind(Utc::now().to_rfc3339())
		.execute(&self.pool)
		.await
		.map_err(|e| match e {
			sqlx::Error::Database(ref db) if db.is_unique_violation() => {
				DbError::Conflict(format!("policy {} already exists", policy.id))
			}
			other => DbError::Sqlx(other),
		})?;

		tracing::debug!(policy_id = %policy.id, "ABAC policy persisted");
		Ok(())
	}

	/// Look up a single policy by id.
	#[tracing::instrument(skip(self))]
	pub async fn get_policy(&self, id: &str) -> Result<Option<Policy>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, name, target_resource, target_action, conditions, effect, priority
			FROM abac_policies
			WHERE id = ?
			"#,
		)
		.bind(id)
		.fetch_optional(&self.pool)
		.await?;

		row.as_ref().map(parse_policy_row).transpose()
	}

	/// Number of persisted policies.
	#[tracing::instrument(skip(self))]
	pub async fn count_policies(&self) -> Result<i64, DbError> {
		let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM abac_policies")
			.fetch_one(&self.pool)
			.await?;
		Ok(count)
	}
}

fn parse_effect(value: &str) -> Result<Effect, DbError> {
	match value {
		"allow" => Ok(Effect::Allow),
		"deny" => Ok(Effect::Deny),
		other => Err(DbError::Internal(format!("Invalid policy effect: {other}"))),
	}
}

fn parse_policy_row(row: &sqlx::sqlite::SqliteRow) -> Result<Policy, DbError> {
	let id: String = row.get("id");
	let name: String = row.get("name");
	let target_resource: String = row.get("target_resource");
	let target_action: String = row.get("target_action");
	let conditions_json: String = row.get("conditions");
	let effect_str: String = row.get("effect");
	let priority: i64 = row.get("priority");

	let conditions: Vec<Condition> = serde_json::from_str(&conditions_json).map_err(|e| {
		DbError::Internal(format!("Invalid conditions for policy {id}: {e}"))
	})?;

	let policy = Policy {
		effect: parse_effect(&effect_str)?,
		id,
		name,
		target: Target::new(target_resource, target_action),
		conditions,
		priority,
	};
	policy.validate()?;
	Ok(policy)
}
