// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Attribute-Based Access Control for the education platform.
//!
//! This crate provides:
//! - The policy model ([`Policy`], [`Target`], [`Condition`])
//! - Per-request contexts ([`AccessContext`]) built from user, resource and environment attributes
//! - A thread-safe [`PolicyStore`] and the [`PolicyEngine`] that evaluates against it
//! - The built-in [`default_policies`] used when no policies are persisted
//!
//! Evaluation is fail-closed: anything that does not explicitly match an allow
//! policy, or that is matched by a deny of equal or higher priority, is denied.
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use edu_server_abac::{default_policies, AccessContext, PolicyEngine, PolicyStore, Role, Subject, UserId};
//!
//! let store = Arc::new(PolicyStore::with_policies(default_policies())?);
//! let engine = PolicyEngine::new(store);
//!
//! let ctx = AccessContext::new("course", "create")
//!     .with_user(Subject::new(UserId::generate(), Role::Teacher));
//! assert!(engine.is_allowed(&ctx));
//! ```

pub mod condition;
pub mod defaults;
pub mod engine;
pub mod error;
pub mod middleware;
pub mod policy;
pub mod store;
pub mod target;
pub mod types;

pub use defaults::default_policies;
pub use engine::{evaluate_policies, Decision, PolicyEngine};
pub use error::{AbacError, Result};
pub use middleware::{AuthContext, AuthRequired, CurrentUser};
pub use policy::{Condition, ConditionValue, Effect, Operator, Policy, Target, WILDCARD};
pub use store::PolicyStore;
pub use types::{AccessContext, AttrValue, Attributes, Role, Subject, UnknownRole, UserId};
