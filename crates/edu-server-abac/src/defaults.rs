// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Built-in policy set, seeded into persistent storage when it holds no policies.
//!
//! Ownership rules compare a resource attribute against `user.id`; the declared
//! value is an attribute reference resolved at evaluation time. Routes must put
//! the owner into the request's resource attributes: `author_id` for authored
//! content, `user_id` for `user_sessions` (`ResourceAuthor::with_attribute("user_id")`
//! in the server). Without it the ownership condition is false and access falls
//! through to default deny.

use crate::policy::{Condition, Effect, Policy, Target};
use crate::types::Role;

const ALL_ROLES: [Role; 3] = [Role::Student, Role::Teacher, Role::Admin];
const AUTHORS: [Role; 2] = [Role::Teacher, Role::Admin];

fn allow(id: &str, name: &str, target: Target, conditions: Vec<Condition>, priority: i64) -> Policy {
	Policy {
		id: id.to_string(),
		name: name.to_string(),
		target,
		conditions,
		effect: Effect::Allow,
		priority,
	}
}

fn role_in(roles: &[Role]) -> Condition {
	Condition::is_in("user.role", roles.iter().map(Role::as_str))
}

fn owned_via(attribute: &str) -> Condition {
	Condition::eq(format!("resource.{attribute}"), "user.id")
}

/// Read access for every role, at the lowest default priority.
fn read_for_all(id: &str, name: &str, resource: &str) -> Policy {
	allow(
		id,
		name,
		Target::new(resource, "read"),
		vec![role_in(&ALL_ROLES)],
		50,
	)
}

/// Full control over resources the requester authored.
fn manage_own(id: &str, name: &str, resource: &str) -> Policy {
	allow(
		id,
		name,
		Target::new(resource, "*"),
		vec![owned_via("author_id")],
		150,
	)
}

/// Creation rights for teachers and admins.
fn create_for_authors(id: &str, name: &str, resource: &str) -> Policy {
	allow(
		id,
		name,
		Target::new(resource, "create"),
		vec![role_in(&AUTHORS)],
		100,
	)
}

/// The default policy set.
pub fn default_policies() -> Vec<Policy> {
	vec![
		allow(
			"admin_full_access",
			"Admin Full Access",
			Target::any(),
			vec![Condition::eq("user.role", Role::Admin.as_str())],
			1000,
		),
		// Needs `resource.user_id`; see the module docs.
		allow(
			"session_manage_own",
			"Manage Own Sessions",
			Target::new("user_sessions", "*"),
			vec![role_in(&ALL_ROLES), owned_via("user_id")],
			100,
		),
		allow(
			"analytics_read",
			"Read Analytics",
			Target::new("analytics", "read"),
			vec![Condition::eq("user.role", Role::Admin.as_str())],
			200,
		),
		create_for_authors("course_create", "Create Courses", "course"),
		read_for_all("course_read_all", "Read Any Course", "course"),
		manage_own("course_manage_own", "Manage Own Course", "course"),
		manage_own("module_create_update_delete", "Manage Own Module", "module"),
		read_for_all("module_read", "Read Modules", "module"),
		manage_own("lesson_manage_own", "Manage Own Lesson", "lesson"),
		read_for_all("lesson_read", "Read Lessons", "lesson"),
		create_for_authors("category_create", "Create Categories", "category"),
		manage_own("category_manage_own", "Manage Own Category", "category"),
		read_for_all("category_read", "Read Categories", "category"),
		create_for_authors("tag_create", "Create Tags", "tag"),
		manage_own("tag_manage_own", "Manage Own Tags", "tag"),
		read_for_all("tag_read", "Read Tags", "tag"),
	]
}
