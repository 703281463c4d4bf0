// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Resource ownership resolution.
//!
//! Ownership policies compare `resource.author_id` against `user.id`, so routes
//! that act on a specific resource need its author resolved before enforcement.
//! [`resource_author_layer`] reads the `{id}` path parameter, asks a
//! [`ResourceAuthorLookup`] for the author, and records both as
//! [`ResourceAttributes`] for [`crate::abac_middleware::RequireAccess`].
//!
//! Failures never reject the request. The attributes are simply left out, and
//! the ownership conditions that depend on them evaluate to false.
//!
//! ```ignore
//! Router::new()
//!     .route("/api/courses/{id}", put(update_course))
//!     .route_layer(RequireAccess::new("course", "update"))
//!     .route_layer(from_fn_with_state(
//!         ResourceAuthor::new("course", lookup),
//!         resource_author_layer,
//!     ));
//! ```

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use axum::{
	body::Body,
	extract::{rejection::PathRejection, Path, State},
	http::Request,
	middleware::Next,
	response::Response,
};
use edu_server_abac::{AttrValue, Attributes};

use crate::error::ServerError;

/// Path parameter holding the resource id.
pub const RESOURCE_ID_PARAM: &str = "id";

/// Resource attribute names written by the layer.
pub const RESOURCE_ID_ATTR: &str = "id";
pub const AUTHOR_ID_ATTR: &str = "author_id";

/// Resolves the author of a resource.
#[async_trait]
pub trait ResourceAuthorLookup: Send + Sync {
	/// The author's user id, or `None` if the resource does not exist.
	async fn author_of(&self, resource_type: &str, id: &str) -> Result<Option<String>, ServerError>;
}

/// Pre-resolved resource attributes carried in request extensions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceAttributes(pub Attributes);

impl ResourceAttributes {
	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
		self.0.insert(key.into(), value.into());
	}
}

/// State for [`resource_author_layer`].
#[derive(Clone)]
pub struct ResourceAuthor {
	resource_type: Arc<str>,
	attribute: &'static str,
	lookup: Arc<dyn ResourceAuthorLookup>,
}

impl ResourceAuthor {
	/// Resolve authors into the `author_id` attribute.
	pub fn new(resource_type: impl Into<Arc<str>>, lookup: Arc<dyn ResourceAuthorLookup>) -> Self {
		Self {
			resource_type: resource_type.into(),
			attribute: AUTHOR_ID_ATTR,
			lookup,
		}
	}

	/// Record the author under a different attribute (e.g. `user_id` for sessions).
	pub fn with_attribute(mut self, attribute: &'static str) -> Self {
		self.attribute = attribute;
		self
	}
}

/// Route middleware that records `id` and the author attribute for the addressed resource.
#[tracing::instrument(
	name = "resource_author_layer",
	skip(state, params, request, next),
	fields(resource_type = %state.resource_type)
)]
pub async fn resource_author_layer(
	State(state): State<ResourceAuthor>,
	params: Result<Path<HashMap<String, String>>, PathRejection>,
	mut request: Request<Body>,
	next: Next,
) -> Response {
	let id = params
		.ok()
		.and_then(|Path(mut params)| params.remove(RESOURCE_ID_PARAM));

	if let Some(id) = id {
		let mut attrs = request
			.extensions_mut()
			.remove::<ResourceAttributes>()
			.unwrap_or_default();

		match state.lookup.author_of(&state.resource_type, &id).await {
			Ok(Some(author_id)) => attrs.insert(state.attribute, author_id),
			Ok(None) => tracing::debug!(resource_id = %id, "resource not found, author unresolved"),
			Err(e) => tracing::warn!(resource_id = %id, error = %e, "author lookup failed"),
		}
		attrs.insert(RESOURCE_ID_ATTR, id);

		request.extensions_mut().insert(attrs);
	}

	next.run(request).await
}
