// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Centralized configuration management for edu-server.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`EDU_SERVER_*`)
//!
//! # Usage
//!
//! ```ignore
//! use edu_server_config::load_config;
//!
//! let config = load_config()?;
//! println!("Server listening on {}:{}", config.http.host, config.http.port);
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub database: DatabaseConfig,
	pub logging: LoggingConfig,
	pub auth: AuthConfig,
	pub abac: AbacConfig,
}

impl ServerConfig {
	/// Get the socket address string for binding.
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`EDU_SERVER_*`)
/// 2. Config file (`/etc/edu/server.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

/// Merge the given sources in precedence order and finalize the result.
pub fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let http = layer.http.unwrap_or_default().finalize();
	let database = layer.database.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();
	let auth = layer.auth.unwrap_or_default().finalize();
	let abac = layer.abac.unwrap_or_default().finalize();

	validate_auth(&auth)?;

	info!(
		host = %http.host,
		port = http.port,
		database = %database.url,
		policy_source = %abac.policy_source,
		"Server configuration loaded"
	);

	Ok(ServerConfig {
		http,
		database,
		logging,
		auth,
		abac,
	})
}

/// Identity header names must be distinct, non-empty HTTP token strings.
fn validate_auth(auth: &AuthConfig) -> Result<(), ConfigError> {
	for name in [&auth.user_id_header, &auth.user_role_header] {
		let valid = !name.is_empty()
			&& name
				.bytes()
				.all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
		if !valid {
			return Err(ConfigError::Validation(format!(
				"invalid identity header name '{name}'"
			)));
		}
	}

	if auth.user_id_header == auth.user_role_header {
		return Err(ConfigError::Validation(
			"user id and user role must be read from different headers".to_string(),
		));
	}

	Ok(())
}
