// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Education platform server binary.

use std::{net::SocketAddr, path::PathBuf};

use clap::{Parser, Subcommand};
use edu_server::{create_app_state, create_router};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Edu server - HTTP server and ABAC enforcement point.
#[derive(Parser, Debug)]
#[command(name = "edu-server", about = "Education platform server", version)]
struct Args {
	/// Path to a TOML config file (defaults to /etc/edu/server.toml)
	#[arg(long, env = "EDU_SERVER_CONFIG")]
	config: Option<PathBuf>,

	/// Subcommands for edu-server (e.g., `version`)
	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show version information
	Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("edu-server version: {}", env!("CARGO_PKG_VERSION"));
		return Ok(());
	}

	// Load .env file if present
	dotenvy::dotenv().ok();

	let config = match &args.config {
		Some(path) => edu_server_config::load_config_with_file(path)?,
		None => edu_server_config::load_config()?,
	};

	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| config.logging.level.clone().into()),
		)
		.with(tracing_subscriber::fmt::layer())
		.init();

	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		database = %config.database.url,
		policy_source = %config.abac.policy_source,
		"starting edu-server"
	);

	// Policy load failures are fatal: never serve with a partial policy set.
	let state = create_app_state(&config).await?;

	let app = create_router(state).layer(TraceLayer::new_for_http());

	let addr = config.socket_addr();
	tracing::info!("listening on {}", addr);

	let listener = tokio::net::TcpListener::bind(&addr).await?;

	tokio::select! {
		result = axum::serve(
			listener,
			app.into_make_service_with_connect_info::<SocketAddr>(),
		) => {
			if let Err(e) = result {
				tracing::error!(error = %e, "Server error");
			}
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("Received shutdown signal");
		}
	}

	tracing::info!("Server shutdown complete");
	Ok(())
}
