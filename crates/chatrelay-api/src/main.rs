//! Chat relay CLI and server entry point.
//!
//! Binary name: `chatrelay`
//!
//! Parses CLI arguments, loads configuration, initializes the database and
//! session hub, then dispatches to a command or starts the server.

mod cli;
mod http;
mod state;

use std::path::PathBuf;

use clap::Parser;

use chatrelay_infra::config::{load_relay_config, resolve_data_dir};
use chatrelay_observe::tracing_setup::{TracingOptions, init_tracing, shutdown_tracing};
use chatrelay_types::config::RelayConfig;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let tracing_options = TracingOptions {
        default_filter: TracingOptions::filter_for_verbosity(cli.verbose).to_string(),
        json: cli.log_json,
        otel: cli.otel,
    };
    init_tracing(&tracing_options)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let data_dir = resolve_data_dir(cli.data_dir.as_deref());
    let mut config = load_relay_config(&data_dir).await;

    let result = match cli.command {
        Commands::Config => cli::config::show_config(&config, &data_dir),

        Commands::History { session_id, json } => {
            let state = AppState::init(data_dir, config).await?;
            cli::history::show_history(&state, &session_id, json).await
        }

        Commands::Serve {
            host,
            port,
            endpoint,
        } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(endpoint) = endpoint {
                config.inference.endpoint = Some(endpoint);
            }
            serve(data_dir, config).await
        }
    };

    shutdown_tracing();
    result
}

async fn serve(data_dir: PathBuf, config: RelayConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::init(data_dir, config).await?;
    let hub = state.hub.clone();

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Chat relay listening");

    println!(
        "  {} Chat relay listening on {}",
        console::style("⚡").bold(),
        console::style(format!("http://{addr}")).cyan()
    );
    println!("  {}", console::style("Press Ctrl+C to stop").dim());

    let router = http::router::build_router(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Actors drain queued commands before exiting.
    hub.shutdown();
    println!("\n  Server stopped.");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
