//! CLI command definitions for the `chatrelay` binary.
//!
//! Uses clap derive macros for argument parsing. Global flags may also be
//! supplied through `CHATRELAY_*` environment variables.

pub mod config;
pub mod history;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Multi-session chat relay with per-session actors.
#[derive(Parser)]
#[command(name = "chatrelay", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding config.toml and the database (default: ~/.chatrelay).
    #[arg(long, global = true, env = "CHATRELAY_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true, env = "CHATRELAY_LOG_JSON")]
    pub log_json: bool,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true, env = "CHATRELAY_OTEL")]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP and WebSocket server.
    Serve {
        /// Address to bind (overrides [server].host).
        #[arg(long, env = "CHATRELAY_HOST")]
        host: Option<String>,

        /// Port to listen on (overrides [server].port).
        #[arg(short, long, env = "CHATRELAY_PORT")]
        port: Option<u16>,

        /// Inference endpoint URL (overrides [inference].endpoint).
        #[arg(long, env = "CHATRELAY_INFERENCE_ENDPOINT")]
        endpoint: Option<String>,
    },

    /// Print a session's stored message log.
    History {
        /// Session identifier.
        session_id: String,

        /// Output machine-readable JSON instead of styled text.
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as TOML.
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        <Cli as clap::CommandFactory>::command().debug_assert();
    }

    #[test]
    fn parses_serve_overrides() {
        let cli = Cli::try_parse_from(["chatrelay", "-v", "serve", "--port", "9000"]).unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Serve { port, host, .. } => {
                assert_eq!(port, Some(9000));
                assert!(host.is_none());
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn parses_history_with_json() {
        let cli =
            Cli::try_parse_from(["chatrelay", "history", "s1", "--json", "--data-dir", "/tmp/relay"])
                .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/relay")));
        assert!(matches!(
            cli.command,
            Commands::History { ref session_id, json: true } if session_id == "s1"
        ));
    }
}
