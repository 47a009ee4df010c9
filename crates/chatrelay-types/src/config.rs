//! Relay configuration types.
//!
//! `RelayConfig` mirrors `config.toml` in the data directory. Every field has
//! a default so a missing file, a missing section, or a missing key all
//! resolve to the same behaviour.

use serde::{Deserialize, Serialize};

/// Top-level relay configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub inference: InferenceConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub retention: RetentionConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8787
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Text-completion backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Full URL the prompt is POSTed to.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Model name forwarded to the backend, if it needs one.
    #[serde(default)]
    pub model: Option<String>,
    /// Name of the environment variable holding the backend API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_key_env() -> String {
    "CHATRELAY_INFERENCE_API_KEY".to_string()
}

fn default_max_tokens() -> u32 {
    256
}

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            model: None,
            api_key_env: default_api_key_env(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Per-session actor settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Number of most recent messages included in each prompt.
    #[serde(default = "default_context_window")]
    pub context_window: usize,
    /// Capacity of each actor's command queue.
    #[serde(default = "default_buffer")]
    pub command_buffer: usize,
    /// Capacity of each real-time connection's outbound queue.
    #[serde(default = "default_buffer")]
    pub outbound_buffer: usize,
    /// Seconds without commands or open connections before an actor exits.
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
}

fn default_context_window() -> usize {
    10
}

fn default_buffer() -> usize {
    64
}

fn default_idle_timeout_secs() -> u64 {
    600
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            context_window: default_context_window(),
            command_buffer: default_buffer(),
            outbound_buffer: default_buffer(),
            idle_timeout_secs: default_idle_timeout_secs(),
        }
    }
}

/// Log size bound applied by the retention sweeper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// A log longer than this is trimmed on the next sweep.
    #[serde(default = "default_max_messages")]
    pub max_messages: usize,
    /// Number of most recent messages kept by a trim.
    #[serde(default = "default_retain_messages")]
    pub retain_messages: usize,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

fn default_max_messages() -> usize {
    100
}

fn default_retain_messages() -> usize {
    50
}

fn default_sweep_interval_secs() -> u64 {
    300
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            max_messages: default_max_messages(),
            retain_messages: default_retain_messages(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relay_config_default_values() {
        let config = RelayConfig::default();
        assert_eq!(config.server.port, 8787);
        assert_eq!(config.inference.max_tokens, 256);
        assert!((config.inference.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.session.context_window, 10);
        assert_eq!(config.retention.max_messages, 100);
        assert_eq!(config.retention.retain_messages, 50);
    }

    #[test]
    fn test_relay_config_deserialize_empty() {
        let config: RelayConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(config.inference.endpoint.is_none());
        assert_eq!(config.session.idle_timeout_secs, 600);
    }

    #[test]
    fn test_relay_config_deserialize_partial_sections() {
        let toml_str = r#"
[server]
port = 9000

[inference]
endpoint = "http://localhost:11434/api/generate"
model = "llama3"

[retention]
sweep_interval_secs = 60
"#;
        let config: RelayConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(
            config.inference.endpoint.as_deref(),
            Some("http://localhost:11434/api/generate")
        );
        assert_eq!(config.inference.model.as_deref(), Some("llama3"));
        assert_eq!(config.inference.timeout_secs, 30);
        assert_eq!(config.retention.sweep_interval_secs, 60);
        assert_eq!(config.retention.max_messages, 100);
    }
}
