//! Session actors and their supporting pieces.
//!
//! Every session identifier maps to exactly one [`actor::SessionActor`],
//! a tokio task that owns the session's log and live connections and
//! processes commands one at a time. [`hub::SessionHub`] is the per-key
//! map that guarantees the one-actor-per-session rule.

pub mod actor;
pub mod context;
pub mod fallback;
pub mod hub;
pub mod registry;
pub mod retention;

#[cfg(test)]
pub(crate) mod testing;

use std::time::Duration;

use serde::Serialize;

use chatrelay_types::config::{InferenceConfig, RelayConfig};
use chatrelay_types::message::Message;

use self::retention::RetentionPolicy;

/// User id recorded for real-time submissions that carry none.
pub const ANONYMOUS_USER: &str = "anonymous";

/// Tuning shared by every session actor.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Messages included in each prompt.
    pub context_window: usize,
    /// Sampling parameters forwarded with every prompt.
    pub inference: InferenceConfig,
    pub command_buffer: usize,
    pub outbound_buffer: usize,
    pub idle_timeout: Duration,
    pub sweep_interval: Duration,
    pub retention: RetentionPolicy,
}

impl SessionSettings {
    pub fn from_config(config: &RelayConfig) -> Self {
        Self {
            context_window: config.session.context_window,
            inference: config.inference.clone(),
            command_buffer: config.session.command_buffer.max(1),
            outbound_buffer: config.session.outbound_buffer.max(1),
            idle_timeout: Duration::from_secs(config.session.idle_timeout_secs),
            sweep_interval: Duration::from_secs(config.retention.sweep_interval_secs.max(1)),
            retention: RetentionPolicy::from_config(&config.retention),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_config(&RelayConfig::default())
    }
}

/// Result of one accepted chat submission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOutcome {
    pub user_message: Message,
    pub assistant_message: Message,
    /// Snapshot of the full log after both appends.
    pub history: Vec<Message>,
}
