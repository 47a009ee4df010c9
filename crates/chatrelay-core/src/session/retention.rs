//! Log size bound applied by the retention sweeper.
//!
//! A capacity bound, not a precision retention policy: once a log grows
//! past `max_messages` it is cut back to the most recent `retain_messages`.
//! Discarded messages are not archived.

use chatrelay_types::config::RetentionConfig;
use chatrelay_types::message::Message;

/// Trim thresholds for one session log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub max_messages: usize,
    pub retain_messages: usize,
}

impl RetentionPolicy {
    pub fn from_config(config: &RetentionConfig) -> Self {
        Self {
            max_messages: config.max_messages,
            retain_messages: config.retain_messages.min(config.max_messages),
        }
    }

    /// The trimmed log, or None when the log is within bounds.
    pub fn trim(&self, log: &[Message]) -> Option<Vec<Message>> {
        if log.len() <= self.max_messages {
            return None;
        }
        let start = log.len() - self.retain_messages;
        Some(log[start..].to_vec())
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::from_config(&RetentionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_of(n: usize) -> Vec<Message> {
        (0..n).map(|i| Message::user(format!("m{i}"), "u1")).collect()
    }

    #[test]
    fn at_threshold_is_untouched() {
        assert!(RetentionPolicy::default().trim(&log_of(100)).is_none());
    }

    #[test]
    fn over_threshold_keeps_most_recent_fifty() {
        let log = log_of(101);
        let trimmed = RetentionPolicy::default().trim(&log).unwrap();
        assert_eq!(trimmed.len(), 50);
        assert_eq!(trimmed[0].content, "m51");
        assert_eq!(trimmed[49].content, "m100");
    }

    #[test]
    fn retain_is_capped_by_max() {
        let policy = RetentionPolicy::from_config(&RetentionConfig {
            max_messages: 10,
            retain_messages: 40,
            sweep_interval_secs: 1,
        });
        assert_eq!(policy.retain_messages, 10);
        assert_eq!(policy.trim(&log_of(11)).unwrap().len(), 10);
    }
}
