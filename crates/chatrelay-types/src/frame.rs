//! Real-time channel frames.
//!
//! Frames are JSON objects discriminated by a `type` tag. Inbound frames are
//! parsed strictly: anything that does not match a known tag is rejected
//! instead of probed field by field.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::message::Message;

/// A frame received from a client on a real-time channel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundFrame {
    /// Submit a chat message to the session.
    Chat {
        message: String,
        #[serde(default, rename = "userId")]
        user_id: Option<String>,
    },
}

/// A frame sent to clients on a real-time channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundFrame {
    /// Delivery of one log message.
    Message { message: Message },
    /// Failure notice for a frame sent on this channel.
    Error { error: String },
}

/// Why an inbound frame could not be turned into an [`InboundFrame`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameParseError {
    /// The payload is not JSON at all.
    #[error("malformed frame: {0}")]
    Malformed(String),

    /// Valid JSON, but not a frame kind this channel accepts.
    #[error("unrecognized frame: {0}")]
    Unrecognized(String),
}

impl InboundFrame {
    /// Parse a raw text payload into a known inbound frame.
    ///
    /// A `chat` frame with an empty or whitespace-only message is treated
    /// as unrecognized.
    pub fn parse(raw: &str) -> Result<Self, FrameParseError> {
        let value: serde_json::Value =
            serde_json::from_str(raw).map_err(|e| FrameParseError::Malformed(e.to_string()))?;

        let frame: InboundFrame = serde_json::from_value(value)
            .map_err(|e| FrameParseError::Unrecognized(e.to_string()))?;

        match &frame {
            InboundFrame::Chat { message, .. } if message.trim().is_empty() => Err(
                FrameParseError::Unrecognized("chat frame without message".to_string()),
            ),
            _ => Ok(frame),
        }
    }
}
