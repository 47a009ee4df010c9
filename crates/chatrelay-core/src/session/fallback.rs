//! Substitute replies for failed or empty model output.
//!
//! Fallbacks are ordinary assistant text: the actor stores and broadcasts
//! them exactly like a genuine reply.

use chatrelay_types::error::InferenceError;

/// Reply used when the model answers with nothing but whitespace.
pub const EMPTY_REPLY_FALLBACK: &str =
    "I apologize, but I could not generate a response. Please try rephrasing your question.";

/// Reply used when the backend reports the model as unavailable.
pub const UNAVAILABLE_FALLBACK: &str =
    "Sorry, the AI model is currently not available. Please try again later.";

/// Reply used when the backend call timed out.
pub const TIMEOUT_FALLBACK: &str =
    "The AI request timed out. Please try again with a shorter message.";

/// Coarse class of an inference failure, decided from its description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Unavailable,
    Timeout,
    Other,
}

/// Classify a failure description by substring, ignoring case.
pub fn classify(description: &str) -> FailureKind {
    let lowered = description.to_lowercase();
    if lowered.contains("not available") {
        FailureKind::Unavailable
    } else if lowered.contains("timeout") {
        FailureKind::Timeout
    } else {
        FailureKind::Other
    }
}

/// Human-readable reply standing in for a failed inference call.
pub fn fallback_reply(error: &InferenceError) -> String {
    let description = error.to_string();
    match classify(&description) {
        FailureKind::Unavailable => UNAVAILABLE_FALLBACK.to_string(),
        FailureKind::Timeout => TIMEOUT_FALLBACK.to_string(),
        FailureKind::Other => format!("I encountered an error: {description}. Please try again."),
    }
}

/// Trim model output, substituting the empty-reply fallback when nothing is left.
pub fn finalize_reply(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        EMPTY_REPLY_FALLBACK.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_unavailable() {
        assert_eq!(
            classify("Model Not Available in this region"),
            FailureKind::Unavailable
        );
    }

    #[test]
    fn classify_timeout() {
        assert_eq!(classify("upstream TIMEOUT"), FailureKind::Timeout);
    }

    #[test]
    fn classify_other() {
        assert_eq!(classify("connection reset"), FailureKind::Other);
    }

    #[test]
    fn unavailable_error_yields_unavailable_text() {
        let err = InferenceError::Unavailable("llama-3".to_string());
        assert_eq!(fallback_reply(&err), UNAVAILABLE_FALLBACK);
    }

    #[test]
    fn timeout_error_yields_timeout_text() {
        assert_eq!(fallback_reply(&InferenceError::Timeout(30)), TIMEOUT_FALLBACK);
    }

    #[test]
    fn provider_message_mentioning_timeout_is_classified_as_timeout() {
        let err = InferenceError::Provider {
            message: "gateway timeout".to_string(),
        };
        assert_eq!(fallback_reply(&err), TIMEOUT_FALLBACK);
    }

    #[test]
    fn other_error_embeds_raw_description() {
        let err = InferenceError::Provider {
            message: "quota exhausted".to_string(),
        };
        let reply = fallback_reply(&err);
        assert!(reply.contains("provider error: quota exhausted"));
        assert!(reply.starts_with("I encountered an error: "));
    }

    #[test]
    fn finalize_trims_whitespace() {
        assert_eq!(finalize_reply("  hi there \n"), "hi there");
    }

    #[test]
    fn finalize_substitutes_empty_output() {
        assert_eq!(finalize_reply(" \n\t "), EMPTY_REPLY_FALLBACK);
    }
}
