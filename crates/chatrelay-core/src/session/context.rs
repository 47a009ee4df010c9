//! Context window and prompt assembly.
//!
//! The window is a fixed message count, not a token budget: the most
//! recent `size` messages, oldest first, included verbatim.

use chatrelay_types::message::{Message, MessageRole};

/// First line of every prompt.
pub const SYSTEM_PREAMBLE: &str = "You are a helpful AI assistant.";

/// The most recent `size` messages of `log`, oldest first.
pub fn context_window(log: &[Message], size: usize) -> &[Message] {
    &log[log.len().saturating_sub(size)..]
}

/// Render messages as `User:` / `Assistant:` turns, one per line.
pub fn render_turns(window: &[Message]) -> String {
    window
        .iter()
        .map(|msg| {
            let speaker = match msg.role {
                MessageRole::User => "User",
                _ => "Assistant",
            };
            format!("{speaker}: {}", msg.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Assemble the full prompt: preamble, optional history, then the new turn.
pub fn build_prompt(window: &[Message], user_message: &str) -> String {
    let mut prompt = format!("{SYSTEM_PREAMBLE}\n\n");
    if !window.is_empty() {
        prompt.push_str("Conversation history:\n");
        prompt.push_str(&render_turns(window));
        prompt.push_str("\n\n");
    }
    prompt.push_str(&format!("User: {user_message}\nAssistant:"));
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_log(n: usize) -> Vec<Message> {
        (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    Message::user(format!("q{i}"), "u1")
                } else {
                    Message::assistant(format!("a{i}"))
                }
            })
            .collect()
    }

    #[test]
    fn window_shorter_than_size_returns_everything() {
        let log = numbered_log(3);
        assert_eq!(context_window(&log, 10).len(), 3);
    }

    #[test]
    fn window_keeps_most_recent_in_order() {
        let log = numbered_log(15);
        let window = context_window(&log, 10);
        assert_eq!(window.len(), 10);
        assert_eq!(window[0].content, "a5");
        assert_eq!(window[9].content, "q14");
    }

    #[test]
    fn render_alternates_speakers() {
        let log = vec![Message::user("hi", "u1"), Message::assistant("hello")];
        assert_eq!(render_turns(&log), "User: hi\nAssistant: hello");
    }

    #[test]
    fn system_messages_render_as_assistant() {
        let mut msg = Message::assistant("note");
        msg.role = MessageRole::System;
        assert_eq!(render_turns(&[msg]), "Assistant: note");
    }

    #[test]
    fn prompt_without_history() {
        assert_eq!(
            build_prompt(&[], "hello"),
            "You are a helpful AI assistant.\n\nUser: hello\nAssistant:"
        );
    }

    #[test]
    fn prompt_with_history() {
        let log = vec![Message::user("hello", "u1")];
        assert_eq!(
            build_prompt(&log, "hello"),
            "You are a helpful AI assistant.\n\nConversation history:\nUser: hello\n\nUser: hello\nAssistant:"
        );
    }
}
