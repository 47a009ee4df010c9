//! `chatrelay history` -- print a stored session log.

use anyhow::Result;
use console::style;

use chatrelay_core::store::log_store::SessionLogStore;
use chatrelay_types::message::{Message, MessageRole};

use crate::state::AppState;

/// Print the persisted log of `session_id`, oldest first.
///
/// Reads the store directly; no session actor is started.
pub async fn show_history(state: &AppState, session_id: &str, json: bool) -> Result<()> {
    let messages = state
        .session_logs
        .load(session_id)
        .await?
        .unwrap_or_default();

    if json {
        let out = serde_json::json!({
            "sessionId": session_id,
            "messages": messages,
            "count": messages.len(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    if messages.is_empty() {
        println!("  No messages stored for session '{}'.", style(session_id).cyan());
        println!();
        return Ok(());
    }

    println!(
        "  {} ({} messages)",
        style(session_id).cyan().bold(),
        messages.len()
    );
    println!();
    for message in &messages {
        println!("  {}", render_line(message));
    }
    println!();

    Ok(())
}

fn render_line(message: &Message) -> String {
    let time = chrono::DateTime::from_timestamp_millis(message.timestamp)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default();
    let speaker = match message.role {
        MessageRole::User => {
            let who = message.user_id.as_deref().unwrap_or("user");
            style(who.to_string()).green().bold()
        }
        MessageRole::Assistant => style("assistant".to_string()).blue().bold(),
        MessageRole::System => style("system".to_string()).yellow().bold(),
    };
    format!("{} {speaker}: {}", style(time).dim(), message.content)
}
