//! User-facing reply texts produced by routing decisions.

use crate::domain::conversation::{AgentRole, Message, MessageRole};
use crate::domain::foundation::ThreadId;

pub const DISCONNECT_PROMPT: &str =
    "Thank you for chatting with us today. Is there anything else you need help with before you go?";

pub const DISCONNECT_CONFIRMED: &str = "Thank you for chatting with us today. Have a great day!";

pub const NO_ACTIVE_SESSION: &str = "You are not currently in an active chat session.";

pub const HIGH_TRAFFIC: &str = "We are experiencing high traffic. Please try again in a few moments.";

pub const SESSION_ENDED: &str =
    "Your chat session with our team has ended. I'm back to help you with anything else you need.";

pub const ESCALATION_UNAVAILABLE: &str =
    "I'm sorry, I couldn't connect you with our team right now. Please try again in a few moments.";

pub const CONTENT_UNAVAILABLE: &str =
    "I'm sorry, I'm having trouble answering right now. Please try again, or ask to speak to an agent.";

/// Builds the link or reference shown to the user for a hand-off thread.
pub fn thread_reference(thread_id: &ThreadId, link_base: Option<&str>) -> String {
    match link_base {
        Some(base) if !base.trim().is_empty() => format!("{}?threadId={}", base.trim(), thread_id),
        _ => thread_id.to_string(),
    }
}

/// Hand-off announcement for an escalation to `target`.
pub fn handoff_message(target: AgentRole, thread_reference: &str, summary: &str) -> String {
    match target {
        AgentRole::RelationshipManager => format!(
            "As a VIP customer, I'll connect you with your dedicated Relationship Manager.\n\n\
             Chat Thread URL: {}\n\
             Summary of conversation:\n{}",
            thread_reference, summary
        ),
        _ => format!(
            "I'll connect you with our Contact Center Agent right away.\n\n\
             Chat Thread URL: {}\n\
             Summary of conversation:\n{}\n\n\
             You can type 'disconnect' at any time to end the conversation.\n\
             A human agent will be with you shortly.",
            thread_reference, summary
        ),
    }
}

/// Summary used when no summarizer is available or it fails.
///
/// Lists the customer's last three messages, oldest first.
pub fn fallback_summary(messages: &[Message]) -> String {
    let mut recent: Vec<&str> = messages
        .iter()
        .rev()
        .filter(|m| m.role() == MessageRole::User)
        .take(3)
        .map(Message::text)
        .collect();
    if recent.is_empty() {
        return "No earlier messages.".to_string();
    }
    recent.reverse();
    format!("Customer said: {}", recent.join("; "))
}

/// Acknowledgment for media forwarded to a human operator.
pub fn media_acknowledgment(kind: &str) -> String {
    format!("I've received your {}. A human agent will review it shortly.", kind)
}

/// History entry recorded for inbound media.
pub fn media_history_entry(kind: &str) -> String {
    format!("[Sent {}]", kind)
}

/// Transcript entry mirrored to the hand-off thread for inbound media.
pub fn media_transcript_entry(kind: &str, handle: &str) -> String {
    format!("[Received {}: {}]", kind, handle)
}
