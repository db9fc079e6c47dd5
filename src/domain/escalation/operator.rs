//! Formatting of messages relayed from human operators to customers.

const FALLBACK_LABEL: &str = "Agent";

/// Prefix put in front of every relayed operator message.
pub const OPERATOR_PREFIX: &str = "[Contact Center Agent]";

/// Normalises an operator display name before relaying.
///
/// Strips one level of `[...]` wrapping, collapses names that already carry
/// the operator prefix, keeps the part after the last ` - ` separator, and
/// falls back to `Agent` for empty or single-character names.
pub fn operator_sender_label(raw: &str) -> String {
    let mut label = raw.trim();

    if label.starts_with('[') && label.ends_with(']') && label.len() >= 2 {
        label = label[1..label.len() - 1].trim();
    }
    if label.contains("Contact Center Agent") {
        return FALLBACK_LABEL.to_string();
    }
    if let Some((_, tail)) = label.rsplit_once(" - ") {
        label = tail.trim();
    }
    if label.chars().count() <= 1 {
        return FALLBACK_LABEL.to_string();
    }
    label.to_string()
}

/// Text delivered to the customer for an operator message.
pub fn relayed_operator_message(sender_name: &str, body: &str) -> String {
    format!("{} {}: {}", OPERATOR_PREFIX, operator_sender_label(sender_name), body)
}
