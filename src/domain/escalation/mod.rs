//! Escalation domain module.
//!
//! Records of hand-off sessions with a human-staffed channel, the transcript
//! mirrored to them, and the formatting of operator replies.

mod errors;
mod operator;
mod record;

pub use errors::EscalationError;
pub use operator::{operator_sender_label, relayed_operator_message, OPERATOR_PREFIX};
pub use record::{
    EscalationRecord, EscalationStatus, TranscriptEntry, TranscriptRole, CUSTOMER_DISCONNECTED_NOTICE,
};

/// Topic of the external hand-off thread.
pub fn escalation_topic(customer_display_name: &str, masked_customer_id: &str) -> String {
    format!(
        "Escalated Chat - Customer {} - {}",
        customer_display_name, masked_customer_id
    )
}
