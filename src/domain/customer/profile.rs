//! Customer reference data.

use serde::{Deserialize, Serialize};

/// A known customer, as held by the customer directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerProfile {
    pub customer_id: String,
    pub phone_number: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub policy_numbers: Vec<String>,
    #[serde(default)]
    pub customer_type: String,
    #[serde(default)]
    pub preferred_language: String,
    #[serde(default)]
    pub relationship_manager: String,
    #[serde(default)]
    pub last_contact: String,
    #[serde(default)]
    pub notes: String,
}

impl CustomerProfile {
    pub fn is_vip(&self) -> bool {
        self.customer_type.eq_ignore_ascii_case("vip")
    }

    /// Snapshot cached on the conversation and shown to content agents.
    pub fn snapshot(&self) -> String {
        format!(
            "Customer Information:\n\
             - Name: {}\n\
             - Customer ID: {}\n\
             - Policy Numbers: {}\n\
             - Customer Type: {}\n\
             - Preferred Language: {}\n\
             - Email: {}\n\
             - Last Contact: {}",
            self.name,
            self.customer_id,
            self.policy_numbers.join(", "),
            self.customer_type,
            self.preferred_language,
            self.email,
            self.last_contact,
        )
    }

    /// Policy number mentioned in `text`, with or without its `POL-` prefix.
    pub fn mentioned_policy(&self, text: &str) -> Option<&str> {
        let lowered = text.to_lowercase();
        self.policy_numbers
            .iter()
            .find(|number| {
                let full = number.to_lowercase();
                let short = full.trim_start_matches("pol-").to_string();
                lowered.contains(&full) || (!short.is_empty() && lowered.contains(&short))
            })
            .map(String::as_str)
    }
}

/// Normalises a channel identity to the directory's `+<digits>` key form.
pub fn normalize_phone_number(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('+') {
        trimmed.to_string()
    } else {
        format!("+{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jane() -> CustomerProfile {
        serde_json::from_value(serde_json::json!({
            "customerId": "CUST-001",
            "phoneNumber": "+15551234567",
            "name": "Jane Doe",
            "email": "jane@example.com",
            "policyNumbers": ["POL-1001", "POL-1002"],
            "customerType": "VIP",
            "preferredLanguage": "English",
            "relationshipManager": "Sam Lee",
            "lastContact": "2024-01-15",
            "notes": "Prefers chat"
        }))
        .unwrap()
    }

    #[test]
    fn deserializes_directory_shape() {
        let profile = jane();
        assert_eq!(profile.name, "Jane Doe");
        assert_eq!(profile.policy_numbers.len(), 2);
        assert!(profile.is_vip());
    }

    #[test]
    fn optional_fields_default() {
        let profile: CustomerProfile = serde_json::from_value(serde_json::json!({
            "customerId": "CUST-002",
            "phoneNumber": "+15550000000",
            "name": "Sam"
        }))
        .unwrap();
        assert!(profile.policy_numbers.is_empty());
        assert!(!profile.is_vip());
    }

    #[test]
    fn snapshot_lists_key_fields() {
        let snapshot = jane().snapshot();
        assert!(snapshot.starts_with("Customer Information:\n- Name: Jane Doe"));
        assert!(snapshot.contains("- Policy Numbers: POL-1001, POL-1002"));
        assert!(snapshot.contains("- Customer Type: VIP"));
    }

    #[test]
    fn mentioned_policy_matches_with_or_without_prefix() {
        let profile = jane();
        assert_eq!(profile.mentioned_policy("what does POL-1002 cover?"), Some("POL-1002"));
        assert_eq!(profile.mentioned_policy("tell me about 1001"), Some("POL-1001"));
        assert_eq!(profile.mentioned_policy("what is covered?"), None);
    }

    #[test]
    fn phone_numbers_gain_leading_plus() {
        assert_eq!(normalize_phone_number("15551234567"), "+15551234567");
        assert_eq!(normalize_phone_number(" +15551234567 "), "+15551234567");
    }
}
