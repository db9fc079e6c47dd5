//! Content agent answering from canned replies and the customer profile.

use async_trait::async_trait;

use crate::domain::conversation::AgentRole;
use crate::domain::customer::CustomerProfile;
use crate::ports::{ContentAgent, ContentAgentError, ContentReply, ContentRequest};

const IDENTITY_QUERIES: &[&str] = &[
    "who am i",
    "what is my name",
    "my details",
    "my info",
    "my information",
    "my profile",
];

const HELP_QUERIES: &[&str] = &["help", "what can you do", "options", "menu"];

const GREETINGS: &[&str] = &["hi", "hello", "hey", "good morning", "good afternoon", "good evening"];

const POLICY_LIST_QUERIES: &[&str] = &["my policies", "my policy numbers", "which policies"];

pub const HELP_REPLY: &str = "I can help you with:\n\
     - Questions about your policies and coverage\n\
     - Your account details\n\
     - Connecting you with a contact center agent (just ask to speak to an agent)\n\n\
     What would you like to do?";

pub const FALLBACK_REPLY: &str = "Thanks for your message. Could you tell me a bit more about what you need? \
     You can also ask to speak to an agent at any time.";

/// Answers the common questions that need no language model.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedContentAgent;

impl RuleBasedContentAgent {
    pub fn new() -> Self {
        Self
    }

    /// Reply for `text` if one of the fixed rules applies.
    pub fn quick_reply(&self, text: &str, customer: Option<&CustomerProfile>) -> Option<ContentReply> {
        let lowered = text.trim().to_lowercase();

        if IDENTITY_QUERIES.iter().any(|q| lowered.contains(q)) {
            let reply = match customer {
                Some(profile) => format!(
                    "Here is your information:\n{}\n\nHow can I assist you today?",
                    profile.snapshot()
                ),
                None => "I couldn't find a customer record for this number. \
                         Please contact us through your registered phone number."
                    .to_string(),
            };
            return Some(ContentReply::new(AgentRole::CustomerAgent, reply));
        }

        if HELP_QUERIES.iter().any(|q| has_phrase(&lowered, q)) {
            return Some(ContentReply::new(AgentRole::CustomerAgent, HELP_REPLY));
        }

        if let Some(profile) = customer {
            if POLICY_LIST_QUERIES.iter().any(|q| lowered.contains(q)) {
                let reply = if profile.policy_numbers.is_empty() {
                    "You don't have any policies on file with us.".to_string()
                } else {
                    format!("Your policies on file: {}.", profile.policy_numbers.join(", "))
                };
                return Some(ContentReply::new(AgentRole::PolicyAgent, reply));
            }
            if let Some(policy) = profile.mentioned_policy(&lowered) {
                return Some(ContentReply::new(
                    AgentRole::PolicyAgent,
                    format!(
                        "I can see policy {} on your account. What would you like to know about it?",
                        policy
                    ),
                ));
            }
        }

        if GREETINGS.iter().any(|g| has_phrase(&lowered, g)) {
            let reply = match customer {
                Some(profile) => format!("Hello {}! How can I help you today?", profile.name),
                None => "Hello! How can I help you today?".to_string(),
            };
            return Some(ContentReply::new(AgentRole::CustomerAgent, reply));
        }

        None
    }
}

/// Whether `phrase` occurs in `text` on word boundaries.
fn has_phrase(text: &str, phrase: &str) -> bool {
    let words: Vec<&str> = text
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|w| !w.is_empty())
        .collect();
    let needle: Vec<&str> = phrase.split_whitespace().collect();
    !needle.is_empty() && words.windows(needle.len()).any(|window| window == needle.as_slice())
}

#[async_trait]
impl ContentAgent for RuleBasedContentAgent {
    async fn respond(&self, request: ContentRequest<'_>) -> Result<ContentReply, ContentAgentError> {
        Ok(self
            .quick_reply(request.text, request.customer)
            .unwrap_or_else(|| ContentReply::new(AgentRole::CustomerAgent, FALLBACK_REPLY)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> CustomerProfile {
        CustomerProfile {
            customer_id: "CUST001".to_string(),
            phone_number: "+15551234567".to_string(),
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            policy_numbers: vec!["POL-1001".to_string(), "POL-2002".to_string()],
            customer_type: "Standard".to_string(),
            preferred_language: "English".to_string(),
            relationship_manager: String::new(),
            last_contact: "2024-01-01".to_string(),
            notes: String::new(),
        }
    }

    #[test]
    fn identity_query_returns_snapshot() {
        let reply = RuleBasedContentAgent::new().quick_reply("Who am I?", Some(&profile())).unwrap();
        assert_eq!(reply.agent, AgentRole::CustomerAgent);
        assert!(reply.text.starts_with("Here is your information:\nCustomer Information:"));
        assert!(reply.text.ends_with("How can I assist you today?"));
    }

    #[test]
    fn identity_query_without_profile() {
        let reply = RuleBasedContentAgent::new().quick_reply("my info", None).unwrap();
        assert!(reply.text.contains("couldn't find a customer record"));
    }

    #[test]
    fn policy_mention_is_attributed_to_policy_agent() {
        let agent = RuleBasedContentAgent::new();

        let reply = agent.quick_reply("question about 1001", Some(&profile())).unwrap();
        assert_eq!(reply.agent, AgentRole::PolicyAgent);
        assert!(reply.text.contains("POL-1001"));

        let reply = agent.quick_reply("list my policies", Some(&profile())).unwrap();
        assert_eq!(reply.text, "Your policies on file: POL-1001, POL-2002.");
    }

    #[test]
    fn greetings_match_whole_words_only() {
        let agent = RuleBasedContentAgent::new();
        assert_eq!(
            agent.quick_reply("hey there", Some(&profile())).unwrap().text,
            "Hello Ada Lovelace! How can I help you today?"
        );
        assert!(agent.quick_reply("this is about my roof", None).is_none());
    }

    #[test]
    fn help_query() {
        let reply = RuleBasedContentAgent::new().quick_reply("help", None).unwrap();
        assert_eq!(reply.text, HELP_REPLY);
    }

    #[tokio::test]
    async fn unmatched_text_gets_fallback() {
        use crate::domain::conversation::ConversationState;
        use crate::domain::foundation::UserId;

        let user = UserId::new("+15551234567").unwrap();
        let conversation = ConversationState::new(user.clone());
        let reply = RuleBasedContentAgent::new()
            .respond(ContentRequest {
                user_id: &user,
                text: "does my plan include flood damage",
                conversation: &conversation,
                customer: None,
            })
            .await
            .unwrap();

        assert_eq!(reply, ContentReply::new(AgentRole::CustomerAgent, FALLBACK_REPLY));
    }
}
