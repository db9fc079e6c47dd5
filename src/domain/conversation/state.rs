//! Per-user conversation state.
//!
//! A `ConversationState` is the unit of work of the orchestrator: it is
//! loaded, mutated by exactly one turn at a time, and saved back.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MessageId, ThreadId, Timestamp, UserId, ValidationError};

use super::{AgentRole, DispatchState, Message};

/// Conversation state for one end user.
///
/// History is append-only. The escalation thread is only set together with
/// a human-staffed owner and only cleared when ownership returns to the
/// automated agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    user_id: UserId,
    messages: Vec<Message>,
    current_agent: AgentRole,
    dispatch: DispatchState,
    #[serde(default)]
    last_summary: Option<String>,
    #[serde(default)]
    customer_profile_snapshot: Option<String>,
    #[serde(default)]
    escalation_thread_id: Option<ThreadId>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl ConversationState {
    /// Fresh conversation owned by the customer agent.
    pub fn new(user_id: UserId) -> Self {
        let now = Timestamp::now();
        Self {
            user_id,
            messages: Vec::new(),
            current_agent: AgentRole::CustomerAgent,
            dispatch: DispatchState::Automated,
            last_summary: None,
            customer_profile_snapshot: None,
            escalation_thread_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn current_agent(&self) -> AgentRole {
        self.current_agent
    }

    pub fn dispatch(&self) -> DispatchState {
        self.dispatch
    }

    pub fn is_human_owned(&self) -> bool {
        self.dispatch == DispatchState::HumanOwned
    }

    pub fn last_summary(&self) -> Option<&str> {
        self.last_summary.as_deref()
    }

    pub fn customer_profile_snapshot(&self) -> Option<&str> {
        self.customer_profile_snapshot.as_deref()
    }

    pub fn escalation_thread_id(&self) -> Option<&ThreadId> {
        self.escalation_thread_id.as_ref()
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// The last `n` messages, oldest first.
    pub fn recent_messages(&self, n: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    /// Appends an inbound user message.
    pub fn record_user_message(&mut self, text: impl Into<String>) -> MessageId {
        self.push(Message::user(text))
    }

    /// Appends a response produced by `agent`.
    pub fn record_agent_message(&mut self, agent: AgentRole, text: impl Into<String>) -> MessageId {
        self.push(Message::agent(agent, text))
    }

    fn push(&mut self, message: Message) -> MessageId {
        let id = message.id();
        self.messages.push(message);
        self.touch();
        id
    }

    /// Stores the profile snapshot unless one is already present.
    ///
    /// Returns true if the snapshot was stored.
    pub fn set_profile_snapshot_once(&mut self, snapshot: impl Into<String>) -> bool {
        if self.customer_profile_snapshot.is_some() {
            return false;
        }
        self.customer_profile_snapshot = Some(snapshot.into());
        self.touch();
        true
    }

    /// Updates the display label chosen by an automated agent.
    ///
    /// Human-staffed roles can only be entered through `begin_escalation`.
    pub fn set_display_agent(&mut self, agent: AgentRole) -> Result<(), ValidationError> {
        if agent.is_human_staffed() || self.is_human_owned() {
            return Err(ValidationError::invalid_format(
                "current_agent",
                format!("cannot hand {} to {} outside an escalation", self.current_agent, agent),
            ));
        }
        self.current_agent = agent;
        self.touch();
        Ok(())
    }

    /// Hands the conversation to a human-staffed role on `thread_id`.
    pub fn begin_escalation(
        &mut self,
        agent: AgentRole,
        thread_id: ThreadId,
        summary: Option<String>,
    ) -> Result<(), ValidationError> {
        if !agent.is_human_staffed() {
            return Err(ValidationError::invalid_format(
                "current_agent",
                format!("{} is not a human-staffed role", agent),
            ));
        }
        self.current_agent = agent;
        self.dispatch = DispatchState::HumanOwned;
        self.escalation_thread_id = Some(thread_id);
        if summary.is_some() {
            self.last_summary = summary;
        }
        self.touch();
        Ok(())
    }

    /// Returns ownership to the customer agent and clears the thread.
    ///
    /// Returns the thread that was attached, if any.
    pub fn end_escalation(&mut self) -> Option<ThreadId> {
        self.current_agent = AgentRole::CustomerAgent;
        self.dispatch = DispatchState::Automated;
        self.touch();
        self.escalation_thread_id.take()
    }

    fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::MessageRole;

    fn user() -> UserId {
        UserId::new("+15551234567").unwrap()
    }

    fn thread() -> ThreadId {
        ThreadId::new("19:abc@thread.v2").unwrap()
    }

    mod construction {
        use super::*;

        #[test]
        fn new_state_is_automated_customer_agent() {
            let state = ConversationState::new(user());
            assert_eq!(state.current_agent(), AgentRole::CustomerAgent);
            assert_eq!(state.dispatch(), DispatchState::Automated);
            assert!(state.messages().is_empty());
            assert!(state.escalation_thread_id().is_none());
        }
    }

    mod history {
        use super::*;

        #[test]
        fn messages_append_in_order() {
            let mut state = ConversationState::new(user());
            state.record_user_message("hi");
            state.record_agent_message(AgentRole::CustomerAgent, "hello");
            let roles: Vec<_> = state.messages().iter().map(|m| m.role()).collect();
            assert_eq!(roles, vec![MessageRole::User, MessageRole::Agent]);
        }

        #[test]
        fn recent_messages_returns_tail() {
            let mut state = ConversationState::new(user());
            for i in 0..8 {
                state.record_user_message(format!("m{}", i));
            }
            let recent: Vec<_> = state.recent_messages(3).iter().map(|m| m.text().to_string()).collect();
            assert_eq!(recent, vec!["m5", "m6", "m7"]);
            assert_eq!(state.recent_messages(50).len(), 8);
        }
    }

    mod profile_snapshot {
        use super::*;

        #[test]
        fn snapshot_is_set_once() {
            let mut state = ConversationState::new(user());
            assert!(state.set_profile_snapshot_once("first"));
            assert!(!state.set_profile_snapshot_once("second"));
            assert_eq!(state.customer_profile_snapshot(), Some("first"));
        }
    }

    mod escalation {
        use super::*;

        #[test]
        fn begin_escalation_sets_owner_and_thread() {
            let mut state = ConversationState::new(user());
            state
                .begin_escalation(AgentRole::HumanChannel, thread(), Some("summary".into()))
                .unwrap();
            assert!(state.is_human_owned());
            assert_eq!(state.current_agent(), AgentRole::HumanChannel);
            assert_eq!(state.escalation_thread_id(), Some(&thread()));
            assert_eq!(state.last_summary(), Some("summary"));
        }

        #[test]
        fn begin_escalation_rejects_automated_role() {
            let mut state = ConversationState::new(user());
            assert!(state.begin_escalation(AgentRole::PolicyAgent, thread(), None).is_err());
            assert!(!state.is_human_owned());
        }

        #[test]
        fn end_escalation_resets_to_customer_agent() {
            let mut state = ConversationState::new(user());
            state.begin_escalation(AgentRole::RelationshipManager, thread(), None).unwrap();
            assert_eq!(state.end_escalation(), Some(thread()));
            assert_eq!(state.current_agent(), AgentRole::CustomerAgent);
            assert_eq!(state.dispatch(), DispatchState::Automated);
            assert!(state.escalation_thread_id().is_none());
        }

        #[test]
        fn display_agent_cannot_claim_human_role() {
            let mut state = ConversationState::new(user());
            assert!(state.set_display_agent(AgentRole::HumanChannel).is_err());
            state.set_display_agent(AgentRole::PolicyAgent).unwrap();
            assert_eq!(state.current_agent(), AgentRole::PolicyAgent);
            assert_eq!(state.dispatch(), DispatchState::Automated);
        }

        #[test]
        fn display_agent_is_frozen_while_human_owned() {
            let mut state = ConversationState::new(user());
            state.begin_escalation(AgentRole::HumanChannel, thread(), None).unwrap();
            assert!(state.set_display_agent(AgentRole::PolicyAgent).is_err());
            assert_eq!(state.current_agent(), AgentRole::HumanChannel);
        }
    }
}
