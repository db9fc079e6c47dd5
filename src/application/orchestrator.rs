//! Conversation orchestrator.
//!
//! Runs one turn per inbound message: loads the conversation, classifies the
//! message against the intent set the dispatch state allows, applies the
//! router's decision (escalate, disconnect, pass through, or delegate to a
//! content agent), mirrors the reply into an open hand-off thread and stores
//! the conversation again.
//!
//! Turns for the same identity never interleave. Collaborator failures
//! during a turn degrade to a user-facing reply rather than an error.

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::conversation::{AgentRole, ConversationState, DispatchState, MediaKind};
use crate::domain::customer::CustomerProfile;
use crate::domain::escalation::{relayed_operator_message, EscalationRecord, TranscriptEntry, TranscriptRole};
use crate::domain::foundation::{DomainError, ErrorCode, ThreadId, UserId, ValidationError};
use crate::domain::routing::replies::{
    fallback_summary, handoff_message, media_acknowledgment, media_history_entry, media_transcript_entry,
    thread_reference, CONTENT_UNAVAILABLE, DISCONNECT_CONFIRMED, DISCONNECT_PROMPT, ESCALATION_UNAVAILABLE,
    HIGH_TRAFFIC, NO_ACTIVE_SESSION, SESSION_ENDED,
};
use crate::domain::routing::{AgentRouter, Classification, RouteDecision, RouteInput};
use crate::ports::{
    ClassificationRequest, ContentAgent, ContentRequest, ConversationStore, ConversationStoreError,
    ConversationSummarizer, CustomerDirectory, IntentClassifier,
};

use super::escalation_ledger::{EscalationLedger, EscalationRequest, LedgerError};
use super::IdentityLocks;

/// Name used for customers the directory does not know.
pub const UNKNOWN_CUSTOMER_NAME: &str = "Customer";

/// Tunables for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Earlier messages offered to the classifier.
    pub context_window: usize,
    /// Messages summarized and seeded into a new hand-off thread.
    pub summary_window: usize,
    /// Base URL the thread reference is built on; bare id when absent.
    pub thread_link_base: Option<String>,
    /// Channel identity whose own posts are never relayed back.
    pub channel_identity: Option<String>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            context_window: 5,
            summary_window: 20,
            thread_link_base: None,
            channel_identity: None,
        }
    }
}

/// Content agents keyed by the automated role that owns the conversation.
#[derive(Clone)]
pub struct ContentAgents {
    default: Arc<dyn ContentAgent>,
    by_role: HashMap<AgentRole, Arc<dyn ContentAgent>>,
}

impl ContentAgents {
    pub fn new(default: Arc<dyn ContentAgent>) -> Self {
        Self {
            default,
            by_role: HashMap::new(),
        }
    }

    pub fn with_agent(mut self, role: AgentRole, agent: Arc<dyn ContentAgent>) -> Self {
        self.by_role.insert(role, agent);
        self
    }

    pub fn for_role(&self, role: AgentRole) -> &Arc<dyn ContentAgent> {
        self.by_role.get(&role).unwrap_or(&self.default)
    }
}

/// Result of one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    /// Text to deliver to the user. `None` while a person owns the reply.
    pub response: Option<String>,
    /// Agent owning the conversation after the turn.
    pub agent: AgentRole,
    pub dispatch: DispatchState,
    pub escalation_thread_id: Option<ThreadId>,
}

impl TurnOutcome {
    /// Response prefixed with the owning agent's label, as shown to users.
    pub fn display_text(&self) -> Option<String> {
        self.response
            .as_ref()
            .map(|text| format!("[{}] {}", self.agent.label(), text))
    }
}

/// An operator message to deliver to the escalation's customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayedMessage {
    pub customer_id: UserId,
    pub text: String,
}

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] ConversationStoreError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("escalation not found: {0}")]
    EscalationNotFound(ThreadId),
}

impl OrchestratorError {
    pub fn code(&self) -> ErrorCode {
        match self {
            OrchestratorError::Validation(_) => ErrorCode::ValidationFailed,
            OrchestratorError::Storage(_) => ErrorCode::StorageError,
            OrchestratorError::EscalationNotFound(_) => ErrorCode::EscalationNotFound,
            OrchestratorError::Ledger(e) => match e {
                LedgerError::NotFound(_) => ErrorCode::EscalationNotFound,
                LedgerError::InactiveEscalation { .. } => ErrorCode::InactiveEscalation,
                LedgerError::RateLimited { .. } => ErrorCode::RateLimited,
                LedgerError::Transport(_) => ErrorCode::ChannelError,
                LedgerError::Storage(_) => ErrorCode::StorageError,
                LedgerError::InvalidTransition(_) => ErrorCode::InvalidStateTransition,
            },
        }
    }
}

impl From<OrchestratorError> for DomainError {
    fn from(err: OrchestratorError) -> Self {
        let domain = DomainError::new(err.code(), err.to_string());
        match err {
            OrchestratorError::EscalationNotFound(thread_id)
            | OrchestratorError::Ledger(LedgerError::NotFound(thread_id))
            | OrchestratorError::Ledger(LedgerError::InactiveEscalation { thread_id, .. }) => {
                domain.with_detail("thread_id", thread_id.to_string())
            }
            OrchestratorError::Ledger(LedgerError::RateLimited {
                retry_after_secs: Some(secs),
            }) => domain.with_detail("retry_after_secs", secs.to_string()),
            _ => domain,
        }
    }
}

struct Reply {
    agent: AgentRole,
    text: String,
    /// Whether the reply is copied into an open hand-off thread.
    mirror: bool,
}

impl Reply {
    fn new(agent: AgentRole, text: impl Into<String>) -> Self {
        Self {
            agent,
            text: text.into(),
            mirror: true,
        }
    }

    fn local(agent: AgentRole, text: impl Into<String>) -> Self {
        Self {
            agent,
            text: text.into(),
            mirror: false,
        }
    }
}

enum Forwarded {
    Delivered,
    RateLimited,
    SessionLost,
}

pub struct ConversationOrchestrator {
    conversations: Arc<dyn ConversationStore>,
    classifier: Arc<dyn IntentClassifier>,
    content_agents: ContentAgents,
    summarizer: Arc<dyn ConversationSummarizer>,
    customers: Arc<dyn CustomerDirectory>,
    ledger: Arc<EscalationLedger>,
    router: AgentRouter,
    user_locks: IdentityLocks<UserId>,
    config: OrchestratorConfig,
}

impl ConversationOrchestrator {
    pub fn new(
        conversations: Arc<dyn ConversationStore>,
        classifier: Arc<dyn IntentClassifier>,
        content_agents: ContentAgents,
        summarizer: Arc<dyn ConversationSummarizer>,
        customers: Arc<dyn CustomerDirectory>,
        ledger: Arc<EscalationLedger>,
    ) -> Self {
        Self {
            conversations,
            classifier,
            content_agents,
            summarizer,
            customers,
            ledger,
            router: AgentRouter::new(),
            user_locks: IdentityLocks::new(),
            config: OrchestratorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn ledger(&self) -> &Arc<EscalationLedger> {
        &self.ledger
    }

    /// Processes one text message from `user_id`.
    pub async fn handle(&self, user_id: &UserId, text: &str) -> Result<TurnOutcome, OrchestratorError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::empty_field("text").into());
        }

        let _turn = self.user_locks.acquire(user_id).await;
        let (mut state, customer) = self.begin_turn(user_id).await?;
        state.record_user_message(text);

        let reply = self.route_message(&mut state, text, customer.as_ref()).await;
        let outcome = self.finish_turn(&mut state, reply).await;

        self.conversations.save(&state).await?;
        Ok(outcome)
    }

    /// Processes an inbound media attachment.
    ///
    /// While a person owns the conversation the reference is forwarded to
    /// the hand-off thread; otherwise media always escalates to the contact
    /// center.
    pub async fn handle_media(
        &self,
        user_id: &UserId,
        kind: MediaKind,
        handle: &str,
    ) -> Result<TurnOutcome, OrchestratorError> {
        if handle.trim().is_empty() {
            return Err(ValidationError::empty_field("handle").into());
        }

        let _turn = self.user_locks.acquire(user_id).await;
        let (mut state, customer) = self.begin_turn(user_id).await?;
        state.record_user_message(media_history_entry(kind.as_str()));

        let reply = self.route_media(&mut state, kind, handle.trim(), customer.as_ref()).await;
        let outcome = self.finish_turn(&mut state, Some(reply)).await;

        self.conversations.save(&state).await?;
        Ok(outcome)
    }

    pub async fn get_conversation(&self, user_id: &UserId) -> Result<Option<ConversationState>, OrchestratorError> {
        Ok(self.conversations.find(user_id).await?)
    }

    pub async fn get_escalation(&self, thread_id: &ThreadId) -> Result<Option<EscalationRecord>, OrchestratorError> {
        Ok(self.ledger.get(thread_id).await?)
    }

    /// Ends a hand-off from the operator side and returns its conversation
    /// to the customer agent.
    pub async fn disconnect_by_thread(&self, thread_id: &ThreadId) -> Result<EscalationRecord, OrchestratorError> {
        let customer_id = self.customer_of(thread_id).await?;
        let _turn = self.user_locks.acquire(&customer_id).await;

        let record = self.ledger.disconnect(thread_id).await?;
        self.release_conversation(&customer_id, thread_id).await?;
        Ok(record)
    }

    /// Administrative close.
    pub async fn close_escalation(&self, thread_id: &ThreadId) -> Result<EscalationRecord, OrchestratorError> {
        let customer_id = self.customer_of(thread_id).await?;
        let _turn = self.user_locks.acquire(&customer_id).await;

        let record = self.ledger.close(thread_id).await?;
        self.release_conversation(&customer_id, thread_id).await?;
        Ok(record)
    }

    pub async fn purge_inactive(&self) -> Result<usize, OrchestratorError> {
        Ok(self.ledger.purge_inactive().await?)
    }

    /// Formats an operator message for delivery to the customer and records
    /// it in their history.
    ///
    /// Returns `None` for messages posted by the channel identity itself.
    pub async fn relay_operator_message(
        &self,
        thread_id: &ThreadId,
        sender_id: Option<&str>,
        sender_name: &str,
        body: &str,
    ) -> Result<Option<RelayedMessage>, OrchestratorError> {
        if let (Some(identity), Some(sender)) = (self.config.channel_identity.as_deref(), sender_id) {
            if identity == sender {
                return Ok(None);
            }
        }

        let record = self
            .ledger
            .get(thread_id)
            .await?
            .ok_or_else(|| OrchestratorError::EscalationNotFound(thread_id.clone()))?;
        record.ensure_active().map_err(LedgerError::from)?;

        let text = relayed_operator_message(sender_name, body);
        let customer_id = record.customer_id().clone();

        let _turn = self.user_locks.acquire(&customer_id).await;
        if let Some(mut state) = self.conversations.find(&customer_id).await? {
            if state.escalation_thread_id() == Some(thread_id) {
                let agent = state.current_agent();
                state.record_agent_message(agent, text.clone());
                self.conversations.save(&state).await?;
            }
        }

        tracing::info!(thread_id = %thread_id, user_id = %customer_id.masked(), "Operator message relayed");
        Ok(Some(RelayedMessage { customer_id, text }))
    }

    async fn begin_turn(
        &self,
        user_id: &UserId,
    ) -> Result<(ConversationState, Option<CustomerProfile>), OrchestratorError> {
        let mut state = self.conversations.load_or_create(user_id).await?;

        let customer = match self.customers.lookup(user_id).await {
            Ok(customer) => customer,
            Err(e) => {
                tracing::warn!(user_id = %user_id.masked(), error = %e, "Customer lookup failed");
                None
            }
        };
        if let Some(profile) = &customer {
            state.set_profile_snapshot_once(profile.snapshot());
        }

        Ok((state, customer))
    }

    async fn route_message(
        &self,
        state: &mut ConversationState,
        text: &str,
        customer: Option<&CustomerProfile>,
    ) -> Option<Reply> {
        let mut forward_limited = false;
        if state.is_human_owned() {
            match self.forward_to_operator(state, text).await {
                Forwarded::Delivered => {}
                Forwarded::RateLimited => forward_limited = true,
                Forwarded::SessionLost => return Some(Reply::local(AgentRole::CustomerAgent, SESSION_ENDED)),
            }
        }

        let classification = self.classify(state, text).await;
        let decision = self.router.route(RouteInput {
            dispatch: state.dispatch(),
            escalation_active: state.escalation_thread_id().is_some(),
            classification,
        });
        tracing::info!(
            user_id = %state.user_id().masked(),
            intent = classification.label(),
            agent = %state.current_agent(),
            decision = ?decision,
            "Message routed"
        );

        // The operator never saw this message; a disconnect still applies.
        if forward_limited && matches!(decision, RouteDecision::PassThrough | RouteDecision::PromptDisconnect) {
            return Some(Reply::local(state.current_agent(), HIGH_TRAFFIC));
        }

        match decision {
            RouteDecision::PromptDisconnect => Some(Reply::new(state.current_agent(), DISCONNECT_PROMPT)),
            RouteDecision::Disconnect => {
                self.confirm_disconnect(state).await;
                Some(Reply::local(AgentRole::CustomerAgent, DISCONNECT_CONFIRMED))
            }
            RouteDecision::NoActiveSession => Some(Reply::new(state.current_agent(), NO_ACTIVE_SESSION)),
            RouteDecision::Escalate { target } => Some(self.escalate(state, target, customer).await),
            RouteDecision::PassThrough => None,
            RouteDecision::DelegateToContent => Some(self.delegate(state, text, customer).await),
        }
    }

    async fn route_media(
        &self,
        state: &mut ConversationState,
        kind: MediaKind,
        handle: &str,
        customer: Option<&CustomerProfile>,
    ) -> Reply {
        if state.is_human_owned() {
            let entry = media_transcript_entry(kind.as_str(), handle);
            match self.forward_to_operator(state, &entry).await {
                Forwarded::Delivered => {
                    return Reply::new(state.current_agent(), media_acknowledgment(kind.as_str()));
                }
                Forwarded::RateLimited => return Reply::local(state.current_agent(), HIGH_TRAFFIC),
                // The old thread is gone; open a new one below.
                Forwarded::SessionLost => {}
            }
        }
        self.escalate(state, AgentRole::HumanChannel, customer).await
    }

    /// Mirrors a customer message into the attached hand-off thread.
    async fn forward_to_operator(&self, state: &mut ConversationState, text: &str) -> Forwarded {
        let thread_id = match state.escalation_thread_id() {
            Some(thread_id) => thread_id.clone(),
            None => {
                state.end_escalation();
                return Forwarded::SessionLost;
            }
        };

        match self
            .ledger
            .append_message(&thread_id, TranscriptRole::Customer, text)
            .await
        {
            Ok(()) => Forwarded::Delivered,
            Err(LedgerError::RateLimited { retry_after_secs }) => {
                tracing::warn!(thread_id = %thread_id, retry_after_secs = ?retry_after_secs, "Channel rate limited");
                Forwarded::RateLimited
            }
            Err(e @ (LedgerError::NotFound(_) | LedgerError::InactiveEscalation { .. })) => {
                tracing::info!(thread_id = %thread_id, reason = %e, "Hand-off ended out of band");
                state.end_escalation();
                Forwarded::SessionLost
            }
            Err(e) => {
                tracing::warn!(thread_id = %thread_id, error = %e, "Failed to forward message to operator");
                Forwarded::Delivered
            }
        }
    }

    async fn classify(&self, state: &ConversationState, text: &str) -> Classification {
        let intents = self.router.scope_for(state.dispatch()).intents();

        // The message being classified is the last history entry.
        let messages = state.messages();
        let history = &messages[..messages.len().saturating_sub(1)];
        let start = history.len().saturating_sub(self.config.context_window);

        let request = ClassificationRequest {
            text,
            context: &history[start..],
            intents,
        };
        match self.classifier.classify(request).await {
            Ok(label) => intents.resolve(&label),
            Err(e) => {
                tracing::warn!(user_id = %state.user_id().masked(), error = %e, "Classification failed");
                Classification::NoMatch
            }
        }
    }

    async fn confirm_disconnect(&self, state: &mut ConversationState) {
        if let Some(thread_id) = state.escalation_thread_id().cloned() {
            match self.ledger.disconnect(&thread_id).await {
                Ok(_) | Err(LedgerError::NotFound(_)) => {}
                Err(e) => {
                    tracing::warn!(thread_id = %thread_id, error = %e, "Failed to record disconnect");
                }
            }
        }
        state.end_escalation();
    }

    async fn escalate(
        &self,
        state: &mut ConversationState,
        target: AgentRole,
        customer: Option<&CustomerProfile>,
    ) -> Reply {
        let window = state.recent_messages(self.config.summary_window);
        let summary = match self.summarizer.summarize(window).await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::warn!(user_id = %state.user_id().masked(), error = %e, "Summarizer failed");
                fallback_summary(window)
            }
        };
        let transcript: Vec<TranscriptEntry> = window.iter().map(TranscriptEntry::from).collect();

        let request = EscalationRequest {
            customer_id: state.user_id().clone(),
            customer_display_name: customer
                .map(|profile| profile.name.clone())
                .unwrap_or_else(|| UNKNOWN_CUSTOMER_NAME.to_string()),
            recent_messages: transcript.clone(),
        };

        let handle = match self.ledger.create_or_reuse(request).await {
            Ok(handle) => handle,
            Err(LedgerError::RateLimited { .. }) => {
                tracing::warn!(user_id = %state.user_id().masked(), "Escalation deferred: channel rate limited");
                return Reply::local(state.current_agent(), HIGH_TRAFFIC);
            }
            Err(e) => {
                tracing::error!(user_id = %state.user_id().masked(), error = %e, "Escalation failed");
                return Reply::local(state.current_agent(), ESCALATION_UNAVAILABLE);
            }
        };

        if handle.reused {
            if let Err(e) = self.ledger.replace_messages(handle.thread_id(), transcript).await {
                tracing::warn!(thread_id = %handle.thread_id(), error = %e, "Failed to resync reused thread");
            }
        }

        let thread_id = handle.thread_id().clone();
        if let Err(e) = state.begin_escalation(target, thread_id.clone(), Some(summary.clone())) {
            tracing::error!(error = %e, "Escalation target rejected");
            return Reply::local(state.current_agent(), ESCALATION_UNAVAILABLE);
        }

        let reference = thread_reference(&thread_id, self.config.thread_link_base.as_deref());
        Reply::new(target, handoff_message(target, &reference, &summary))
    }

    async fn delegate(
        &self,
        state: &mut ConversationState,
        text: &str,
        customer: Option<&CustomerProfile>,
    ) -> Reply {
        let agent = self.content_agents.for_role(state.current_agent());
        let request = ContentRequest {
            user_id: state.user_id(),
            text,
            conversation: state,
            customer,
        };

        match agent.respond(request).await {
            Ok(reply) => {
                if let Err(e) = state.set_display_agent(reply.agent) {
                    tracing::debug!(requested = %reply.agent, error = %e, "Display label ignored");
                }
                Reply::new(state.current_agent(), reply.text)
            }
            Err(e) => {
                tracing::warn!(user_id = %state.user_id().masked(), error = %e, "Content agent failed");
                Reply::new(state.current_agent(), CONTENT_UNAVAILABLE)
            }
        }
    }

    async fn finish_turn(&self, state: &mut ConversationState, reply: Option<Reply>) -> TurnOutcome {
        let response = match reply {
            None => None,
            Some(mut reply) => {
                if reply.mirror && state.is_human_owned() {
                    if let Some(thread_id) = state.escalation_thread_id().cloned() {
                        match self
                            .ledger
                            .append_message(&thread_id, TranscriptRole::Assistant, &reply.text)
                            .await
                        {
                            Ok(()) => {}
                            Err(LedgerError::RateLimited { .. }) => reply.text = HIGH_TRAFFIC.to_string(),
                            Err(e) => {
                                tracing::warn!(thread_id = %thread_id, error = %e, "Failed to mirror reply");
                            }
                        }
                    }
                }
                state.record_agent_message(reply.agent, reply.text.clone());
                Some(reply.text)
            }
        };

        TurnOutcome {
            response,
            agent: state.current_agent(),
            dispatch: state.dispatch(),
            escalation_thread_id: state.escalation_thread_id().cloned(),
        }
    }

    async fn customer_of(&self, thread_id: &ThreadId) -> Result<UserId, OrchestratorError> {
        self.ledger
            .get(thread_id)
            .await?
            .map(|record| record.customer_id().clone())
            .ok_or_else(|| OrchestratorError::EscalationNotFound(thread_id.clone()))
    }

    /// Returns the conversation to the customer agent if it is still
    /// attached to `thread_id`.
    async fn release_conversation(&self, customer_id: &UserId, thread_id: &ThreadId) -> Result<(), OrchestratorError> {
        if let Some(mut state) = self.conversations.find(customer_id).await? {
            if state.escalation_thread_id() == Some(thread_id) {
                state.end_escalation();
                self.conversations.save(&state).await?;
            }
        }
        Ok(())
    }
}
