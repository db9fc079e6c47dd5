//! The routing state machine.
//!
//! `AgentRouter` is pure: it maps the dispatch state and a classified intent
//! to a `RouteDecision`. The orchestrator carries out the side effects.

use crate::domain::conversation::{AgentRole, DispatchState};

use super::intents::{Classification, Intent, IntentScope};

/// Everything the router needs to decide one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteInput {
    pub dispatch: DispatchState,
    /// True when the conversation has an escalation thread attached.
    pub escalation_active: bool,
    pub classification: Classification,
}

/// What a turn should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Ask the user to confirm they want to leave. No state change.
    PromptDisconnect,

    /// Mark the escalation disconnected and return to the customer agent.
    Disconnect,

    /// Tell the user there is no live session to end. No state change.
    NoActiveSession,

    /// Hand the conversation to a human-staffed role.
    Escalate { target: AgentRole },

    /// A person owns the turn; mirror the message and stay silent.
    PassThrough,

    /// No escalation trigger; the owning agent's content logic answers.
    DelegateToContent,
}

impl RouteDecision {
    /// The owning agent after this decision is applied.
    pub fn next_agent(&self, current: AgentRole) -> AgentRole {
        match self {
            RouteDecision::Escalate { target } => *target,
            RouteDecision::Disconnect => AgentRole::CustomerAgent,
            _ => current,
        }
    }

    /// True if applying this decision touches the escalation ledger's status.
    pub fn changes_escalation(&self) -> bool {
        matches!(self, RouteDecision::Escalate { .. } | RouteDecision::Disconnect)
    }
}

/// Stateless transition table for conversation ownership.
#[derive(Debug, Clone, Copy, Default)]
pub struct AgentRouter;

impl AgentRouter {
    pub fn new() -> Self {
        Self
    }

    /// The intent set a classifier should be offered in `dispatch`.
    pub fn scope_for(&self, dispatch: DispatchState) -> IntentScope {
        IntentScope::for_dispatch(dispatch)
    }

    /// Applies the transition table.
    ///
    /// Escalation intents only count while automated agents own the
    /// conversation. A human-owned conversation that somehow receives one is
    /// treated as ordinary input.
    pub fn route(&self, input: RouteInput) -> RouteDecision {
        let human_owned = input.dispatch == DispatchState::HumanOwned;

        match input.classification {
            Classification::Matched(Intent::WantsDisconnect) => RouteDecision::PromptDisconnect,
            Classification::Matched(Intent::ConfirmsDisconnect) => {
                if input.escalation_active {
                    RouteDecision::Disconnect
                } else {
                    RouteDecision::NoActiveSession
                }
            }
            Classification::Matched(Intent::NeedsAgent) if !human_owned => RouteDecision::Escalate {
                target: AgentRole::HumanChannel,
            },
            Classification::Matched(Intent::NeedsRm) if !human_owned => RouteDecision::Escalate {
                target: AgentRole::RelationshipManager,
            },
            _ if human_owned => RouteDecision::PassThrough,
            _ => RouteDecision::DelegateToContent,
        }
    }
}
