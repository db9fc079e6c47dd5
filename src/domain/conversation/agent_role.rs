//! Agent roles and the dispatch state derived from them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// The cooperating agents a conversation can be owned by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    CustomerAgent,
    PolicyAgent,
    #[serde(rename = "contact_center")]
    HumanChannel,
    RelationshipManager,
}

impl AgentRole {
    /// All roles, in declaration order.
    pub const ALL: [AgentRole; 4] = [
        AgentRole::CustomerAgent,
        AgentRole::PolicyAgent,
        AgentRole::HumanChannel,
        AgentRole::RelationshipManager,
    ];

    /// Stable identifier used in storage and on the wire.
    pub fn id(&self) -> &'static str {
        match self {
            AgentRole::CustomerAgent => "customer_agent",
            AgentRole::PolicyAgent => "policy_agent",
            AgentRole::HumanChannel => "contact_center",
            AgentRole::RelationshipManager => "relationship_manager",
        }
    }

    /// Label shown to end users in front of a response.
    pub fn label(&self) -> &'static str {
        match self {
            AgentRole::CustomerAgent => "Customer Service",
            AgentRole::PolicyAgent => "Policy Specialist",
            AgentRole::HumanChannel => "Contact Center",
            AgentRole::RelationshipManager => "Relationship Manager",
        }
    }

    /// True for roles staffed by people rather than automated agents.
    pub fn is_human_staffed(&self) -> bool {
        matches!(self, AgentRole::HumanChannel | AgentRole::RelationshipManager)
    }

    /// The dispatch state a conversation is in while owned by this role.
    pub fn dispatch_state(&self) -> DispatchState {
        if self.is_human_staffed() {
            DispatchState::HumanOwned
        } else {
            DispatchState::Automated
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for AgentRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgentRole::ALL
            .iter()
            .copied()
            .find(|role| role.id() == s.trim())
            .ok_or_else(|| ValidationError::invalid_format("agent_role", format!("unknown role '{}'", s)))
    }
}

/// Routing state of a conversation.
///
/// The router only distinguishes automated handling from human ownership;
/// the finer-grained `AgentRole` is a display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DispatchState {
    /// Automated agents answer; every intent is considered.
    #[default]
    Automated,

    /// A person owns the conversation; only disconnect intents are considered.
    HumanOwned,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_from_str() {
        for role in AgentRole::ALL {
            assert_eq!(role.id().parse::<AgentRole>().unwrap(), role);
        }
    }

    #[test]
    fn unknown_id_is_rejected() {
        assert!("supervisor".parse::<AgentRole>().is_err());
    }

    #[test]
    fn human_staffed_roles_are_human_owned() {
        assert_eq!(AgentRole::HumanChannel.dispatch_state(), DispatchState::HumanOwned);
        assert_eq!(AgentRole::RelationshipManager.dispatch_state(), DispatchState::HumanOwned);
        assert_eq!(AgentRole::CustomerAgent.dispatch_state(), DispatchState::Automated);
        assert_eq!(AgentRole::PolicyAgent.dispatch_state(), DispatchState::Automated);
    }

    #[test]
    fn serializes_with_stable_ids() {
        let json = serde_json::to_string(&AgentRole::HumanChannel).unwrap();
        assert_eq!(json, "\"contact_center\"");
        let role: AgentRole = serde_json::from_str("\"relationship_manager\"").unwrap();
        assert_eq!(role, AgentRole::RelationshipManager);
    }

    #[test]
    fn labels_match_display_names() {
        assert_eq!(AgentRole::CustomerAgent.label(), "Customer Service");
        assert_eq!(AgentRole::HumanChannel.label(), "Contact Center");
    }
}
