//! Intent catalogue and classification labels.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::conversation::DispatchState;

/// Label a classifier returns when nothing in the offered set matches.
pub const GENERAL_QUERY: &str = "general_query";

/// Intents that can drive a routing decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    WantsDisconnect,
    ConfirmsDisconnect,
    NeedsAgent,
    NeedsRm,
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::WantsDisconnect => "wants_disconnect",
            Intent::ConfirmsDisconnect => "confirms_disconnect",
            Intent::NeedsAgent => "needs_agent",
            Intent::NeedsRm => "needs_rm",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Intent::WantsDisconnect => "User wants to end the conversation",
            Intent::ConfirmsDisconnect => "User confirms they want to end chat (after being asked)",
            Intent::NeedsAgent => "User needs human agent for complex/urgent issues",
            Intent::NeedsRm => "User needs relationship manager for complex financial queries",
        }
    }

    /// Example phrases offered to the classifier.
    pub fn examples(&self) -> &'static [&'static str] {
        match self {
            Intent::WantsDisconnect => &["bye", "disconnect", "end chat", "goodbye"],
            Intent::ConfirmsDisconnect => {
                &["no thanks", "that's all", "no further questions", "no", "I'm good"]
            }
            Intent::NeedsAgent => &["speak to agent", "urgent assistance", "complaint", "talk to human"],
            Intent::NeedsRm => &["portfolio review", "investment strategy", "financial planning"],
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Outcome of classifying a message against an intent set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    Matched(Intent),
    /// The classifier returned the sentinel or a label outside the offered set.
    NoMatch,
}

impl Classification {
    pub fn intent(&self) -> Option<Intent> {
        match self {
            Classification::Matched(intent) => Some(*intent),
            Classification::NoMatch => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Classification::Matched(intent) => intent.name(),
            Classification::NoMatch => GENERAL_QUERY,
        }
    }
}

/// A named, ordered set of intents offered to a classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentSet {
    intents: Vec<Intent>,
}

impl IntentSet {
    pub fn new(intents: impl IntoIterator<Item = Intent>) -> Self {
        let mut unique = Vec::new();
        for intent in intents {
            if !unique.contains(&intent) {
                unique.push(intent);
            }
        }
        Self { intents: unique }
    }

    pub fn intents(&self) -> &[Intent] {
        &self.intents
    }

    pub fn contains(&self, intent: Intent) -> bool {
        self.intents.contains(&intent)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.intents.iter().map(Intent::name).collect()
    }

    /// `name -> examples` map in the shape classifier prompts render.
    pub fn examples_by_name(&self) -> BTreeMap<&'static str, Vec<&'static str>> {
        self.intents
            .iter()
            .map(|intent| (intent.name(), intent.examples().to_vec()))
            .collect()
    }

    /// Maps a raw classifier label onto this set.
    ///
    /// Labels are compared case-insensitively after stripping whitespace and
    /// surrounding quotes or punctuation. Anything not in the set, including
    /// the sentinel, is `NoMatch`.
    pub fn resolve(&self, raw_label: &str) -> Classification {
        let label = normalize_label(raw_label);
        self.intents
            .iter()
            .copied()
            .find(|intent| intent.name() == label)
            .map(Classification::Matched)
            .unwrap_or(Classification::NoMatch)
    }
}

fn normalize_label(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '`' || c == '.' || c.is_whitespace())
        .to_lowercase()
}

/// Intents considered while a person owns the conversation.
pub static DISCONNECT_INTENTS: Lazy<IntentSet> =
    Lazy::new(|| IntentSet::new([Intent::WantsDisconnect, Intent::ConfirmsDisconnect]));

/// Intents considered while automated agents own the conversation.
pub static ALL_INTENTS: Lazy<IntentSet> = Lazy::new(|| {
    IntentSet::new([
        Intent::WantsDisconnect,
        Intent::ConfirmsDisconnect,
        Intent::NeedsAgent,
        Intent::NeedsRm,
    ])
});

/// Which intent set applies in a given dispatch state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentScope {
    DisconnectOnly,
    Full,
}

impl IntentScope {
    pub fn for_dispatch(dispatch: DispatchState) -> Self {
        match dispatch {
            DispatchState::HumanOwned => IntentScope::DisconnectOnly,
            DispatchState::Automated => IntentScope::Full,
        }
    }

    pub fn intents(&self) -> &'static IntentSet {
        match self {
            IntentScope::DisconnectOnly => &DISCONNECT_INTENTS,
            IntentScope::Full => &ALL_INTENTS,
        }
    }
}
