//! Routing domain module.
//!
//! The intent catalogue, the ownership state machine and the reply texts
//! its decisions produce.

mod intents;
pub mod replies;
mod router;

pub use intents::{
    Classification, Intent, IntentScope, IntentSet, ALL_INTENTS, DISCONNECT_INTENTS, GENERAL_QUERY,
};
pub use router::{AgentRouter, RouteDecision, RouteInput};
