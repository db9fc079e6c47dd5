//! Application layer - use cases over the domain and ports.
//!
//! - `ConversationOrchestrator` - one turn per inbound message, plus the
//!   operator-side and administrative escalation operations
//! - `EscalationLedger` - sole owner of escalation records and the external
//!   threads behind them
//! - `IdentityLocks` - per-key serialization shared by both

mod escalation_ledger;
mod identity_locks;
mod orchestrator;

pub use escalation_ledger::{
    EscalationHandle, EscalationLedger, EscalationRequest, LedgerError, DEFAULT_SEED_WINDOW,
};
pub use identity_locks::IdentityLocks;
pub use orchestrator::{
    ContentAgents, ConversationOrchestrator, OrchestratorConfig, OrchestratorError, RelayedMessage, TurnOutcome,
    UNKNOWN_CUSTOMER_NAME,
};
