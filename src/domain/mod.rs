//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (identifiers, timestamps, errors)
//! - `conversation` - Per-user history, owning agent and dispatch state
//! - `routing` - Intent catalogue and the ownership state machine
//! - `escalation` - Hand-off records and their lifecycle
//! - `customer` - Customer reference data

pub mod conversation;
pub mod customer;
pub mod escalation;
pub mod foundation;
pub mod routing;
