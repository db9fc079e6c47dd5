//! Agent Handoff - conversation routing and human hand-off
//!
//! Routes each inbound message of a per-user conversation between automated
//! agents and human-staffed channels, and manages the lifecycle of the
//! escalation threads human operators answer in.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
