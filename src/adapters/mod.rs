//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the routing core to external systems:
//! - `ai` - Language-model and deterministic classifiers, summarizers, content agents
//! - `channel` - Hand-off thread transport (HTTP chat service, in-memory)
//! - `customers` - Customer directory (JSON file, in-memory)
//! - `storage` - Conversation state and escalation records
//! - `http` - REST API

pub mod ai;
pub mod channel;
pub mod customers;
pub mod http;
pub mod storage;
