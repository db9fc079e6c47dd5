//! Channel transport adapters.
//!
//! - `HttpChatTransport` - chat-thread REST service with refreshed bearer credentials
//! - `InMemoryTransport` - recording fake with failure injection

mod http_chat_transport;
mod in_memory_transport;

pub use http_chat_transport::{ChannelCredential, ChatTransportConfig, HttpChatTransport};
pub use in_memory_transport::{InMemoryTransport, RecordedThread};
