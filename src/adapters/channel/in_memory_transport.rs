//! In-memory channel transport for testing.
//!
//! Records every thread and post. Failures can be injected for the next
//! create or send calls to exercise overload and lost-thread handling.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::foundation::ThreadId;
use crate::ports::{ChannelMessageId, ChannelTransport, ThreadPost, TransportError};

/// A thread as seen by the fake channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedThread {
    pub topic: String,
    pub posts: Vec<ThreadPost>,
    pub deleted: bool,
}

#[derive(Debug, Default)]
struct State {
    threads: HashMap<ThreadId, RecordedThread>,
    creation_order: Vec<ThreadId>,
    pending_failures: VecDeque<TransportError>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryTransport {
    state: Arc<RwLock<State>>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next transport call fail with `error`.
    pub async fn fail_next(&self, error: TransportError) {
        self.state.write().await.pending_failures.push_back(error);
    }

    /// Makes the next transport call report overload.
    pub async fn rate_limit_next(&self) {
        self.fail_next(TransportError::RateLimited { retry_after_secs: Some(1) }).await;
    }

    /// Drops a thread as if an operator removed it out of band.
    pub async fn remove_thread(&self, thread_id: &ThreadId) {
        if let Some(thread) = self.state.write().await.threads.get_mut(thread_id) {
            thread.deleted = true;
        }
    }

    pub async fn thread(&self, thread_id: &ThreadId) -> Option<RecordedThread> {
        self.state.read().await.threads.get(thread_id).cloned()
    }

    /// Number of threads ever created, deleted ones included.
    pub async fn threads_created(&self) -> usize {
        self.state.read().await.creation_order.len()
    }

    pub async fn thread_ids(&self) -> Vec<ThreadId> {
        self.state.read().await.creation_order.clone()
    }

    fn take_failure(state: &mut State) -> Result<(), TransportError> {
        match state.pending_failures.pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn live_thread<'a>(state: &'a mut State, thread_id: &ThreadId) -> Result<&'a mut RecordedThread, TransportError> {
        state
            .threads
            .get_mut(thread_id)
            .filter(|thread| !thread.deleted)
            .ok_or_else(|| TransportError::ThreadNotFound(thread_id.clone()))
    }
}

#[async_trait]
impl ChannelTransport for InMemoryTransport {
    async fn create_thread(&self, topic: &str, seed: &[ThreadPost]) -> Result<ThreadId, TransportError> {
        let mut state = self.state.write().await;
        Self::take_failure(&mut state)?;

        let thread_id = ThreadId::new(format!("19:{}@thread.v2", Uuid::new_v4().simple()))
            .map_err(|e| TransportError::Protocol(e.to_string()))?;
        state.threads.insert(
            thread_id.clone(),
            RecordedThread {
                topic: topic.to_string(),
                posts: seed.to_vec(),
                deleted: false,
            },
        );
        state.creation_order.push(thread_id.clone());
        Ok(thread_id)
    }

    async fn send_message(
        &self,
        thread_id: &ThreadId,
        sender_label: &str,
        text: &str,
    ) -> Result<ChannelMessageId, TransportError> {
        let mut state = self.state.write().await;
        Self::take_failure(&mut state)?;

        let thread = Self::live_thread(&mut state, thread_id)?;
        thread.posts.push(ThreadPost::new(sender_label, text));
        Ok(ChannelMessageId(Uuid::new_v4().to_string()))
    }

    async fn delete_thread(&self, thread_id: &ThreadId) -> Result<(), TransportError> {
        let mut state = self.state.write().await;
        Self::take_failure(&mut state)?;

        Self::live_thread(&mut state, thread_id)?.deleted = true;
        Ok(())
    }
}
