//! Test doubles for relay clients and sessions.

use crate::domain::EndpointError;
use crate::ports::outbound::SignatureClient;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{MessageId, SignatureShare};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};

/// Scripted `SignatureClient`.
///
/// Unknown messages answer `Ok(None)`. The first `pending_polls` calls
/// answer `Ok(None)` regardless, to exercise re-polling.
#[derive(Default)]
pub struct MockSignatureClient {
    shares: RwLock<HashMap<MessageId, SignatureShare>>,
    errors: RwLock<HashMap<MessageId, EndpointError>>,
    unreachable: AtomicBool,
    pending_polls: AtomicU32,
    calls: AtomicUsize,
}

impl MockSignatureClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: MessageId, share: SignatureShare) {
        self.shares.write().insert(id, share);
    }

    /// Answer requests for `id` with `error`.
    pub fn fail_message(&self, id: MessageId, error: EndpointError) {
        self.errors.write().insert(id, error);
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    pub fn set_pending_polls(&self, polls: u32) {
        self.pending_polls.store(polls, Ordering::SeqCst);
    }

    /// Number of `get_signature` calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SignatureClient for MockSignatureClient {
    async fn get_signature(
        &self,
        message_id: &MessageId,
    ) -> Result<Option<SignatureShare>, EndpointError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.unreachable.load(Ordering::SeqCst) {
            return Err(EndpointError::Unreachable("mock endpoint offline".into()));
        }
        if let Some(error) = self.errors.read().get(message_id) {
            return Err(error.clone());
        }
        let pending = self
            .pending_polls
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if pending.is_ok() {
            return Ok(None);
        }
        Ok(self.shares.read().get(message_id).copied())
    }
}
