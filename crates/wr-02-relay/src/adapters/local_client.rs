//! # Local Signature Client
//!
//! `SignatureClient` that calls a validator's `WarpBackend` in-process.

use crate::domain::EndpointError;
use crate::ports::outbound::SignatureClient;
use async_trait::async_trait;
use shared_types::{MessageId, SignatureShare};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use wr_01_signing_backend::{BackendError, WarpBackend};

/// Direct handle on a validator's signing backend.
///
/// The endpoint can be switched offline to simulate a validator dropping
/// out of the network.
pub struct LocalSignatureClient {
    backend: Arc<dyn WarpBackend>,
    reachable: AtomicBool,
}

impl LocalSignatureClient {
    pub fn new(backend: Arc<dyn WarpBackend>) -> Self {
        Self {
            backend,
            reachable: AtomicBool::new(true),
        }
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    pub fn is_reachable(&self) -> bool {
        self.reachable.load(Ordering::SeqCst)
    }
}

/// Map a backend failure onto the endpoint taxonomy.
///
/// `NotFound` is retryable: the validator may not have accepted the block
/// carrying the message yet.
pub fn endpoint_error(error: BackendError) -> EndpointError {
    let (id, retryable) = match &error {
        BackendError::NotFound(id) => (*id, true),
        BackendError::Store { id, .. } | BackendError::Signing { id, .. } => {
            (*id, error.is_retryable())
        }
        BackendError::Decode { id, .. } => (*id, false),
    };
    EndpointError::Backend {
        id,
        message: error.to_string(),
        retryable,
    }
}

#[async_trait]
impl SignatureClient for LocalSignatureClient {
    async fn get_signature(
        &self,
        message_id: &MessageId,
    ) -> Result<Option<SignatureShare>, EndpointError> {
        if !self.is_reachable() {
            return Err(EndpointError::Unreachable("validator endpoint offline".into()));
        }
        self.backend.get_signature(message_id).map_err(endpoint_error)
    }
}
