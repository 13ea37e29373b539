//! # Signing Backend Service
//!
//! Application service implementing `WarpBackend` on top of a durable
//! `MessageStore`, a `WarpSigner` and the volatile `SignatureCache`.
//!
//! ## Write Path (`add_message`)
//!
//! 1. Persist canonical bytes under the message ID
//! 2. Sign
//! 3. Cache the share
//!
//! ## Read Path (`get_signature`)
//!
//! Cache hit returns immediately. On a miss the message is loaded, parsed,
//! checked against the requested ID, re-signed and cached again.

use crate::domain::{BackendError, CacheStats, SignatureCache};
use crate::ports::inbound::WarpBackend;
use crate::ports::outbound::{MessageStore, WarpSigner};
use shared_types::{DecodeError, MessageId, SignatureShare, UnsignedMessage};
use tracing::{debug, warn};

/// Warp signing backend of a single validator.
pub struct SigningBackend<S: MessageStore, K: WarpSigner> {
    store: S,
    signer: K,
    cache: SignatureCache,
}

impl<S: MessageStore, K: WarpSigner> SigningBackend<S, K> {
    /// Create a backend with an empty signature cache of `cache_size` entries.
    pub fn new(store: S, signer: K, cache_size: usize) -> Self {
        Self {
            store,
            signer,
            cache: SignatureCache::new(cache_size),
        }
    }

    /// Drop every cached share. Subsequent reads re-sign from the store.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn signer(&self) -> &K {
        &self.signer
    }

    fn sign(&self, message: &UnsignedMessage) -> Result<SignatureShare, BackendError> {
        self.signer
            .sign(message)
            .map_err(|source| BackendError::Signing {
                id: message.id(),
                source,
            })
    }

    fn load(&self, id: &MessageId) -> Result<UnsignedMessage, BackendError> {
        let bytes = self
            .store
            .get(id)
            .map_err(|source| BackendError::Store { id: *id, source })?
            .ok_or(BackendError::NotFound(*id))?;

        let message =
            UnsignedMessage::parse(&bytes).map_err(|source| BackendError::Decode { id: *id, source })?;

        if message.id() != *id {
            return Err(BackendError::Decode {
                id: *id,
                source: DecodeError::IdMismatch {
                    expected: *id,
                    actual: message.id(),
                },
            });
        }
        Ok(message)
    }
}

impl<S: MessageStore, K: WarpSigner> WarpBackend for SigningBackend<S, K> {
    fn add_message(&self, message: &UnsignedMessage) -> Result<(), BackendError> {
        let id = message.id();

        self.store
            .put(&id, message.bytes())
            .map_err(|source| BackendError::Store { id, source })?;

        let share = self.sign(message).inspect_err(|e| {
            warn!(message_id = %id, error = %e, "[wr-01] Signing failed, message kept for lazy retry");
        })?;
        self.cache.put(id, share);

        debug!(
            message_id = %id,
            payload_len = message.payload().len(),
            "[wr-01] Added warp message"
        );
        Ok(())
    }

    fn get_signature(
        &self,
        message_id: &MessageId,
    ) -> Result<Option<SignatureShare>, BackendError> {
        if let Some(share) = self.cache.get(message_id) {
            return Ok(Some(share));
        }

        let message = self.load(message_id).inspect_err(|e| {
            if !matches!(e, BackendError::NotFound(_)) {
                warn!(message_id = %message_id, error = %e, "[wr-01] Failed to load warp message");
            }
        })?;
        let share = self.sign(&message)?;
        self.cache.put(*message_id, share);

        debug!(message_id = %message_id, "[wr-01] Re-signed warp message on cache miss");
        Ok(Some(share))
    }
}

/// Backend for nodes with warp signing administratively disabled.
///
/// Accepts every message and never returns a share.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopBackend;

impl WarpBackend for NoopBackend {
    fn add_message(&self, _message: &UnsignedMessage) -> Result<(), BackendError> {
        Ok(())
    }

    fn get_signature(
        &self,
        _message_id: &MessageId,
    ) -> Result<Option<SignatureShare>, BackendError> {
        Ok(None)
    }
}
