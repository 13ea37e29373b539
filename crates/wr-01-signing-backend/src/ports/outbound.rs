//! # Outbound Ports
//!
//! Dependencies the signing backend needs from its host: a durable message
//! store and a signing key.
//!
//! Production: `RocksDbMessageStore` (feature `rocksdb`) + `BlsWarpSigner`
//! Testing: `InMemoryMessageStore` + doubles in `test_utils`

use shared_crypto::BlsPublicKey;
use shared_types::{ChainId, MessageId, SignatureShare, UnsignedMessage};
use std::sync::Arc;
use thiserror::Error;

/// Errors from the durable message store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// I/O error during read/write.
    #[error("Message store I/O error: {message}")]
    Io { message: String },

    /// The store reports internal corruption.
    #[error("Message store corruption: {message}")]
    Corruption { message: String },
}

/// Durable key-value persistence of raw unsigned messages.
///
/// Keys are the raw 32 `MessageId` bytes; values are the message's
/// canonical encoding with no extra framing. Implementations must tolerate
/// concurrent reads and writes to different keys.
pub trait MessageStore: Send + Sync {
    /// Read the stored bytes for `id`.
    fn get(&self, id: &MessageId) -> Result<Option<Vec<u8>>, StoreError>;

    /// Durably write `bytes` under `id`, replacing any previous value.
    fn put(&self, id: &MessageId, bytes: &[u8]) -> Result<(), StoreError>;

    /// Check if a message is stored.
    fn contains(&self, id: &MessageId) -> Result<bool, StoreError> {
        Ok(self.get(id)?.is_some())
    }
}

impl<T: MessageStore + ?Sized> MessageStore for Arc<T> {
    fn get(&self, id: &MessageId) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get(id)
    }

    fn put(&self, id: &MessageId, bytes: &[u8]) -> Result<(), StoreError> {
        (**self).put(id, bytes)
    }

    fn contains(&self, id: &MessageId) -> Result<bool, StoreError> {
        (**self).contains(id)
    }
}

/// Errors from the signer capability.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignerError {
    /// The signing key is not loaded (e.g. mid-rotation).
    #[error("Signing key unavailable: {0}")]
    KeyUnavailable(String),

    /// The message claims a source chain this validator does not sign for.
    #[error("Wrong source chain: expected {expected:?}, got {actual:?}")]
    WrongSourceChain { expected: ChainId, actual: ChainId },
}

/// The validator's signing key, as seen by the backend.
pub trait WarpSigner: Send + Sync {
    /// Sign the canonical bytes of `message`.
    fn sign(&self, message: &UnsignedMessage) -> Result<SignatureShare, SignerError>;

    /// Public key matching the shares this signer produces.
    fn public_key(&self) -> BlsPublicKey;
}
