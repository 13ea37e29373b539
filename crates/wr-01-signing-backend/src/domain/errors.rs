//! # Domain Errors
//!
//! Error taxonomy of the signing backend.

use crate::ports::{SignerError, StoreError};
use shared_types::{DecodeError, MessageId};
use thiserror::Error;

/// Errors returned by `WarpBackend` operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// Durable persistence failed. Retried by the external caller.
    #[error("Failed to access warp message {id} in store: {source}")]
    Store {
        /// Message being stored or loaded
        id: MessageId,
        /// Underlying store failure
        #[source]
        source: StoreError,
    },

    /// The signer capability failed. Retryable.
    #[error("Failed to sign warp message {id}: {source}")]
    Signing {
        /// Message being signed
        id: MessageId,
        /// Underlying signer failure
        #[source]
        source: SignerError,
    },

    /// The message was never added.
    #[error("Warp message {0} not found")]
    NotFound(MessageId),

    /// Stored bytes are malformed or belong to another message.
    #[error("Failed to parse stored warp message {id}: {source}")]
    Decode {
        /// Message being loaded
        id: MessageId,
        /// Decoder failure
        #[source]
        source: DecodeError,
    },
}

impl BackendError {
    /// Whether retrying the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BackendError::Store { .. } | BackendError::Signing { .. })
    }
}
