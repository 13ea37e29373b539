//! # Relay Errors

use shared_crypto::CryptoError;
use shared_types::{MessageId, ValidatorIndex};
use thiserror::Error;

/// A validator endpoint could not serve a request.
///
/// Confined to the client that observed it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EndpointError {
    /// The endpoint cannot be reached at all.
    #[error("Endpoint unreachable: {0}")]
    Unreachable(String),

    /// The validator's backend answered with an error.
    #[error("Backend error for message {id}: {message}")]
    Backend {
        id: MessageId,
        message: String,
        retryable: bool,
    },

    /// Polling gave up before the validator produced a share.
    #[error("Signature for message {id} unavailable after {attempts} attempts")]
    SignatureUnavailable { id: MessageId, attempts: u32 },

    /// The accepted-message subscription failed.
    #[error("Message source failed: {0}")]
    SourceFailed(String),
}

impl EndpointError {
    /// Whether re-polling the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            EndpointError::Unreachable(_) => true,
            EndpointError::Backend { retryable, .. } => *retryable,
            EndpointError::SignatureUnavailable { .. } | EndpointError::SourceFailed(_) => false,
        }
    }
}

/// Combining the shares of one message failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AggregationError {
    #[error("Share from validator {validator} is malformed: {source}")]
    MalformedShare {
        validator: ValidatorIndex,
        #[source]
        source: CryptoError,
    },

    #[error("Failed to aggregate shares: {0}")]
    Combine(#[source] CryptoError),

    #[error("No shares to aggregate")]
    NoShares,
}

/// Invalid relay configuration or a relay task that died.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RelayError {
    #[error("Threshold must be at least 1")]
    ZeroThreshold,

    #[error("Threshold {threshold} exceeds validator count {validators}")]
    ThresholdTooHigh { threshold: usize, validators: usize },

    #[error("Relay session needs at least one endpoint")]
    NoEndpoints,

    #[error("Validator {validator} is outside the validator set of {validators}")]
    EndpointOutOfSet {
        validator: ValidatorIndex,
        validators: usize,
    },

    #[error("Delivery needs at least one worker")]
    NoWorkers,

    #[error("Expected {workers} starting nonces, got {nonces}")]
    NonceCountMismatch { workers: usize, nonces: usize },

    #[error("Relay task failed: {0}")]
    TaskFailed(String),
}
