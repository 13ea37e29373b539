//! # Inbound Ports
//!
//! API the precompile layer and relay clients call.

use crate::domain::BackendError;
use shared_types::{MessageId, SignatureShare, UnsignedMessage};

/// Warp signing backend - inbound port.
///
/// Tracks signature-eligible warp messages and serves this validator's
/// signature share for them. Implementations must be safe to call from many
/// tasks at once.
///
/// Calls are synchronous and carry no gas accounting; both are the caller's
/// concern.
pub trait WarpBackend: Send + Sync {
    /// Persist `message`, sign it and cache the share.
    ///
    /// # Errors
    /// * `BackendError::Store` - persistence failed; nothing was signed
    /// * `BackendError::Signing` - signer failed; the message stays persisted
    fn add_message(&self, message: &UnsignedMessage) -> Result<(), BackendError>;

    /// Return this validator's share for `message_id`.
    ///
    /// `Ok(None)` is only returned by backends that do not sign at all.
    ///
    /// # Errors
    /// * `BackendError::NotFound` - the message was never added
    /// * `BackendError::Decode` - stored bytes are corrupt
    /// * `BackendError::Signing` - signer failed
    /// * `BackendError::Store` - the store read failed
    fn get_signature(&self, message_id: &MessageId)
        -> Result<Option<SignatureShare>, BackendError>;
}
