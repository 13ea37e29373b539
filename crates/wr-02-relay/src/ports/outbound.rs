//! # Outbound Ports
//!
//! Per-validator endpoint access used by relay clients.
//!
//! Production: a node RPC client (out of tree)
//! In-process: `LocalSignatureClient` + `ChannelMessageSource`
//! Testing: `MockSignatureClient`

use crate::domain::EndpointError;
use async_trait::async_trait;
use shared_types::{MessageId, SignatureShare, UnsignedMessage};

/// Stream of warp messages accepted on the source chain, as observed by
/// one endpoint (e.g. an accepted-log subscription).
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Next accepted message.
    ///
    /// `Ok(None)` means the source is exhausted. An error means the
    /// subscription is broken and will not recover.
    async fn next_message(&mut self) -> Result<Option<UnsignedMessage>, EndpointError>;
}

/// A validator's signature endpoint.
#[async_trait]
pub trait SignatureClient: Send + Sync {
    /// Fetch the validator's share for `message_id`.
    ///
    /// `Ok(None)` means the validator has no share (yet).
    async fn get_signature(
        &self,
        message_id: &MessageId,
    ) -> Result<Option<SignatureShare>, EndpointError>;
}
