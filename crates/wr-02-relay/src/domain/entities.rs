//! # Relay Entities
//!
//! Values flowing between relay clients, the aggregator and consumers.

use crate::domain::errors::{AggregationError, EndpointError};
use bitvec::prelude::*;
use shared_types::{AggregateSignature, MessageId, SignatureShare, ValidatorIndex};

/// One bit per validator index; set when that validator's share is part of
/// the aggregate.
pub type SignerBitmap = BitVec<u8, Msb0>;

/// A validator's share for one message, as delivered to the aggregator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShareEvent {
    pub message_id: MessageId,
    pub validator: ValidatorIndex,
    pub share: SignatureShare,
}

/// Quorum-signed message, emitted at most once per `MessageId`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedMessage {
    pub message_id: MessageId,
    pub signature: AggregateSignature,
    pub signers: SignerBitmap,
}

impl SignedMessage {
    /// Indices of the validators whose shares were combined.
    pub fn signer_indices(&self) -> Vec<ValidatorIndex> {
        self.signers
            .iter_ones()
            .map(|i| ValidatorIndex(i as u32))
            .collect()
    }

    pub fn signer_count(&self) -> usize {
        self.signers.count_ones()
    }
}

/// A message still below threshold when the session ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectingMessage {
    pub message_id: MessageId,
    pub share_count: usize,
    pub validators: Vec<ValidatorIndex>,
}

/// A message whose shares could not be combined.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FailedMessage {
    pub message_id: MessageId,
    pub reason: AggregationError,
}

/// Final state of every message the aggregator saw.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionReport {
    /// Completed messages in emission order.
    pub completed: Vec<MessageId>,
    /// Messages below threshold, sorted by ID.
    pub collecting: Vec<CollectingMessage>,
    /// Messages that failed to combine, sorted by ID.
    pub failed: Vec<FailedMessage>,
}

impl SessionReport {
    pub fn is_complete(&self) -> bool {
        self.collecting.is_empty() && self.failed.is_empty()
    }
}

/// Error observed by one relay client, tagged with its validator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientError {
    pub validator: ValidatorIndex,
    pub error: EndpointError,
}

/// Why a relay client stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClientExit {
    /// The session was cancelled.
    Cancelled,
    /// The message source has no more messages.
    SourceExhausted,
    /// The message source failed.
    SourceFailed,
    /// The aggregator no longer accepts shares.
    ChannelClosed,
}

/// Per-client result returned when a relay client stops.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientSummary {
    pub validator: ValidatorIndex,
    pub shares_forwarded: usize,
    pub errors_reported: usize,
    pub exit: ClientExit,
}

/// A signed message bound to a delivery worker's transaction slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundDelivery {
    pub worker: usize,
    pub nonce: u64,
    pub message_id: MessageId,
    pub signature: AggregateSignature,
    pub signers: SignerBitmap,
}
