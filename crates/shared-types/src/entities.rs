//! # Core Domain Entities
//!
//! Identifiers and signature byte types for warp messaging.
//!
//! ## Clusters
//!
//! - **Identity**: `MessageId`, `ChainId`, `ValidatorIndex`
//! - **Signatures**: `SignatureShare`, `AggregateSignature`

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use sha2::{Digest, Sha256};
use std::fmt;

/// A 32-byte SHA-256 hash.
pub type Hash = [u8; 32];

/// Length of a compressed BLS12-381 G2 signature (`min_pk` variant).
pub const SIGNATURE_LEN: usize = 96;

/// Length of a compressed BLS12-381 G1 public key (`min_pk` variant).
pub const PUBLIC_KEY_LEN: usize = 48;

// =============================================================================
// IDENTITY
// =============================================================================

/// Identifier of an unsigned warp message.
///
/// Always the SHA-256 of the message's canonical encoding, see
/// [`MessageId::compute`]. Used as the key in the message store, the
/// signature cache and the relay's aggregation arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(Hash);

impl MessageId {
    /// Hash canonical message bytes into an identifier.
    pub fn compute(message_bytes: &[u8]) -> Self {
        let digest = Sha256::digest(message_bytes);
        let mut id = [0u8; 32];
        id.copy_from_slice(&digest);
        Self(id)
    }

    /// Wrap raw identifier bytes (e.g. a key read back from the store).
    pub const fn from_bytes(bytes: Hash) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &Hash {
        &self.0
    }

    /// Short hex prefix for log lines.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageId({})", self.short())
    }
}

/// Identifier of a chain (blockchain) within the platform.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ChainId(pub Hash);

impl fmt::Debug for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChainId({})", hex::encode(&self.0[..4]))
    }
}

/// Position of a validator in the externally supplied validator ordering.
///
/// The relay deduplicates shares by this index, so the mapping between an
/// endpoint and its index must not change during a relay session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ValidatorIndex(pub u32);

impl ValidatorIndex {
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ValidatorIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ValidatorIndex {
    fn from(index: u32) -> Self {
        Self(index)
    }
}

// =============================================================================
// SIGNATURES
// =============================================================================

/// One validator's BLS signature over a message (G2 point, compressed).
///
/// Kept as raw bytes: a share is only parsed when the relay combines it,
/// so a corrupt share affects just the message it belongs to.
#[serde_as]
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureShare {
    #[serde_as(as = "Bytes")]
    bytes: [u8; SIGNATURE_LEN],
}

impl SignatureShare {
    pub const fn new(bytes: [u8; SIGNATURE_LEN]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.bytes
    }
}

impl fmt::Debug for SignatureShare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignatureShare({}..)", hex::encode(&self.bytes[..6]))
    }
}

/// Threshold-combined signature over a message (G2 point, compressed).
#[serde_as]
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateSignature {
    #[serde_as(as = "Bytes")]
    bytes: [u8; SIGNATURE_LEN],
}

impl AggregateSignature {
    pub const fn new(bytes: [u8; SIGNATURE_LEN]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.bytes
    }
}

impl fmt::Debug for AggregateSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AggregateSignature({}..)", hex::encode(&self.bytes[..6]))
    }
}
