//! # Unsigned Warp Message
//!
//! Canonical encoding (big-endian):
//!
//! ```text
//! ┌──────────┬─────────────────┬──────────────────────┬────────────┬─────────┐
//! │ version  │ source chain ID │ destination chain ID │ payload len│ payload │
//! │ u16 (2)  │      32         │         32           │  u32 (4)   │    n    │
//! └──────────┴─────────────────┴──────────────────────┴────────────┴─────────┘
//! ```
//!
//! The message store persists exactly these bytes, and the `MessageId` is
//! the SHA-256 over them.

use crate::entities::{ChainId, MessageId};
use crate::errors::DecodeError;

/// Only codec version currently understood.
pub const CODEC_VERSION: u16 = 0;

/// Largest accepted payload (256 KiB).
pub const MAX_PAYLOAD_SIZE: usize = 256 * 1024;

const HEADER_LEN: usize = 2 + 32 + 32 + 4;

/// An application message awaiting validator attestation.
///
/// Immutable once built; the canonical bytes and identifier are computed
/// at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnsignedMessage {
    source_chain_id: ChainId,
    destination_chain_id: ChainId,
    payload: Vec<u8>,
    bytes: Vec<u8>,
    id: MessageId,
}

impl UnsignedMessage {
    /// Build a message.
    ///
    /// # Errors
    /// * `PayloadTooLarge` if the payload exceeds [`MAX_PAYLOAD_SIZE`]
    pub fn new(
        source_chain_id: ChainId,
        destination_chain_id: ChainId,
        payload: Vec<u8>,
    ) -> Result<Self, DecodeError> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(DecodeError::PayloadTooLarge {
                size: payload.len(),
                max: MAX_PAYLOAD_SIZE,
            });
        }

        let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
        bytes.extend_from_slice(&CODEC_VERSION.to_be_bytes());
        bytes.extend_from_slice(&source_chain_id.0);
        bytes.extend_from_slice(&destination_chain_id.0);
        bytes.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&payload);
        let id = MessageId::compute(&bytes);

        Ok(Self {
            source_chain_id,
            destination_chain_id,
            payload,
            bytes,
            id,
        })
    }

    /// Parse canonical bytes.
    ///
    /// # Errors
    /// * `Truncated` / `TrailingBytes` on length mismatches
    /// * `UnsupportedCodecVersion` on an unknown version prefix
    /// * `PayloadTooLarge` if the declared payload exceeds the limit
    pub fn parse(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = Reader::new(bytes);

        let version = u16::from_be_bytes(reader.take_array()?);
        if version != CODEC_VERSION {
            return Err(DecodeError::UnsupportedCodecVersion(version));
        }

        let source_chain_id = ChainId(reader.take_array()?);
        let destination_chain_id = ChainId(reader.take_array()?);

        let payload_len = u32::from_be_bytes(reader.take_array()?) as usize;
        if payload_len > MAX_PAYLOAD_SIZE {
            return Err(DecodeError::PayloadTooLarge {
                size: payload_len,
                max: MAX_PAYLOAD_SIZE,
            });
        }
        let payload = reader.take(payload_len)?.to_vec();

        let remaining = reader.remaining();
        if remaining != 0 {
            return Err(DecodeError::TrailingBytes(remaining));
        }

        Ok(Self {
            source_chain_id,
            destination_chain_id,
            payload,
            bytes: bytes.to_vec(),
            id: MessageId::compute(bytes),
        })
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    /// Canonical encoding; this is what validators sign.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn source_chain_id(&self) -> ChainId {
        self.source_chain_id
    }

    pub fn destination_chain_id(&self) -> ChainId {
        self.destination_chain_id
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

/// Cursor over an input slice that reports how much was missing.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let available = self.remaining();
        if available < len {
            return Err(DecodeError::Truncated {
                needed: len,
                available,
            });
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}
