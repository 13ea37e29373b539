//! # Error Types
//!
//! Errors raised while decoding warp message bytes.

use crate::entities::MessageId;
use thiserror::Error;

/// Malformed or inconsistent unsigned-message bytes.
///
/// Always signals corruption or a format mismatch. Callers surface it; a
/// message that fails to decode is never replaced with a default.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// Input ended before a field could be read.
    #[error("Truncated message: needed {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },

    /// Codec version prefix is not one we understand.
    #[error("Unsupported codec version: {0}")]
    UnsupportedCodecVersion(u16),

    /// Payload exceeds `MAX_PAYLOAD_SIZE`.
    #[error("Payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// Bytes left over after the payload.
    #[error("{0} trailing bytes after payload")]
    TrailingBytes(usize),

    /// Bytes decoded fine but hash to a different identifier than the one
    /// they were stored under.
    #[error("Message ID mismatch: expected {expected}, computed {actual}")]
    IdMismatch {
        expected: MessageId,
        actual: MessageId,
    },
}
