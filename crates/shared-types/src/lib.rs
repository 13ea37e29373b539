//! # Shared Types Crate
//!
//! Types shared by the signing backend (wr-01) and the relay (wr-02).
//!
//! ## Design Principles
//!
//! - **Single identity key**: a message is identified everywhere by its
//!   `MessageId`, the SHA-256 of its canonical encoding. No component
//!   derives it any other way.
//! - **Opaque signatures**: shares and aggregates travel as raw compressed
//!   bytes; only `shared-crypto` interprets them as curve points.

pub mod entities;
pub mod errors;
pub mod message;

pub use entities::*;
pub use errors::DecodeError;
pub use message::{UnsignedMessage, CODEC_VERSION, MAX_PAYLOAD_SIZE};
