//! # Ports
//!
//! The relay only has outbound dependencies: where accepted messages come
//! from and how a validator's share is fetched.

pub mod outbound;

pub use outbound::{MessageSource, SignatureClient};
