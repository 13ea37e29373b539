//! # Shared Crypto - BLS Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `bls` | BLS12-381 (`min_pk`) | Warp signature shares and quorum aggregation |
//!
//! ## Security Properties
//!
//! - **Proof-of-possession DST**: signatures use the Ethereum 2.0 / Avalanche
//!   ciphersuite, so aggregates over one message are safe against rogue keys
//!   once possession is proven at registration.
//! - **Group checks**: every signature is subgroup-checked before it is
//!   aggregated or verified.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bls;
pub mod errors;

// Re-exports
pub use bls::{BlsKeyPair, BlsPublicKey, BlsSignature};
pub use errors::CryptoError;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
