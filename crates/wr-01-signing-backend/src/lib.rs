//! # WR-01 Warp Signing Backend
//!
//! Per-validator service that tracks which warp messages it agreed to sign
//! and serves its BLS signature share for them.
//!
//! **Subsystem ID:** 1
//! **Architecture:** Hexagonal (Ports/Adapters)
//!
//! ## Two-Tier Storage
//!
//! | Tier | Type | Contract |
//! |------|------|----------|
//! | Durable | `MessageStore` | raw unsigned-message bytes keyed by `MessageId`; survives restarts |
//! | Volatile | `SignatureCache` | LRU `MessageId → SignatureShare`; always reproducible from store + signer |
//!
//! A message is persisted before it is signed or cached, so any share the
//! backend ever served can be re-derived after a restart or key rotation.
//!
//! ## Module Structure
//!
//! ```text
//! wr-01-signing-backend/
//! ├── domain/      # BackendError, SignatureCache
//! ├── ports/       # WarpBackend (inbound), MessageStore + WarpSigner (outbound)
//! ├── adapters/    # in-memory store, RocksDB store, BLS signer
//! └── service.rs   # SigningBackend, NoopBackend
//! ```

#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;
pub mod test_utils;

// Re-exports
pub use adapters::{BlsWarpSigner, InMemoryMessageStore};
#[cfg(feature = "rocksdb")]
pub use adapters::{RocksDbConfig, RocksDbMessageStore};
pub use domain::{BackendError, CacheStats, SignatureCache, DEFAULT_SIGNATURE_CACHE_SIZE};
pub use ports::{MessageStore, SignerError, StoreError, WarpBackend, WarpSigner};
pub use service::{NoopBackend, SigningBackend};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
