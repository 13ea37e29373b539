//! # Adapters
//!
//! Concrete implementations of the outbound ports.

pub mod memory;
#[cfg(feature = "rocksdb")]
pub mod rocksdb;
pub mod signer;

pub use memory::InMemoryMessageStore;
#[cfg(feature = "rocksdb")]
pub use self::rocksdb::{RocksDbConfig, RocksDbMessageStore, CF_WARP_MESSAGES};
pub use signer::BlsWarpSigner;
