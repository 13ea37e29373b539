//! # Domain Layer
//!
//! Backend errors and the volatile signature cache. No I/O.

pub mod cache;
pub mod errors;

pub use cache::{CacheStats, SignatureCache, DEFAULT_SIGNATURE_CACHE_SIZE};
pub use errors::BackendError;
