//! # RocksDB Message Store
//!
//! Durable `MessageStore` for validator nodes.
//!
//! All warp messages live in a single column family, keyed by the raw
//! 32-byte `MessageId`, with the canonical message bytes as value. Writes
//! are fsynced by default so an acknowledged `add_message` survives a crash.

use crate::ports::outbound::{MessageStore, StoreError};
use rocksdb::{ColumnFamilyDescriptor, Options, WriteOptions, DB};
use shared_types::MessageId;
use std::path::PathBuf;

/// Column family holding unsigned warp messages.
pub const CF_WARP_MESSAGES: &str = "warp_messages";

/// RocksDB configuration
#[derive(Debug, Clone)]
pub struct RocksDbConfig {
    /// Path to the database directory
    pub path: PathBuf,
    /// Block cache size in bytes (default: 64MB)
    pub block_cache_size: usize,
    /// Write buffer size in bytes (default: 16MB)
    pub write_buffer_size: usize,
    /// Enable fsync after each write (default: true for durability)
    pub sync_writes: bool,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/warp"),
            block_cache_size: 64 * 1024 * 1024,  // 64MB
            write_buffer_size: 16 * 1024 * 1024, // 16MB
            sync_writes: true,
        }
    }
}

impl RocksDbConfig {
    /// Create config for testing (smaller buffers, no sync)
    pub fn for_testing(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            block_cache_size: 4 * 1024 * 1024,
            write_buffer_size: 1024 * 1024,
            sync_writes: false,
        }
    }
}

/// RocksDB-backed message store.
pub struct RocksDbMessageStore {
    db: DB,
    config: RocksDbConfig,
}

impl RocksDbMessageStore {
    /// Open or create the database.
    pub fn open(config: RocksDbConfig) -> Result<Self, StoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_compression_type(rocksdb::DBCompressionType::Snappy);

        // Point lookups only, bloom filter pays off
        let mut block_opts = rocksdb::BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false);
        block_opts.set_block_cache(&rocksdb::Cache::new_lru_cache(config.block_cache_size));
        opts.set_block_based_table_factory(&block_opts);

        let mut cf_opts = Options::default();
        cf_opts.set_compression_type(rocksdb::DBCompressionType::Snappy);
        let cf = ColumnFamilyDescriptor::new(CF_WARP_MESSAGES, cf_opts);

        let db = DB::open_cf_descriptors(&opts, &config.path, vec![cf]).map_err(|e| {
            StoreError::Io {
                message: format!("Failed to open RocksDB: {}", e),
            }
        })?;

        tracing::info!(
            path = %config.path.display(),
            sync_writes = config.sync_writes,
            "[wr-01] Opened warp message store"
        );

        Ok(Self { db, config })
    }

    pub fn config(&self) -> &RocksDbConfig {
        &self.config
    }

    fn cf(&self) -> Result<&rocksdb::ColumnFamily, StoreError> {
        self.db
            .cf_handle(CF_WARP_MESSAGES)
            .ok_or_else(|| StoreError::Corruption {
                message: format!("missing column family {}", CF_WARP_MESSAGES),
            })
    }
}

impl MessageStore for RocksDbMessageStore {
    fn get(&self, id: &MessageId) -> Result<Option<Vec<u8>>, StoreError> {
        let cf = self.cf()?;
        self.db
            .get_cf(cf, id.as_bytes())
            .map_err(|e| StoreError::Io {
                message: format!("RocksDB get failed: {}", e),
            })
    }

    fn put(&self, id: &MessageId, bytes: &[u8]) -> Result<(), StoreError> {
        let cf = self.cf()?;
        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(self.config.sync_writes);

        self.db
            .put_cf_opt(cf, id.as_bytes(), bytes, &write_opts)
            .map_err(|e| StoreError::Io {
                message: format!("RocksDB put failed: {}", e),
            })
    }
}
