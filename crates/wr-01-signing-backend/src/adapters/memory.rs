use crate::ports::outbound::{MessageStore, StoreError};
use parking_lot::RwLock;
use shared_types::MessageId;
use std::collections::HashMap;

/// In-memory message store for tests and the devnet harness.
///
/// Survives a backend "restart" as long as the same instance is handed to
/// the new backend.
#[derive(Default)]
pub struct InMemoryMessageStore {
    data: RwLock<HashMap<MessageId, Vec<u8>>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Overwrite stored bytes without any checks. Used to simulate corruption.
    pub fn insert_raw(&self, id: MessageId, bytes: Vec<u8>) {
        self.data.write().insert(id, bytes);
    }
}

impl MessageStore for InMemoryMessageStore {
    fn get(&self, id: &MessageId) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.data.read().get(id).cloned())
    }

    fn put(&self, id: &MessageId, bytes: &[u8]) -> Result<(), StoreError> {
        self.data.write().insert(*id, bytes.to_vec());
        Ok(())
    }

    fn contains(&self, id: &MessageId) -> Result<bool, StoreError> {
        Ok(self.data.read().contains_key(id))
    }
}
