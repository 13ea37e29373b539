//! Test doubles and fixtures shared by unit and integration tests.

use crate::adapters::InMemoryMessageStore;
use crate::ports::outbound::{MessageStore, SignerError, StoreError, WarpSigner};
use shared_crypto::{BlsKeyPair, BlsPublicKey};
use shared_types::{ChainId, MessageId, SignatureShare, UnsignedMessage};
use std::sync::atomic::{AtomicBool, Ordering};

/// Source chain used by fixtures.
pub const SOURCE_CHAIN: ChainId = ChainId([0xA1; 32]);

/// Destination chain used by fixtures.
pub const DESTINATION_CHAIN: ChainId = ChainId([0xB2; 32]);

/// Build a distinct message from `SOURCE_CHAIN` for each `n`.
pub fn sample_message(n: u8) -> UnsignedMessage {
    let payload = format!("warp payload #{}", n).into_bytes();
    // Payload is far below the size limit
    UnsignedMessage::new(SOURCE_CHAIN, DESTINATION_CHAIN, payload)
        .unwrap_or_else(|e| panic!("fixture message invalid: {e}"))
}

/// In-memory store whose reads and writes can be switched to fail.
#[derive(Default)]
pub struct FailingMessageStore {
    inner: InMemoryMessageStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl FailingMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl MessageStore for FailingMessageStore {
    fn get(&self, id: &MessageId) -> Result<Option<Vec<u8>>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Io {
                message: "simulated read failure".into(),
            });
        }
        self.inner.get(id)
    }

    fn put(&self, id: &MessageId, bytes: &[u8]) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Io {
                message: "simulated write failure".into(),
            });
        }
        self.inner.put(id, bytes)
    }
}

/// Signer that reports `KeyUnavailable` while failing is switched on.
///
/// Signs any source chain.
pub struct FailingSigner {
    keypair: BlsKeyPair,
    failing: AtomicBool,
}

impl FailingSigner {
    pub fn new(keypair: BlsKeyPair) -> Self {
        Self {
            keypair,
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl WarpSigner for FailingSigner {
    fn sign(&self, message: &UnsignedMessage) -> Result<SignatureShare, SignerError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SignerError::KeyUnavailable("simulated key outage".into()));
        }
        Ok(SignatureShare::new(self.keypair.sign(message.bytes()).to_bytes()))
    }

    fn public_key(&self) -> BlsPublicKey {
        self.keypair.public_key()
    }
}
