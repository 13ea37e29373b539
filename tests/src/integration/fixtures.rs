//! Shared fixtures: an in-memory validator network.

use shared_crypto::{BlsKeyPair, BlsPublicKey};
use shared_types::{UnsignedMessage, ValidatorIndex};
use std::sync::Arc;
use std::time::Duration;
use wr_01_signing_backend::test_utils::SOURCE_CHAIN;
use wr_01_signing_backend::{
    BlsWarpSigner, InMemoryMessageStore, NoopBackend, SigningBackend, WarpBackend,
};
use wr_02_relay::{
    ChannelMessageSource, ClientConfig, LocalSignatureClient, MessageFeed, RelayEndpoint,
};

pub struct TestValidator {
    pub index: ValidatorIndex,
    pub public_key: BlsPublicKey,
    pub backend: Arc<dyn WarpBackend>,
    pub client: Arc<LocalSignatureClient>,
}

/// Deterministic key for validator `index`.
pub fn validator_key(index: u32) -> BlsKeyPair {
    let mut seed = [0x42u8; 32];
    seed[..4].copy_from_slice(&index.to_be_bytes());
    BlsKeyPair::from_seed(&seed).expect("32-byte seed")
}

pub struct TestNetwork {
    pub validators: Vec<TestValidator>,
}

impl TestNetwork {
    /// `n` signing validators with in-memory stores.
    pub fn new(n: u32) -> Self {
        Self::with_noop(n, &[])
    }

    /// Like [`TestNetwork::new`], but `noop` validators have signing disabled.
    pub fn with_noop(n: u32, noop: &[u32]) -> Self {
        let validators = (0..n)
            .map(|i| {
                let keypair = validator_key(i);
                let public_key = keypair.public_key();
                let backend: Arc<dyn WarpBackend> = if noop.contains(&i) {
                    Arc::new(NoopBackend)
                } else {
                    Arc::new(SigningBackend::new(
                        InMemoryMessageStore::new(),
                        BlsWarpSigner::new(keypair, SOURCE_CHAIN),
                        64,
                    ))
                };
                TestValidator {
                    index: ValidatorIndex(i),
                    public_key,
                    client: Arc::new(LocalSignatureClient::new(backend.clone())),
                    backend,
                }
            })
            .collect();
        Self { validators }
    }

    /// Every validator accepts `message`.
    pub fn accept(&self, message: &UnsignedMessage) {
        for validator in &self.validators {
            validator
                .backend
                .add_message(message)
                .expect("validator accepts message");
        }
    }

    /// One channel-fed endpoint per validator.
    pub fn endpoints(&self) -> (Vec<MessageFeed>, Vec<RelayEndpoint>) {
        self.validators
            .iter()
            .map(|v| {
                let (feed, source) = ChannelMessageSource::channel();
                (feed, RelayEndpoint::new(v.index, source, v.client.clone()))
            })
            .unzip()
    }

    pub fn public_keys(&self) -> Vec<BlsPublicKey> {
        self.validators.iter().map(|v| v.public_key.clone()).collect()
    }
}

/// Publish `message` on every feed.
pub fn announce(feeds: &[MessageFeed], message: &UnsignedMessage) {
    for feed in feeds {
        feed.publish(message.clone());
    }
}

/// Fast polling that keeps retrying until the session is cancelled.
pub fn patient_client() -> ClientConfig {
    ClientConfig {
        poll_interval: Duration::from_millis(5),
        max_attempts: 100_000,
    }
}

/// Fast polling that gives up quickly.
pub fn impatient_client() -> ClientConfig {
    ClientConfig {
        poll_interval: Duration::from_millis(2),
        max_attempts: 3,
    }
}
