//! # In-Process Devnet
//!
//! Runs a complete warp round trip inside one process:
//!
//! 1. Build `validators` signing backends, each with its own BLS key
//! 2. Every validator accepts the same batch of messages (`add_message`)
//! 3. A relay session fetches every validator's shares and aggregates them
//! 4. Delivery workers assign the signed messages to transaction nonces
//! 5. Every delivered aggregate is verified against the validator keys

use crate::config::RuntimeConfig;
use serde::Serialize;
use shared_crypto::{BlsKeyPair, BlsPublicKey};
use shared_types::{ChainId, DecodeError, MessageId, UnsignedMessage, ValidatorIndex};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use wr_01_signing_backend::{
    BackendError, BlsWarpSigner, InMemoryMessageStore, MessageStore, SigningBackend, StoreError,
    WarpBackend,
};
use wr_02_relay::{
    verify_signed_message, AggregatorConfig, ChannelMessageSource, ClientConfig, DeliveryConfig,
    DeliverySequence, LocalSignatureClient, RelayEndpoint, RelayError, RelaySession,
    SessionOutcome, SignedMessage, WorkerReport,
};

/// Chain the devnet validators run and sign for.
pub const SOURCE_CHAIN: ChainId = ChainId([0x5A; 32]);

/// Chain the signed messages are delivered to.
pub const DESTINATION_CHAIN: ChainId = ChainId([0xC7; 32]);

#[derive(Debug, Error)]
pub enum DevnetError {
    #[error("Failed to open message store for validator {index}: {source}")]
    Store {
        index: u32,
        #[source]
        source: StoreError,
    },

    #[error("Validator {index} rejected message: {source}")]
    Backend {
        index: u32,
        #[source]
        source: BackendError,
    },

    #[error(transparent)]
    Message(#[from] DecodeError),

    #[error(transparent)]
    Relay(#[from] RelayError),
}

/// One devnet validator.
pub struct DevnetValidator {
    pub index: ValidatorIndex,
    pub backend: Arc<dyn WarpBackend>,
    pub public_key: BlsPublicKey,
    pub client: Arc<LocalSignatureClient>,
}

/// Build every validator with a fresh key and its own message store.
pub fn build_validators(config: &RuntimeConfig) -> Result<Vec<DevnetValidator>, DevnetError> {
    (0..config.validators as u32)
        .map(|i| {
            let keypair = BlsKeyPair::generate();
            let public_key = keypair.public_key();
            let store = open_store(config, i)?;
            let backend: Arc<dyn WarpBackend> = Arc::new(SigningBackend::new(
                store,
                BlsWarpSigner::new(keypair, SOURCE_CHAIN),
                config.signature_cache_size,
            ));
            let client = Arc::new(LocalSignatureClient::new(backend.clone()));
            if config.offline_validators.contains(&i) {
                client.set_reachable(false);
            }
            Ok(DevnetValidator {
                index: ValidatorIndex(i),
                backend,
                public_key,
                client,
            })
        })
        .collect()
}

#[cfg(feature = "rocksdb")]
fn open_store(config: &RuntimeConfig, index: u32) -> Result<Arc<dyn MessageStore>, DevnetError> {
    use wr_01_signing_backend::{RocksDbConfig, RocksDbMessageStore};

    match &config.data_dir {
        Some(root) => {
            let store = RocksDbMessageStore::open(RocksDbConfig {
                path: root.join(format!("validator-{}", index)),
                ..Default::default()
            })
            .map_err(|source| DevnetError::Store { index, source })?;
            Ok(Arc::new(store))
        }
        None => Ok(Arc::new(InMemoryMessageStore::new())),
    }
}

#[cfg(not(feature = "rocksdb"))]
fn open_store(config: &RuntimeConfig, index: u32) -> Result<Arc<dyn MessageStore>, DevnetError> {
    if config.data_dir.is_some() && index == 0 {
        warn!("WR_DATA_DIR is set but the rocksdb feature is disabled, using in-memory stores");
    }
    Ok(Arc::new(InMemoryMessageStore::new()))
}

/// Distinct messages from `SOURCE_CHAIN` to `DESTINATION_CHAIN`.
pub fn devnet_messages(count: usize) -> Result<Vec<UnsignedMessage>, DecodeError> {
    (0..count)
        .map(|n| {
            let payload = format!("devnet warp message #{}", n).into_bytes();
            UnsignedMessage::new(SOURCE_CHAIN, DESTINATION_CHAIN, payload)
        })
        .collect()
}

/// Messages still below threshold at the end of the run.
#[derive(Debug, Clone, Serialize)]
pub struct CollectingSummary {
    pub message_id: String,
    pub shares: usize,
    pub validators: Vec<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedSummary {
    pub message_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientReport {
    pub validator: u32,
    pub shares_forwarded: usize,
    pub errors_reported: usize,
    pub exit: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeliveryReport {
    pub worker: usize,
    pub nonce: u64,
    pub message_id: String,
    /// Hex-encoded aggregate signature.
    pub signature: String,
    pub signers: Vec<u32>,
    pub verified: bool,
}

/// Result of a devnet run, printed as JSON by the binary.
#[derive(Debug, Clone, Serialize)]
pub struct DevnetReport {
    pub session_id: String,
    pub validators: usize,
    pub threshold: usize,
    pub expected_messages: usize,
    pub timed_out: bool,
    pub completed: Vec<String>,
    pub collecting: Vec<CollectingSummary>,
    pub failed: Vec<FailedSummary>,
    pub clients: Vec<ClientReport>,
    pub deliveries: Vec<DeliveryReport>,
}

impl DevnetReport {
    /// Every expected message was signed, delivered and verified.
    pub fn is_success(&self) -> bool {
        self.completed.len() == self.expected_messages
            && self.deliveries.len() == self.expected_messages
            && self.deliveries.iter().all(|d| d.verified)
    }
}

/// Run the devnet until every expected message is signed, the session
/// times out, or `shutdown` fires.
pub async fn run(
    config: &RuntimeConfig,
    shutdown: CancellationToken,
) -> Result<DevnetReport, DevnetError> {
    let validators = build_validators(config)?;
    let messages = devnet_messages(config.expected_messages())?;

    info!(
        validators = config.validators,
        threshold = config.threshold,
        messages = messages.len(),
        offline = ?config.offline_validators,
        "Starting warp devnet"
    );

    let mut feeds = Vec::with_capacity(validators.len());
    let mut endpoints = Vec::with_capacity(validators.len());
    for validator in &validators {
        let (feed, source) = ChannelMessageSource::channel();
        endpoints.push(RelayEndpoint::new(
            validator.index,
            source,
            validator.client.clone(),
        ));
        feeds.push(feed);
    }

    // Every validator accepts every message, then announces it
    for message in &messages {
        for (validator, feed) in validators.iter().zip(&feeds) {
            validator
                .backend
                .add_message(message)
                .map_err(|source| DevnetError::Backend {
                    index: validator.index.0,
                    source,
                })?;
            feed.publish(message.clone());
        }
    }
    drop(feeds);

    let mut session = RelaySession::builder(AggregatorConfig {
        threshold: config.threshold,
        validator_count: config.validators,
        expected_messages: messages.len(),
    })
    .client_config(ClientConfig {
        poll_interval: config.poll_interval,
        max_attempts: config.max_poll_attempts,
    })
    .cancel_token(&shutdown)
    .endpoints(endpoints)
    .start()?;

    let signed = session
        .signed_messages()
        .ok_or_else(|| RelayError::TaskFailed("signed message stream already taken".into()))?;
    let delivery = DeliverySequence::new(
        shutdown.child_token(),
        DeliveryConfig {
            workers: config.workers,
            messages_per_worker: config.messages_per_worker,
        },
        vec![0; config.workers],
    )?;
    let delivery_task = tokio::spawn(delivery.run(signed));

    let timed_out = tokio::select! {
        done = session.completed() => {
            if !done {
                warn!("Relay session ended before all messages were signed");
            }
            false
        }
        _ = tokio::time::sleep(config.session_timeout) => {
            warn!(timeout = ?config.session_timeout, "Relay session timed out");
            true
        }
        _ = shutdown.cancelled() => {
            info!("Shutdown requested");
            false
        }
    };

    session.cancel();
    let outcome = session.finish().await?;
    let workers = delivery_task
        .await
        .map_err(|e| RelayError::TaskFailed(e.to_string()))??;

    let public_keys: Vec<_> = validators.iter().map(|v| v.public_key.clone()).collect();
    let report = build_report(config, &messages, &public_keys, outcome, workers, timed_out);

    info!(
        completed = report.completed.len(),
        delivered = report.deliveries.len(),
        success = report.is_success(),
        "Warp devnet finished"
    );
    Ok(report)
}

fn build_report(
    config: &RuntimeConfig,
    messages: &[UnsignedMessage],
    public_keys: &[BlsPublicKey],
    outcome: SessionOutcome,
    workers: Vec<WorkerReport>,
    timed_out: bool,
) -> DevnetReport {
    let bytes_by_id: HashMap<MessageId, &[u8]> =
        messages.iter().map(|m| (m.id(), m.bytes())).collect();

    let deliveries = workers
        .into_iter()
        .flat_map(|w| w.deliveries)
        .map(|d| {
            let signed = SignedMessage {
                message_id: d.message_id,
                signature: d.signature,
                signers: d.signers,
            };
            let verified = bytes_by_id
                .get(&d.message_id)
                .is_some_and(|bytes| verify_signed_message(&signed, bytes, public_keys));
            DeliveryReport {
                worker: d.worker,
                nonce: d.nonce,
                message_id: d.message_id.to_string(),
                signature: hex::encode(signed.signature.as_bytes()),
                signers: signed.signer_indices().into_iter().map(|v| v.0).collect(),
                verified,
            }
        })
        .collect();

    DevnetReport {
        session_id: outcome.session_id.to_string(),
        validators: config.validators,
        threshold: config.threshold,
        expected_messages: messages.len(),
        timed_out,
        completed: outcome
            .report
            .completed
            .iter()
            .map(|id| id.to_string())
            .collect(),
        collecting: outcome
            .report
            .collecting
            .iter()
            .map(|c| CollectingSummary {
                message_id: c.message_id.to_string(),
                shares: c.share_count,
                validators: c.validators.iter().map(|v| v.0).collect(),
            })
            .collect(),
        failed: outcome
            .report
            .failed
            .iter()
            .map(|f| FailedSummary {
                message_id: f.message_id.to_string(),
                reason: f.reason.to_string(),
            })
            .collect(),
        clients: outcome
            .clients
            .iter()
            .map(|c| ClientReport {
                validator: c.validator.0,
                shares_forwarded: c.shares_forwarded,
                errors_reported: c.errors_reported,
                exit: format!("{:?}", c.exit),
            })
            .collect(),
        deliveries,
    }
}
