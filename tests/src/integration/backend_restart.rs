//! # Backend Restart
//!
//! Signing backends over RocksDB: shares must be re-derivable from the
//! durable store alone after a restart or a key rotation.

#[cfg(test)]
mod tests {
    use super::super::fixtures::{announce, impatient_client, validator_key};
    use shared_crypto::{BlsPublicKey, BlsSignature};
    use shared_types::ValidatorIndex;
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::time::timeout;
    use wr_01_signing_backend::test_utils::{sample_message, SOURCE_CHAIN};
    use wr_01_signing_backend::{
        BlsWarpSigner, RocksDbConfig, RocksDbMessageStore, SigningBackend, WarpBackend,
    };
    use wr_02_relay::{
        verify_signed_message, AggregatorConfig, ChannelMessageSource, LocalSignatureClient,
        RelayEndpoint, RelaySession,
    };

    type DurableBackend = SigningBackend<RocksDbMessageStore, BlsWarpSigner>;

    fn open_backend(path: &Path, key_index: u32) -> DurableBackend {
        let store = RocksDbMessageStore::open(RocksDbConfig::for_testing(path)).unwrap();
        SigningBackend::new(
            store,
            BlsWarpSigner::new(validator_key(key_index), SOURCE_CHAIN),
            16,
        )
    }

    fn verifies(share: &[u8; 96], message: &[u8], key: &BlsPublicKey) -> bool {
        BlsSignature::from_bytes(share)
            .map(|sig| key.verify(message, &sig))
            .unwrap_or(false)
    }

    #[test]
    fn test_restart_serves_identical_share() {
        let dir = TempDir::new().unwrap();
        let message = sample_message(1);

        let before = {
            let backend = open_backend(dir.path(), 0);
            backend.add_message(&message).unwrap();
            backend.get_signature(&message.id()).unwrap().unwrap()
        };

        // No add_message after the restart
        let backend = open_backend(dir.path(), 0);
        let after = backend.get_signature(&message.id()).unwrap().unwrap();

        assert_eq!(before, after);
        assert_eq!(backend.cache_stats().misses, 1);
    }

    #[test]
    fn test_key_rotation_resigns_from_store() {
        let dir = TempDir::new().unwrap();
        let message = sample_message(2);

        let old_share = {
            let backend = open_backend(dir.path(), 0);
            backend.add_message(&message).unwrap();
            backend.get_signature(&message.id()).unwrap().unwrap()
        };

        let backend = open_backend(dir.path(), 7);
        let new_share = backend.get_signature(&message.id()).unwrap().unwrap();

        assert_ne!(old_share, new_share);
        assert!(verifies(
            new_share.as_bytes(),
            message.bytes(),
            &validator_key(7).public_key()
        ));
        assert!(!verifies(
            new_share.as_bytes(),
            message.bytes(),
            &validator_key(0).public_key()
        ));
    }

    #[tokio::test]
    async fn test_restarted_backends_complete_relay_session() {
        let dirs: Vec<TempDir> = (0..3).map(|_| TempDir::new().unwrap()).collect();
        let messages: Vec<_> = (10..13).map(sample_message).collect();

        // Accept everything, then shut every validator down
        for (i, dir) in dirs.iter().enumerate() {
            let backend = open_backend(dir.path(), i as u32);
            for message in &messages {
                backend.add_message(message).unwrap();
            }
        }

        let mut feeds = Vec::new();
        let mut endpoints = Vec::new();
        for (i, dir) in dirs.iter().enumerate() {
            let backend: Arc<dyn WarpBackend> = Arc::new(open_backend(dir.path(), i as u32));
            let (feed, source) = ChannelMessageSource::channel();
            feeds.push(feed);
            endpoints.push(RelayEndpoint::new(
                ValidatorIndex(i as u32),
                source,
                Arc::new(LocalSignatureClient::new(backend)),
            ));
        }
        for message in &messages {
            announce(&feeds, message);
        }
        drop(feeds);

        let mut session = RelaySession::builder(AggregatorConfig {
            threshold: 2,
            validator_count: 3,
            expected_messages: messages.len(),
        })
        .client_config(impatient_client())
        .endpoints(endpoints)
        .start()
        .unwrap();
        let mut signed = session.signed_messages().unwrap();

        let outcome = timeout(Duration::from_secs(10), session.finish())
            .await
            .unwrap()
            .unwrap();
        assert!(outcome.report.is_complete());
        assert_eq!(outcome.report.completed.len(), messages.len());

        let keys: Vec<_> = (0..3).map(|i| validator_key(i).public_key()).collect();
        while let Some(aggregate) = signed.recv().await {
            let message = messages
                .iter()
                .find(|m| m.id() == aggregate.message_id)
                .unwrap();
            assert!(verify_signed_message(&aggregate, message.bytes(), &keys));
        }
    }
}
