//! # Relay Flows
//!
//! Signing backends, relay clients, the aggregator and delivery workers
//! running together.
//!
//! ## Scenarios
//!
//! 1. **Quorum**: threshold 4 of 5, exactly one aggregate per message
//! 2. **Endpoint outage**: satisfiable messages complete, the rest stay `Collecting`
//! 3. **Signing disabled**: a `NoopBackend` validator is simply never counted
//! 4. **Corrupt share**: only the affected message fails
//! 5. **Duplicate endpoint**: two clients for one validator count once
//! 6. **Delivery**: signed messages flow into per-worker nonce sequences

#[cfg(test)]
mod tests {
    use super::super::fixtures::{
        announce, impatient_client, patient_client, validator_key, TestNetwork,
    };
    use shared_types::{SignatureShare, ValidatorIndex};
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;
    use tokio_util::sync::CancellationToken;
    use wr_01_signing_backend::test_utils::sample_message;
    use wr_02_relay::test_utils::MockSignatureClient;
    use wr_02_relay::{
        verify_signed_message, AggregationError, AggregatorConfig, ChannelMessageSource,
        ClientExit, DeliveryConfig, DeliverySequence, EndpointError, RelayEndpoint, RelaySession,
    };

    const WAIT: Duration = Duration::from_secs(10);

    // =========================================================================
    // SCENARIO 1: Quorum
    // =========================================================================

    #[tokio::test]
    async fn test_threshold_four_of_five_emits_single_aggregate() {
        let network = TestNetwork::new(5);
        let (feeds, endpoints) = network.endpoints();
        let message = sample_message(1);
        network.accept(&message);
        announce(&feeds, &message);
        drop(feeds);

        let mut session = RelaySession::builder(AggregatorConfig {
            threshold: 4,
            validator_count: 5,
            expected_messages: 1,
        })
        .client_config(impatient_client())
        .endpoints(endpoints)
        .start()
        .unwrap();
        let mut signed = session.signed_messages().unwrap();

        let aggregate = timeout(WAIT, signed.recv()).await.unwrap().unwrap();
        assert_eq!(aggregate.message_id, message.id());
        assert_eq!(aggregate.signer_count(), 4);
        assert!(verify_signed_message(
            &aggregate,
            message.bytes(),
            &network.public_keys()
        ));

        let outcome = timeout(WAIT, session.finish()).await.unwrap().unwrap();

        // The fifth share was discarded, no second aggregate
        assert!(signed.recv().await.is_none());
        assert_eq!(outcome.report.completed, vec![message.id()]);
        assert_eq!(
            outcome
                .clients
                .iter()
                .map(|c| c.shares_forwarded)
                .sum::<usize>(),
            5
        );
    }

    // =========================================================================
    // SCENARIO 2: Endpoint outage mid-session
    // =========================================================================

    #[tokio::test]
    async fn test_endpoint_outage_mid_session() {
        let network = TestNetwork::new(4);
        let (feeds, endpoints) = network.endpoints();
        let mut session = RelaySession::builder(AggregatorConfig {
            threshold: 3,
            validator_count: 4,
            expected_messages: 2,
        })
        .client_config(patient_client())
        .endpoints(endpoints)
        .start()
        .unwrap();
        let mut signed = session.signed_messages().unwrap();

        let a = sample_message(10);
        network.accept(&a);
        announce(&feeds, &a);
        assert_eq!(
            timeout(WAIT, signed.recv()).await.unwrap().unwrap().message_id,
            a.id()
        );

        // Validator 3 drops out: 3 of 4 still reach threshold
        network.validators[3].client.set_reachable(false);
        let b = sample_message(11);
        network.accept(&b);
        announce(&feeds, &b);
        let b_signed = timeout(WAIT, signed.recv()).await.unwrap().unwrap();
        assert_eq!(b_signed.message_id, b.id());
        assert!(!b_signed.signers[3]);
        assert!(timeout(WAIT, session.completed()).await.unwrap());

        // Validator 2 drops out too: threshold now unreachable
        network.validators[2].client.set_reachable(false);
        let c = sample_message(12);
        network.accept(&c);
        announce(&feeds, &c);
        tokio::time::sleep(Duration::from_millis(200)).await;

        session.cancel();
        let outcome = timeout(WAIT, session.finish()).await.unwrap().unwrap();

        assert_eq!(outcome.report.completed, vec![a.id(), b.id()]);
        assert_eq!(outcome.report.collecting.len(), 1);
        assert_eq!(outcome.report.collecting[0].message_id, c.id());
        assert_eq!(
            outcome.report.collecting[0].validators,
            vec![ValidatorIndex(0), ValidatorIndex(1)]
        );
        assert!(outcome
            .clients
            .iter()
            .all(|c| c.exit == ClientExit::Cancelled));
        drop(feeds);
    }

    // =========================================================================
    // SCENARIO 3: Signing disabled on one validator
    // =========================================================================

    #[tokio::test]
    async fn test_noop_validator_never_counted() {
        let network = TestNetwork::with_noop(4, &[1]);
        let (feeds, endpoints) = network.endpoints();
        let message = sample_message(20);
        network.accept(&message);
        announce(&feeds, &message);
        drop(feeds);

        let mut session = RelaySession::builder(AggregatorConfig {
            threshold: 3,
            validator_count: 4,
            expected_messages: 1,
        })
        .client_config(impatient_client())
        .endpoints(endpoints)
        .start()
        .unwrap();
        let mut signed = session.signed_messages().unwrap();
        let mut errors = session.take_errors().unwrap();

        let aggregate = timeout(WAIT, signed.recv()).await.unwrap().unwrap();
        assert_eq!(
            aggregate.signer_indices(),
            vec![ValidatorIndex(0), ValidatorIndex(2), ValidatorIndex(3)]
        );

        let outcome = timeout(WAIT, session.finish()).await.unwrap().unwrap();
        assert!(outcome.report.is_complete());

        let error = errors.recv().await.unwrap();
        assert_eq!(error.validator, ValidatorIndex(1));
        assert_eq!(
            error.error,
            EndpointError::SignatureUnavailable {
                id: message.id(),
                attempts: 3,
            }
        );
    }

    // =========================================================================
    // SCENARIO 4: Corrupt share
    // =========================================================================

    #[tokio::test]
    async fn test_corrupt_share_fails_only_its_message() {
        let network = TestNetwork::new(2);
        let (mut feeds, mut endpoints) = network.endpoints();

        // Validator 2 is served by a scripted endpoint
        let good = sample_message(30);
        let bad = sample_message(31);
        let scripted = Arc::new(MockSignatureClient::new());
        scripted.insert(
            good.id(),
            SignatureShare::new(validator_key(2).sign(good.bytes()).to_bytes()),
        );
        scripted.insert(bad.id(), SignatureShare::new([0xFF; 96]));
        let (feed, source) = ChannelMessageSource::channel();
        endpoints.push(RelayEndpoint::new(ValidatorIndex(2), source, scripted));
        feeds.push(feed);

        for message in [&good, &bad] {
            network.accept(message);
            announce(&feeds, message);
        }
        drop(feeds);

        let session = RelaySession::builder(AggregatorConfig {
            threshold: 3,
            validator_count: 3,
            expected_messages: 2,
        })
        .client_config(impatient_client())
        .endpoints(endpoints)
        .start()
        .unwrap();

        let outcome = timeout(WAIT, session.finish()).await.unwrap().unwrap();

        assert_eq!(outcome.report.completed, vec![good.id()]);
        assert_eq!(outcome.report.failed.len(), 1);
        assert_eq!(outcome.report.failed[0].message_id, bad.id());
        assert!(matches!(
            outcome.report.failed[0].reason,
            AggregationError::MalformedShare {
                validator: ValidatorIndex(2),
                ..
            }
        ));
    }

    // =========================================================================
    // SCENARIO 5: Two endpoints claiming the same validator
    // =========================================================================

    #[tokio::test]
    async fn test_duplicate_endpoint_counts_once() {
        let network = TestNetwork::new(3);
        let message = sample_message(40);
        network.accept(&message);

        let validator = &network.validators[0];
        let (feed_a, source_a) = ChannelMessageSource::channel();
        let (feed_b, source_b) = ChannelMessageSource::channel();
        feed_a.publish(message.clone());
        feed_b.publish(message.clone());
        drop((feed_a, feed_b));

        let session = RelaySession::builder(AggregatorConfig {
            threshold: 2,
            validator_count: 3,
            expected_messages: 1,
        })
        .client_config(impatient_client())
        .endpoint(RelayEndpoint::new(validator.index, source_a, validator.client.clone()))
        .endpoint(RelayEndpoint::new(validator.index, source_b, validator.client.clone()))
        .start()
        .unwrap();

        let outcome = timeout(WAIT, session.finish()).await.unwrap().unwrap();

        assert!(outcome.report.completed.is_empty());
        assert_eq!(outcome.report.collecting[0].share_count, 1);
        assert_eq!(
            outcome
                .clients
                .iter()
                .map(|c| c.shares_forwarded)
                .sum::<usize>(),
            2
        );
    }

    // =========================================================================
    // SCENARIO 6: Delivery workers
    // =========================================================================

    #[tokio::test]
    async fn test_signed_messages_delivered_with_worker_nonces() {
        let network = TestNetwork::new(5);
        let (feeds, endpoints) = network.endpoints();
        let delivery_config = DeliveryConfig {
            workers: 2,
            messages_per_worker: 3,
        };
        let messages: Vec<_> = (50..56).map(sample_message).collect();
        for message in &messages {
            network.accept(message);
            announce(&feeds, message);
        }
        drop(feeds);

        let mut session = RelaySession::builder(AggregatorConfig {
            threshold: 4,
            validator_count: 5,
            expected_messages: delivery_config.expected_messages(),
        })
        .client_config(impatient_client())
        .endpoints(endpoints)
        .start()
        .unwrap();

        let delivery =
            DeliverySequence::new(CancellationToken::new(), delivery_config, vec![100, 7]).unwrap();
        let delivery_task = tokio::spawn(delivery.run(session.signed_messages().unwrap()));

        assert!(timeout(WAIT, session.completed()).await.unwrap());
        timeout(WAIT, session.finish()).await.unwrap().unwrap();
        let workers = timeout(WAIT, delivery_task).await.unwrap().unwrap().unwrap();

        let nonces: Vec<Vec<u64>> = workers
            .iter()
            .map(|w| w.deliveries.iter().map(|d| d.nonce).collect())
            .collect();
        assert_eq!(nonces, vec![vec![100, 101, 102], vec![7, 8, 9]]);

        let delivered: HashSet<_> = workers
            .iter()
            .flat_map(|w| w.deliveries.iter().map(|d| d.message_id))
            .collect();
        let expected: HashSet<_> = messages.iter().map(|m| m.id()).collect();
        assert_eq!(delivered, expected);
    }
}
