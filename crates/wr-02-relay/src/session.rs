//! # Relay Session
//!
//! Wires one relay client per validator endpoint and one aggregator under
//! a single cancellation token. All tasks are spawned on one `TaskTracker`.
//!
//! ```text
//! endpoint 0 ─► RelayClient ─┐
//! endpoint 1 ─► RelayClient ─┼─► ShareChannel ─► RelayAggregator ─► signed messages
//! endpoint N ─► RelayClient ─┘
//! ```
//!
//! The session holds no share sender of its own: once every client stops,
//! the share channel closes and the aggregator exits.

use crate::aggregator::{RelayAggregator, RelayHandle, SignedMessageStream};
use crate::channel::share_channel;
use crate::client::RelayClient;
use crate::domain::{
    AggregatorConfig, ClientConfig, ClientError, ClientSummary, RelayError, SessionReport,
};
use crate::ports::outbound::{MessageSource, SignatureClient};
use shared_types::ValidatorIndex;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

/// One validator endpoint: where its accepted messages come from and how
/// its shares are fetched.
pub struct RelayEndpoint {
    pub validator: ValidatorIndex,
    pub source: Box<dyn MessageSource>,
    pub signatures: Arc<dyn SignatureClient>,
}

impl RelayEndpoint {
    pub fn new(
        validator: ValidatorIndex,
        source: impl MessageSource + 'static,
        signatures: Arc<dyn SignatureClient>,
    ) -> Self {
        Self {
            validator,
            source: Box::new(source),
            signatures,
        }
    }
}

/// Everything a finished session produced.
#[derive(Debug)]
pub struct SessionOutcome {
    pub session_id: Uuid,
    pub report: SessionReport,
    /// Client summaries ordered by validator index.
    pub clients: Vec<ClientSummary>,
    /// Client errors not consumed through [`RelaySession::take_errors`].
    pub errors: Vec<ClientError>,
}

/// Builder for [`RelaySession`].
pub struct RelaySessionBuilder {
    aggregator: AggregatorConfig,
    client: ClientConfig,
    cancel: CancellationToken,
    endpoints: Vec<RelayEndpoint>,
}

impl RelaySessionBuilder {
    pub fn client_config(mut self, config: ClientConfig) -> Self {
        self.client = config;
        self
    }

    /// Use an externally owned token; the session cancels a child of it.
    pub fn cancel_token(mut self, parent: &CancellationToken) -> Self {
        self.cancel = parent.child_token();
        self
    }

    pub fn endpoint(mut self, endpoint: RelayEndpoint) -> Self {
        self.endpoints.push(endpoint);
        self
    }

    pub fn endpoints(mut self, endpoints: impl IntoIterator<Item = RelayEndpoint>) -> Self {
        self.endpoints.extend(endpoints);
        self
    }

    /// Validate and spawn the aggregator and every client.
    pub fn start(self) -> Result<RelaySession, RelayError> {
        self.aggregator.validate()?;
        if self.endpoints.is_empty() {
            return Err(RelayError::NoEndpoints);
        }
        if let Some(endpoint) = self
            .endpoints
            .iter()
            .find(|e| e.validator.as_usize() >= self.aggregator.validator_count)
        {
            return Err(RelayError::EndpointOutOfSet {
                validator: endpoint.validator,
                validators: self.aggregator.validator_count,
            });
        }

        let id = Uuid::new_v4();
        let span = info_span!("relay_session", session_id = %id);
        let tracker = TaskTracker::new();
        let (shares_tx, shares_rx) = share_channel();
        let (errors_tx, errors_rx) = mpsc::unbounded_channel();

        let aggregator = {
            let _entered = span.enter();
            RelayAggregator::spawn_tracked(&tracker, self.cancel.clone(), self.aggregator, shares_rx)?
        };

        let clients = self
            .endpoints
            .into_iter()
            .map(|endpoint| {
                let client = RelayClient::new(
                    self.cancel.clone(),
                    endpoint.source,
                    endpoint.signatures,
                    shares_tx.clone(),
                    endpoint.validator,
                    self.client,
                    errors_tx.clone(),
                );
                let client_span = info_span!(parent: &span, "relay_client", validator = %endpoint.validator);
                tracker.spawn(client.run().instrument(client_span))
            })
            .collect::<Vec<_>>();

        info!(
            session_id = %id,
            clients = clients.len(),
            threshold = self.aggregator.threshold,
            "[wr-02] Relay session started"
        );

        Ok(RelaySession {
            id,
            cancel: self.cancel,
            tracker,
            clients,
            aggregator,
            errors: Some(errors_rx),
        })
    }
}

/// A running relay session.
pub struct RelaySession {
    id: Uuid,
    cancel: CancellationToken,
    tracker: TaskTracker,
    clients: Vec<JoinHandle<ClientSummary>>,
    aggregator: RelayHandle,
    errors: Option<mpsc::UnboundedReceiver<ClientError>>,
}

impl RelaySession {
    pub fn builder(config: AggregatorConfig) -> RelaySessionBuilder {
        RelaySessionBuilder {
            aggregator: config,
            client: ClientConfig::default(),
            cancel: CancellationToken::new(),
            endpoints: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Take the signed-message stream. Returns `None` after the first call.
    pub fn signed_messages(&mut self) -> Option<SignedMessageStream> {
        self.aggregator.take_signed_messages()
    }

    /// Take the client error stream. Returns `None` after the first call.
    pub fn take_errors(&mut self) -> Option<mpsc::UnboundedReceiver<ClientError>> {
        self.errors.take()
    }

    /// Wait for the completion signal. `false` if the aggregator exited first.
    pub async fn completed(&self) -> bool {
        self.aggregator.completed().await
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait for every client, then for the aggregator to drain and exit.
    ///
    /// Clients only stop on cancellation or when their source ends, so
    /// callers typically [`cancel`](Self::cancel) first.
    pub async fn finish(self) -> Result<SessionOutcome, RelayError> {
        self.tracker.close();

        let mut clients = Vec::with_capacity(self.clients.len());
        for handle in self.clients {
            match handle.await {
                Ok(summary) => clients.push(summary),
                Err(e) => warn!(session_id = %self.id, error = %e, "[wr-02] Relay client task failed"),
            }
        }
        clients.sort_by_key(|c| c.validator);

        let report = self.aggregator.join().await?;
        self.tracker.wait().await;

        let mut errors = Vec::new();
        if let Some(mut rx) = self.errors {
            while let Ok(error) = rx.try_recv() {
                errors.push(error);
            }
        }

        info!(
            session_id = %self.id,
            completed = report.completed.len(),
            collecting = report.collecting.len(),
            failed = report.failed.len(),
            "[wr-02] Relay session finished"
        );

        Ok(SessionOutcome {
            session_id: self.id,
            report,
            clients,
            errors,
        })
    }
}
