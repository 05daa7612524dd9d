//! Loggregator v2 ingress client.
//!
//! `emit_gauge` never blocks: envelopes are queued on an unbounded channel
//! and a background task batches them into `Ingress/Send` calls. A batch
//! is flushed when it reaches `batch_max_size` or when the flush interval
//! elapses, whichever comes first. Send failures drop the batch; the
//! channel reconnects on its own.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tonic::transport::Endpoint;
use tracing::{debug, info, warn};

use crate::envelope::{now_nanos, GaugeEnvelope, GaugeIngressClient};
use crate::error::EgressError;
use crate::proto::{Envelope, EnvelopeBatch, IngressServiceClient};
use crate::tls::IngressTlsConfig;

/// Batching and timeout parameters for the background sender.
#[derive(Debug, Clone)]
pub struct IngressOptions {
    pub batch_max_size: usize,
    pub batch_flush_interval: Duration,
    /// Bound on establishing the connection, TLS handshake included.
    pub connect_timeout: Duration,
    /// Bound on a single `Send` call.
    pub request_timeout: Duration,
}

impl Default for IngressOptions {
    fn default() -> Self {
        Self {
            batch_max_size: 100,
            batch_flush_interval: Duration::from_secs(1),
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(5),
        }
    }
}

/// Destination for envelope batches.
pub trait BatchSender: Send + 'static {
    fn send(&mut self, batch: EnvelopeBatch) -> impl Future<Output = Result<(), tonic::Status>> + Send;
}

impl BatchSender for IngressServiceClient {
    async fn send(&mut self, batch: EnvelopeBatch) -> Result<(), tonic::Status> {
        IngressServiceClient::send(self, batch).await.map(|_| ())
    }
}

/// Handle for queueing envelopes to the background sender.
#[derive(Debug, Clone)]
pub struct IngressClient {
    tx: mpsc::UnboundedSender<Envelope>,
}

impl IngressClient {
    /// Build a TLS channel to the agent and start the sender task.
    ///
    /// The connection is established lazily on first send, so an agent
    /// that is not up yet does not fail startup. Must be called from
    /// within a tokio runtime.
    pub fn connect(
        agent_addr: &str,
        tls: &IngressTlsConfig,
        options: IngressOptions,
    ) -> Result<(Self, JoinHandle<()>), EgressError> {
        let channel = Endpoint::from_shared(format!("https://{agent_addr}"))?
            .tls_config(tls.client_config())?
            .connect_timeout(options.connect_timeout)
            .timeout(options.request_timeout)
            .connect_lazy();

        info!(%agent_addr, "ingress client initialized");
        Ok(Self::with_sender(IngressServiceClient::new(channel), options))
    }

    /// Start a sender task over an arbitrary batch destination.
    pub fn with_sender<S: BatchSender>(sender: S, options: IngressOptions) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_sender(rx, sender, options));
        (Self { tx }, handle)
    }
}

impl GaugeIngressClient for IngressClient {
    fn emit_gauge(&self, envelope: GaugeEnvelope) {
        if self.tx.send(envelope.to_proto(now_nanos())).is_err() {
            warn!("ingress sender stopped, dropping envelope");
        }
    }
}

async fn run_sender<S: BatchSender>(
    mut rx: mpsc::UnboundedReceiver<Envelope>,
    mut sender: S,
    options: IngressOptions,
) {
    let max = options.batch_max_size.max(1);
    let mut batch: Vec<Envelope> = Vec::with_capacity(max);
    let period = options.batch_flush_interval.max(Duration::from_millis(1));
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            received = rx.recv() => match received {
                Some(envelope) => {
                    batch.push(envelope);
                    if batch.len() >= max {
                        flush(&mut sender, &mut batch).await;
                    }
                }
                None => {
                    flush(&mut sender, &mut batch).await;
                    debug!("ingress sender shutting down");
                    break;
                }
            },
            _ = ticker.tick() => {
                flush(&mut sender, &mut batch).await;
            }
        }
    }
}

async fn flush<S: BatchSender>(sender: &mut S, batch: &mut Vec<Envelope>) {
    if batch.is_empty() {
        return;
    }
    let envelopes = std::mem::take(batch);
    let count = envelopes.len();
    match sender.send(EnvelopeBatch { batch: envelopes }).await {
        Ok(()) => debug!(count, "envelope batch sent"),
        Err(status) => warn!(count, error = %status, "failed to send envelope batch"),
    }
}
