//! Egress emitter — turns a cycle's metrics into one gauge emission.

use std::sync::atomic::{AtomicI64, Ordering};

use service_metrics_core::{LogData, Logger, Metrics};

use crate::envelope::{GaugeEnvelope, GaugeIngressClient, GaugeValue};
use crate::error::EgressError;

/// Sends metrics to an ingestion client under a fixed source ID and a
/// mutable instance ID.
///
/// The instance ID is atomic, so it may be updated from another task
/// while cycles are running; the new value applies from the next `emit`.
pub struct EgressClient<C> {
    emitter: C,
    source_id: String,
    instance_id: AtomicI64,
}

impl<C: GaugeIngressClient> EgressClient<C> {
    pub fn new(emitter: C, source_id: impl Into<String>) -> Self {
        Self {
            emitter,
            source_id: source_id.into(),
            instance_id: AtomicI64::new(0),
        }
    }

    /// Emit all metrics as a single envelope.
    ///
    /// An empty collection is a no-op. An empty source ID is logged as an
    /// error but the envelope is still sent.
    pub fn emit(&self, metrics: &Metrics, logger: &dyn Logger) {
        if metrics.is_empty() {
            return;
        }

        if self.source_id.is_empty() {
            logger.error(
                "sending metrics failed",
                &EgressError::MissingSourceId,
                LogData::from([("Emit", "failed".to_string())]),
            );
        }

        logger.info(
            "sending-metrics",
            LogData::from([(
                "details",
                "emitting gauges to logging platform".to_string(),
            )]),
        );

        let values = metrics
            .iter()
            .map(|m| GaugeValue {
                name: m.key.clone(),
                value: m.value,
                unit: m.unit.clone(),
            })
            .collect();

        self.emitter.emit_gauge(GaugeEnvelope {
            source_id: self.source_id.clone(),
            instance_id: self.instance_id().to_string(),
            values,
        });
    }

    pub fn set_instance_id(&self, instance_id: i64) {
        self.instance_id.store(instance_id, Ordering::Relaxed);
    }

    pub fn instance_id(&self) -> i64 {
        self.instance_id.load(Ordering::Relaxed)
    }
}
