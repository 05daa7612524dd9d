//! Gauge envelopes and the ingestion client seam.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::proto;

/// One named gauge reading inside an envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeValue {
    pub name: String,
    pub value: f64,
    pub unit: String,
}

/// All gauge readings of one collection cycle, stamped with identity.
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeEnvelope {
    pub source_id: String,
    /// Decimal form of the emitter's instance ID.
    pub instance_id: String,
    /// Values in metric order; duplicates are kept.
    pub values: Vec<GaugeValue>,
}

impl GaugeEnvelope {
    /// Look up a value by name. With duplicate names the last one wins,
    /// matching what lands in the wire envelope's gauge map.
    pub fn value(&self, name: &str) -> Option<&GaugeValue> {
        self.values.iter().rev().find(|v| v.name == name)
    }

    /// Convert to a Loggregator v2 envelope stamped with `timestamp_ns`.
    pub fn to_proto(&self, timestamp_ns: i64) -> proto::Envelope {
        let metrics: HashMap<String, proto::GaugeValue> = self
            .values
            .iter()
            .map(|v| {
                (
                    v.name.clone(),
                    proto::GaugeValue {
                        unit: v.unit.clone(),
                        value: v.value,
                    },
                )
            })
            .collect();

        proto::Envelope {
            timestamp: timestamp_ns,
            source_id: self.source_id.clone(),
            instance_id: self.instance_id.clone(),
            tags: HashMap::new(),
            message: Some(proto::envelope::Message::Gauge(proto::Gauge { metrics })),
        }
    }
}

/// A streaming gauge ingestion client.
///
/// Delivery is the client's own concern; callers hand over an envelope
/// and move on.
pub trait GaugeIngressClient: Send + Sync {
    fn emit_gauge(&self, envelope: GaugeEnvelope);
}

impl<T: GaugeIngressClient + ?Sized> GaugeIngressClient for Arc<T> {
    fn emit_gauge(&self, envelope: GaugeEnvelope) {
        (**self).emit_gauge(envelope)
    }
}

pub(crate) fn now_nanos() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as i64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(name: &str, value: f64, unit: &str) -> GaugeValue {
        GaugeValue {
            name: name.to_string(),
            value,
            unit: unit.to_string(),
        }
    }

    #[test]
    fn to_proto_carries_identity_and_values() {
        let envelope = GaugeEnvelope {
            source_id: "source-1".to_string(),
            instance_id: "3".to_string(),
            values: vec![value("metric-1", 0.1, "s"), value("metric-2", 1.3, "s")],
        };

        let proto = envelope.to_proto(42);
        assert_eq!(proto.timestamp, 42);
        assert_eq!(proto.source_id, "source-1");
        assert_eq!(proto.instance_id, "3");

        let gauge = proto.gauge().unwrap();
        assert_eq!(gauge.metrics.len(), 2);
        assert_eq!(
            gauge.metrics["metric-1"],
            proto::GaugeValue {
                unit: "s".to_string(),
                value: 0.1
            }
        );
        assert_eq!(gauge.metrics["metric-2"].value, 1.3);
    }

    #[test]
    fn duplicate_names_last_one_wins() {
        let envelope = GaugeEnvelope {
            source_id: "s".to_string(),
            instance_id: "0".to_string(),
            values: vec![value("dup", 1.0, "s"), value("dup", 2.0, "ms")],
        };

        assert_eq!(envelope.value("dup").map(|v| v.value), Some(2.0));
        let proto = envelope.to_proto(0);
        let gauge = proto.gauge().unwrap();
        assert_eq!(gauge.metrics.len(), 1);
        assert_eq!(gauge.metrics["dup"].unit, "ms");
    }

    #[test]
    fn now_nanos_is_positive() {
        assert!(now_nanos() > 0);
    }
}
