//! Loggregator v2 wire types and the `Ingress` gRPC client.
//!
//! Only the subset of `loggregator.v2` needed to ship gauges is declared
//! here. Field numbers match the upstream `envelope.proto` and
//! `ingress.proto`, so the messages are wire-compatible with a stock
//! Loggregator agent.

use std::collections::HashMap;

use tonic::codec::ProstCodec;
use tonic::transport::Channel;

/// A single telemetry envelope.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Envelope {
    /// Nanoseconds since the Unix epoch.
    #[prost(int64, tag = "1")]
    pub timestamp: i64,
    #[prost(string, tag = "2")]
    pub source_id: String,
    #[prost(string, tag = "8")]
    pub instance_id: String,
    #[prost(map = "string, string", tag = "9")]
    pub tags: HashMap<String, String>,
    #[prost(oneof = "envelope::Message", tags = "6")]
    pub message: Option<envelope::Message>,
}

pub mod envelope {
    /// Envelope payload. Log, counter, timer and event payloads are never
    /// produced by this system.
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Message {
        #[prost(message, tag = "6")]
        Gauge(super::Gauge),
    }
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct EnvelopeBatch {
    #[prost(message, repeated, tag = "1")]
    pub batch: Vec<Envelope>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Gauge {
    #[prost(map = "string, message", tag = "1")]
    pub metrics: HashMap<String, GaugeValue>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct GaugeValue {
    #[prost(string, tag = "1")]
    pub unit: String,
    #[prost(double, tag = "2")]
    pub value: f64,
}

#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct SendResponse {}

impl Envelope {
    pub fn gauge(&self) -> Option<&Gauge> {
        match &self.message {
            Some(envelope::Message::Gauge(g)) => Some(g),
            None => None,
        }
    }
}

/// Client for the `loggregator.v2.Ingress` service.
#[derive(Debug, Clone)]
pub struct IngressServiceClient {
    inner: tonic::client::Grpc<Channel>,
}

impl IngressServiceClient {
    pub fn new(channel: Channel) -> Self {
        Self {
            inner: tonic::client::Grpc::new(channel),
        }
    }

    /// Unary `Send(EnvelopeBatch) returns (SendResponse)`.
    pub async fn send(
        &mut self,
        batch: EnvelopeBatch,
    ) -> Result<tonic::Response<SendResponse>, tonic::Status> {
        self.inner
            .ready()
            .await
            .map_err(|e| tonic::Status::unknown(format!("service was not ready: {e}")))?;
        let path = http::uri::PathAndQuery::from_static("/loggregator.v2.Ingress/Send");
        self.inner
            .unary(tonic::Request::new(batch), path, ProstCodec::default())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn gauge_envelope_survives_the_wire() {
        let mut metrics = HashMap::new();
        metrics.insert(
            "cpu".to_string(),
            GaugeValue {
                unit: "Percent".to_string(),
                value: 42.5,
            },
        );
        let envelope = Envelope {
            timestamp: 1_700_000_000_000_000_000,
            source_id: "redis".to_string(),
            instance_id: "3".to_string(),
            tags: HashMap::new(),
            message: Some(envelope::Message::Gauge(Gauge { metrics })),
        };

        let bytes = EnvelopeBatch {
            batch: vec![envelope.clone()],
        }
        .encode_to_vec();
        let decoded = EnvelopeBatch::decode(bytes.as_slice()).unwrap();

        assert_eq!(decoded.batch, vec![envelope]);
        let gauge = decoded.batch[0].gauge().unwrap();
        assert_eq!(gauge.metrics["cpu"].value, 42.5);
    }

    #[test]
    fn source_and_instance_use_loggregator_field_numbers() {
        let envelope = Envelope {
            timestamp: 0,
            source_id: "s".to_string(),
            instance_id: "i".to_string(),
            tags: HashMap::new(),
            message: None,
        };
        // tag 2, wire type 2 → 0x12; tag 8, wire type 2 → 0x42.
        assert_eq!(envelope.encode_to_vec(), vec![0x12, 1, b's', 0x42, 1, b'i']);
    }
}
