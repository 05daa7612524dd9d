//! service-metrics-egress — forwards decoded metrics as gauge telemetry.
//!
//! Converts a cycle's `Metrics` into a single gauge envelope stamped with
//! the configured source and instance identity, and ships envelopes to a
//! Loggregator v2 agent over mutually-authenticated gRPC.
//!
//! # Architecture
//!
//! ```text
//! EgressClient
//!   ├── emit(metrics, logger) → one GaugeEnvelope per non-empty cycle
//!   └── set_instance_id() (atomic, settable after startup)
//!
//! GaugeIngressClient (trait)
//!   └── IngressClient
//!       ├── emit_gauge() → unbounded queue, never blocks
//!       └── background sender: batch by size / flush interval
//!           └── loggregator.v2.Ingress/Send over tonic + TLS
//! ```

pub mod emitter;
pub mod envelope;
pub mod error;
pub mod ingress;
pub mod proto;
pub mod tls;

pub use emitter::EgressClient;
pub use envelope::{GaugeEnvelope, GaugeIngressClient, GaugeValue};
pub use error::EgressError;
pub use ingress::{IngressClient, IngressOptions};
pub use tls::IngressTlsConfig;
