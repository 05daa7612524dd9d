//! service-metrics-core — shared types for the service-metrics pipeline.
//!
//! Holds the metric data model produced by an external metrics command,
//! the strict decoder for its JSON output, and the `Logger` seam through
//! which every pipeline step reports what it did.
//!
//! # Architecture
//!
//! ```text
//! metrics command output (bytes)
//!   └── Metrics::decode() → Metrics (ordered Vec<Metric>)
//!
//! Logger (trait)
//!   ├── info(action, data)
//!   ├── error(action, err, data)
//!   └── TracingLogger → tracing events
//! ```

pub mod error;
pub mod logger;
pub mod metric;

pub use error::DecodeError;
pub use logger::{LogData, Logger, TracingLogger};
pub use metric::{Metric, Metrics};
