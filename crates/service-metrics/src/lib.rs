//! service-metrics — periodic metrics collection and egress.
//!
//! Runs an external metrics command on a fixed interval, interprets its
//! exit status, decodes its JSON output and forwards the readings as
//! gauges through an `EgressClient`.
//!
//! # Architecture
//!
//! ```text
//! Scheduler (once at startup, then every interval)
//!   └── Processor::process()
//!       ├── executor::run() → Success | NotReady (exit 10) | Failure
//!       ├── Metrics::decode() on Success
//!       └── EgressClient::emit()
//! ```
//!
//! Fatal conditions (launch failure, command failure, undecodable output)
//! are returned as `ProcessError` and end the scheduler loop; the binary
//! turns them into exit status 1.

pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod processor;
pub mod scheduler;

pub use config::{Cli, Config};
pub use error::ProcessError;
pub use executor::ExecutionOutcome;
pub use processor::{CycleOutcome, Processor};
pub use scheduler::{Cycle, Scheduler};
