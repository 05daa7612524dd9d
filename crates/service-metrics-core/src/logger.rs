//! Logging seam for the collection pipeline.
//!
//! Pipeline steps report through `Logger` instead of calling `tracing`
//! directly so that tests can observe exactly which actions were logged.
//! `TracingLogger` is the production implementation.

use std::collections::BTreeMap;
use std::error::Error;

use tracing::{error, info};

/// Structured data attached to a log event.
pub type LogData = BTreeMap<&'static str, String>;

/// Sink for pipeline events. Logging has no failure mode.
pub trait Logger: Send + Sync {
    fn info(&self, action: &str, data: LogData);

    fn error(&self, action: &str, err: &(dyn Error + 'static), data: LogData);
}

/// Forwards pipeline events to `tracing`.
#[derive(Debug, Clone)]
pub struct TracingLogger {
    component: String,
}

impl TracingLogger {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
        }
    }

    pub fn component(&self) -> &str {
        &self.component
    }
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new("service-metrics")
    }
}

impl Logger for TracingLogger {
    fn info(&self, action: &str, data: LogData) {
        info!(component = %self.component, action, data = ?data, "{action}");
    }

    fn error(&self, action: &str, err: &(dyn Error + 'static), data: LogData) {
        error!(
            component = %self.component,
            action,
            error = %err,
            data = ?data,
            "{action}"
        );
    }
}
