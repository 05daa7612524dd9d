//! One collection cycle: execute, decode, emit.

use std::path::PathBuf;
use std::sync::Arc;

use service_metrics_core::{LogData, Logger, Metrics};
use service_metrics_egress::{EgressClient, GaugeIngressClient};

use crate::error::{ProcessError, ProcessResult};
use crate::executor::{self, ExecutionOutcome};

const EXECUTE_ACTION: &str = "executing-metrics-cmd";
const PARSE_ACTION: &str = "parsing-metrics-output";
const LAUNCH_FAILED_OUTPUT: &str = "no metrics command has been configured, cannot collect metrics";

/// How a non-fatal cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The command exited 10; nothing was decoded or emitted.
    NotReady,
    /// Output was decoded and handed to the emitter.
    Emitted { metrics: usize },
}

/// Runs the metrics command and forwards its output.
pub struct Processor<C> {
    egress: Arc<EgressClient<C>>,
    logger: Arc<dyn Logger>,
    command: PathBuf,
    args: Vec<String>,
}

impl<C: GaugeIngressClient> Processor<C> {
    pub fn new(
        egress: Arc<EgressClient<C>>,
        logger: Arc<dyn Logger>,
        command: impl Into<PathBuf>,
        args: Vec<String>,
    ) -> Self {
        Self {
            egress,
            logger,
            command: command.into(),
            args,
        }
    }

    pub fn egress(&self) -> &Arc<EgressClient<C>> {
        &self.egress
    }

    /// Run a single collection cycle.
    ///
    /// Each step's outcome is logged here; errors are returned for the
    /// caller to act on.
    pub async fn process(&self) -> ProcessResult<CycleOutcome> {
        self.logger
            .info(EXECUTE_ACTION, data([("event", "starting".to_string())]));

        let outcome = match executor::run(&self.command, &self.args).await {
            Ok(outcome) => outcome,
            Err(err) => {
                self.logger.error(
                    EXECUTE_ACTION,
                    &err,
                    data([
                        ("event", "failed".to_string()),
                        ("output", LAUNCH_FAILED_OUTPUT.to_string()),
                    ]),
                );
                return Err(err);
            }
        };

        let output = match outcome {
            ExecutionOutcome::Success(output) => output,
            ExecutionOutcome::NotReady(output) => {
                self.logger.info(
                    EXECUTE_ACTION,
                    data([
                        ("event", "not yet ready to emit metrics".to_string()),
                        ("output", lossy(&output)),
                    ]),
                );
                return Ok(CycleOutcome::NotReady);
            }
            ExecutionOutcome::Failure { output, status } => {
                let err = ProcessError::CommandFailed {
                    status,
                    output: lossy(&output),
                };
                self.logger.error(
                    EXECUTE_ACTION,
                    &err,
                    data([("event", "failed".to_string()), ("output", lossy(&output))]),
                );
                return Err(err);
            }
        };

        self.logger
            .info(EXECUTE_ACTION, data([("event", "done".to_string())]));

        let metrics = match Metrics::decode(&output) {
            Ok(metrics) => metrics,
            Err(err) => {
                self.logger.error(
                    PARSE_ACTION,
                    &err,
                    data([("event", "failed".to_string()), ("output", lossy(&output))]),
                );
                return Err(err.into());
            }
        };

        self.egress.emit(&metrics, self.logger.as_ref());
        Ok(CycleOutcome::Emitted {
            metrics: metrics.len(),
        })
    }
}

fn data<const N: usize>(pairs: [(&'static str, String); N]) -> LogData {
    LogData::from(pairs)
}

fn lossy(output: &[u8]) -> String {
    String::from_utf8_lossy(output).into_owned()
}
