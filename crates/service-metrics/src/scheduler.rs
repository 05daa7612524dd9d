//! Fixed-interval collection loop.
//!
//! Runs a cycle at startup, then waits `interval` after each cycle
//! finishes before starting the next one. Cycles never overlap, and a
//! slow cycle pushes the following ones back instead of queueing them.

use std::future::Future;
use std::time::Duration;

use service_metrics_egress::GaugeIngressClient;
use tokio::sync::watch;
use tracing::info;

use crate::error::ProcessResult;
use crate::processor::{CycleOutcome, Processor};

/// A unit of work the scheduler repeats.
pub trait Cycle {
    fn run_cycle(&self) -> impl Future<Output = ProcessResult<CycleOutcome>>;
}

impl<C: GaugeIngressClient> Cycle for Processor<C> {
    fn run_cycle(&self) -> impl Future<Output = ProcessResult<CycleOutcome>> {
        self.process()
    }
}

pub struct Scheduler<P> {
    cycle: P,
    interval: Duration,
}

impl<P: Cycle> Scheduler<P> {
    pub fn new(cycle: P, interval: Duration) -> Self {
        Self { cycle, interval }
    }

    pub fn cycle(&self) -> &P {
        &self.cycle
    }

    /// Run until shutdown or the first fatal cycle error.
    ///
    /// Shutdown is only observed between cycles; a running cycle is
    /// allowed to finish.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> ProcessResult<()> {
        info!(interval = ?self.interval, "metrics scheduler started");

        self.cycle.run_cycle().await?;

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {
                    self.cycle.run_cycle().await?;
                }
                _ = shutdown.changed() => {
                    info!("metrics scheduler shutting down");
                    break;
                }
            }
        }

        Ok(())
    }
}
