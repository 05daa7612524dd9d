//! service-metrics — emits the output of a metrics command as gauges.
//!
//! # Usage
//!
//! ```text
//! service-metrics --origin redis --agent-addr localhost:3458 \
//!     --metrics-cmd /var/vcap/jobs/redis/bin/metrics \
//!     --metrics-cmd-arg -config --metrics-cmd-arg /etc/redis.yml \
//!     --ca ca.pem --cert client.pem --key client.key
//! ```
//!
//! Exits 1 on bad flags, TLS or client setup failure, or any fatal
//! collection cycle (command could not run, failed, or printed
//! something other than a metrics array).

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info, warn};

use service_metrics::{logging, Cli, Config, Processor, Scheduler};
use service_metrics_core::{Logger, TracingLogger};
use service_metrics_egress::{EgressClient, IngressClient, IngressOptions, IngressTlsConfig};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    let config = Config::from(cli);

    if let Err(e) = logging::init(config.debug) {
        eprintln!("failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "service-metrics exiting");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    info!(
        origin = %config.origin,
        agent_addr = %config.agent_addr,
        command = %config.metrics_cmd.display(),
        interval = ?config.metrics_interval,
        "service-metrics starting"
    );

    let tls = IngressTlsConfig::load(&config.ca_path, &config.cert_path, &config.key_path)
        .inspect_err(|e| error!(error = %e, "Failed to load TLS config"))?;

    let (ingress, sender) =
        IngressClient::connect(&config.agent_addr, &tls, IngressOptions::default())
            .inspect_err(|e| error!(error = %e, "Failed to initialize loggregator client"))?;

    let egress = Arc::new(EgressClient::new(ingress, config.origin.clone()));
    egress.set_instance_id(config.instance_id);

    let logger: Arc<dyn Logger> = Arc::new(TracingLogger::default());
    let processor = Processor::new(
        egress,
        logger,
        config.metrics_cmd.clone(),
        config.metrics_cmd_args.clone(),
    );
    let scheduler = Scheduler::new(processor, config.metrics_interval);

    // ── Shutdown signal ────────────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("shutdown signal received");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                warn!(error = %e, "failed to install CTRL+C handler");
                std::future::pending::<()>().await;
            }
        }
    });

    scheduler.run(shutdown_rx).await?;

    // Dropping the last ingress handle lets the sender flush and exit.
    drop(scheduler);
    let _ = sender.await;

    info!("service-metrics stopped");
    Ok(())
}
