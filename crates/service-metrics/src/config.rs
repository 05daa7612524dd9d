//! Command-line flags and the immutable runtime configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "service-metrics",
    about = "Runs a metrics command on an interval and emits its output as gauges to a Loggregator agent",
    version
)]
pub struct Cli {
    /// Source name for metrics emitted by this process, e.g. service-name.
    #[arg(long, value_parser = non_empty)]
    pub origin: String,

    /// Loggregator agent address, e.g. localhost:3458.
    #[arg(long, value_parser = non_empty)]
    pub agent_addr: String,

    /// Path to the metrics command.
    #[arg(long, value_parser = non_empty)]
    pub metrics_cmd: String,

    /// Argument to pass on to the metrics command (repeatable).
    #[arg(long = "metrics-cmd-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub metrics_cmd_args: Vec<String>,

    /// Interval between metrics command runs, e.g. 30s, 1m, 1m30s.
    #[arg(long, default_value = "1m", value_parser = parse_duration)]
    pub metrics_interval: Duration,

    /// Path to the CA certificate.
    #[arg(long, value_parser = non_empty)]
    pub ca: String,

    /// Path to the client TLS certificate.
    #[arg(long, value_parser = non_empty)]
    pub cert: String,

    /// Path to the client TLS private key.
    #[arg(long, value_parser = non_empty)]
    pub key: String,

    /// Initial instance ID attached to emitted envelopes.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub instance_id: i64,

    /// Output debug logging.
    #[arg(long)]
    pub debug: bool,
}

/// Runtime configuration, fixed for the life of the process.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub origin: String,
    pub agent_addr: String,
    pub metrics_cmd: PathBuf,
    pub metrics_cmd_args: Vec<String>,
    pub metrics_interval: Duration,
    pub ca_path: PathBuf,
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
    pub instance_id: i64,
    pub debug: bool,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Self {
            origin: cli.origin,
            agent_addr: cli.agent_addr,
            metrics_cmd: PathBuf::from(cli.metrics_cmd),
            metrics_cmd_args: cli.metrics_cmd_args,
            metrics_interval: cli.metrics_interval,
            ca_path: PathBuf::from(cli.ca),
            cert_path: PathBuf::from(cli.cert),
            key_path: PathBuf::from(cli.key),
            instance_id: cli.instance_id,
            debug: cli.debug,
        }
    }
}

fn non_empty(value: &str) -> Result<String, String> {
    if value.trim().is_empty() {
        Err("must not be empty".to_string())
    } else {
        Ok(value.to_string())
    }
}

/// Parse a duration such as `500ms`, `30s`, `1m30s`, `1.5h` or a bare
/// number of seconds. Zero is rejected.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let s = input.trim();
    if s.is_empty() {
        return Err("empty duration".to_string());
    }
    if let Ok(secs) = s.parse::<u64>() {
        return positive(Duration::from_secs(secs), input);
    }

    let mut rest = s;
    let mut total_nanos = 0.0_f64;
    while !rest.is_empty() {
        let num_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if num_len == 0 {
            return Err(format!("invalid duration {input:?}"));
        }
        let value: f64 = rest[..num_len]
            .parse()
            .map_err(|_| format!("invalid duration {input:?}"))?;
        rest = &rest[num_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let scale = match &rest[..unit_len] {
            "h" => 3.6e12,
            "m" => 6e10,
            "s" => 1e9,
            "ms" => 1e6,
            "us" | "µs" => 1e3,
            "ns" => 1.0,
            "" => return Err(format!("missing unit in duration {input:?}")),
            unit => return Err(format!("unknown unit {unit:?} in duration {input:?}")),
        };
        total_nanos += value * scale;
        rest = &rest[unit_len..];
    }

    positive(Duration::from_nanos(total_nanos.round() as u64), input)
}

fn positive(duration: Duration, input: &str) -> Result<Duration, String> {
    if duration.is_zero() {
        Err(format!("duration {input:?} must be greater than zero"))
    } else {
        Ok(duration)
    }
}
