//! Process-level log sinks.
//!
//! JSON lines go to stdout at INFO (DEBUG with `--debug`, or whatever
//! `RUST_LOG` says), and errors are repeated on stderr.

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Default stdout filter directive.
pub fn default_directive(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "info"
    }
}

/// Install the global subscriber.
pub fn init(debug: bool) -> anyhow::Result<()> {
    let stdout_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(debug)))?;

    let stdout = fmt::layer()
        .json()
        .with_writer(std::io::stdout)
        .with_filter(stdout_filter);
    let stderr = fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .with_filter(LevelFilter::ERROR);

    tracing_subscriber::registry()
        .with(stdout)
        .with(stderr)
        .try_init()?;
    Ok(())
}
