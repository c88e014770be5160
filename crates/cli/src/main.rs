//! gmu - S3 path and object store toolkit
//!
//! A thin command-line surface over the gmu ObjectStore operations.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use gmu_cli::commands::{self, Cli};
use gmu_core::telemetry;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if let Some(addr) = telemetry::statsd_address() {
        tracing::debug!(statsd = %addr, sample_rate = telemetry::DD_ALWAYS_SAMPLE, "datadog agent configured");
    }

    let exit_code = commands::execute(cli).await;

    std::process::exit(exit_code.as_i32());
}
