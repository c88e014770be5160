//! Telemetry constants shared by services that host the client

/// Environment variable holding the Datadog agent host name
pub const DATADOG_AGENT_ENV: &str = "DD_AGENT_HOST";

/// Default Datadog statsd port
pub const DATADOG_STATSD_PORT: u16 = 8125;

/// Sample rate for Datadog counters. Counters take a rate in `0.0..=1.0`;
/// `1.0` sends every value instead of subsampling.
pub const DD_ALWAYS_SAMPLE: f64 = 1.0;

/// `host:port` of the statsd agent, if `DD_AGENT_HOST` is set
pub fn statsd_address() -> Option<String> {
    statsd_address_from(std::env::var(DATADOG_AGENT_ENV).ok())
}

fn statsd_address_from(host: Option<String>) -> Option<String> {
    host.map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
        .map(|h| format!("{h}:{DATADOG_STATSD_PORT}"))
}
