//! Subscriber setup (§10.2): one `EnvFilter`-driven subscriber per process,
//! `--log-level` as the default directive and `--log-format` choosing
//! between a human-readable `pretty` layer and a `json` layer for piping
//! into log aggregation.

use crate::args::{LogFormat, LogLevel};
use tracing_subscriber::EnvFilter;

pub fn init(level: LogLevel, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Pretty => subscriber.init(),
        LogFormat::Json => subscriber.json().init(),
    }
}
