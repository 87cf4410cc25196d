//! Logging setup for the `slidedeck` binary.
//!
//! The engine logs through `tracing`; this installs a compact stderr
//! subscriber for it.
//!
//! - no flag: warnings (failed storage writes)
//! - `-v`: mode changes and attach summaries
//! - `-vv`: every slide activation
//! - `-vvv`: key routing and storage traffic
//!
//! `RUST_LOG` overrides all of the above.

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    pub with_ansi: bool,
    pub with_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            with_ansi: true,
            with_target: false,
        }
    }
}

impl LogConfig {
    pub fn from_flags(verbose: u8, quiet: bool, no_color: bool) -> Self {
        let level = if quiet {
            Level::ERROR
        } else {
            match verbose {
                0 => Level::WARN,
                1 => Level::INFO,
                2 => Level::DEBUG,
                _ => Level::TRACE,
            }
        };
        Self {
            level,
            with_ansi: !no_color,
            with_target: verbose > 2,
        }
    }
}

pub fn init_logging(config: &LogConfig) {
    let layer = fmt::layer()
        .compact()
        .without_time()
        .with_writer(std::io::stderr)
        .with_ansi(config.with_ansi)
        .with_target(config.with_target);

    tracing_subscriber::registry()
        .with(build_env_filter(config.level))
        .with(layer)
        .init();
}

fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = level.as_str().to_lowercase();
        // Dependencies stay at warn
        EnvFilter::new(format!("warn,slidedeck={level}"))
    })
}
