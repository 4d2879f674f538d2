//! Tracing subscriber setup.
//!
//! The library itself only emits `tracing` events: a `build_id` span per
//! resolution, `debug!` per strategy and `warn!` for ambiguous notes.
//! Binaries and the Python extension call one of the `init_*` functions to
//! get them printed. Filtering follows `RUST_LOG` and defaults to `info`.

use std::sync::Once;
use tracing::{debug, error, info, trace, warn};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

static INIT: Once = Once::new();

const DEFAULT_FILTER: &str = "info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a human-readable subscriber. Later calls are ignored.
pub fn init_tracing() {
    INIT.call_once(|| {
        let fmt_layer = fmt::layer()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .with_thread_names(true);

        // A host application may already own the global subscriber
        let _ = tracing_subscriber::registry()
            .with(env_filter())
            .with(fmt_layer)
            .try_init();

        debug!("buildid tracing initialized");
    });
}

/// Install a JSON subscriber carrying the current span's fields.
pub fn init_tracing_json() {
    INIT.call_once(|| {
        let fmt_layer = fmt::layer()
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .with_current_span(true);

        let _ = tracing_subscriber::registry()
            .with(env_filter())
            .with(fmt_layer)
            .try_init();

        debug!("buildid tracing initialized (JSON mode)");
    });
}

/// Log levels for Python integration
#[cfg(feature = "python-ext")]
#[pyo3::prelude::pyclass]
#[derive(Debug, Clone, Copy)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[cfg(feature = "python-ext")]
#[pyo3::prelude::pymethods]
impl LogLevel {
    fn __str__(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

/// Initialize logging from Python
#[cfg(feature = "python-ext")]
#[pyo3::prelude::pyfunction]
pub fn init_logging(json: bool) {
    if json {
        init_tracing_json();
    } else {
        init_tracing();
    }
}

/// Log a message from Python through the same subscriber
#[cfg(feature = "python-ext")]
#[pyo3::prelude::pyfunction]
pub fn log_message(level: LogLevel, message: &str) {
    log_at(to_tracing_level(level), message);
}

#[cfg(feature = "python-ext")]
fn to_tracing_level(level: LogLevel) -> tracing::Level {
    match level {
        LogLevel::Trace => tracing::Level::TRACE,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Error => tracing::Level::ERROR,
    }
}

/// Emit `message` at `level`; `tracing` macros need the level at compile time.
pub fn log_at(level: tracing::Level, message: &str) {
    match level {
        tracing::Level::TRACE => trace!("{}", message),
        tracing::Level::DEBUG => debug!("{}", message),
        tracing::Level::INFO => info!("{}", message),
        tracing::Level::WARN => warn!("{}", message),
        _ => error!("{}", message),
    }
}
