//! Deadlines around build ID resolution.
//!
//! Resolution is synchronous and has no cancellation point of its own. Callers
//! that cannot trust the filesystem (network mounts, FUSE) run it on tokio's
//! blocking pool and stop waiting after a deadline.

use crate::error::{BuildIdError, Result};
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error};

/// Default timeout duration in seconds
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Timeout for a single local file (in seconds)
pub const FAST_TIMEOUT_SECONDS: u64 = 5;

/// Timeout configuration for resolution
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Maximum duration for the operation
    pub duration: Duration,
    /// Whether to log timeout errors
    pub log_warnings: bool,
    /// Operation name for logging
    pub operation_name: String,
}

impl TimeoutConfig {
    pub fn new(seconds: u64, operation: impl Into<String>) -> Self {
        Self::from_duration(Duration::from_secs(seconds), operation)
    }

    pub fn from_duration(duration: Duration, operation: impl Into<String>) -> Self {
        Self {
            duration,
            log_warnings: true,
            operation_name: operation.into(),
        }
    }

    /// Create a fast timeout configuration (5 seconds)
    pub fn fast(operation: impl Into<String>) -> Self {
        Self::new(FAST_TIMEOUT_SECONDS, operation)
    }

    /// Create a default timeout configuration (30 seconds)
    pub fn default_timeout(operation: impl Into<String>) -> Self {
        Self::new(DEFAULT_TIMEOUT_SECONDS, operation)
    }
}

/// Execute an async operation with a timeout
pub async fn with_timeout<T, F>(config: TimeoutConfig, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    debug!(
        operation = %config.operation_name,
        seconds = config.duration.as_secs_f64(),
        "Starting operation with timeout"
    );

    match timeout(config.duration, future).await {
        Ok(result) => result,
        Err(_) => {
            if config.log_warnings {
                error!(
                    operation = %config.operation_name,
                    seconds = config.duration.as_secs_f64(),
                    "Operation timed out"
                );
            }

            Err(BuildIdError::Timeout {
                seconds: config.duration.as_secs(),
            })
        }
    }
}

/// Resolve the build ID of `path` on the blocking pool, bounded by `config`.
///
/// The blocking task is not interrupted on timeout; its result is discarded.
pub async fn build_id_with_timeout(path: impl Into<PathBuf>, config: TimeoutConfig) -> Result<String> {
    let path = path.into();
    let task = tokio::task::spawn_blocking(move || crate::buildid::build_id_from_path(&path));

    with_timeout(config, async move {
        task.await
            .map_err(|e| BuildIdError::Internal(format!("resolution task failed: {}", e)))?
    })
    .await
}
