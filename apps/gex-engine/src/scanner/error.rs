//! Per-symbol scan failures.

use serde::{Deserialize, Serialize};

use crate::infrastructure::ChainProviderError;

/// Why one symbol in a scan produced no analysis.
///
/// Failures are recorded on the symbol's [`ScanResult`](crate::models::ScanResult)
/// and never abort sibling tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScanFailure {
    /// The chain provider returned an error.
    #[error("fetch failed: {message}")]
    Fetch {
        /// Provider error message.
        message: String,
    },

    /// The chain had no usable expirations or spot price.
    #[error("no chain data")]
    NoChainData,

    /// The task exceeded its time ceiling.
    #[error("timed out after {secs}s")]
    Timeout {
        /// Ceiling in seconds.
        secs: u64,
    },

    /// The task panicked or was cancelled.
    #[error("task aborted: {message}")]
    TaskAborted {
        /// Join error message.
        message: String,
    },
}

impl ScanFailure {
    /// Short label for metrics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Fetch { .. } => "fetch_error",
            Self::NoChainData => "no_chain_data",
            Self::Timeout { .. } => "timeout",
            Self::TaskAborted { .. } => "aborted",
        }
    }
}

impl From<ChainProviderError> for ScanFailure {
    fn from(err: ChainProviderError) -> Self {
        Self::Fetch {
            message: err.to_string(),
        }
    }
}
