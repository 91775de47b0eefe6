//! In-memory chain provider for testing.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::chain_provider::{ChainProvider, ChainProviderError};
use crate::models::ChainSnapshot;

/// In-memory implementation of [`ChainProvider`].
///
/// Serves seeded snapshots, with optional per-symbol failures and latency.
/// Suitable for testing and development.
#[derive(Debug, Default)]
pub struct InMemoryChainProvider {
    snapshots: RwLock<HashMap<String, ChainSnapshot>>,
    failures: RwLock<HashMap<String, ChainProviderError>>,
    delays: RwLock<HashMap<String, Duration>>,
    volatility_index: RwLock<Option<f64>>,
}

impl InMemoryChainProvider {
    /// Create an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a snapshot, keyed by its symbol.
    pub fn insert(&self, snapshot: ChainSnapshot) {
        self.snapshots
            .write()
            .insert(snapshot.symbol.clone(), snapshot);
    }

    /// Make `symbol` fail with `error`.
    pub fn fail(&self, symbol: impl Into<String>, error: ChainProviderError) {
        self.failures.write().insert(symbol.into(), error);
    }

    /// Delay responses for `symbol`.
    pub fn delay(&self, symbol: impl Into<String>, delay: Duration) {
        self.delays.write().insert(symbol.into(), delay);
    }

    /// Set the volatility index; unset means unavailable.
    pub fn set_volatility_index(&self, value: f64) {
        *self.volatility_index.write() = Some(value);
    }

    /// Number of seeded snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.read().len()
    }

    /// Whether no snapshots are seeded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.read().is_empty()
    }
}

#[async_trait]
impl ChainProvider for InMemoryChainProvider {
    async fn fetch_chain(&self, symbol: &str) -> Result<ChainSnapshot, ChainProviderError> {
        let delay = self.delays.read().get(symbol).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.failures.read().get(symbol) {
            return Err(error.clone());
        }

        self.snapshots
            .read()
            .get(symbol)
            .cloned()
            .ok_or_else(|| ChainProviderError::SymbolNotFound {
                symbol: symbol.to_string(),
            })
    }

    async fn volatility_index(&self) -> Result<f64, ChainProviderError> {
        (*self.volatility_index.read()).ok_or_else(|| ChainProviderError::DataUnavailable {
            message: "volatility index not set".to_string(),
        })
    }
}
