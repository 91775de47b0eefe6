//! Snapshot directory replay provider.
//!
//! Serves chains previously captured to disk, one JSON document per symbol:
//!
//! ```text
//! <dir>/SPY.json      ChainSnapshot
//! <dir>/QQQ.json      ChainSnapshot
//! <dir>/market.json   {"volatility_index": 17.4}
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::chain_provider::{ChainProvider, ChainProviderError};
use crate::models::ChainSnapshot;

const MARKET_FILE: &str = "market.json";

/// Market-wide values stored next to the chain snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Volatility index level.
    pub volatility_index: f64,
}

/// [`ChainProvider`] backed by a directory of JSON snapshots.
#[derive(Debug, Clone)]
pub struct SnapshotDirectory {
    root: PathBuf,
    max_days_to_expiry: i64,
}

impl SnapshotDirectory {
    /// Create a provider over `root`, retaining expirations with
    /// `0 < days_to_expiry <= max_days_to_expiry`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, max_days_to_expiry: i64) -> Self {
        Self {
            root: root.into(),
            max_days_to_expiry,
        }
    }

    /// Directory being served.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Tickers are letters and digits with inner `.` or `-` (`BRK.B`), which
    /// keeps every path a plain file name directly under `root`.
    fn chain_path(&self, symbol: &str) -> Result<PathBuf, ChainProviderError> {
        let valid = symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
            && symbol.starts_with(|c: char| c.is_ascii_alphanumeric());
        if !valid {
            return Err(ChainProviderError::InvalidSymbol {
                symbol: symbol.to_string(),
            });
        }
        Ok(self
            .root
            .join(format!("{}.json", symbol.to_ascii_uppercase())))
    }

    /// Write a snapshot to `<dir>/<SYMBOL>.json`.
    pub async fn save(&self, snapshot: &ChainSnapshot) -> Result<(), ChainProviderError> {
        let json = serde_json::to_vec_pretty(snapshot).map_err(|e| ChainProviderError::Malformed {
            symbol: snapshot.symbol.clone(),
            message: e.to_string(),
        })?;
        let path = self.chain_path(&snapshot.symbol)?;
        write_file(&self.root, &path, json).await
    }

    /// Write `<dir>/market.json`.
    pub async fn save_market(&self, market: MarketSnapshot) -> Result<(), ChainProviderError> {
        let json = serde_json::to_vec_pretty(&market).map_err(|e| ChainProviderError::Malformed {
            symbol: MARKET_FILE.to_string(),
            message: e.to_string(),
        })?;
        write_file(&self.root, &self.root.join(MARKET_FILE), json).await
    }
}

async fn write_file(root: &Path, path: &Path, bytes: Vec<u8>) -> Result<(), ChainProviderError> {
    tokio::fs::create_dir_all(root)
        .await
        .map_err(|e| unavailable(root, &e))?;
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| unavailable(path, &e))
}

fn unavailable(path: &Path, error: &std::io::Error) -> ChainProviderError {
    ChainProviderError::DataUnavailable {
        message: format!("{}: {error}", path.display()),
    }
}

#[async_trait]
impl ChainProvider for SnapshotDirectory {
    async fn fetch_chain(&self, symbol: &str) -> Result<ChainSnapshot, ChainProviderError> {
        let path = self.chain_path(symbol)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ChainProviderError::SymbolNotFound {
                    symbol: symbol.to_string(),
                });
            }
            Err(e) => return Err(unavailable(&path, &e)),
        };

        let snapshot: ChainSnapshot =
            serde_json::from_slice(&bytes).map_err(|e| ChainProviderError::Malformed {
                symbol: symbol.to_string(),
                message: e.to_string(),
            })?;

        let before = snapshot.expirations.len();
        let snapshot = snapshot.within_horizon(self.max_days_to_expiry);
        debug!(
            symbol = %symbol,
            expirations = snapshot.expirations.len(),
            dropped = before - snapshot.expirations.len(),
            "Loaded chain snapshot"
        );

        Ok(snapshot)
    }

    async fn volatility_index(&self) -> Result<f64, ChainProviderError> {
        let path = self.root.join(MARKET_FILE);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| unavailable(&path, &e))?;
        let market: MarketSnapshot =
            serde_json::from_slice(&bytes).map_err(|e| ChainProviderError::Malformed {
                symbol: MARKET_FILE.to_string(),
                message: e.to_string(),
            })?;
        Ok(market.volatility_index)
    }
}
