//! Chain Provider Port (Driven Port)
//!
//! Interface for fetching option chain snapshots from an external provider.

use async_trait::async_trait;

use crate::models::ChainSnapshot;

/// Chain provider error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ChainProviderError {
    /// No chain exists for the symbol.
    #[error("Symbol not found: {symbol}")]
    SymbolNotFound {
        /// The unknown symbol.
        symbol: String,
    },

    /// The symbol is not a valid ticker.
    #[error("Invalid symbol: {symbol:?}")]
    InvalidSymbol {
        /// The rejected symbol.
        symbol: String,
    },

    /// Provider could not serve the request.
    #[error("Chain data unavailable: {message}")]
    DataUnavailable {
        /// Error details.
        message: String,
    },

    /// Provider returned data that could not be decoded.
    #[error("Malformed chain data for {symbol}: {message}")]
    Malformed {
        /// Symbol being decoded.
        symbol: String,
        /// Decoder message.
        message: String,
    },
}

/// Port for fetching chain snapshots.
///
/// Implementations are shared by every in-flight scan task and must tolerate
/// concurrent calls.
#[async_trait]
pub trait ChainProvider: Send + Sync {
    /// Fetch the chain snapshot for one symbol.
    async fn fetch_chain(&self, symbol: &str) -> Result<ChainSnapshot, ChainProviderError>;

    /// Current volatility index level.
    async fn volatility_index(&self) -> Result<f64, ChainProviderError>;
}
