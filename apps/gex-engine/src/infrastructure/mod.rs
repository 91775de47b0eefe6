//! Market-data collaborators.
//!
//! The core never retrieves quotes itself. It consumes chain snapshots through
//! the [`ChainProvider`] port:
//!
//! - [`InMemoryChainProvider`]: seeded snapshots with injectable failures and
//!   latency, for tests and embedding
//! - [`SnapshotDirectory`]: replays JSON snapshots from disk

mod chain_provider;
mod in_memory;
mod snapshot_dir;

pub use chain_provider::{ChainProvider, ChainProviderError};
pub use in_memory::InMemoryChainProvider;
pub use snapshot_dir::{MarketSnapshot, SnapshotDirectory};
