//! Vite Pools - staking-pool data source for the Vite ledger
//!
//! Exposes pool, user-stake, token and network-height data through the
//! [`DataSource`] contract. [`ViteDataSource`] resolves off-chain methods from
//! the contract ABI, calls them over JSON-RPC and decodes their results,
//! caching chain height and token details along the way.

pub mod cache;
pub mod config;
pub mod datasource;
pub mod errors;
pub mod events;
pub mod network;
pub mod pools;
pub mod storage;
pub mod types;
pub mod utils;
pub mod wallet;

// Re-export commonly used items
pub use config::{CONFIG, Config};
pub use datasource::{DataSource, DataSourceCore, ViteDataSource};
pub use errors::{DataSourceError, DataSourceResult};
pub use types::*;
