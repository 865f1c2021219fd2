//! Pool APR and list filtering

pub mod apr;
pub mod filter;

pub use apr::*;
pub use filter::*;
