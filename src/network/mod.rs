//! Ledger transport and remote data providers

pub mod ledger;
pub mod prices;
pub mod retry;
pub mod token_detail;

pub use ledger::*;
pub use prices::*;
pub use retry::*;
pub use token_detail::*;
