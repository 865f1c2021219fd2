//! Wallet account access

pub mod manager;

pub use manager::*;
