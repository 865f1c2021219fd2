//! Core data types and structures

pub mod contract;
pub mod pools;
pub mod token;

pub use contract::*;
pub use pools::*;
pub use token::*;
