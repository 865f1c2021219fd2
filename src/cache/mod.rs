//! Caching primitives

pub mod cached_call;
pub mod token_cache;

pub use cached_call::*;
pub use token_cache::*;
