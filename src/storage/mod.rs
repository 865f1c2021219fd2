//! Descriptor storage and file operations

pub mod contracts;

pub use contracts::*;
