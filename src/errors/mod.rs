//! Error handling for the data source layer

pub mod data_source_error;

pub use data_source_error::*;
