//! Event publication and subscription

pub mod bus;

pub use bus::*;
