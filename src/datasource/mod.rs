//! Data source contract, shared lifecycle and the Vite backend

pub mod base;
pub mod decode;
pub mod method_index;
pub mod source;
pub mod vite;

pub use base::*;
pub use decode::*;
pub use method_index::*;
pub use source::*;
pub use vite::*;
