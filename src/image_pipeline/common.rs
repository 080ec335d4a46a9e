//! Shared pipeline definitions
//!
//! Error type and result alias used by readers, writers and the conversion loop.

pub mod error;

pub use error::{ConversionError, Result};
