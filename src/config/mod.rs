//! Settings file support
//!
//! See [`settings`] for the file format and lookup order.

pub mod settings;
pub mod validation;

pub use settings::{ExtractMethod, Settings};
