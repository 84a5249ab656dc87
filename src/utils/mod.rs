//! Shared utilities for color parsing and parameter validation

pub mod color;
pub mod validation;

pub use color::ColorParser;
pub use validation::{NumericValidator, MAX_ERODE_SIZE};
