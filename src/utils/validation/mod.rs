//! Input validation helpers

pub mod numeric;

pub use numeric::{NumericValidator, MAX_ERODE_SIZE};
