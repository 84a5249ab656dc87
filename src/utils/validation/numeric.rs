//! Numeric validation utilities
//!
//! Range checks for the tuning parameters and encoder settings that arrive
//! from user input.

use crate::error::{CompositeError, Result};

/// Upper bound of the erode radius accepted by matte providers
pub const MAX_ERODE_SIZE: u8 = 20;

/// Validator for numeric parameters
pub struct NumericValidator;

impl NumericValidator {
    /// Validate quality setting (0-100)
    pub fn validate_quality(value: u8) -> Result<u8> {
        if value > 100 {
            return Err(CompositeError::config_value_error(
                "JPEG quality",
                value,
                "0-100",
                Some(90),
            ));
        }
        Ok(value)
    }

    /// Validate erode radius (0-20)
    pub fn validate_erode_size(value: u8) -> Result<u8> {
        if value > MAX_ERODE_SIZE {
            return Err(CompositeError::config_value_error(
                "erode size",
                value,
                "0-20",
                Some(12),
            ));
        }
        Ok(value)
    }

    /// Validate raster dimensions for compositing (both sides at least 1)
    pub fn validate_dimensions(width: u32, height: u32) -> Result<(u32, u32)> {
        if width == 0 || height == 0 {
            return Err(CompositeError::invalid_input(format!(
                "raster must be at least 1x1, got {}x{}",
                width, height
            )));
        }
        Ok((width, height))
    }

    /// Check that two rasters share width and height
    pub fn validate_same_dimensions(
        expected: (u32, u32),
        actual: (u32, u32),
        what: &str,
    ) -> Result<()> {
        if expected != actual {
            return Err(CompositeError::matte_provider(format!(
                "{} is {}x{} but the input is {}x{}",
                what, actual.0, actual.1, expected.0, expected.1
            )));
        }
        Ok(())
    }
}
