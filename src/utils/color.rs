//! Color parsing and conversion utilities
//!
//! Color strings come straight from user input (a color picker or a CLI
//! flag), so parsing is strict: exactly `#RRGGBB`, nothing is defaulted.

use crate::{
    config::BackgroundColor,
    error::{CompositeError, Result},
};

/// Utility for parsing and formatting `#RRGGBB` colors
pub struct ColorParser;

impl ColorParser {
    /// Parse a `#RRGGBB` color string into a `BackgroundColor`
    ///
    /// The leading `#` is mandatory and must be followed by exactly six
    /// hexadecimal digits (either case).
    ///
    /// # Errors
    /// - `CompositeError::InvalidColor` for a missing `#`, a wrong digit count,
    ///   or a non-hex digit
    ///
    /// # Examples
    /// ```rust
    /// use matte_compositor::utils::ColorParser;
    ///
    /// let pink = ColorParser::parse_hex("#FF6EC4").unwrap();
    /// assert_eq!((pink.r, pink.g, pink.b), (255, 110, 196));
    /// assert!(ColorParser::parse_hex("#12345").is_err());
    /// ```
    pub fn parse_hex(input: &str) -> Result<BackgroundColor> {
        let digits = input.strip_prefix('#').ok_or_else(|| {
            CompositeError::invalid_color(format!(
                "'{}' must start with '#' followed by 6 hex digits",
                input
            ))
        })?;

        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(CompositeError::invalid_color(format!(
                "'{}' must be exactly 6 hex digits after '#'",
                input
            )));
        }

        let channel = |range: std::ops::Range<usize>| -> Result<u8> {
            digits
                .get(range)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| CompositeError::invalid_color(format!("'{}' is not a valid color", input)))
        };

        Ok(BackgroundColor::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Convert a `BackgroundColor` to a lowercase hex string
    ///
    /// # Examples
    /// ```rust
    /// use matte_compositor::{utils::ColorParser, BackgroundColor};
    ///
    /// let color = BackgroundColor::new(255, 0, 128);
    /// assert_eq!(ColorParser::to_hex(&color, true), "#ff0080");
    /// assert_eq!(ColorParser::to_hex(&color, false), "ff0080");
    /// ```
    #[must_use]
    pub fn to_hex(color: &BackgroundColor, include_hash: bool) -> String {
        if include_hash {
            format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
        } else {
            format!("{:02x}{:02x}{:02x}", color.r, color.g, color.b)
        }
    }

    /// Check a color string without building a color
    #[must_use]
    pub fn is_valid_hex(input: &str) -> bool {
        Self::parse_hex(input).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_known_values() {
        let black = ColorParser::parse_hex("#000000").unwrap();
        assert_eq!((black.r, black.g, black.b), (0, 0, 0));

        let pink = ColorParser::parse_hex("#FF6EC4").unwrap();
        assert_eq!((pink.r, pink.g, pink.b), (255, 110, 196));

        let lower = ColorParser::parse_hex("#ff6ec4").unwrap();
        assert_eq!(lower, pink);
    }

    #[test]
    fn test_parse_hex_rejects_wrong_length() {
        for input in ["#12345", "#1234567", "#fff", "#", ""] {
            let err = ColorParser::parse_hex(input).unwrap_err();
            assert!(
                matches!(err, CompositeError::InvalidColor(_)),
                "expected InvalidColor for {:?}",
                input
            );
        }
    }

    #[test]
    fn test_parse_hex_rejects_missing_hash_and_bad_digits() {
        assert!(matches!(
            ColorParser::parse_hex("000000"),
            Err(CompositeError::InvalidColor(_))
        ));
        assert!(matches!(
            ColorParser::parse_hex("#gggggg"),
            Err(CompositeError::InvalidColor(_))
        ));
        // Multi-byte characters must not slip past the length check
        assert!(ColorParser::parse_hex("#ééé").is_err());
        assert!(ColorParser::parse_hex(" #000000").is_err());
    }

    #[test]
    fn test_to_hex_roundtrips_through_parser() {
        let color = BackgroundColor::new(18, 52, 86);
        let hex = ColorParser::to_hex(&color, true);
        assert_eq!(hex, "#123456");
        assert_eq!(ColorParser::parse_hex(&hex).unwrap(), color);
    }

    #[test]
    fn test_is_valid_hex() {
        assert!(ColorParser::is_valid_hex("#7873f5"));
        assert!(!ColorParser::is_valid_hex("#7873f"));
        assert!(!ColorParser::is_valid_hex("7873f5"));
    }
}
