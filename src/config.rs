//! Configuration types for matte compositing operations

use crate::{
    error::{CompositeError, Result},
    utils::{ColorParser, NumericValidator},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Solid background color a matte is flattened onto
///
/// Serialized as a `#rrggbb` string so config files stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BackgroundColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Default for BackgroundColor {
    fn default() -> Self {
        Self::black()
    }
}

impl BackgroundColor {
    /// Create a new background color with RGB values
    ///
    /// # Examples
    /// ```rust
    /// use matte_compositor::BackgroundColor;
    /// let purple = BackgroundColor::new(128, 0, 128);
    /// assert_eq!(purple.to_string(), "#800080");
    /// ```
    #[must_use]
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Black (0, 0, 0), the default backdrop
    #[must_use]
    pub fn black() -> Self {
        Self::new(0, 0, 0)
    }

    /// White (255, 255, 255)
    #[must_use]
    pub fn white() -> Self {
        Self::new(255, 255, 255)
    }

    /// Color as an `[r, g, b]` channel array
    #[must_use]
    pub fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl std::fmt::Display for BackgroundColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&ColorParser::to_hex(self, true))
    }
}

impl std::str::FromStr for BackgroundColor {
    type Err = CompositeError;

    fn from_str(s: &str) -> Result<Self> {
        ColorParser::parse_hex(s)
    }
}

impl TryFrom<String> for BackgroundColor {
    type Error = CompositeError;

    fn try_from(value: String) -> Result<Self> {
        ColorParser::parse_hex(&value)
    }
}

impl From<BackgroundColor> for String {
    fn from(color: BackgroundColor) -> Self {
        color.to_string()
    }
}

/// Output image format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossless PNG (the download default)
    Png,
    /// JPEG (RGB only)
    Jpeg,
    /// WebP, lossless (requires the `webp-support` feature)
    WebP,
    /// TIFF, lossless
    Tiff,
    /// Raw interleaved 8-bit pixel data, no header
    Raw,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Png
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Png => write!(f, "png"),
            Self::Jpeg => write!(f, "jpeg"),
            Self::WebP => write!(f, "webp"),
            Self::Tiff => write!(f, "tiff"),
            Self::Raw => write!(f, "raw"),
        }
    }
}

/// Tuning options handed to the matte provider
///
/// Opaque to the compositor; these only steer the provider's alpha matting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatteOptions {
    /// Refine edges with alpha matting instead of a hard cutout
    pub alpha_matting: bool,
    /// Mask level above which a pixel counts as certain foreground
    pub foreground_threshold: u8,
    /// Mask level below which a pixel counts as certain background
    pub background_threshold: u8,
    /// Radius used to shrink the foreground boundary (0-20)
    pub erode_size: u8,
}

impl Default for MatteOptions {
    fn default() -> Self {
        Self {
            alpha_matting: true,
            foreground_threshold: 240,
            background_threshold: 15,
            erode_size: 12,
        }
    }
}

impl MatteOptions {
    /// Validate option ranges
    ///
    /// Thresholds are `u8` and therefore always in range; only the erode
    /// radius carries an additional bound.
    ///
    /// # Errors
    /// - Erode size above 20
    pub fn validate(&self) -> Result<()> {
        NumericValidator::validate_erode_size(self.erode_size)?;
        Ok(())
    }
}

/// Configuration for compositing operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositeConfig {
    /// Color the matte is flattened onto
    pub background: BackgroundColor,

    /// Output format of the flattened image
    pub output_format: OutputFormat,

    /// JPEG quality (0-100, only used for JPEG output)
    pub jpeg_quality: u8,

    /// Options passed through to the matte provider
    pub matte: MatteOptions,

    /// File stem of the downloadable result (extension follows the format)
    pub result_file_stem: String,
}

impl Default for CompositeConfig {
    fn default() -> Self {
        Self {
            background: BackgroundColor::default(),
            output_format: OutputFormat::default(),
            jpeg_quality: 90,
            matte: MatteOptions::default(),
            result_file_stem: "result".to_string(),
        }
    }
}

impl CompositeConfig {
    /// Create a new configuration builder
    ///
    /// # Examples
    /// ```rust
    /// use matte_compositor::{BackgroundColor, CompositeConfig, OutputFormat};
    ///
    /// let config = CompositeConfig::builder()
    ///     .background(BackgroundColor::white())
    ///     .output_format(OutputFormat::Jpeg)
    ///     .jpeg_quality(80)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.jpeg_quality, 80);
    /// ```
    #[must_use]
    pub fn builder() -> CompositeConfigBuilder {
        CompositeConfigBuilder::default()
    }

    /// Validate all configuration parameters
    ///
    /// # Errors
    /// - JPEG quality above 100
    /// - Erode size above 20
    /// - Empty result file stem
    pub fn validate(&self) -> Result<()> {
        NumericValidator::validate_quality(self.jpeg_quality)?;
        self.matte.validate()?;

        if self.result_file_stem.trim().is_empty() {
            return Err(CompositeError::invalid_config(
                "result file stem must not be empty",
            ));
        }

        Ok(())
    }

    /// Load a configuration from a JSON file
    ///
    /// Missing fields fall back to their defaults.
    ///
    /// # Errors
    /// - File cannot be read
    /// - JSON is malformed or holds an invalid color
    /// - Loaded values fail validation
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let content = std::fs::read_to_string(path_ref)
            .map_err(|e| CompositeError::file_io_error("read config file", path_ref, &e))?;
        let config = Self::from_json_str(&content)?;
        log::debug!("Loaded configuration from {}", path_ref.display());
        Ok(config)
    }

    /// Parse a configuration from a JSON string
    ///
    /// # Errors
    /// - JSON is malformed or holds an invalid color
    /// - Parsed values fail validation
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| CompositeError::invalid_config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }
}

/// Builder for `CompositeConfig`
#[derive(Debug, Default)]
pub struct CompositeConfigBuilder {
    config: CompositeConfig,
}

impl CompositeConfigBuilder {
    /// Set background color
    #[must_use]
    pub fn background(mut self, background: BackgroundColor) -> Self {
        self.config.background = background;
        self
    }

    /// Set output format
    #[must_use]
    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.config.output_format = format;
        self
    }

    /// Set JPEG quality
    #[must_use]
    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality.min(100);
        self
    }

    /// Set all matte provider options at once
    #[must_use]
    pub fn matte_options(mut self, options: MatteOptions) -> Self {
        self.config.matte = options;
        self
    }

    /// Enable or disable alpha matting
    #[must_use]
    pub fn alpha_matting(mut self, enabled: bool) -> Self {
        self.config.matte.alpha_matting = enabled;
        self
    }

    /// Set foreground threshold
    #[must_use]
    pub fn foreground_threshold(mut self, threshold: u8) -> Self {
        self.config.matte.foreground_threshold = threshold;
        self
    }

    /// Set background threshold
    #[must_use]
    pub fn background_threshold(mut self, threshold: u8) -> Self {
        self.config.matte.background_threshold = threshold;
        self
    }

    /// Set erode radius
    #[must_use]
    pub fn erode_size(mut self, size: u8) -> Self {
        self.config.matte.erode_size = size;
        self
    }

    /// Set the file stem used for downloads
    #[must_use]
    pub fn result_file_stem<S: Into<String>>(mut self, stem: S) -> Self {
        self.config.result_file_stem = stem.into();
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    /// - Any value rejected by `CompositeConfig::validate`
    pub fn build(self) -> Result<CompositeConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
