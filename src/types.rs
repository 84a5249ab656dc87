//! Core types for matte compositing operations

use crate::{
    config::{BackgroundColor, MatteOptions, OutputFormat},
    error::{CompositeError, Result},
    services::{ImageIOService, OutputFormatHandler},
};
use image::{GrayImage, RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One user action: the uploaded image plus everything needed to flatten it
///
/// Built once and passed by value into the pipeline; nothing in it changes
/// while the request is processed.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeRequest {
    /// Encoded input image (PNG, JPEG, ...)
    pub image: Vec<u8>,
    /// Options forwarded to the matte provider
    pub matte: MatteOptions,
    /// Solid color the matte is flattened onto
    pub background: BackgroundColor,
}

impl CompositeRequest {
    /// Create a request with default matte options over black
    #[must_use]
    pub fn new(image: Vec<u8>) -> Self {
        Self {
            image,
            matte: MatteOptions::default(),
            background: BackgroundColor::default(),
        }
    }

    /// Replace the matte provider options
    #[must_use]
    pub fn with_matte_options(mut self, matte: MatteOptions) -> Self {
        self.matte = matte;
        self
    }

    /// Replace the background color
    #[must_use]
    pub fn with_background(mut self, background: BackgroundColor) -> Self {
        self.background = background;
        self
    }

    /// Replace the background color from a `#RRGGBB` string
    ///
    /// # Errors
    /// - `CompositeError::InvalidColor` for a malformed color string
    pub fn with_background_hex(self, hex: &str) -> Result<Self> {
        let background = hex.parse()?;
        Ok(self.with_background(background))
    }
}

/// Encoded result ready to be offered for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadArtifact {
    /// Suggested file name, e.g. `result.png`
    pub file_name: String,
    /// MIME type matching the encoding, e.g. `image/png`
    pub mime_type: &'static str,
    /// Encoded image bytes
    pub bytes: Vec<u8>,
}

impl DownloadArtifact {
    /// Build an artifact by encoding a flattened raster
    ///
    /// # Errors
    /// - `CompositeError::Encode` when the format cannot hold the raster
    pub fn encode(image: &RgbImage, format: OutputFormat, quality: u8, file_stem: &str) -> Result<Self> {
        let bytes = OutputFormatHandler::encode_rgb(image, format, quality)?;
        Ok(Self {
            file_name: OutputFormatHandler::file_name(file_stem, format),
            mime_type: OutputFormatHandler::mime_type(format),
            bytes,
        })
    }

    /// Write the artifact into a directory under its file name
    ///
    /// Returns the full path that was written.
    pub fn save_to_dir<P: AsRef<Path>>(&self, dir: P) -> Result<std::path::PathBuf> {
        let path = dir.as_ref().join(&self.file_name);
        ImageIOService::write_bytes(&path, &self.bytes)?;
        Ok(path)
    }
}

/// Result of one compositing request
#[derive(Debug, Clone)]
pub struct CompositeResult {
    /// Flattened, fully opaque image
    pub image: RgbImage,

    /// RGBA cut-out returned by the matte provider
    pub matte: RgbaImage,

    /// Background the matte was flattened onto
    pub background: BackgroundColor,

    /// Encoded download produced with the processor's output settings
    pub download: DownloadArtifact,

    /// Per-stage timings
    pub timings: ProcessingTimings,
}

impl CompositeResult {
    /// Image dimensions (width, height)
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Transparency channel of the provider's matte
    #[must_use]
    pub fn transparency(&self) -> TransparencyChannel {
        TransparencyChannel::from_matte(&self.matte)
    }

    /// Re-encode the flattened image in another format
    ///
    /// # Errors
    /// - `CompositeError::Encode` when the format cannot hold the raster
    pub fn to_bytes(&self, format: OutputFormat, quality: u8) -> Result<Vec<u8>> {
        OutputFormatHandler::encode_rgb(&self.image, format, quality)
    }

    /// Re-encode the flattened image as a named download
    ///
    /// # Errors
    /// - `CompositeError::Encode` when the format cannot hold the raster
    pub fn to_download(&self, format: OutputFormat, quality: u8, file_stem: &str) -> Result<DownloadArtifact> {
        DownloadArtifact::encode(&self.image, format, quality, file_stem)
    }

    /// Save the flattened image in the specified format
    pub fn save<P: AsRef<Path>>(&self, path: P, format: OutputFormat, quality: u8) -> Result<()> {
        let bytes = self.to_bytes(format, quality)?;
        ImageIOService::write_bytes(path, &bytes)
    }

    /// Save the provider's RGBA matte as PNG
    pub fn save_matte_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = OutputFormatHandler::encode_rgba(&self.matte, OutputFormat::Png, 100)?;
        ImageIOService::write_bytes(path, &bytes)
    }

    /// One-line human-readable timing summary
    #[must_use]
    pub fn timing_summary(&self) -> String {
        let t = &self.timings;
        format!(
            "total {}ms (decode {}ms, matte {}ms, composite {}ms, encode {}ms)",
            t.total_ms, t.decode_ms, t.matte_ms, t.composite_ms, t.encode_ms
        )
    }
}

/// 8-bit transparency plane of a matte
///
/// 0 is pure background, 255 pure foreground, anything between is an edge
/// blend weight.
#[derive(Debug, Clone, PartialEq)]
pub struct TransparencyChannel {
    plane: GrayImage,
}

impl TransparencyChannel {
    /// Extract the alpha channel of an RGBA matte
    #[must_use]
    pub fn from_matte(matte: &RgbaImage) -> Self {
        let (width, height) = matte.dimensions();
        let plane = GrayImage::from_fn(width, height, |x, y| image::Luma([matte.get_pixel(x, y)[3]]));
        Self { plane }
    }

    /// Wrap raw alpha values laid out row by row
    ///
    /// # Errors
    /// - `CompositeError::InvalidInput` if `data` does not hold `width * height` values
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let len = data.len();
        GrayImage::from_raw(width, height, data)
            .map(|plane| Self { plane })
            .ok_or_else(|| {
                CompositeError::invalid_input(format!(
                    "{} alpha values cannot fill a {}x{} plane",
                    len, width, height
                ))
            })
    }

    /// Plane dimensions (width, height)
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.plane.dimensions()
    }

    /// Alpha value at a position, `None` when out of bounds
    #[must_use]
    pub fn alpha_at(&self, x: u32, y: u32) -> Option<u8> {
        self.plane.get_pixel_checked(x, y).map(|p| p[0])
    }

    /// Raw alpha values, row by row
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        self.plane.as_raw()
    }

    /// Borrow the plane as a grayscale image
    #[must_use]
    pub fn as_image(&self) -> &GrayImage {
        &self.plane
    }

    /// Count fully-foreground, fully-background and partial pixels
    #[must_use]
    pub fn statistics(&self) -> MatteStatistics {
        let mut stats = MatteStatistics {
            total_pixels: self.plane.as_raw().len(),
            ..MatteStatistics::default()
        };

        for &alpha in self.plane.as_raw() {
            match alpha {
                255 => stats.foreground_pixels += 1,
                0 => stats.background_pixels += 1,
                _ => stats.partial_pixels += 1,
            }
        }

        stats
    }

    /// Save the plane as a grayscale PNG
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = OutputFormatHandler::encode_gray(&self.plane, OutputFormat::Png, 100)?;
        ImageIOService::write_bytes(path, &bytes)
    }
}

/// Pixel counts of a transparency channel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatteStatistics {
    pub total_pixels: usize,
    pub foreground_pixels: usize,
    pub background_pixels: usize,
    pub partial_pixels: usize,
}

impl MatteStatistics {
    /// Share of pixels that are at least partly foreground
    #[must_use]
    pub fn coverage_ratio(&self) -> f64 {
        if self.total_pixels == 0 {
            0.0
        } else {
            (self.foreground_pixels + self.partial_pixels) as f64 / self.total_pixels as f64
        }
    }
}

/// Timing breakdown of one compositing request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingTimings {
    /// Decoding the uploaded image
    pub decode_ms: u64,

    /// Matte provider call plus decoding its output
    pub matte_ms: u64,

    /// Flattening the matte onto the background
    pub composite_ms: u64,

    /// Encoding the download
    pub encode_ms: u64,

    /// Total end-to-end processing time
    pub total_ms: u64,
}

impl ProcessingTimings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Share of the total spent waiting on the matte provider
    #[must_use]
    pub fn matte_ratio(&self) -> f64 {
        if self.total_ms == 0 {
            0.0
        } else {
            self.matte_ms as f64 / self.total_ms as f64
        }
    }

    /// Time not attributed to any stage
    #[must_use]
    pub fn other_overhead_ms(&self) -> u64 {
        let measured = self.decode_ms + self.matte_ms + self.composite_ms + self.encode_ms;
        self.total_ms.saturating_sub(measured)
    }
}
