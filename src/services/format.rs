//! Output format handling service
//!
//! Encoding lives here, separate from the pipeline, so every caller (the
//! processor, `CompositeResult::save`, the CLI) serializes rasters the same way.

use crate::{
    config::OutputFormat,
    error::{CompositeError, Result},
};
use image::{ColorType, DynamicImage, GrayImage, ImageEncoder, ImageFormat, RgbImage, RgbaImage};
use std::io::Cursor;

/// Service for encoding rasters into output formats
pub struct OutputFormatHandler;

impl OutputFormatHandler {
    /// Encode a decoded raster into the requested format
    ///
    /// # Arguments
    /// * `image` - Raster to serialize (any 8-bit color type)
    /// * `format` - Target output format
    /// * `quality` - JPEG quality (0-100), ignored by lossless formats
    ///
    /// # Errors
    /// - `CompositeError::Encode` if the format cannot hold the raster's
    ///   channels (JPEG with alpha), the format is not compiled in, or the
    ///   encoder fails
    ///
    /// # Examples
    /// ```rust
    /// use matte_compositor::{services::OutputFormatHandler, OutputFormat};
    /// use image::{DynamicImage, RgbaImage};
    ///
    /// let rgba = DynamicImage::ImageRgba8(RgbaImage::new(4, 4));
    /// assert!(OutputFormatHandler::encode(&rgba, OutputFormat::Png, 90).is_ok());
    /// assert!(OutputFormatHandler::encode(&rgba, OutputFormat::Jpeg, 90).is_err());
    /// ```
    pub fn encode(image: &DynamicImage, format: OutputFormat, quality: u8) -> Result<Vec<u8>> {
        Self::encode_raw(
            image.as_bytes(),
            image.width(),
            image.height(),
            image.color(),
            format,
            quality,
        )
    }

    /// Encode a flattened RGB raster
    pub fn encode_rgb(image: &RgbImage, format: OutputFormat, quality: u8) -> Result<Vec<u8>> {
        let (width, height) = image.dimensions();
        Self::encode_raw(image.as_raw(), width, height, ColorType::Rgb8, format, quality)
    }

    /// Encode an RGBA raster
    pub fn encode_rgba(image: &RgbaImage, format: OutputFormat, quality: u8) -> Result<Vec<u8>> {
        let (width, height) = image.dimensions();
        Self::encode_raw(image.as_raw(), width, height, ColorType::Rgba8, format, quality)
    }

    /// Encode a single-channel raster
    pub fn encode_gray(image: &GrayImage, format: OutputFormat, quality: u8) -> Result<Vec<u8>> {
        let (width, height) = image.dimensions();
        Self::encode_raw(image.as_raw(), width, height, ColorType::L8, format, quality)
    }

    fn encode_raw(
        buf: &[u8],
        width: u32,
        height: u32,
        color: ColorType,
        format: OutputFormat,
        quality: u8,
    ) -> Result<Vec<u8>> {
        if !Self::supports_color_type(format, color) {
            return Err(CompositeError::encode(format!(
                "{} cannot encode a {:?} raster ({} channels)",
                Self::format_name(format),
                color,
                color.channel_count()
            )));
        }

        let mut buffer = Vec::new();
        let result = match format {
            OutputFormat::Raw => return Ok(buf.to_vec()),
            OutputFormat::Jpeg => {
                let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
                    &mut buffer,
                    quality.min(100),
                );
                encoder.write_image(buf, width, height, color.into())
            },
            OutputFormat::Png => Self::write_with_format(&mut buffer, buf, width, height, color, ImageFormat::Png),
            OutputFormat::Tiff => Self::write_with_format(&mut buffer, buf, width, height, color, ImageFormat::Tiff),
            #[cfg(feature = "webp-support")]
            OutputFormat::WebP => Self::write_with_format(&mut buffer, buf, width, height, color, ImageFormat::WebP),
            #[cfg(not(feature = "webp-support"))]
            OutputFormat::WebP => {
                return Err(CompositeError::encode(
                    "WebP output requires the 'webp-support' feature",
                ));
            },
        };

        result.map_err(|e| {
            CompositeError::encode(format!(
                "Failed to encode {}x{} raster as {}: {}",
                width,
                height,
                Self::format_name(format),
                e
            ))
        })?;

        log::debug!(
            "Encoded {}x{} {:?} raster as {} ({} bytes)",
            width,
            height,
            color,
            Self::format_name(format),
            buffer.len()
        );

        Ok(buffer)
    }

    fn write_with_format(
        buffer: &mut Vec<u8>,
        buf: &[u8],
        width: u32,
        height: u32,
        color: ColorType,
        format: ImageFormat,
    ) -> image::ImageResult<()> {
        let mut cursor = Cursor::new(buffer);
        image::write_buffer_with_format(&mut cursor, buf, width, height, color, format)
    }

    /// Whether a format can store a raster of the given color type
    ///
    /// # Examples
    /// ```rust
    /// use matte_compositor::{services::OutputFormatHandler, OutputFormat};
    /// use image::ColorType;
    ///
    /// assert!(OutputFormatHandler::supports_color_type(OutputFormat::Jpeg, ColorType::Rgb8));
    /// assert!(!OutputFormatHandler::supports_color_type(OutputFormat::Jpeg, ColorType::Rgba8));
    /// ```
    #[must_use]
    pub fn supports_color_type(format: OutputFormat, color: ColorType) -> bool {
        match format {
            OutputFormat::Jpeg => matches!(color, ColorType::Rgb8 | ColorType::L8),
            OutputFormat::WebP => matches!(
                color,
                ColorType::Rgb8 | ColorType::Rgba8 | ColorType::L8 | ColorType::La8
            ),
            OutputFormat::Png | OutputFormat::Tiff | OutputFormat::Raw => true,
        }
    }

    /// Get the file extension for a given output format (without the dot)
    ///
    /// # Examples
    /// ```rust
    /// use matte_compositor::{services::OutputFormatHandler, OutputFormat};
    ///
    /// assert_eq!(OutputFormatHandler::get_extension(OutputFormat::Png), "png");
    /// assert_eq!(OutputFormatHandler::get_extension(OutputFormat::Jpeg), "jpg");
    /// ```
    #[must_use]
    pub fn get_extension(format: OutputFormat) -> &'static str {
        match format {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::WebP => "webp",
            OutputFormat::Tiff => "tiff",
            OutputFormat::Raw => "raw",
        }
    }

    /// MIME type announced with a download in this format
    #[must_use]
    pub fn mime_type(format: OutputFormat) -> &'static str {
        match format {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::WebP => "image/webp",
            OutputFormat::Tiff => "image/tiff",
            OutputFormat::Raw => "application/octet-stream",
        }
    }

    /// Download file name for a stem and format, e.g. `result.png`
    #[must_use]
    pub fn file_name(stem: &str, format: OutputFormat) -> String {
        format!("{}.{}", stem, Self::get_extension(format))
    }

    /// Whether a format supports transparency (alpha channel)
    #[must_use]
    pub fn supports_transparency(format: OutputFormat) -> bool {
        match format {
            OutputFormat::Png | OutputFormat::WebP | OutputFormat::Tiff | OutputFormat::Raw => true,
            OutputFormat::Jpeg => false,
        }
    }

    /// Whether decoding an encoding yields the exact same pixels
    #[must_use]
    pub fn is_lossless(format: OutputFormat) -> bool {
        !matches!(format, OutputFormat::Jpeg)
    }

    fn format_name(format: OutputFormat) -> &'static str {
        match format {
            OutputFormat::Png => "PNG",
            OutputFormat::Jpeg => "JPEG",
            OutputFormat::WebP => "WebP",
            OutputFormat::Tiff => "TIFF",
            OutputFormat::Raw => "raw",
        }
    }
}
