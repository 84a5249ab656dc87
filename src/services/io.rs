//! Image I/O operations service
//!
//! Keeps decoding and file/stdio handling out of the compositing logic.
//! The path `-` stands for stdin (reading) or stdout (writing).

use crate::error::{CompositeError, Result};
use image::DynamicImage;
use std::io::{Read, Write};
use std::path::Path;

/// Path that selects stdin/stdout instead of a file
pub const STDIO_PATH: &str = "-";

/// Service for handling image input/output operations
pub struct ImageIOService;

impl ImageIOService {
    /// Decode an image from bytes
    ///
    /// # Errors
    /// - `CompositeError::Decode` if the bytes are empty or not a supported image
    ///
    /// # Examples
    /// ```rust
    /// use matte_compositor::services::ImageIOService;
    ///
    /// assert!(ImageIOService::load_from_bytes(b"definitely not an image").is_err());
    /// ```
    pub fn load_from_bytes(bytes: &[u8]) -> Result<DynamicImage> {
        if bytes.is_empty() {
            return Err(CompositeError::decode("image data is empty"));
        }

        image::load_from_memory(bytes).map_err(|e| {
            CompositeError::decode(format!(
                "Failed to decode image from {} bytes: {}",
                bytes.len(),
                e
            ))
        })
    }

    /// Load and decode an image file
    ///
    /// # Errors
    /// - `CompositeError::Io` if the file cannot be read
    /// - `CompositeError::Decode` if its content is not a supported image
    pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
        let path_ref = path.as_ref();
        let data = Self::read_bytes(path_ref)?;
        Self::load_from_bytes(&data).map_err(|e| match e {
            CompositeError::Decode(msg) => {
                CompositeError::decode(format!("{} ({})", msg, path_ref.display()))
            },
            other => other,
        })
    }

    /// Read raw bytes from a file, or from stdin when the path is `-`
    pub fn read_bytes<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
        let path_ref = path.as_ref();

        if path_ref == Path::new(STDIO_PATH) {
            let mut buffer = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buffer)
                .map_err(|e| CompositeError::file_io_error("read", "<stdin>", &e))?;
            log::debug!("Read {} bytes from stdin", buffer.len());
            return Ok(buffer);
        }

        std::fs::read(path_ref).map_err(|e| CompositeError::file_io_error("read", path_ref, &e))
    }

    /// Write raw bytes to a file, or to stdout when the path is `-`
    ///
    /// Parent directories are created as needed.
    pub fn write_bytes<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Result<()> {
        let path_ref = path.as_ref();

        if path_ref == Path::new(STDIO_PATH) {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(bytes)
                .and_then(|()| stdout.flush())
                .map_err(|e| CompositeError::file_io_error("write", "<stdout>", &e))?;
            return Ok(());
        }

        if let Some(parent) = path_ref.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    CompositeError::file_io_error("create output directory", parent, &e)
                })?;
            }
        }

        std::fs::write(path_ref, bytes)
            .map_err(|e| CompositeError::file_io_error("write", path_ref, &e))?;
        log::debug!("Wrote {} bytes to {}", bytes.len(), path_ref.display());
        Ok(())
    }

    /// Check if a file path has an extension accepted as upload
    #[must_use]
    pub fn is_supported_format<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .is_some_and(|ext| matches!(ext.as_str(), "jpg" | "jpeg" | "png" | "webp" | "tiff" | "tif"))
    }
}
