//! Provider for images that already carry their matte
//!
//! Useful when the cut-out was produced elsewhere: the input's own alpha
//! channel is the matte, and images without alpha count as fully opaque.

use crate::{
    config::{MatteOptions, OutputFormat},
    error::Result,
    matte::MatteProvider,
    services::{ImageIOService, OutputFormatHandler},
};

/// Uses the input image's alpha channel as the matte
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedAlphaProvider;

impl EmbeddedAlphaProvider {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl MatteProvider for EmbeddedAlphaProvider {
    fn name(&self) -> &str {
        "embedded-alpha"
    }

    fn extract_matte(&self, image: &[u8], options: &MatteOptions) -> Result<Vec<u8>> {
        let decoded = ImageIOService::load_from_bytes(image)?;
        if !decoded.color().has_alpha() {
            log::debug!("Input has no alpha channel; treating every pixel as foreground");
        }
        if options.alpha_matting {
            log::trace!("Alpha matting options are ignored by the embedded-alpha provider");
        }

        OutputFormatHandler::encode_rgba(&decoded.to_rgba8(), OutputFormat::Png, 100)
    }
}
