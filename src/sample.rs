//! Optional sample rendering
//!
//! A bundled demo image is rendered with default settings over black. The
//! sample is optional: if it is missing or cannot be processed, the caller
//! gets an informational outcome instead of an error.

use crate::{
    config::{BackgroundColor, MatteOptions},
    processor::CompositeProcessor,
    services::ImageIOService,
    types::{CompositeRequest, CompositeResult},
};
use std::path::Path;

/// Outcome of rendering the optional sample
#[derive(Debug)]
pub enum SampleOutcome {
    /// Sample processed successfully
    Rendered(Box<CompositeResult>),
    /// Sample could not be shown; `reason` is meant for the user
    Unavailable { reason: String },
}

impl SampleOutcome {
    /// Whether the sample was rendered
    #[must_use]
    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::Rendered(_))
    }
}

/// Render a sample image with default options over black
///
/// Never fails: read, decode and provider errors all become
/// `SampleOutcome::Unavailable`.
pub fn render_sample<P: AsRef<Path>>(processor: &CompositeProcessor, path: P) -> SampleOutcome {
    let path_ref = path.as_ref();

    let outcome = ImageIOService::read_bytes(path_ref).and_then(|bytes| {
        let request = CompositeRequest::new(bytes)
            .with_matte_options(MatteOptions::default())
            .with_background(BackgroundColor::black());
        processor.process(request)
    });

    match outcome {
        Ok(result) => SampleOutcome::Rendered(Box::new(result)),
        Err(e) => {
            log::warn!("Sample {} unavailable: {}", path_ref.display(), e);
            SampleOutcome::Unavailable {
                reason: format!(
                    "Failed to load sample image: {}. Please supply your own image.",
                    e
                ),
            }
        },
    }
}
