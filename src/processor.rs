//! Compositing processor
//!
//! `CompositeProcessor` runs one request end to end: decode the upload, ask
//! the matte provider for a cut-out, flatten it onto the background color,
//! and encode the download. Used by the CLI and by library callers alike.

use crate::{
    compositor::Compositor,
    config::CompositeConfig,
    error::{CompositeError, Result},
    matte::MatteProvider,
    services::{ImageIOService, ProcessingStage, ProgressTracker},
    types::{CompositeRequest, CompositeResult, DownloadArtifact, ProcessingTimings},
    utils::NumericValidator,
};
use image::RgbaImage;
use instant::Instant;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Runs compositing requests against one matte provider
///
/// Cheap to clone; clones share the provider. Requests share no mutable
/// state, so one processor may serve concurrent callers.
#[derive(Clone)]
pub struct CompositeProcessor {
    provider: Arc<dyn MatteProvider>,
    config: CompositeConfig,
}

impl std::fmt::Debug for CompositeProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeProcessor")
            .field("provider", &self.provider.name())
            .field("config", &self.config)
            .finish()
    }
}

impl CompositeProcessor {
    /// Create a processor around a shared provider
    ///
    /// # Errors
    /// - `CompositeError::InvalidConfig` if the configuration is invalid
    pub fn new(provider: Arc<dyn MatteProvider>, config: CompositeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { provider, config })
    }

    /// Create a processor that owns its provider
    pub fn with_provider<P: MatteProvider + 'static>(provider: P, config: CompositeConfig) -> Result<Self> {
        Self::new(Arc::new(provider), config)
    }

    /// Processor configuration
    #[must_use]
    pub fn config(&self) -> &CompositeConfig {
        &self.config
    }

    /// Name of the matte provider in use
    #[must_use]
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Request for `image` using the configured matte options and background
    #[must_use]
    pub fn request(&self, image: Vec<u8>) -> CompositeRequest {
        CompositeRequest::new(image)
            .with_matte_options(self.config.matte)
            .with_background(self.config.background)
    }

    /// Process one request
    ///
    /// # Errors
    /// - `CompositeError::InvalidConfig` for out-of-range matte options
    /// - `CompositeError::Decode` if the upload or the provider's matte does not decode
    /// - `CompositeError::MatteProvider` if the provider fails or breaks its contract
    /// - `CompositeError::Encode` if the configured output format cannot be written
    pub fn process(&self, request: CompositeRequest) -> Result<CompositeResult> {
        self.process_with_progress(request, &mut ProgressTracker::no_op())
    }

    /// Process one request, reporting stages to `tracker`
    #[instrument(
        skip_all,
        fields(provider = %self.provider.name(), input_bytes = request.image.len(), background = %request.background)
    )]
    pub fn process_with_progress(
        &self,
        request: CompositeRequest,
        tracker: &mut ProgressTracker,
    ) -> Result<CompositeResult> {
        let result = self.run_pipeline(request, tracker);
        if let Err(e) = &result {
            warn!(kind = e.kind(), error = %e, "Compositing request failed");
            tracker.report_error(&e.to_string());
        }
        result
    }

    /// Process one request on tokio's blocking pool
    ///
    /// # Errors
    /// Same as [`CompositeProcessor::process`]; a panicked worker surfaces as
    /// `CompositeError::Internal`.
    pub async fn process_async(&self, request: CompositeRequest) -> Result<CompositeResult> {
        let processor = self.clone();
        tokio::task::spawn_blocking(move || processor.process(request))
            .await
            .map_err(|e| CompositeError::internal(format!("processing task failed: {}", e)))?
    }

    fn run_pipeline(
        &self,
        request: CompositeRequest,
        tracker: &mut ProgressTracker,
    ) -> Result<CompositeResult> {
        let total_start = Instant::now();
        let mut timings = ProcessingTimings::new();
        let CompositeRequest {
            image,
            matte: options,
            background,
        } = request;

        options.validate()?;

        tracker.report_stage(ProcessingStage::Decoding);
        let decode_start = Instant::now();
        let input = ImageIOService::load_from_bytes(&image)?;
        let input_dimensions = NumericValidator::validate_dimensions(input.width(), input.height())?;
        drop(input);
        timings.decode_ms = decode_start.elapsed().as_millis() as u64;
        debug!(
            width = input_dimensions.0,
            height = input_dimensions.1,
            "Decoded input image"
        );

        tracker.report_stage(ProcessingStage::MatteExtraction);
        let matte_start = Instant::now();
        let matte_bytes = self.provider.extract_matte(&image, &options)?;
        let matte = Self::decode_matte(&matte_bytes, input_dimensions)?;
        timings.matte_ms = matte_start.elapsed().as_millis() as u64;
        debug!(matte_ms = timings.matte_ms, "Matte provider returned");

        tracker.report_stage(ProcessingStage::Compositing);
        let composite_start = Instant::now();
        let flattened = Compositor::composite(&matte, background)?;
        timings.composite_ms = composite_start.elapsed().as_millis() as u64;

        tracker.report_stage(ProcessingStage::Encoding);
        let encode_start = Instant::now();
        let download = DownloadArtifact::encode(
            &flattened,
            self.config.output_format,
            self.config.jpeg_quality,
            &self.config.result_file_stem,
        )?;
        timings.encode_ms = encode_start.elapsed().as_millis() as u64;

        timings.total_ms = total_start.elapsed().as_millis() as u64;
        tracker.report_completion(&timings);
        info!(
            file_name = %download.file_name,
            output_bytes = download.bytes.len(),
            total_ms = timings.total_ms,
            "Compositing request completed"
        );

        Ok(CompositeResult {
            image: flattened,
            matte,
            background,
            download,
            timings,
        })
    }

    /// Decode the provider's output and check it honours the contract
    fn decode_matte(bytes: &[u8], expected: (u32, u32)) -> Result<RgbaImage> {
        let decoded = ImageIOService::load_from_bytes(bytes).map_err(|e| match e {
            CompositeError::Decode(msg) => {
                CompositeError::decode(format!("matte provider output: {}", msg))
            },
            other => other,
        })?;

        if !decoded.color().has_alpha() {
            return Err(CompositeError::matte_provider(format!(
                "matte has no transparency channel ({:?})",
                decoded.color()
            )));
        }

        NumericValidator::validate_same_dimensions(
            expected,
            (decoded.width(), decoded.height()),
            "matte",
        )?;

        Ok(decoded.to_rgba8())
    }
}
