#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

//! # Matte Compositor
//!
//! Flattens the cut-out produced by a background-removal model onto a solid
//! background color and exports the result as a regular opaque image.
//!
//! The model itself is an external collaborator behind the [`MatteProvider`]
//! trait: encoded bytes go in, an RGBA matte of the same size comes out. This
//! crate owns everything around it: decoding uploads, validating the matte,
//! alpha-compositing over the chosen color, and encoding a download.
//!
//! ## Features
//!
//! - **Pluggable providers**: external command (`rembg` by default) or the
//!   input's own alpha channel
//! - **Deterministic compositing**: `(bg*(255-a) + fg*a) / 255` per channel
//! - **Format Support**: PNG, JPEG, TIFF, WebP and raw pixel output
//! - **Async and Sync APIs**: blocking `process` plus `process_async` on
//!   tokio's blocking pool
//! - **CLI Integration**: optional command-line interface (`cli` feature)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use matte_compositor::{
//!     BackgroundColor, CommandMatteProvider, CompositeConfig, CompositeProcessor,
//! };
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = CompositeConfig::builder()
//!     .background("#FF6EC4".parse::<BackgroundColor>()?)
//!     .build()?;
//! let processor = CompositeProcessor::with_provider(CommandMatteProvider::rembg(), config)?;
//!
//! let upload = std::fs::read("portrait.jpg")?;
//! let result = processor.process(processor.request(upload))?;
//! result.download.save_to_dir(".")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Compositing an existing matte
//!
//! ```rust
//! use image::{Rgba, RgbaImage};
//! use matte_compositor::{BackgroundColor, Compositor};
//!
//! let matte = RgbaImage::from_pixel(1, 1, Rgba([200, 100, 50, 64]));
//! let flat = Compositor::composite(&matte, BackgroundColor::black()).unwrap();
//! assert_eq!(flat.get_pixel(0, 0).0, [50, 25, 12]);
//! ```
//!
//! ### Feature Flags
//!
//! - `cli` (default): command-line interface, progress spinner and tracing setup
//! - `webp-support` (default): WebP output
//! - `tracing-json`: JSON log output for the CLI

pub mod backends;
#[cfg(feature = "cli")]
pub mod cli;
pub mod compositor;
pub mod config;
pub mod error;
pub mod matte;
pub mod processor;
pub mod sample;
pub mod services;
#[cfg(feature = "cli")]
pub mod tracing_config;
pub mod types;
pub mod utils;

use tokio::io::AsyncRead;

// Public API exports
pub use backends::{CommandMatteProvider, EmbeddedAlphaProvider, ProviderKind};
pub use compositor::Compositor;
pub use config::{BackgroundColor, CompositeConfig, CompositeConfigBuilder, MatteOptions, OutputFormat};
pub use error::{CompositeError, Result};
pub use matte::MatteProvider;
pub use processor::CompositeProcessor;
pub use sample::{render_sample, SampleOutcome};
pub use services::{
    ConsoleProgressReporter, ImageIOService, NoOpProgressReporter, OutputFormatHandler,
    ProcessingStage, ProgressReporter, ProgressTracker, ProgressUpdate,
};
pub use types::{
    CompositeRequest, CompositeResult, DownloadArtifact, MatteStatistics, ProcessingTimings,
    TransparencyChannel,
};
pub use utils::{ColorParser, NumericValidator};

#[cfg(feature = "cli")]
pub use tracing_config::{init_cli_tracing, spans, TracingConfig, TracingFormat};

/// Flatten an already encoded RGBA matte onto a background color
///
/// Skips the provider entirely; useful when the cut-out was produced
/// elsewhere. Images without alpha come back unchanged.
///
/// # Examples
/// ```rust,no_run
/// use matte_compositor::{composite_matte_bytes, BackgroundColor};
///
/// # fn example() -> anyhow::Result<()> {
/// let cutout = std::fs::read("cutout.png")?;
/// let flat = composite_matte_bytes(&cutout, BackgroundColor::white())?;
/// flat.save("flat.png")?;
/// # Ok(())
/// # }
/// ```
pub fn composite_matte_bytes(
    matte_bytes: &[u8],
    background: BackgroundColor,
) -> Result<image::RgbImage> {
    let matte = ImageIOService::load_from_bytes(matte_bytes)?;
    Compositor::composite_dynamic(&matte, background)
}

/// Process an image read from an async stream
///
/// Reads the stream to the end, then runs the request with the processor's
/// configured matte options and background.
///
/// # Examples
/// ```rust,no_run
/// use matte_compositor::{process_from_reader, CompositeConfig, CompositeProcessor, EmbeddedAlphaProvider};
/// use tokio::fs::File;
///
/// # async fn example() -> anyhow::Result<()> {
/// let processor = CompositeProcessor::with_provider(EmbeddedAlphaProvider, CompositeConfig::default())?;
/// let file = File::open("cutout.png").await?;
/// let result = process_from_reader(file, &processor).await?;
/// println!("{}", result.timing_summary());
/// # Ok(())
/// # }
/// ```
pub async fn process_from_reader<R: AsyncRead + Unpin>(
    mut reader: R,
    processor: &CompositeProcessor,
) -> Result<CompositeResult> {
    let mut buffer = Vec::new();
    tokio::io::AsyncReadExt::read_to_end(&mut reader, &mut buffer).await?;

    processor.process_async(processor.request(buffer)).await
}
