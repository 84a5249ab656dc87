//! Matte compositor CLI tool
//!
//! Runs one image through the matte provider, flattens it onto a solid color
//! and writes the download.

use super::config::CliConfigBuilder;
use crate::{
    processor::CompositeProcessor,
    sample::{render_sample, SampleOutcome},
    services::{ImageIOService, STDIO_PATH},
    tracing_config::{init_cli_tracing, spans},
    types::CompositeResult,
};
use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Instrument;

/// Remove an image's background and flatten it onto a solid color
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "matte-compositor")]
pub struct Cli {
    /// Input image (use "-" for stdin)
    #[arg(value_name = "INPUT", required_unless_present = "sample")]
    pub input: Option<String>,

    /// Output file. Use "-" for stdout [default: result.<ext>, or stdout for stdin input]
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<String>,

    /// Mask level above which pixels are certain foreground [default: 240]
    #[arg(long, value_name = "0-255")]
    pub fg_threshold: Option<u8>,

    /// Mask level below which pixels are certain background [default: 15]
    #[arg(long, value_name = "0-255")]
    pub bg_threshold: Option<u8>,

    /// Foreground erosion radius [default: 12]
    #[arg(long, value_name = "0-20")]
    pub erode_size: Option<u8>,

    /// Disable alpha matting and keep the provider's hard cut-out
    #[arg(long)]
    pub no_alpha_matting: bool,

    /// Background color as #RRGGBB [default: #000000]
    #[arg(short, long, value_name = "#RRGGBB")]
    pub background: Option<String>,

    /// Output format [default: png]
    #[arg(short, long, value_enum)]
    pub format: Option<CliOutputFormat>,

    /// JPEG quality (0-100) [default: 90]
    #[arg(long)]
    pub jpeg_quality: Option<u8>,

    /// Matte provider
    #[arg(short, long, value_enum, default_value_t = CliProvider::Command)]
    pub provider: CliProvider,

    /// Command line of the external provider [default: "rembg i"]
    #[arg(long, value_name = "COMMAND")]
    pub provider_command: Option<String>,

    /// JSON configuration file; flags override its values
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Render a sample image with default settings over black
    #[arg(long, value_name = "PATH")]
    pub sample: Option<PathBuf>,

    /// Also write the provider's RGBA cut-out as PNG
    #[arg(long, value_name = "PATH")]
    pub save_matte: Option<PathBuf>,

    /// Enable verbose logging (-v: DEBUG, -vv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum CliOutputFormat {
    Png,
    Jpeg,
    Webp,
    Tiff,
    Raw,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliProvider {
    /// External background-removal command
    Command,
    /// Use the input's own alpha channel
    Embedded,
}

pub async fn main() -> Result<()> {
    let cli = Cli::parse();

    let session_id = init_cli_tracing(cli.verbose).context("Failed to initialize tracing")?;

    let config = CliConfigBuilder::from_cli(&cli)?;
    let provider = CliConfigBuilder::provider(&cli)?;
    let processor =
        CompositeProcessor::new(provider, config).context("Failed to create compositing processor")?;

    let span = spans::session(&session_id, processor.provider_name());
    run(&cli, &processor).instrument(span).await
}

async fn run(cli: &Cli, processor: &CompositeProcessor) -> Result<()> {
    check_stdout_targets(cli)?;

    if let Some(sample) = &cli.sample {
        show_sample(cli, processor, sample)?;
    }

    if let Some(input) = &cli.input {
        let span = spans::file_processing(input, &processor.config().output_format.to_string());
        process_input(cli, processor, input).instrument(span).await?;
    }

    Ok(())
}

fn show_sample(cli: &Cli, processor: &CompositeProcessor, sample: &Path) -> Result<()> {
    match render_sample(processor, sample) {
        SampleOutcome::Rendered(result) => {
            info!("Rendered sample {}", sample.display());
            if cli.input.is_none() {
                write_result(cli, &result)?;
            } else {
                // The output path belongs to the input
                let target = PathBuf::from(format!("sample_{}", result.download.file_name));
                ImageIOService::write_bytes(&target, &result.download.bytes)
                    .with_context(|| format!("Failed to write {}", target.display()))?;
                info!("Sample saved to {}", target.display());
            }
        },
        SampleOutcome::Unavailable { reason } => warn!("{}", reason),
    }
    Ok(())
}

async fn process_input(cli: &Cli, processor: &CompositeProcessor, input: &str) -> Result<()> {
    if input != STDIO_PATH && !ImageIOService::is_supported_format(input) {
        warn!("{} does not have an image file extension, decoding by content", input);
    }

    let image = ImageIOService::read_bytes(input)
        .with_context(|| format!("Failed to read input {}", input))?;
    info!("Read {} bytes from {}", image.len(), input);

    let spinner = removal_spinner();
    let outcome = processor.process_async(processor.request(image)).await;
    spinner.finish_and_clear();

    let result = outcome.context("Failed to remove background")?;
    let stats = result.transparency().statistics();
    info!(
        "Foreground coverage {:.1}% ({} edge pixels)",
        stats.coverage_ratio() * 100.0,
        stats.partial_pixels
    );
    info!("Timings: {}", result.timing_summary());

    write_result(cli, &result)
}

/// Both the image and the matte on stdout would interleave two files
fn check_stdout_targets(cli: &Cli) -> Result<()> {
    let matte_to_stdout = cli.save_matte.as_deref() == Some(Path::new(STDIO_PATH));
    if matte_to_stdout && image_to_stdout(cli) {
        bail!("--save-matte - cannot share stdout with the composited image; pass a file path");
    }
    Ok(())
}

fn image_to_stdout(cli: &Cli) -> bool {
    match cli.output.as_deref() {
        Some(target) => target == STDIO_PATH,
        None => cli.input.as_deref() == Some(STDIO_PATH),
    }
}

fn write_result(cli: &Cli, result: &CompositeResult) -> Result<()> {
    let target = match cli.output.as_deref() {
        Some(target) => PathBuf::from(target),
        None if image_to_stdout(cli) => PathBuf::from(STDIO_PATH),
        None => PathBuf::from(&result.download.file_name),
    };

    ImageIOService::write_bytes(&target, &result.download.bytes)
        .with_context(|| format!("Failed to write {}", target.display()))?;
    if target.as_os_str() == STDIO_PATH {
        info!("Image written to stdout ({})", result.download.mime_type);
    } else {
        info!("Image saved to {}", target.display());
    }

    if let Some(matte_path) = &cli.save_matte {
        result
            .save_matte_png(matte_path)
            .with_context(|| format!("Failed to write matte {}", matte_path.display()))?;
        info!("Matte saved to {}", matte_path.display());
    }

    Ok(())
}

fn removal_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]") {
        spinner.set_style(style);
    }
    spinner.set_message("Removing background...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
