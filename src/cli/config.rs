//! Conversion of CLI arguments into library configuration

use crate::backends::ProviderKind;
use crate::cli::main_impl::{Cli, CliOutputFormat, CliProvider};
use crate::{
    config::{CompositeConfig, OutputFormat},
    matte::MatteProvider,
    utils::ColorParser,
};
use anyhow::{Context, Result};
use std::sync::Arc;

/// Merges `--config` file values with flag overrides
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Build the compositing configuration for this invocation
    ///
    /// Flags win over the config file; the file wins over built-in defaults.
    pub(crate) fn from_cli(cli: &Cli) -> Result<CompositeConfig> {
        let mut config = match &cli.config {
            Some(path) => CompositeConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config file {}", path.display()))?,
            None => CompositeConfig::default(),
        };

        if let Some(hex) = &cli.background {
            config.background = ColorParser::parse_hex(hex).context("Invalid --background")?;
        }
        if let Some(format) = cli.format {
            config.output_format = Self::output_format(format);
        }
        if let Some(quality) = cli.jpeg_quality {
            config.jpeg_quality = quality;
        }
        if cli.no_alpha_matting {
            config.matte.alpha_matting = false;
        }
        if let Some(threshold) = cli.fg_threshold {
            config.matte.foreground_threshold = threshold;
        }
        if let Some(threshold) = cli.bg_threshold {
            config.matte.background_threshold = threshold;
        }
        if let Some(size) = cli.erode_size {
            config.matte.erode_size = size;
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    /// Build the matte provider selected on the command line
    pub(crate) fn provider(cli: &Cli) -> Result<Arc<dyn MatteProvider>> {
        let kind = match cli.provider {
            CliProvider::Command => ProviderKind::Command,
            CliProvider::Embedded => ProviderKind::Embedded,
        };

        if kind == ProviderKind::Embedded && cli.provider_command.is_some() {
            log::warn!("--provider-command is ignored by the embedded provider");
        }

        kind.build(cli.provider_command.as_deref())
            .context("Failed to set up matte provider")
    }

    fn output_format(format: CliOutputFormat) -> OutputFormat {
        match format {
            CliOutputFormat::Png => OutputFormat::Png,
            CliOutputFormat::Jpeg => OutputFormat::Jpeg,
            CliOutputFormat::Webp => OutputFormat::WebP,
            CliOutputFormat::Tiff => OutputFormat::Tiff,
            CliOutputFormat::Raw => OutputFormat::Raw,
        }
    }
}
