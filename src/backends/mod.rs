//! Matte provider implementations
//!
//! - Command backend: runs an external background-removal tool (`rembg` by default)
//! - Embedded-alpha backend: uses a matte the input already carries

pub mod command;
pub mod embedded;

// Test utilities for provider testing
#[cfg(test)]
pub(crate) mod test_utils;

pub use self::command::CommandMatteProvider;
pub use self::embedded::EmbeddedAlphaProvider;

use crate::{error::Result, matte::MatteProvider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Provider selection for runtime construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// External command (`rembg i` unless overridden)
    #[default]
    Command,
    /// Input already carries its matte
    Embedded,
}

impl ProviderKind {
    /// Build a shareable provider of this kind
    ///
    /// `command_line` overrides the external command; it is ignored by the
    /// embedded provider.
    ///
    /// # Errors
    /// - `CompositeError::InvalidConfig` for an empty command line
    pub fn build(self, command_line: Option<&str>) -> Result<Arc<dyn MatteProvider>> {
        match self {
            Self::Command => {
                let provider = match command_line {
                    Some(line) => CommandMatteProvider::from_command_line(line)?,
                    None => CommandMatteProvider::rembg(),
                };
                Ok(Arc::new(provider))
            },
            Self::Embedded => Ok(Arc::new(EmbeddedAlphaProvider::new())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_build() {
        let provider = ProviderKind::Command.build(None).unwrap();
        assert_eq!(provider.name(), "rembg");

        let provider = ProviderKind::Command.build(Some("backgroundremover -i")).unwrap();
        assert_eq!(provider.name(), "backgroundremover");

        let provider = ProviderKind::Embedded.build(Some("ignored")).unwrap();
        assert_eq!(provider.name(), "embedded-alpha");

        assert!(ProviderKind::Command.build(Some("")).is_err());
    }
}
