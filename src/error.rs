//! Error types for matte compositing operations

use thiserror::Error;

/// Result type alias for compositing operations
pub type Result<T> = std::result::Result<T, CompositeError>;

/// Error kinds surfaced by the compositing pipeline.
///
/// Every error is scoped to the request that produced it; none of them leaves
/// the processor in an unusable state.
#[derive(Error, Debug)]
pub enum CompositeError {
    /// Input bytes (or the provider's output) are not a decodable image
    #[error("Decode error: {0}")]
    Decode(String),

    /// The matte provider could not be invoked or rejected the input
    #[error("Matte provider error: {0}")]
    MatteProvider(String),

    /// Malformed `#RRGGBB` color string
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// The output format cannot represent the raster, or the encoder failed
    #[error("Encode error: {0}")]
    Encode(String),

    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Raster violates a compositing precondition (e.g. zero-sized)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A processing worker died before producing a result
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CompositeError {
    /// Create a new decode error
    pub fn decode<S: Into<String>>(msg: S) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a new matte provider error
    pub fn matte_provider<S: Into<String>>(msg: S) -> Self {
        Self::MatteProvider(msg.into())
    }

    /// Create a new invalid color error
    pub fn invalid_color<S: Into<String>>(msg: S) -> Self {
        Self::InvalidColor(msg.into())
    }

    /// Create a new encode error
    pub fn encode<S: Into<String>>(msg: S) -> Self {
        Self::Encode(msg.into())
    }

    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<std::path::Path>>(
        operation: &str,
        path: P,
        error: &std::io::Error,
    ) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to {} '{}': {}", operation, path_display, error),
        ))
    }

    /// Create configuration error with valid ranges
    pub fn config_value_error<T: std::fmt::Display>(
        parameter: &str,
        value: T,
        valid_range: &str,
        recommended: Option<T>,
    ) -> Self {
        let recommendation = match recommended {
            Some(rec) => format!(" Recommended: {}", rec),
            None => String::new(),
        };

        Self::InvalidConfig(format!(
            "Invalid {}: {} (valid range: {}).{}",
            parameter, value, valid_range, recommendation
        ))
    }

    /// Create matte provider error carrying the command that failed
    pub fn provider_command_error(command: &str, details: &str, stderr: Option<&str>) -> Self {
        let stderr_context = match stderr.map(str::trim) {
            Some(text) if !text.is_empty() => format!(" (stderr: {})", text),
            _ => String::new(),
        };

        Self::MatteProvider(format!(
            "'{}' failed: {}{}",
            command, details, stderr_context
        ))
    }

    /// Short machine-friendly name of the error kind
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Decode(_) => "decode",
            Self::MatteProvider(_) => "matte_provider",
            Self::InvalidColor(_) => "invalid_color",
            Self::Encode(_) => "encode",
            Self::Io(_) => "io",
            Self::InvalidConfig(_) => "invalid_config",
            Self::InvalidInput(_) => "invalid_input",
            Self::Internal(_) => "internal",
        }
    }
}
