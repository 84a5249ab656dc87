//! Matte provider backed by an external command
//!
//! The command receives the encoded image on stdin and writes the RGBA matte
//! to stdout. Option flags follow the `rembg i` command line:
//! `-a -af <fg> -ab <bg> -ae <erode>`, then `- -` for stdin/stdout.

use crate::{
    config::MatteOptions,
    error::{CompositeError, Result},
    matte::MatteProvider,
};
use std::io::Write;
use std::process::{Command, Stdio};
use tracing::{debug, instrument};

/// Runs an external background-removal command per request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMatteProvider {
    program: String,
    args: Vec<String>,
    model: Option<String>,
}

impl CommandMatteProvider {
    /// Command that runs `program` with `args` before the option flags
    #[must_use]
    pub fn new<S: Into<String>>(program: S, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            model: None,
        }
    }

    /// `rembg i`, the default provider command
    #[must_use]
    pub fn rembg() -> Self {
        Self::new("rembg", vec!["i".to_string()])
    }

    /// Parse a whitespace-separated command line such as `"rembg i"`
    ///
    /// # Errors
    /// - `CompositeError::InvalidConfig` for an empty command line
    pub fn from_command_line(command_line: &str) -> Result<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| CompositeError::invalid_config("provider command must not be empty"))?;
        Ok(Self::new(program, parts.collect()))
    }

    /// Ask the command for a specific model (`-m <model>`)
    #[must_use]
    pub fn with_model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Program that will be executed
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Full argument list for a request, excluding the program itself
    #[must_use]
    pub fn command_args(&self, options: &MatteOptions) -> Vec<String> {
        let mut args = self.args.clone();

        if let Some(model) = &self.model {
            args.push("-m".to_string());
            args.push(model.clone());
        }

        if options.alpha_matting {
            args.extend([
                "-a".to_string(),
                "-af".to_string(),
                options.foreground_threshold.to_string(),
                "-ab".to_string(),
                options.background_threshold.to_string(),
                "-ae".to_string(),
                options.erode_size.to_string(),
            ]);
        }

        args.push("-".to_string());
        args.push("-".to_string());
        args
    }

    fn display_command(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

impl Default for CommandMatteProvider {
    fn default() -> Self {
        Self::rembg()
    }
}

impl MatteProvider for CommandMatteProvider {
    fn name(&self) -> &str {
        &self.program
    }

    #[instrument(skip(self, image), fields(program = %self.program, input_bytes = image.len()))]
    fn extract_matte(&self, image: &[u8], options: &MatteOptions) -> Result<Vec<u8>> {
        let command = self.display_command();
        let args = self.command_args(options);
        debug!(args = ?args, "Spawning matte provider command");

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                CompositeError::provider_command_error(&command, &format!("failed to start: {}", e), None)
            })?;

        let mut stdin = child.stdin.take().ok_or_else(|| {
            CompositeError::provider_command_error(&command, "stdin was not captured", None)
        })?;

        // Feed stdin from a second thread so a command that streams its
        // output before consuming all input cannot deadlock on full pipes.
        let (write_result, output) = std::thread::scope(|scope| {
            let writer = scope.spawn(move || stdin.write_all(image));
            let output = child.wait_with_output();
            let write_result = writer.join().unwrap_or_else(|_| {
                Err(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "stdin writer thread panicked",
                ))
            });
            (write_result, output)
        });

        let output = output.map_err(|e| {
            CompositeError::provider_command_error(&command, &format!("failed to wait: {}", e), None)
        })?;
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            return Err(CompositeError::provider_command_error(
                &command,
                &format!("exited with {}", output.status),
                Some(&stderr),
            ));
        }

        if let Err(e) = write_result {
            return Err(CompositeError::provider_command_error(
                &command,
                &format!("failed to write input: {}", e),
                Some(&stderr),
            ));
        }

        if output.stdout.is_empty() {
            return Err(CompositeError::provider_command_error(
                &command,
                "produced no output",
                Some(&stderr),
            ));
        }

        debug!(output_bytes = output.stdout.len(), "Matte provider command finished");
        Ok(output.stdout)
    }
}
