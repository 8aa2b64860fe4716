//! OpenAPI to Postman collection conversion
//!
//! The conversion itself is delegated to the `openapi2postmanv2` command line
//! tool. This crate runs it and turns its exit status and diagnostic output
//! into a [`SyncError::Process`].
//!
//! ## Usage
//! ```rust,ignore
//! use postman_sync_converter::Converter;
//!
//! let converter = Converter::default();
//! let stdout = converter.convert("openapi.yaml", "docs/document-postman.json").await?;
//! ```

use postman_sync_common::{Result, SyncError};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, warn};

/// Default converter executable
pub const DEFAULT_CONVERTER: &str = "openapi2postmanv2";

/// Converter settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterConfig {
    /// Executable to run, looked up on `PATH` when not absolute
    pub program: PathBuf,

    /// Treat any output on stderr as a failure, even with a zero exit status
    pub strict: bool,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_CONVERTER),
            strict: true,
        }
    }
}

/// Runs the external converter
#[derive(Debug, Clone, Default)]
pub struct Converter {
    config: ConverterConfig,
}

impl Converter {
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    /// Use a different converter executable
    pub fn with_program<P: Into<PathBuf>>(mut self, program: P) -> Self {
        self.config.program = program.into();
        self
    }

    /// Toggle the stderr-is-failure policy
    pub fn strict(mut self, strict: bool) -> Self {
        self.config.strict = strict;
        self
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Convert `input` to a Postman collection written at `output`
    ///
    /// Returns whatever the converter printed on stdout.
    pub async fn convert<I, O>(&self, input: I, output: O) -> Result<String>
    where
        I: AsRef<Path>,
        O: AsRef<Path>,
    {
        let input = input.as_ref();
        let output = output.as_ref();

        if !tokio::fs::try_exists(input).await? {
            return Err(SyncError::process(
                "Input file not found",
                input.display().to_string(),
            ));
        }

        let args = self.args(input, output);
        debug!(
            program = %self.config.program.display(),
            input = %input.display(),
            output = %output.display(),
            "running converter"
        );

        let result = Command::new(&self.config.program)
            .args(&args)
            .output()
            .await
            .map_err(|e| {
                SyncError::process(
                    "Error executing command",
                    format!("{}: {}", self.config.program.display(), e),
                )
            })?;

        let stdout = String::from_utf8_lossy(&result.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&result.stderr).into_owned();

        if !result.status.success() {
            let mut data = format!("converter exited with {}", result.status);
            if !stderr.trim().is_empty() {
                data.push_str(": ");
                data.push_str(stderr.trim());
            }
            return Err(SyncError::process("Error executing command", data));
        }

        if !stderr.is_empty() {
            if self.config.strict {
                return Err(SyncError::process("Command threw errors", stderr));
            }
            warn!(stderr = %stderr.trim(), "converter wrote diagnostics");
        }

        debug!(bytes = stdout.len(), "converter finished");
        Ok(stdout)
    }

    fn args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        vec![
            OsString::from("-s"),
            input.as_os_str().to_owned(),
            OsString::from("-o"),
            output.as_os_str().to_owned(),
        ]
    }
}
