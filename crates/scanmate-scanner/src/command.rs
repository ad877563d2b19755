//! Capture source backed by external command line tools.
//!
//! The physical kiosk takes pictures with `raspistill` and decodes them with
//! `zbarimg`:
//!
//! ```text
//! raspistill --timeout 1500 --encoding jpg --output <image> --nopreview \
//!            --quality 10 --rotation 180 --width 1200 --height 1200
//! zbarimg -Sdisable -Sean13.enable -Sposition=false -Sx-density=2 \
//!         -Sy-density=2 --raw --quiet <image>
//! ```
//!
//! zbarimg exits with [`ZBAR_EXIT_NO_BARCODE`] when it processed the image
//! but found nothing. That is the only exit status mapped to
//! [`DecodeError::NotFound`].

use crate::error::{CaptureError, DecodeError};
use crate::traits::CaptureSource;
use scanmate_core::constants::{
    DEFAULT_CAPTURE_PROGRAM, DEFAULT_DECODE_PROGRAM, DEFAULT_IMAGE_PATH, ZBAR_EXIT_NO_BARCODE,
};
use std::fmt;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::info;

/// A program with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: String,
    args: Vec<String>,
}

impl ToolCommand {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// `raspistill` invocation writing a low quality, rotated JPEG to `image`.
    pub fn raspistill(program: impl Into<String>, image: &Path) -> Self {
        let image = image.display().to_string();
        Self::new(
            program,
            [
                "--timeout",
                "1500",
                "--encoding",
                "jpg",
                "--output",
                image.as_str(),
                "--nopreview",
                "--quality",
                "10",
                "--rotation",
                "180",
                "--width",
                "1200",
                "--height",
                "1200",
            ],
        )
    }

    /// `zbarimg` invocation reading EAN-13 codes only from `image`.
    pub fn zbarimg(program: impl Into<String>, image: &Path) -> Self {
        let image = image.display().to_string();
        Self::new(
            program,
            [
                "-Sdisable",
                "-Sean13.enable",
                "-Sposition=false",
                "-Sx-density=2",
                "-Sy-density=2",
                "--raw",
                "--quiet",
                image.as_str(),
            ],
        )
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).stdin(Stdio::null());
        command
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// [`CaptureSource`] running a capture and a decode program.
///
/// # Examples
///
/// ```no_run
/// use scanmate_scanner::{CaptureSource, CommandScanner};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut scanner = CommandScanner::default();
/// scanner.capture_image().await?;
/// let barcode = scanner.decode_image().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CommandScanner {
    capture: ToolCommand,
    decode: ToolCommand,
}

impl CommandScanner {
    pub fn new(capture: ToolCommand, decode: ToolCommand) -> Self {
        Self { capture, decode }
    }

    /// Use `raspistill`-compatible and `zbarimg`-compatible programs sharing
    /// `image` as the still image location.
    pub fn for_image(capture_program: &str, decode_program: &str, image: &Path) -> Self {
        Self::new(
            ToolCommand::raspistill(capture_program, image),
            ToolCommand::zbarimg(decode_program, image),
        )
    }

    pub fn capture_command(&self) -> &ToolCommand {
        &self.capture
    }

    pub fn decode_command(&self) -> &ToolCommand {
        &self.decode
    }
}

impl Default for CommandScanner {
    fn default() -> Self {
        Self::for_image(
            DEFAULT_CAPTURE_PROGRAM,
            DEFAULT_DECODE_PROGRAM,
            Path::new(DEFAULT_IMAGE_PATH),
        )
    }
}

impl CaptureSource for CommandScanner {
    async fn capture_image(&mut self) -> Result<(), CaptureError> {
        info!(command = %self.capture, "executing");

        let status = self
            .capture
            .command()
            .status()
            .await
            .map_err(|source| CaptureError::Spawn {
                program: self.capture.program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(CaptureError::Failed {
                program: self.capture.program.clone(),
                status: status.to_string(),
            });
        }

        Ok(())
    }

    async fn decode_image(&mut self) -> Result<String, DecodeError> {
        info!(command = %self.decode, "executing");

        let output = self.decode.command().output().await.map_err(|e| {
            DecodeError::fatal(format!("failed to run {}: {e}", self.decode.program))
        })?;

        if output.status.code() == Some(ZBAR_EXIT_NO_BARCODE) {
            return Err(DecodeError::NotFound);
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DecodeError::fatal(format!(
                "{} failed: {}: {}",
                self.decode.program,
                output.status,
                stderr.trim()
            )));
        }

        // --raw prints one symbol per line; only the first one is used.
        let stdout = String::from_utf8_lossy(&output.stdout);
        stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
            .ok_or(DecodeError::NotFound)
    }
}
