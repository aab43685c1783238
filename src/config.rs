//! Command-line configuration.
//!
//! Arguments come from the command line or from environment variables with
//! the `HISTOSEG_` prefix.
//!
//! # Commands
//!
//! ```text
//! histoseg-viewer render  -i IMG -s SEG [-s SEG ...] [-o OUT] [--classes FILE]
//! histoseg-viewer serve   -i IMG -s SEG [-s SEG ...] [--classes FILE] [--host H] [--port P]
//! histoseg-viewer inspect PATH [--label]
//! ```
//!
//! # Environment Variables
//!
//! - `HISTOSEG_IMAGE` - Base image path
//! - `HISTOSEG_SEGMENTATIONS` - Segmentation paths (comma-separated)
//! - `HISTOSEG_OUTPUT` - Output document (default: image_and_segmentation.html)
//! - `HISTOSEG_CLASSES` - Class scheme JSON file (default: built-in histology scheme)
//! - `HISTOSEG_HOST` - Server bind address (default: 127.0.0.1)
//! - `HISTOSEG_PORT` - Server port (default: 3000)

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::composite::ClassScheme;
use crate::error::SchemeError;
use crate::format::resolve_extension;
use crate::server::DEFAULT_OUTPUT;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

// =============================================================================
// CLI Arguments
// =============================================================================

/// histoseg-viewer - overlay pixel-wise segmentations on histology tiles
/// and medical volumes.
#[derive(Parser, Debug, Clone)]
#[command(name = "histoseg-viewer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Write a standalone HTML viewer for an image and its segmentations.
    Render(RenderConfig),

    /// Serve the viewer over HTTP with a live opacity API.
    Serve(ServeConfig),

    /// Load a single file and report what the loader made of it.
    Inspect(InspectConfig),
}

/// Inputs shared by `render` and `serve`.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Base image (.nii, .nii.gz or .png).
    #[arg(short, long, env = "HISTOSEG_IMAGE")]
    pub image: PathBuf,

    /// Segmentation label maps, one panel each.
    #[arg(
        short,
        long = "segmentation",
        required = true,
        env = "HISTOSEG_SEGMENTATIONS",
        value_delimiter = ','
    )]
    pub segmentations: Vec<PathBuf>,

    /// Class scheme JSON file.
    ///
    /// If not specified, uses Background, Normal, Stroma and Tumor.
    #[arg(long, env = "HISTOSEG_CLASSES")]
    pub classes: Option<PathBuf>,
}

impl InputArgs {
    /// Check every input resolves to a supported format.
    pub fn validate(&self) -> Result<(), String> {
        if self.segmentations.is_empty() {
            return Err("At least one segmentation is required. Set -s or HISTOSEG_SEGMENTATIONS".to_string());
        }
        for path in std::iter::once(&self.image).chain(&self.segmentations) {
            resolve_extension(path).map_err(|e| e.to_string())?;
        }
        Ok(())
    }

    /// The class scheme from `--classes`, or the default one.
    pub fn load_scheme(&self) -> Result<ClassScheme, SchemeError> {
        match &self.classes {
            Some(path) => ClassScheme::load(path),
            None => Ok(ClassScheme::default()),
        }
    }
}

/// Configuration for the `render` command.
#[derive(Args, Debug, Clone)]
pub struct RenderConfig {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output HTML file.
    #[arg(short, long, default_value = DEFAULT_OUTPUT, env = "HISTOSEG_OUTPUT")]
    pub output: PathBuf,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl RenderConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.input.validate()?;
        if self.output.as_os_str().is_empty() {
            return Err("Output path must not be empty".to_string());
        }
        Ok(())
    }
}

/// Configuration for the `serve` command.
#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    #[command(flatten)]
    pub input: InputArgs,

    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "HISTOSEG_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "HISTOSEG_PORT")]
    pub port: u16,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl ServeConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.input.validate()?;
        if self.host.is_empty() {
            return Err("Host must not be empty. Set --host or HISTOSEG_HOST".to_string());
        }
        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration for the `inspect` command.
#[derive(Args, Debug, Clone)]
pub struct InspectConfig {
    /// File to load.
    pub path: PathBuf,

    /// Load the file as a label map.
    #[arg(long, default_value_t = false)]
    pub label: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl InspectConfig {
    pub fn validate(&self) -> Result<(), String> {
        resolve_extension(&self.path)
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

// =============================================================================
// Tests
// =============================================================================
