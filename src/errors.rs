/*!
 * Error types for the otapack build step.
 *
 * Every stage of the pipeline reports failures through `BuildError`,
 * using the thiserror crate for ergonomic error definitions. Each variant
 * maps to exactly one stage so the binary can tell the user where the
 * build stopped.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can abort a build
#[derive(Error, Debug)]
pub enum BuildError {
    /// A required input file is absent or unreadable
    #[error("Missing input file {path:?}: {source}")]
    MissingInput {
        /// Path that could not be read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Markup the minifier cannot process
    #[error("Minification failed: {0}")]
    Minification(String),

    /// The compressor ran out of resources
    #[error("Compression failed: {0}")]
    Resource(String),

    /// The output header cannot be created or written
    #[error("Failed to write output {path:?}: {source}")]
    Write {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The rendered header does not decode back to the minified document
    #[error("Output verification failed: {0}")]
    Verification(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl BuildError {
    /// Name of the pipeline stage that produced this error
    pub fn stage(&self) -> &'static str {
        match self {
            Self::MissingInput { .. } => "inline",
            Self::Minification(_) => "minify",
            Self::Resource(_) => "compress",
            Self::Write { .. } => "emit",
            Self::Verification(_) => "verify",
            Self::Config(_) => "config",
        }
    }

    pub(crate) fn missing_input(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::MissingInput { path: path.into(), source }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write { path: path.into(), source }
    }
}

/// Result alias used throughout the library
pub type BuildResult<T> = std::result::Result<T, BuildError>;
