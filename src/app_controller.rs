use log::{debug, info};
use std::path::PathBuf;
use std::time::Instant;

use crate::app_config::Config;
use crate::compressor;
use crate::emitter;
use crate::errors::{BuildError, BuildResult};
use crate::file_utils::{FileManager, format_kb};
use crate::inliner::Inliner;
use crate::minifier::Minifier;

// @module: Build controller composing the pipeline stages

/// Everything the pipeline produced for one document, before anything is written
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Minified document
    pub minified: String,
    /// Gzip bytes of the minified document
    pub compressed: Vec<u8>,
    /// Rendered header text
    pub header: String,
    /// Size bookkeeping
    pub report: BuildReport,
}

/// Sizes and counts from one build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Bytes of the document after inlining
    pub original_size: usize,
    /// Bytes after minification
    pub minified_size: usize,
    /// Bytes after compression
    pub compressed_size: usize,
    /// Marker occurrences replaced by the payload
    pub replacements: usize,
    /// Destination header path
    pub output_path: PathBuf,
    /// Whether the header was written
    pub written: bool,
}

/// Main build controller
pub struct Controller {
    // @field: Build configuration
    config: Config,
    inliner: Inliner,
    minifier: Minifier,
}

impl Controller {
    // @method: Create a controller, validating the configuration first
    pub fn with_config(config: Config) -> BuildResult<Self> {
        config.validate()?;
        let inliner = Inliner::new(&config.inline)?;
        let minifier = Minifier::new(&config.minify);

        Ok(Self {
            config,
            inliner,
            minifier,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the pure stages over in-memory inputs: inline, minify, compress, render, verify
    pub fn process(&self, html: &str, payload: &str) -> BuildResult<Artifact> {
        let inlined = self.inliner.inline(html, payload);
        let minified = self.minifier.minify(&inlined.html)?;
        let compressed = compressor::compress(minified.as_bytes(), self.config.compression.level)?;
        let header = emitter::render(&compressed, &self.config.output);

        if self.config.verify_output {
            Self::verify(&header, &compressed, &minified)?;
        }

        let report = BuildReport {
            original_size: inlined.html.len(),
            minified_size: minified.len(),
            compressed_size: compressed.len(),
            replacements: inlined.replacements,
            output_path: self.config.output.path.clone(),
            written: false,
        };

        Ok(Artifact {
            minified,
            compressed,
            header,
            report,
        })
    }

    /// Decode `header` back and compare it to what was rendered
    fn verify(header: &str, compressed: &[u8], minified: &str) -> BuildResult<()> {
        let parsed = emitter::parse_byte_array(header)?;
        if parsed != compressed {
            return Err(BuildError::Verification(format!(
                "header holds {} bytes, expected {}",
                parsed.len(),
                compressed.len()
            )));
        }

        let restored = compressor::decompress(&parsed)?;
        if restored != minified.as_bytes() {
            return Err(BuildError::Verification(
                "decompressed header does not match the minified document".to_string(),
            ));
        }

        debug!("Verified {} header bytes", parsed.len());
        Ok(())
    }

    /// Load the inputs and build the artifact without touching the output
    pub fn build(&self) -> BuildResult<Artifact> {
        let html = FileManager::read_input(&self.config.input.html_path)?;
        let payload = FileManager::read_input(&self.config.input.payload_path)?;
        debug!(
            "Read {} and {}",
            self.config.input.html_path.display(),
            self.config.input.payload_path.display()
        );

        self.process(&html, &payload)
    }

    /// Run the whole build and write the header
    pub fn run(&self) -> BuildResult<BuildReport> {
        let start_time = Instant::now();

        let artifact = self.build()?;
        emitter::write_header(
            &self.config.output.path,
            &artifact.header,
            artifact.compressed.len(),
        )?;

        let mut report = artifact.report;
        report.written = true;

        info!(
            "{} file created successfully ({} gzip) in {:.1?}",
            self.config.output.path.display(),
            format_kb(report.compressed_size),
            start_time.elapsed()
        );

        Ok(report)
    }

    /// Run every stage except the write
    pub fn check(&self) -> BuildResult<BuildReport> {
        let artifact = self.build()?;
        info!(
            "Check passed: {} would hold {} bytes ({} lines)",
            self.config.output.path.display(),
            artifact.compressed.len(),
            artifact.compressed.len().div_ceil(self.config.output.chunk_width)
        );
        Ok(artifact.report)
    }
}
