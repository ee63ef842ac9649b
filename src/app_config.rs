use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::PathBuf;

use crate::errors::{BuildError, BuildResult};

/// Application configuration module
/// This module holds the build configuration: where the inputs live, how the
/// placeholder marker looks, which minifier behaviors are on, and the shape
/// of the emitted header. Every field has a default so an empty JSON object
/// (or no config file at all) reproduces the stock build step.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Input file locations
    #[serde(default)]
    pub input: InputConfig,

    /// Placeholder marker settings
    #[serde(default)]
    pub inline: InlineConfig,

    /// Minifier toggles
    #[serde(default)]
    pub minify: MinifyConfig,

    /// Compression settings
    #[serde(default)]
    pub compression: CompressionConfig,

    /// Header output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Decode the rendered header before writing it
    #[serde(default = "default_true")]
    pub verify_output: bool,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Input file locations
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct InputConfig {
    /// HTML source document
    #[serde(default = "default_html_path")]
    pub html_path: PathBuf,

    /// Companion script inlined in place of the marker
    #[serde(default = "default_payload_path")]
    pub payload_path: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            html_path: default_html_path(),
            payload_path: default_payload_path(),
        }
    }
}

/// Placeholder marker: `<!-- build:{directive} -->` followed by
/// `<script src="{script_src}"></script>`
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct InlineConfig {
    /// Build directive name inside the comment
    #[serde(default = "default_directive")]
    pub directive: String,

    /// `src` of the reference-only script tag
    #[serde(default = "default_script_src")]
    pub script_src: String,
}

impl Default for InlineConfig {
    fn default() -> Self {
        Self {
            directive: default_directive(),
            script_src: default_script_src(),
        }
    }
}

/// Minification behaviors, each independently toggleable
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MinifyConfig {
    /// Collapse insignificant whitespace between tags
    #[serde(default = "default_true")]
    pub collapse_whitespace: bool,

    /// Remove comments
    #[serde(default = "default_true")]
    pub remove_comments: bool,

    /// Unquote attribute values where safe
    #[serde(default = "default_true")]
    pub remove_attribute_quotes: bool,

    /// Drop attributes whose value is the HTML default
    #[serde(default = "default_true")]
    pub remove_redundant_attributes: bool,

    /// Normalize the doctype to `<!doctype html>`
    #[serde(default = "default_true")]
    pub use_short_doctype: bool,

    /// Drop redundant `type` attributes on script and style
    #[serde(default = "default_true")]
    pub remove_type_attributes: bool,

    /// Minify embedded CSS
    #[serde(default = "default_true")]
    pub minify_css: bool,

    /// Minify embedded JS
    #[serde(default = "default_true")]
    pub minify_js: bool,

    /// Rename class names to short generated names.
    ///
    /// Only classes referenced nowhere but `class` attributes and `<style>`
    /// selectors are renamed. Turn this off for documents whose classes are
    /// referenced from outside the document.
    #[serde(default = "default_true")]
    pub shorten_class_names: bool,
}

impl Default for MinifyConfig {
    fn default() -> Self {
        Self {
            collapse_whitespace: true,
            remove_comments: true,
            remove_attribute_quotes: true,
            remove_redundant_attributes: true,
            use_short_doctype: true,
            remove_type_attributes: true,
            minify_css: true,
            minify_js: true,
            shorten_class_names: true,
        }
    }
}

/// Compression settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CompressionConfig {
    /// Gzip level, 0 (store) to 9 (best)
    #[serde(default = "default_compression_level")]
    pub level: u32,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            level: default_compression_level(),
        }
    }
}

/// Shape of the emitted header
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OutputConfig {
    /// Destination header path
    #[serde(default = "default_output_path")]
    pub path: PathBuf,

    /// Include guard macro
    #[serde(default = "default_guard")]
    pub guard: String,

    /// Array identifier
    #[serde(default = "default_array_name")]
    pub array_name: String,

    /// Header pulled in before the declaration
    #[serde(default = "default_include")]
    pub include: String,

    /// 8-bit unsigned element type
    #[serde(default = "default_element_type")]
    pub element_type: String,

    /// Program-memory storage qualifier
    #[serde(default = "default_storage_qualifier")]
    pub storage_qualifier: String,

    /// Bytes per body line
    #[serde(default = "default_chunk_width")]
    pub chunk_width: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            guard: default_guard(),
            array_name: default_array_name(),
            include: default_include(),
            element_type: default_element_type(),
            storage_qualifier: default_storage_qualifier(),
            chunk_width: default_chunk_width(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    // @returns: Matching log crate filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_html_path() -> PathBuf {
    PathBuf::from("frontend/index.html")
}

fn default_payload_path() -> PathBuf {
    PathBuf::from("frontend/node_modules/spark-md5/spark-md5.min.js")
}

fn default_directive() -> String {
    "sparkmd5".to_string()
}

fn default_script_src() -> String {
    "node_modules/spark-md5/spark-md5.js".to_string()
}

fn default_compression_level() -> u32 {
    9
}

fn default_output_path() -> PathBuf {
    PathBuf::from("src/OtaHTML.h")
}

fn default_guard() -> String {
    "OTA_HTML_H".to_string()
}

fn default_array_name() -> String {
    "OTA_HTML".to_string()
}

fn default_include() -> String {
    "<Arduino.h>".to_string()
}

fn default_element_type() -> String {
    "uint8_t".to_string()
}

fn default_storage_qualifier() -> String {
    "PROGMEM".to_string()
}

fn default_chunk_width() -> usize {
    64
}

/// C identifier check for guard and array names
fn is_c_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> BuildResult<()> {
        if self.inline.directive.trim().is_empty() {
            return Err(BuildError::Config("inline.directive must not be empty".to_string()));
        }

        if self.inline.script_src.trim().is_empty() {
            return Err(BuildError::Config("inline.script_src must not be empty".to_string()));
        }

        if self.compression.level > 9 {
            return Err(BuildError::Config(format!(
                "compression.level must be between 0 and 9, got {}",
                self.compression.level
            )));
        }

        self.output.validate()
    }
}

impl OutputConfig {
    /// Validate identifiers and chunking
    pub fn validate(&self) -> BuildResult<()> {
        if !is_c_identifier(&self.guard) {
            return Err(BuildError::Config(format!(
                "output.guard is not a valid identifier: {:?}",
                self.guard
            )));
        }

        if !is_c_identifier(&self.array_name) {
            return Err(BuildError::Config(format!(
                "output.array_name is not a valid identifier: {:?}",
                self.array_name
            )));
        }

        if self.guard == self.array_name {
            return Err(BuildError::Config(
                "output.guard and output.array_name must differ".to_string(),
            ));
        }

        if self.chunk_width == 0 {
            return Err(BuildError::Config("output.chunk_width must be at least 1".to_string()));
        }

        if self.element_type.trim().is_empty() {
            return Err(BuildError::Config("output.element_type must not be empty".to_string()));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            input: InputConfig::default(),
            inline: InlineConfig::default(),
            minify: MinifyConfig::default(),
            compression: CompressionConfig::default(),
            output: OutputConfig::default(),
            verify_output: true,
            log_level: LogLevel::default(),
        }
    }
}
