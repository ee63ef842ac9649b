/*!
 * # otapack - OTA page packer
 *
 * Build step that turns the OTA update page into a header file the firmware
 * can link in and serve straight from flash.
 *
 * ## Pipeline
 *
 * 1. Inline the companion script in place of its build marker
 * 2. Minify the HTML (markup, embedded CSS and JS, class names)
 * 3. Gzip the minified bytes
 * 4. Emit a guarded header holding a `PROGMEM` byte array, 64 bytes per line
 *
 * Every stage is a pure function of its input; only loading the two input
 * files and writing the header touch the filesystem.
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `inliner`: Build marker replacement
 * - `minifier`: HTML minification and class-name shortening
 * - `compressor`: Gzip compression
 * - `emitter`: Header rendering, parsing and writing
 * - `app_controller`: Stage orchestration
 * - `file_utils`: File system operations
 * - `errors`: Custom error types for the build
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod compressor;
pub mod emitter;
pub mod errors;
pub mod file_utils;
pub mod inliner;
pub mod minifier;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Artifact, BuildReport, Controller};
pub use errors::{BuildError, BuildResult};
