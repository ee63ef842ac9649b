/*!
 * Integration tests for complete builds through the controller
 */

use anyhow::Result;
use std::fs;
use otapack::compressor::decompress;
use otapack::emitter::parse_byte_array;
use otapack::{BuildError, Controller};
use crate::common;

const END_TO_END_HTML: &str = "<html><!-- build:sparkmd5 --><script src=\"node_modules/spark-md5/spark-md5.js\"></script><body> <p>hi</p> </body></html>";

/// Decode the header on disk back into the minified document
fn decode_header(text: &str) -> Result<String> {
    let bytes = parse_byte_array(text)?;
    Ok(String::from_utf8(decompress(&bytes)?)?)
}

/// Test the full pipeline on the reference document
#[test]
fn test_run_withReferenceDocument_shouldWriteDecodableHeader() -> Result<()> {
    common::init_logger();
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "index.html", END_TO_END_HTML)?;
    common::create_test_file(temp_dir.path(), "spark-md5.min.js", "var x=1;")?;
    let config = common::config_in(temp_dir.path());
    let output_path = config.output.path.clone();

    let report = Controller::with_config(config)?.run()?;

    assert!(report.written);
    assert_eq!(report.replacements, 1);

    let header = fs::read_to_string(&output_path)?;
    assert!(header.starts_with("#ifndef OTA_HTML_H\n#define OTA_HTML_H\n"));
    assert!(header.contains("const uint8_t OTA_HTML[] PROGMEM = {\n  0x1f, 0x8b"));
    assert!(header.trim_end().ends_with("#endif // OTA_HTML_H"));

    let html = decode_header(&header)?;
    assert!(html.contains("<script>var x=1;</script>"), "got {}", html);
    assert!(html.contains("<p>hi</p>"));
    assert!(!html.contains("build:sparkmd5"));
    assert!(!html.contains("> <"));
    assert_eq!(report.minified_size, html.len());
    assert_eq!(report.compressed_size, parse_byte_array(&header)?.len());

    Ok(())
}

/// Test that the payload is reproduced byte for byte when JS minification is off
#[test]
fn test_run_withJsMinificationDisabled_shouldKeepPayloadExactly() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "index.html", END_TO_END_HTML)?;
    common::create_test_file(temp_dir.path(), "spark-md5.min.js", "var x=1;")?;
    let mut config = common::config_in(temp_dir.path());
    config.minify.minify_js = false;
    let output_path = config.output.path.clone();

    Controller::with_config(config)?.run()?;

    let html = decode_header(&fs::read_to_string(&output_path)?)?;
    assert!(html.contains("<script>var x=1;</script>"));
    assert!(html.contains("<p>hi</p>"));

    Ok(())
}

/// Test that running twice produces an identical header
#[test]
fn test_run_twice_shouldProduceIdenticalOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "index.html", &common::sample_page())?;
    common::create_test_file(temp_dir.path(), "spark-md5.min.js", "(function(){window.SparkMD5={}})();")?;
    let config = common::config_in(temp_dir.path());
    let output_path = config.output.path.clone();
    let controller = Controller::with_config(config)?;

    controller.run()?;
    let first = fs::read(&output_path)?;
    controller.run()?;
    let second = fs::read(&output_path)?;

    assert_eq!(first, second);

    Ok(())
}

/// Test that a missing payload aborts before the existing header is touched
#[test]
fn test_run_withMissingPayload_shouldLeaveExistingOutputUntouched() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "index.html", END_TO_END_HTML)?;
    let config = common::config_in(temp_dir.path());
    let output_path = common::create_test_file(temp_dir.path(), "OtaHTML.h", "// previous build\n")?;
    let before = fs::metadata(&output_path)?.modified()?;

    let result = Controller::with_config(config)?.run();

    match result {
        Err(BuildError::MissingInput { path, .. }) => assert!(path.ends_with("spark-md5.min.js")),
        other => panic!("expected MissingInput, got {:?}", other),
    }
    assert_eq!(fs::read_to_string(&output_path)?, "// previous build\n");
    assert_eq!(fs::metadata(&output_path)?.modified()?, before);

    Ok(())
}

/// Test that a missing payload never creates the header
#[test]
fn test_run_withMissingPayload_shouldNotCreateOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "index.html", END_TO_END_HTML)?;
    let config = common::config_in(temp_dir.path());
    let output_path = config.output.path.clone();

    let result = Controller::with_config(config)?.run();

    assert!(result.is_err());
    assert!(!output_path.exists());

    Ok(())
}

/// Test that a minification failure aborts before writing
#[test]
fn test_run_withUnclosedScript_shouldFailInMinifyStage() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "index.html", "<html><body><script>var a = 1;</body></html>")?;
    common::create_test_file(temp_dir.path(), "spark-md5.min.js", "var x=1;")?;
    let config = common::config_in(temp_dir.path());
    let output_path = config.output.path.clone();

    let error = Controller::with_config(config)?.run().unwrap_err();

    assert_eq!(error.stage(), "minify");
    assert!(!output_path.exists());

    Ok(())
}

/// Test that an output path in a missing directory is a write error
#[test]
fn test_run_withMissingOutputDirectory_shouldReturnWriteError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "index.html", END_TO_END_HTML)?;
    common::create_test_file(temp_dir.path(), "spark-md5.min.js", "var x=1;")?;
    let mut config = common::config_in(temp_dir.path());
    config.output.path = temp_dir.path().join("no-such-dir").join("OtaHTML.h");

    let error = Controller::with_config(config)?.run().unwrap_err();

    assert!(matches!(error, BuildError::Write { .. }));
    assert_eq!(error.stage(), "emit");

    Ok(())
}

/// Test check mode: every stage runs but nothing is written
#[test]
fn test_check_withValidInputs_shouldNotWriteOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "index.html", &common::sample_page())?;
    common::create_test_file(temp_dir.path(), "spark-md5.min.js", "var x=1;")?;
    let config = common::config_in(temp_dir.path());
    let output_path = config.output.path.clone();

    let report = Controller::with_config(config)?.check()?;

    assert!(!report.written);
    assert!(report.minified_size < report.original_size);
    assert!(report.compressed_size > 0);
    assert!(!output_path.exists());

    Ok(())
}

/// Test that process() is a pure function of its inputs
#[test]
fn test_process_withInMemoryInputs_shouldProduceConsistentArtifact() -> Result<()> {
    let controller = Controller::with_config(otapack::Config::default())?;

    let artifact = controller.process(END_TO_END_HTML, "var x=1;")?;

    assert_eq!(parse_byte_array(&artifact.header)?, artifact.compressed);
    assert_eq!(decompress(&artifact.compressed)?, artifact.minified.as_bytes());
    assert_eq!(artifact.report.original_size, END_TO_END_HTML.len() - common::MARKER.len() + "<script>var x=1;</script>".len());
    assert!(!artifact.report.written);

    Ok(())
}

/// Test that the default minification keeps the payload's statement terminator
#[test]
fn test_process_withDefaultConfig_shouldKeepPayloadTerminator() -> Result<()> {
    let controller = Controller::with_config(otapack::Config::default())?;

    let artifact = controller.process(END_TO_END_HTML, "var x=1;")?;

    assert!(artifact.minified.contains("<script>var x=1;</script>"), "got {}", artifact.minified);
    assert!(artifact.minified.contains("<p>hi</p>"));

    Ok(())
}

/// Test that an invalid configuration is rejected before any stage runs
#[test]
fn test_with_config_withInvalidGuard_shouldReturnConfigError() {
    let mut config = otapack::Config::default();
    config.output.guard = "OTA HTML".to_string();

    let result = Controller::with_config(config);

    assert!(matches!(result, Err(BuildError::Config(_))));
}
