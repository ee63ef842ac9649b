/*!
 * Tests for error types and stage mapping
 */

use std::io;
use otapack::BuildError;

#[test]
fn test_buildError_missingInput_shouldDisplayPath() {
    let error = BuildError::MissingInput {
        path: "frontend/index.html".into(),
        source: io::Error::new(io::ErrorKind::NotFound, "No such file"),
    };
    let display = format!("{}", error);
    assert!(display.contains("Missing input file"));
    assert!(display.contains("frontend/index.html"));
    assert!(display.contains("No such file"));
}

#[test]
fn test_buildError_write_shouldDisplayPath() {
    let error = BuildError::Write {
        path: "missing/OtaHTML.h".into(),
        source: io::Error::new(io::ErrorKind::NotFound, "No such directory"),
    };
    let display = format!("{}", error);
    assert!(display.contains("Failed to write output"));
    assert!(display.contains("missing/OtaHTML.h"));
}

#[test]
fn test_buildError_stage_shouldNameEachStage() {
    let missing = BuildError::MissingInput {
        path: "a".into(),
        source: io::Error::new(io::ErrorKind::NotFound, "x"),
    };
    let write = BuildError::Write {
        path: "b".into(),
        source: io::Error::new(io::ErrorKind::PermissionDenied, "x"),
    };

    assert_eq!(missing.stage(), "inline");
    assert_eq!(BuildError::Minification("x".into()).stage(), "minify");
    assert_eq!(BuildError::Resource("x".into()).stage(), "compress");
    assert_eq!(write.stage(), "emit");
    assert_eq!(BuildError::Verification("x".into()).stage(), "verify");
    assert_eq!(BuildError::Config("x".into()).stage(), "config");
}

#[test]
fn test_buildError_intoAnyhow_shouldStillDowncast() {
    let error: anyhow::Error = BuildError::Resource("out of memory".into()).into();
    let build_error = error.downcast_ref::<BuildError>().expect("should downcast");
    assert_eq!(build_error.stage(), "compress");
    assert!(error.to_string().contains("out of memory"));
}
