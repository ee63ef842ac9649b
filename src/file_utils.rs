use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::errors::{BuildError, BuildResult};

// @module: File utilities for the build inputs and the emitted header

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    /// Read a required input file to a string
    pub fn read_input<P: AsRef<Path>>(path: P) -> BuildResult<String> {
        fs::read_to_string(&path).map_err(|e| BuildError::missing_input(path.as_ref(), e))
    }

    /// Replace `path` with `content` in one step.
    ///
    /// The bytes go to a temporary file next to the destination which is then
    /// renamed over it, so a failed write never leaves a truncated header
    /// behind. The parent directory must already exist.
    pub fn write_atomic<P: AsRef<Path>>(path: P, content: &str) -> BuildResult<()> {
        let path = path.as_ref();
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp = NamedTempFile::new_in(parent).map_err(|e| BuildError::write(path, e))?;
        temp.write_all(content.as_bytes())
            .map_err(|e| BuildError::write(path, e))?;
        temp.flush().map_err(|e| BuildError::write(path, e))?;
        temp.persist(path).map_err(|e| BuildError::write(path, e.error))?;

        Ok(())
    }
}

/// Format a byte count as kilobytes with two decimals
pub fn format_kb(bytes: usize) -> String {
    format!("{:.2}KB", bytes as f64 / 1024.0)
}
