/*!
 * Header emission.
 *
 * Renders compressed bytes as a guarded C header holding one program-memory
 * byte array, one chunk of bytes per line:
 *
 * ```text
 * #ifndef OTA_HTML_H
 * #define OTA_HTML_H
 *
 * #include <Arduino.h>
 *
 * const uint8_t OTA_HTML[] PROGMEM = {
 *   0x1f, 0x8b, 0x08, ...,
 *   0x00, 0x00
 * };
 *
 * #endif // OTA_HTML_H
 * ```
 */

use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Write as _;
use std::path::Path;

use crate::app_config::OutputConfig;
use crate::errors::{BuildError, BuildResult};
use crate::file_utils::FileManager;

static HEX_BYTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b0[xX]([0-9a-fA-F]{2})\b").expect("valid hex byte regex"));

/// Render the array body: `0x..` tokens, `chunk_width` per line, no trailing comma
pub fn render_body(bytes: &[u8], chunk_width: usize) -> String {
    let mut body = String::with_capacity(bytes.len() * 6 + 4);

    for (row, chunk) in bytes.chunks(chunk_width.max(1)).enumerate() {
        if row > 0 {
            body.push_str(",\n");
        }
        body.push_str("  ");
        for (i, byte) in chunk.iter().enumerate() {
            if i > 0 {
                body.push_str(", ");
            }
            // Writing into a String cannot fail
            let _ = write!(body, "0x{:02x}", byte);
        }
    }

    body
}

/// Render the complete header file for `bytes`
pub fn render(bytes: &[u8], output: &OutputConfig) -> String {
    let guard = &output.guard;
    let mut header = String::with_capacity(bytes.len() * 6 + 256);

    let _ = writeln!(header, "#ifndef {}", guard);
    let _ = writeln!(header, "#define {}", guard);
    header.push('\n');
    if !output.include.is_empty() {
        let _ = writeln!(header, "#include {}", output.include);
        header.push('\n');
    }

    let _ = write!(header, "const {} {}[]", output.element_type, output.array_name);
    if !output.storage_qualifier.is_empty() {
        let _ = write!(header, " {}", output.storage_qualifier);
    }
    header.push_str(" = {\n");
    header.push_str(&render_body(bytes, output.chunk_width));
    header.push_str("\n};\n\n");
    let _ = writeln!(header, "#endif // {}", guard);

    header
}

/// Recover the array bytes from a rendered header.
///
/// Only tokens between the opening `{` and the closing `};` of the array
/// are read, in order.
pub fn parse_byte_array(header: &str) -> BuildResult<Vec<u8>> {
    let open = header
        .find('{')
        .ok_or_else(|| BuildError::Verification("array initializer not found".to_string()))?;
    let close = header[open..]
        .find("};")
        .map(|offset| open + offset)
        .ok_or_else(|| BuildError::Verification("array initializer is not closed".to_string()))?;

    HEX_BYTE
        .captures_iter(&header[open + 1..close])
        .map(|token| {
            let digits = token.get(1).map_or("", |m| m.as_str());
            u8::from_str_radix(digits, 16)
                .map_err(|e| BuildError::Verification(format!("bad byte token {:?}: {}", digits, e)))
        })
        .collect()
}

/// Write the rendered header to `path`, replacing any existing file
pub fn write_header(path: &Path, header: &str, byte_count: usize) -> BuildResult<()> {
    FileManager::write_atomic(path, header)?;
    info!("Wrote {} bytes of compressed HTML to {:?}", byte_count, path);
    Ok(())
}
