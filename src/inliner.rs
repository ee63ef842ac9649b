/*!
 * Placeholder inlining.
 *
 * The HTML source references its third-party script through a build marker:
 *
 * ```html
 * <!-- build:sparkmd5 -->
 * <script src="node_modules/spark-md5/spark-md5.js"></script>
 * ```
 *
 * The whole marker is swapped for an inline `<script>` element holding the
 * payload text verbatim.
 */

use log::{debug, warn};
use regex::{NoExpand, Regex};

use crate::app_config::InlineConfig;
use crate::errors::{BuildError, BuildResult};

/// Result of inlining a payload into a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlinedDocument {
    /// Document text after replacement
    pub html: String,
    /// Number of marker occurrences replaced
    pub replacements: usize,
}

/// Matches the build marker described by an [`InlineConfig`]
pub struct Inliner {
    pattern: Regex,
    directive: String,
}

impl Inliner {
    /// Compile the marker pattern for the given configuration
    pub fn new(config: &InlineConfig) -> BuildResult<Self> {
        let pattern = format!(
            r#"<!--\s*build:{}\s*-->\s*<script\s+src="{}"\s*>\s*</script>"#,
            regex::escape(&config.directive),
            regex::escape(&config.script_src)
        );

        let pattern = Regex::new(&pattern)
            .map_err(|e| BuildError::Config(format!("Invalid inline marker: {}", e)))?;

        Ok(Self {
            pattern,
            directive: config.directive.clone(),
        })
    }

    /// Replace every marker occurrence in `html` with `<script>{payload}</script>`
    pub fn inline(&self, html: &str, payload: &str) -> InlinedDocument {
        let replacements = self.pattern.find_iter(html).count();

        if replacements == 0 {
            warn!(
                "No build:{} marker found, document passes through unchanged",
                self.directive
            );
            return InlinedDocument {
                html: html.to_string(),
                replacements,
            };
        }

        let script = format!("<script>{}</script>", payload);
        let html = self.pattern.replace_all(html, NoExpand(&script)).into_owned();

        debug!(
            "Inlined {} bytes of script at {} marker(s)",
            payload.len(),
            replacements
        );

        InlinedDocument { html, replacements }
    }
}
