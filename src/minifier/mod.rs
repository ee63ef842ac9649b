/*!
 * HTML minification.
 *
 * Markup, embedded CSS and embedded JS are shrunk by the `minify-html`
 * crate. Class-name shortening is not something that crate does, so it
 * runs afterwards as a separate pass (see [`class_names`]).
 */

pub mod class_names;

use log::{debug, info, warn};
use minify_html::Cfg;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::app_config::MinifyConfig;
use crate::errors::{BuildError, BuildResult};
use crate::file_utils::format_kb;

static RAW_TEXT_OPEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<!--|<(script|style)\b(?:[^>"']|"[^"]*"|'[^']*')*>"#).expect("valid raw text regex")
});
static SCRIPT_CLOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</script\s*>").expect("valid script close regex"));
static STYLE_CLOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</style\s*>").expect("valid style close regex"));

/// Kind of raw text element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawTextKind {
    Script,
    Style,
}

/// Body of a `<script>` or `<style>` element, as byte offsets into the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawText {
    pub kind: RawTextKind,
    pub start: usize,
    pub end: usize,
}

/// Markup that cannot be split into raw text and the rest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanError {
    /// `<script>` or `<style>` without a close tag, at this offset
    UnclosedElement(usize),
    /// `<!--` without `-->`, at this offset
    UnterminatedComment(usize),
}

/// Locate every script and style body in `html`.
///
/// A body ends at the first matching close tag, the way an HTML parser
/// ends it. Elements inside comments are skipped.
pub fn raw_text_elements(html: &str) -> Result<Vec<RawText>, ScanError> {
    let mut elements = Vec::new();
    let mut pos = 0;

    while let Some(open) = RAW_TEXT_OPEN.captures_at(html, pos) {
        let Some(tag) = open.get(0) else {
            break;
        };

        let Some(name) = open.get(1) else {
            let close = html[tag.end()..]
                .find("-->")
                .ok_or(ScanError::UnterminatedComment(tag.start()))?;
            pos = tag.end() + close + 3;
            continue;
        };

        let kind = if name.as_str().eq_ignore_ascii_case("script") {
            RawTextKind::Script
        } else {
            RawTextKind::Style
        };
        let close_re = match kind {
            RawTextKind::Script => &*SCRIPT_CLOSE,
            RawTextKind::Style => &*STYLE_CLOSE,
        };

        let close = close_re
            .find_at(html, tag.end())
            .ok_or(ScanError::UnclosedElement(tag.start()))?;
        elements.push(RawText {
            kind,
            start: tag.end(),
            end: close.start(),
        });
        pos = close.end();
    }

    Ok(elements)
}

/// Reject input the minifier cannot process
fn check_markup(html: &str) -> BuildResult<()> {
    if let Some(offset) = html.find('\0') {
        return Err(BuildError::Minification(format!(
            "NUL byte at offset {}",
            offset
        )));
    }

    match raw_text_elements(html) {
        Ok(_) => Ok(()),
        Err(ScanError::UnclosedElement(offset)) => Err(BuildError::Minification(format!(
            "unclosed <script> or <style> element at offset {}",
            offset
        ))),
        Err(ScanError::UnterminatedComment(offset)) => Err(BuildError::Minification(format!(
            "unterminated comment at offset {}",
            offset
        ))),
    }
}

/// Put back the trailing `;` the JS minifier strips from script bodies.
///
/// Scripts are paired by position. If the two documents do not hold the same
/// number of scripts the minified text is returned unchanged.
fn restore_statement_terminators(source: &str, minified: String) -> String {
    let scripts = |html: &str| -> Option<Vec<RawText>> {
        raw_text_elements(html).ok().map(|elements| {
            elements
                .into_iter()
                .filter(|e| e.kind == RawTextKind::Script)
                .collect()
        })
    };
    let (Some(before), Some(after)) = (scripts(source), scripts(&minified)) else {
        return minified;
    };
    if before.len() != after.len() {
        return minified;
    }

    let mut output = String::with_capacity(minified.len() + after.len());
    let mut pos = 0;
    for (original, shrunk) in before.iter().zip(&after) {
        let terminated = source[original.start..original.end].trim_end().ends_with(';');
        let body = minified[shrunk.start..shrunk.end].trim_end();
        if terminated && !body.is_empty() && !body.ends_with(';') {
            let body_end = shrunk.start + body.len();
            output.push_str(&minified[pos..body_end]);
            output.push(';');
            pos = body_end;
        }
    }
    output.push_str(&minified[pos..]);
    output
}

/// Minifies HTML according to a [`MinifyConfig`]
pub struct Minifier {
    config: MinifyConfig,
    cfg: Cfg,
}

impl Minifier {
    pub fn new(config: &MinifyConfig) -> Self {
        let forced = [
            ("collapse_whitespace", config.collapse_whitespace),
            ("remove_attribute_quotes", config.remove_attribute_quotes),
            ("remove_type_attributes", config.remove_type_attributes),
        ];
        for (flag, enabled) in forced {
            if !enabled {
                warn!("minify.{} = false is not supported by the HTML minifier and will be ignored", flag);
            }
        }

        let cfg = Cfg {
            do_not_minify_doctype: !config.use_short_doctype,
            ensure_spec_compliant_unquoted_attribute_values: true,
            keep_closing_tags: true,
            keep_comments: !config.remove_comments,
            keep_html_and_head_opening_tags: true,
            keep_input_type_text_attr: !config.remove_redundant_attributes,
            minify_css: config.minify_css,
            minify_js: config.minify_js,
            ..Cfg::new()
        };

        Self {
            config: config.clone(),
            cfg,
        }
    }

    /// Minify `html`, logging the size before and after
    pub fn minify(&self, html: &str) -> BuildResult<String> {
        check_markup(html)?;

        let minified = minify_html::minify(html.as_bytes(), &self.cfg);
        let mut minified = String::from_utf8(minified).map_err(|_| {
            BuildError::Minification("minification produced invalid UTF-8".to_string())
        })?;

        if self.config.minify_js {
            minified = restore_statement_terminators(html, minified);
        }

        if self.config.shorten_class_names {
            minified = class_names::shorten(&minified);
        }

        if minified.len() > html.len() {
            debug!(
                "Minified output is larger than its input ({} > {} bytes), keeping the input",
                minified.len(),
                html.len()
            );
            minified = html.to_string();
        }

        info!(
            "[Minifier] Original: {} | Minified: {}",
            format_kb(html.len()),
            format_kb(minified.len())
        );

        Ok(minified)
    }
}
