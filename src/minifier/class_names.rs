/*!
 * Class-name shortening.
 *
 * Renames classes to `a`, `b`, ... `z`, `aa`, ... in order of first
 * appearance. A class is only renamed when every occurrence of its name in
 * the document is either a token of a `class` attribute or a `.name`
 * selector in a `<style>` element; a name that shows up anywhere else
 * (script text, another attribute, page text) may be referenced in a way
 * this pass cannot rewrite, so it keeps its name.
 *
 * Generated names never collide with any word already in the document,
 * which also makes the pass idempotent.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

use super::{RawTextKind, raw_text_elements};

static TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<([a-zA-Z][^\s/>]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#).expect("valid tag regex")
});
static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([^\s"'<>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .expect("valid attribute regex")
});
static TEXTAREA_CLOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</textarea\s*>").expect("valid textarea close regex"));
static TITLE_CLOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</title\s*>").expect("valid title close regex"));
static CLASS_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+").expect("valid token regex"));
static SELECTOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\.(-?[_a-zA-Z][_a-zA-Z0-9-]*)").expect("valid selector regex")
});
static CSS_OPAQUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)url\([^)]*\)|"[^"]*"|'[^']*'|/\*.*?\*/"#).expect("valid css literal regex")
});
static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[_a-zA-Z0-9-]+").expect("valid word regex"));
static IDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?[_a-zA-Z][_a-zA-Z0-9-]*$").expect("valid ident regex"));

/// One place a class name is written
#[derive(Debug, Clone)]
struct Occurrence {
    start: usize,
    end: usize,
    in_style: bool,
}

/// Every class attribute token and style selector in the document, by name
#[derive(Debug, Default)]
struct ClassIndex {
    order: Vec<String>,
    occurrences: HashMap<String, Vec<Occurrence>>,
}

impl ClassIndex {
    fn record(&mut self, html: &str, start: usize, end: usize, in_style: bool) {
        let name = &html[start..end];
        if !self.occurrences.contains_key(name) {
            self.order.push(name.to_string());
        }
        self.occurrences
            .entry(name.to_string())
            .or_default()
            .push(Occurrence { start, end, in_style });
    }

    fn build(html: &str) -> Option<Self> {
        let raw_text = raw_text_elements(html).ok()?;
        let mut index = Self::default();

        let mut markup_start = 0;
        for element in raw_text.iter().map(Some).chain([None]) {
            let markup_end = element.map_or(html.len(), |e| e.start);
            index.scan_markup(html, markup_start, markup_end);

            if let Some(element) = element {
                if element.kind == RawTextKind::Style {
                    index.scan_style(html, element.start, element.end);
                }
                markup_start = element.end;
            }
        }

        Some(index)
    }

    fn scan_markup(&mut self, html: &str, start: usize, end: usize) {
        let markup = &html[start..end];
        let mut pos = 0;
        while let Some(tag) = TAG.captures_at(markup, pos) {
            let (Some(whole), Some(name), Some(attributes)) = (tag.get(0), tag.get(1), tag.get(2))
            else {
                break;
            };
            pos = whole.end();

            for attribute in ATTRIBUTE.captures_iter(attributes.as_str()) {
                let is_class = attribute
                    .get(1)
                    .is_some_and(|n| n.as_str().eq_ignore_ascii_case("class"));
                if !is_class {
                    continue;
                }
                let Some(value) = attribute.get(2).or_else(|| attribute.get(3)).or_else(|| attribute.get(4))
                else {
                    continue;
                };
                let value_start = start + attributes.start() + value.start();
                for token in CLASS_TOKEN.find_iter(value.as_str()) {
                    self.record(html, value_start + token.start(), value_start + token.end(), false);
                }
            }

            // Textarea and title bodies are text, whatever they look like
            let text_close = if name.as_str().eq_ignore_ascii_case("textarea") {
                Some(&*TEXTAREA_CLOSE)
            } else if name.as_str().eq_ignore_ascii_case("title") {
                Some(&*TITLE_CLOSE)
            } else {
                None
            };
            if let Some(close) = text_close {
                pos = close.find_at(markup, pos).map_or(markup.len(), |m| m.end());
            }
        }
    }

    fn scan_style(&mut self, html: &str, start: usize, end: usize) {
        let css = &html[start..end];
        let opaque: Vec<(usize, usize)> = CSS_OPAQUE
            .find_iter(css)
            .map(|m| (m.start(), m.end()))
            .collect();

        for selector in SELECTOR.captures_iter(css) {
            let Some(name) = selector.get(1) else {
                continue;
            };
            if opaque.iter().any(|&(s, e)| name.start() >= s && name.start() < e) {
                continue;
            }
            self.record(html, start + name.start(), start + name.end(), true);
        }
    }
}

/// Generated name for position `n` in `a, b, ..., z, aa, ab, ...`
fn generated_name(mut n: usize) -> String {
    let mut name = Vec::new();
    loop {
        name.push(b'a' + (n % 26) as u8);
        n /= 26;
        if n == 0 {
            break;
        }
        n -= 1;
    }
    name.reverse();
    String::from_utf8(name).unwrap_or_default()
}

/// Shorten class names in `html` where it is safe to do so
pub fn shorten(html: &str) -> String {
    let Some(index) = ClassIndex::build(html) else {
        return html.to_string();
    };

    let mut words: HashMap<&str, usize> = HashMap::new();
    for word in WORD.find_iter(html) {
        *words.entry(word.as_str()).or_default() += 1;
    }

    // Class names proper come from attributes; a selector-only name is just CSS
    let declared: HashSet<&str> = index
        .order
        .iter()
        .filter(|name| {
            index.occurrences[name.as_str()]
                .iter()
                .any(|o| !o.in_style)
        })
        .map(String::as_str)
        .collect();

    let mut renames: HashMap<&str, String> = HashMap::new();
    let mut next = 0;
    for name in index.order.iter().map(String::as_str) {
        if !declared.contains(name) || !IDENT.is_match(name) {
            continue;
        }
        let accounted = index.occurrences[name].len();
        if words.get(name).copied().unwrap_or(0) != accounted {
            debug!("Keeping class '{}', it is referenced outside class attributes and styles", name);
            continue;
        }

        let candidate = loop {
            let candidate = generated_name(next);
            if candidate == name || !words.contains_key(candidate.as_str()) {
                break candidate;
            }
            next += 1;
        };

        if candidate == name {
            next += 1;
        } else if candidate.len() < name.len() {
            renames.insert(name, candidate);
            next += 1;
        }
    }

    if renames.is_empty() {
        return html.to_string();
    }

    let mut edits: Vec<(usize, usize, &str)> = renames
        .iter()
        .flat_map(|(name, replacement)| {
            index.occurrences[*name]
                .iter()
                .map(move |o| (o.start, o.end, replacement.as_str()))
        })
        .collect();
    edits.sort_by_key(|&(start, _, _)| start);

    let mut output = String::with_capacity(html.len());
    let mut pos = 0;
    for (start, end, replacement) in edits {
        output.push_str(&html[pos..start]);
        output.push_str(replacement);
        pos = end;
    }
    output.push_str(&html[pos..]);

    debug!("Shortened {} class name(s)", renames.len());
    output
}
