//! Release name parsing
//!
//! Turns a raw release name such as `"V1.2.0-beta3"` into a numeric core and
//! an optional recognized pre-release marker. Parsing never fails: anything
//! that does not look like `<numeric><marker><digits>` is classified as a
//! production release.

use std::sync::LazyLock;

use regex::Regex;

use crate::release::channel::Marker;

/// `<numeric core>[separator]<letters><digits>` after prefix stripping
static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+(?:\.\d+)*)\.?[-_+~]?([a-z]+)(\d*)$").expect("marker pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedVersion {
    /// Dot-separated numeric components, possibly empty for non-numeric names
    pub numeric_core: Vec<u64>,
    /// Recognized marker token as written (`"beta"`, `"b"`, `"rc"`, ...)
    pub pre_release_tag: Option<String>,
    /// Digits trailing the marker
    pub pre_release_patch: Option<u64>,
}

impl ParsedVersion {
    pub fn marker(&self) -> Option<Marker> {
        self.pre_release_tag.as_deref().and_then(Marker::from_token)
    }
}

/// Lower-case, drop whitespace and strip a leading alphabetic prefix (`v`, `version`)
///
/// One `-` or `_` joining the prefix to the digits (`release-1.2.0`) goes with it.
/// The result is the display form of a release version; any marker is kept as-is.
pub fn normalized_version_string(raw_name: &str) -> String {
    let compact: String = raw_name
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    let unprefixed = compact.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    if unprefixed.len() == compact.len() {
        return compact;
    }
    match unprefixed.strip_prefix(['-', '_']) {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => rest.to_string(),
        _ => unprefixed.to_string(),
    }
}

pub fn parse(raw_name: &str) -> ParsedVersion {
    let normalized = normalized_version_string(raw_name);

    if let Some(caps) = MARKER_RE.captures(&normalized) {
        let token = &caps[2];
        if Marker::from_token(token).is_some() {
            return ParsedVersion {
                numeric_core: parse_numeric_core(&caps[1]),
                pre_release_tag: Some(token.to_string()),
                pre_release_patch: caps[3].parse().ok(),
            };
        }
    }

    ParsedVersion {
        numeric_core: parse_numeric_core(leading_numeric_run(&normalized)),
        pre_release_tag: None,
        pre_release_patch: None,
    }
}

fn leading_numeric_run(s: &str) -> &str {
    let end = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    &s[..end]
}

/// Components too large for `u64` saturate so later components keep their position
fn parse_numeric_core(s: &str) -> Vec<u64> {
    s.split('.')
        .filter(|part| !part.is_empty())
        .map(|part| part.parse().unwrap_or(u64::MAX))
        .collect()
}
