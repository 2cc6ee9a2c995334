//! Normalized-content fingerprint for markup fragments.
//!
//! Two renderings of the same component differ only in volatile
//! identifier attributes and whitespace; stripping both before hashing
//! makes the fingerprint stable across re-generations. The encoding is
//! process-local cache identity, not a compatibility surface.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

fn element_id_attr_regex() -> &'static regex::Regex {
    use std::sync::OnceLock;
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r#"data-element-id="[^"]*""#).unwrap())
}

fn whitespace_regex() -> &'static regex::Regex {
    use std::sync::OnceLock;
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r"\s+").unwrap())
}

/// Fingerprints a markup fragment: volatile id attributes stripped,
/// whitespace collapsed, base64-encoded and truncated to 32 chars.
pub fn fingerprint(element_html: &str) -> String {
    let stripped = element_id_attr_regex().replace_all(element_html, "");
    let collapsed = whitespace_regex().replace_all(&stripped, " ");
    let normalized = collapsed.trim();
    let mut encoded = STANDARD.encode(normalized);
    encoded.truncate(32);
    encoded
}
