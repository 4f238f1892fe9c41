/// Argument selector codec
///
/// A selector is an ordered path used to pull a value out of a structured step result.
/// The store persists it as a segment array (`["output", 0, "id"]`); the editor shows it
/// as a dotted string (`"output.0.id"`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// One path segment: a mapping key or an array index
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectorSegment {
    Index(u64),
    Key(String),
}

impl fmt::Display for SelectorSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorSegment::Index(i) => write!(f, "{}", i),
            SelectorSegment::Key(k) => f.write_str(k),
        }
    }
}

/// Selector in either its canonical (segments) or editable (dotted string) form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Selector {
    Path(Vec<SelectorSegment>),
    Text(String),
}

impl Default for Selector {
    fn default() -> Self {
        Selector::Path(Vec::new())
    }
}

impl Selector {
    /// Canonical segments, parsing the editable form if needed
    pub fn segments(&self) -> Vec<SelectorSegment> {
        match self {
            Selector::Path(segments) => segments.clone(),
            Selector::Text(text) => parse(text),
        }
    }

    /// Convert to the canonical form in place
    pub fn normalize(&mut self) {
        if let Selector::Text(text) = self {
            *self = Selector::Path(parse(text));
        }
    }

    /// Convert to the editable form in place
    pub fn to_editable(&mut self) {
        if let Selector::Path(segments) = self {
            *self = Selector::Text(serialize(segments));
        }
    }

    pub fn is_canonical(&self) -> bool {
        matches!(self, Selector::Path(_))
    }
}

/// Parse a dotted selector string into segments
///
/// Tokens made only of ASCII digits become integer segments, so `"a.2.b"` yields
/// `["a", 2, "b"]`. This is lossy on purpose: downstream, an integer indexes an array
/// while a string looks up a mapping key.
pub fn parse(text: &str) -> Vec<SelectorSegment> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    trimmed.split('.').map(parse_segment).collect()
}

// Only bare ASCII digits count: " 2" and "" stay keys rather than coercing to 2 and 0.
fn parse_segment(token: &str) -> SelectorSegment {
    if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
        // digits that overflow u64 stay a key
        if let Ok(index) = token.parse::<u64>() {
            return SelectorSegment::Index(index);
        }
    }
    SelectorSegment::Key(token.to_string())
}

/// Join segments into the editable dotted form
pub fn serialize(segments: &[SelectorSegment]) -> String {
    segments
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(k: &str) -> SelectorSegment {
        SelectorSegment::Key(k.to_string())
    }

    #[test]
    fn test_parse_mixed_segments() {
        assert_eq!(
            parse("a.2.b"),
            vec![key("a"), SelectorSegment::Index(2), key("b")]
        );
    }

    #[test]
    fn test_parse_empty_and_blank() {
        assert!(parse("").is_empty());
        assert!(parse("   ").is_empty());
    }

    #[test]
    fn test_parse_single_number() {
        assert_eq!(parse("3"), vec![SelectorSegment::Index(3)]);
    }

    #[test]
    fn test_parse_trims_outer_whitespace_only() {
        assert_eq!(parse("  a.b "), vec![key("a"), key("b")]);
        assert_eq!(parse("a. 2"), vec![key("a"), key(" 2")]);
    }

    #[test]
    fn test_non_digit_tokens_stay_keys() {
        assert_eq!(parse("-1"), vec![key("-1")]);
        assert_eq!(parse("a..b"), vec![key("a"), key(""), key("b")]);
        assert_eq!(
            parse("99999999999999999999999"),
            vec![key("99999999999999999999999")]
        );
    }

    #[test]
    fn test_serialize_joins_with_dots() {
        assert_eq!(
            serialize(&[key("output"), SelectorSegment::Index(0), key("id")]),
            "output.0.id"
        );
        assert_eq!(serialize(&[]), "");
    }

    #[test]
    fn test_normalize_and_editable() {
        let mut selector = Selector::Text("x.1".into());
        selector.normalize();
        assert_eq!(
            selector,
            Selector::Path(vec![key("x"), SelectorSegment::Index(1)])
        );

        selector.to_editable();
        assert_eq!(selector, Selector::Text("x.1".into()));
    }

    #[test]
    fn test_segments_from_either_form() {
        let expected = vec![key("rows"), SelectorSegment::Index(3)];
        assert_eq!(Selector::Text(" rows.3 ".into()).segments(), expected);
        assert_eq!(Selector::Path(expected.clone()).segments(), expected);
        assert!(Selector::Text("".into()).segments().is_empty());
    }

    #[test]
    fn test_padded_and_empty_tokens_stay_keys() {
        assert_eq!(parse("a. 2"), vec![key("a"), key(" 2")]);
        assert_eq!(parse("a..b"), vec![key("a"), key(""), key("b")]);
    }
}
