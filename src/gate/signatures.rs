//! Fast signature scan for known injection phrasing.

use aho_corasick::AhoCorasick;
use unicode_normalization::UnicodeNormalization;

/// Multi-pattern matcher over normalized text.
///
/// Patterns are matched case-insensitively against NFKC-folded text with
/// runs of whitespace collapsed to single spaces, so `IGNORE\n  previous`
/// and fullwidth look-alikes still hit `ignore previous`.
pub struct SignatureScanner {
    matcher: AhoCorasick,
    patterns: Vec<String>,
}

impl SignatureScanner {
    /// Build a scanner from a list of signature substrings.
    pub fn new(patterns: Vec<String>) -> Self {
        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(&patterns)
            .expect("Failed to build signature matcher");
        Self { matcher, patterns }
    }

    /// Scan text, returning the first matched signature if any.
    pub fn scan(&self, text: &str) -> Option<&str> {
        let normalized = normalize(text);
        self.matcher
            .find(&normalized)
            .map(|mat| self.patterns[mat.pattern().as_usize()].as_str())
    }

    /// The configured signature list.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

/// NFKC-fold and collapse whitespace runs to single spaces.
fn normalize(text: &str) -> String {
    let folded: String = text.nfkc().collect();
    let mut out = String::with_capacity(folded.len());
    let mut in_whitespace = false;
    for c in folded.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push(' ');
            }
            in_whitespace = true;
        } else {
            out.push(c);
            in_whitespace = false;
        }
    }
    out
}
