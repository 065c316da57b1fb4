//! Obfuscation metric (`rogue_glyphs`).
//!
//! Measures the fraction of characters that fall outside the plain-prose
//! alphabet: zero-width characters, control characters, combining marks,
//! homoglyph-style symbols. Legitimate prompts are overwhelmingly letters,
//! digits, whitespace, and basic punctuation, so a high ratio is a strong
//! obfuscation signal.

use crate::metrics::Metric;
use crate::request::Request;

/// The `rogue_glyphs` metric.
pub struct RogueGlyphs;

/// Zero-width characters, flagged explicitly. Not whitespace per Unicode,
/// but invisible in rendered text.
const ZERO_WIDTH: &[char] = &[
    '\u{200B}', // zero width space
    '\u{200C}', // zero width non-joiner
    '\u{200D}', // zero width joiner
    '\u{2060}', // word joiner
    '\u{FEFF}', // zero width no-break space
];

fn is_flagged(c: char) -> bool {
    if ZERO_WIDTH.contains(&c) {
        return true;
    }
    !(c.is_alphanumeric() || c.is_whitespace() || matches!(c, '.' | ',' | '!' | '?' | '_' | '\''))
}

impl Metric for RogueGlyphs {
    fn name(&self) -> &'static str {
        "rogue_glyphs"
    }

    fn score(&self, request: &Request) -> f64 {
        let total = request.text.chars().count();
        if total == 0 {
            return 0.0;
        }
        let flagged = request.text.chars().filter(|&c| is_flagged(c)).count();
        (flagged as f64 / total as f64).clamp(0.0, 1.0)
    }
}
