#![forbid(unsafe_code)]

//! Tokenization policy: what the smallest indivisible unit of text is.
//!
//! The splitter never reasons about strings directly; it asks the active
//! policy whether a string can still be subdivided and, for word-based
//! splitting, how it decomposes into tokens.
//!
//! Two policies exist:
//!
//! - [`TokenizePolicy::Characters`]: every grapheme cluster is a unit.
//!   Tokenization is unsupported; splitting operates on cluster offsets.
//! - [`TokenizePolicy::Words`]: a unit is a run of non-space characters
//!   together with the whitespace run that precedes it. Non-breaking space
//!   glues words together and is never dropped.
//!
//! # Example
//! ```
//! use clipmark_core::tokenize::TokenizePolicy;
//!
//! let words = TokenizePolicy::Words;
//! let tokens = words.tokenize("the quick  fox").unwrap();
//! assert_eq!(tokens, vec!["the", " quick", "  fox"]);
//! assert_eq!(tokens.concat(), "the quick  fox");
//!
//! assert!(words.is_atomic("  word  "));
//! assert!(!words.is_atomic("two words"));
//! ```

const NBSP: char = '\u{a0}';

/// Pluggable rule set defining the smallest indivisible unit of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenizePolicy {
    /// Split at grapheme-cluster offsets.
    #[default]
    Characters,
    /// Split at word boundaries, whitespace attached to the following word.
    Words,
}

impl TokenizePolicy {
    /// Resolve a policy from its configured name.
    ///
    /// Unknown names fall back to [`TokenizePolicy::Characters`] and emit a
    /// configuration warning; this is never an error.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "characters" => Self::Characters,
            "words" => Self::Words,
            other => {
                tracing::warn!(
                    policy = %other,
                    "unknown tokenize policy, falling back to characters"
                );
                Self::Characters
            }
        }
    }

    /// Whether the string cannot be subdivided any further under this policy.
    #[must_use]
    pub fn is_atomic(self, unit: &str) -> bool {
        match self {
            Self::Characters => {
                use unicode_segmentation::UnicodeSegmentation;
                unit.graphemes(true).nth(1).is_none()
            }
            Self::Words => words_atomic(unit),
        }
    }

    /// Decompose a string into tokens, or `None` when the policy splits on
    /// unit offsets instead.
    ///
    /// For [`TokenizePolicy::Words`], concatenating the tokens reproduces
    /// the input except that a trailing run of plain whitespace with no
    /// following word is trimmed. A trailing run containing non-breaking
    /// space is kept as a final token.
    #[must_use]
    pub fn tokenize(self, unit: &str) -> Option<Vec<String>> {
        match self {
            Self::Characters => None,
            Self::Words => Some(words_tokenize(unit)),
        }
    }

    /// Number of atomic units in the string.
    #[must_use]
    pub fn unit_count(self, text: &str) -> usize {
        match self {
            Self::Characters => {
                use unicode_segmentation::UnicodeSegmentation;
                text.graphemes(true).count()
            }
            Self::Words => {
                if text.is_empty() {
                    0
                } else if words_atomic(text) {
                    1
                } else {
                    words_tokenize(text).len()
                }
            }
        }
    }
}

/// Word characters are everything that is not whitespace, plus NBSP.
fn is_word_char(c: char) -> bool {
    !c.is_whitespace() || c == NBSP
}

/// Atomic under the words policy: optional whitespace, at most one run of
/// word characters, optional whitespace. Whitespace-only strings are atomic.
fn words_atomic(s: &str) -> bool {
    let mut chars = s.chars().peekable();
    while chars.peek().is_some_and(|c| c.is_whitespace()) {
        chars.next();
    }
    while chars.peek().copied().is_some_and(is_word_char) {
        chars.next();
    }
    while chars.peek().is_some_and(|c| c.is_whitespace()) {
        chars.next();
    }
    chars.next().is_none()
}

/// Split into tokens of the form `<whitespace run><word run>`, where the word
/// run starts with a strict non-whitespace character and then extends over
/// word characters (NBSP included, so NBSP-joined words stay one token).
fn words_tokenize(s: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut rest = s;
    loop {
        let ws_len = rest
            .find(|c: char| !c.is_whitespace())
            .unwrap_or(rest.len());
        if ws_len == rest.len() {
            // Trailing whitespace with no word after it: plain spaces are
            // trimmed, but NBSP must survive the round trip.
            if rest.contains(NBSP) {
                tokens.push(rest.to_string());
            }
            break;
        }
        let mut end = rest.len();
        for (i, c) in rest[ws_len..].char_indices() {
            if !is_word_char(c) {
                end = ws_len + i;
                break;
            }
        }
        tokens.push(rest[..end].to_string());
        rest = &rest[end..];
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn characters_single_grapheme_is_atomic() {
        let policy = TokenizePolicy::Characters;
        assert!(policy.is_atomic(""));
        assert!(policy.is_atomic("a"));
        assert!(policy.is_atomic("e\u{301}")); // combining accent, one cluster
        assert!(!policy.is_atomic("ab"));
    }

    #[test]
    fn characters_does_not_tokenize() {
        assert_eq!(TokenizePolicy::Characters.tokenize("abc"), None);
    }

    #[test]
    fn words_atomicity() {
        let policy = TokenizePolicy::Words;
        assert!(policy.is_atomic(""));
        assert!(policy.is_atomic("   "));
        assert!(policy.is_atomic("word"));
        assert!(policy.is_atomic("  word  "));
        assert!(policy.is_atomic("a\u{a0}b")); // NBSP glues, no boundary
        assert!(!policy.is_atomic("two words"));
        assert!(!policy.is_atomic(" a b "));
    }

    #[test]
    fn words_tokenize_attaches_leading_whitespace() {
        let tokens = TokenizePolicy::Words.tokenize("one two  three").unwrap();
        assert_eq!(tokens, vec!["one", " two", "  three"]);
    }

    #[test]
    fn words_tokenize_trims_trailing_plain_spaces() {
        let tokens = TokenizePolicy::Words.tokenize("one two   ").unwrap();
        assert_eq!(tokens, vec!["one", " two"]);
    }

    #[test]
    fn words_tokenize_keeps_trailing_nbsp_run() {
        let tokens = TokenizePolicy::Words.tokenize("one \u{a0}").unwrap();
        assert_eq!(tokens.concat(), "one \u{a0}");
    }

    #[test]
    fn words_tokenize_nbsp_inside_word() {
        let tokens = TokenizePolicy::Words.tokenize("a\u{a0}b c").unwrap();
        assert_eq!(tokens, vec!["a\u{a0}b", " c"]);
    }

    #[test]
    fn unit_counts() {
        assert_eq!(TokenizePolicy::Characters.unit_count("abcd"), 4);
        assert_eq!(TokenizePolicy::Words.unit_count("a b c"), 3);
        assert_eq!(TokenizePolicy::Words.unit_count("   "), 1);
        assert_eq!(TokenizePolicy::Words.unit_count(""), 0);
    }

    #[traced_test]
    #[test]
    fn unknown_policy_warns_and_falls_back() {
        let policy = TokenizePolicy::from_name("unknown-option");
        assert_eq!(policy, TokenizePolicy::Characters);
        assert!(logs_contain("unknown tokenize policy"));
    }

    #[test]
    fn known_names_resolve() {
        assert_eq!(
            TokenizePolicy::from_name("characters"),
            TokenizePolicy::Characters
        );
        assert_eq!(TokenizePolicy::from_name("words"), TokenizePolicy::Words);
    }
}
