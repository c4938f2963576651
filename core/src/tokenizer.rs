use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};

lazy_static! {
    static ref RE: Regex = Regex::new(r"[\p{L}\p{Nd}]+").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
}

/// Splits text into lowercase runs of letters and decimal digits, optionally
/// stemmed. Other numeric symbols such as `²` or `½` are delimiters.
///
/// The same configuration must be used at build time and at query time; the
/// index manifest records which one was used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tokenizer {
    stem: bool,
}

impl Tokenizer {
    pub fn new(stem: bool) -> Self {
        Self { stem }
    }

    pub fn stems(&self) -> bool {
        self.stem
    }

    /// Lazily yield the tokens of `text`. Calling again restarts the sequence.
    pub fn tokens<'a>(&self, text: &'a str) -> impl Iterator<Item = String> + 'a {
        let stem = self.stem;
        RE.find_iter(text).map(move |mat| {
            let token = mat.as_str().to_lowercase();
            if stem {
                STEMMER.stem(&token).into_owned()
            } else {
                token
            }
        })
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        self.tokens(text).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokenize() {
        let t = Tokenizer::new(false).tokenize("Hello, World!! 42nd--street");
        assert_eq!(t, vec!["hello", "world", "42nd", "street"]);
    }

    #[test]
    fn delimiters_at_edges_yield_no_empty_tokens() {
        let t = Tokenizer::new(false).tokenize("  ...cat;;dog...  ");
        assert_eq!(t, vec!["cat", "dog"]);
        assert!(Tokenizer::new(true).tokenize("").is_empty());
        assert!(Tokenizer::new(false).tokenize("--- !!").is_empty());
    }

    #[test]
    fn non_decimal_numerals_are_delimiters() {
        let t = Tokenizer::new(false).tokenize("x²+y½ Ⅻ 42");
        assert_eq!(t, vec!["x", "y", "42"]);
    }

    #[test]
    fn stemming_is_applied_only_when_enabled() {
        let plain = Tokenizer::new(false).tokenize("Running cats");
        assert_eq!(plain, vec!["running", "cats"]);
        let stemmed = Tokenizer::new(true).tokenize("Running cats");
        assert_eq!(stemmed, vec!["run", "cat"]);
    }
}
