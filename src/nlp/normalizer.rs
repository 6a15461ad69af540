//! Sentence normalization
//!
//! Turns raw `word/POS/weight` strings into [`Sentence`]s bounded by the
//! START and END sentinels. The split is anchored on the right so that the
//! word itself may contain the separator (`1/2/CD/1.5` is the word `1/2`).

use crate::errors::{CompressionError, Result};
use crate::types::{Sentence, Token};

/// Parser for tagged, weighted sentences
#[derive(Debug, Clone)]
pub struct SentenceNormalizer {
    separator: String,
}

impl Default for SentenceNormalizer {
    fn default() -> Self {
        Self::new("/")
    }
}

impl SentenceNormalizer {
    /// Create a normalizer splitting on `separator`
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }

    /// Normalize every sentence; the output is index-aligned with the input
    pub fn normalize_all<S: AsRef<str>>(&self, sentences: &[S]) -> Result<Vec<Sentence>> {
        sentences
            .iter()
            .enumerate()
            .map(|(index, raw)| self.normalize(index, raw.as_ref()))
            .collect()
    }

    /// Normalize a single sentence
    pub fn normalize(&self, index: usize, raw: &str) -> Result<Sentence> {
        let mut tokens = Vec::with_capacity(raw.len() / 8 + 2);
        tokens.push(Token::start());

        for chunk in raw.split_whitespace() {
            let token = self.parse_token(chunk).ok_or_else(|| {
                CompressionError::parse(
                    format!("sentence {}", index),
                    None,
                    format!(
                        "token {:?} does not match word{sep}tag{sep}weight",
                        chunk,
                        sep = self.separator
                    ),
                )
            })?;
            tokens.push(token);
        }

        tokens.push(Token::end());
        Ok(Sentence { index, tokens })
    }

    /// Split `word<sep>tag<sep>weight` from the right
    fn parse_token(&self, chunk: &str) -> Option<Token> {
        let mut parts = chunk.rsplitn(3, self.separator.as_str());
        let weight = parts.next()?;
        let pos = parts.next()?;
        let word = parts.next()?;

        if word.is_empty() || pos.is_empty() || !is_decimal(weight) {
            return None;
        }

        let weight: f64 = weight.parse().ok()?;
        Some(Token::new(word.to_lowercase(), pos, weight))
    }
}

/// Digits, optionally followed by a fractional part
fn is_decimal(text: &str) -> bool {
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text, None),
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    all_digits(int_part) && frac_part.map_or(true, all_digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_sentence() {
        let normalizer = SentenceNormalizer::default();
        let sentence = normalizer
            .normalize(0, "Turkey/NNP/2.47 says/VBZ/1.5 ./PUNCT/1")
            .unwrap();

        assert_eq!(sentence.len(), 5);
        assert_eq!(sentence.word_count(), 3);
        assert_eq!(sentence.tokens[0], Token::start());
        assert_eq!(sentence.tokens[1], Token::new("turkey", "NNP", 2.47));
        assert_eq!(sentence.tokens[3], Token::new(".", "PUNCT", 1.0));
        assert_eq!(sentence.tokens[4], Token::end());
    }

    #[test]
    fn test_whitespace_collapsed() {
        let normalizer = SentenceNormalizer::default();
        let sentence = normalizer
            .normalize(0, "  a/DT/1.0    cat/NN/2.0 \t ")
            .unwrap();
        assert_eq!(sentence.word_count(), 2);
    }

    #[test]
    fn test_word_containing_separator() {
        let normalizer = SentenceNormalizer::default();
        let sentence = normalizer.normalize(0, "1/2/CD/1.5").unwrap();
        assert_eq!(sentence.tokens[1], Token::new("1/2", "CD", 1.5));
    }

    #[test]
    fn test_custom_separator() {
        let normalizer = SentenceNormalizer::new("_");
        let sentence = normalizer.normalize(0, "cat_NN_3").unwrap();
        assert_eq!(sentence.tokens[1], Token::new("cat", "NN", 3.0));
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        let normalizer = SentenceNormalizer::default();
        for raw in ["cat/NN", "cat/NN/heavy", "/NN/1.0", "cat//1.0", "cat/NN/-1", "cat/NN/1."] {
            let err = normalizer.normalize(3, raw).unwrap_err();
            assert!(
                matches!(err, CompressionError::Parse { .. }),
                "{raw} should fail"
            );
        }
    }

    #[test]
    fn test_index_alignment() {
        let normalizer = SentenceNormalizer::default();
        let sentences = normalizer
            .normalize_all(&["a/DT/1", "b/NN/1 c/VB/1"])
            .unwrap();
        assert_eq!(sentences[0].index, 0);
        assert_eq!(sentences[1].index, 1);
        assert_eq!(sentences[1].word_count(), 2);
    }

    #[test]
    fn test_empty_sentence_has_only_sentinels() {
        let normalizer = SentenceNormalizer::default();
        let sentence = normalizer.normalize(0, "   ").unwrap();
        assert_eq!(sentence.len(), 2);
    }
}
