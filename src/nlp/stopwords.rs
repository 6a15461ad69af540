//! Stopword lists
//!
//! Stopwords come either from a list file (one word per line, `#` starts a
//! comment line) or from the built-in lists of the `stop-words` crate.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use rustc_hash::FxHashSet;
use stop_words::{get, LANGUAGE};

use crate::errors::{CompressionError, Result};

/// A set of lowercase stopwords
#[derive(Debug, Clone, Default)]
pub struct StopwordFilter {
    stopwords: FxHashSet<String>,
}

impl StopwordFilter {
    /// Create a filter from the built-in list for `language`
    ///
    /// Unknown language codes fall back to English.
    pub fn new(language: &str) -> Self {
        let lang = match language.to_lowercase().as_str() {
            "de" | "german" => LANGUAGE::German,
            "fr" | "french" => LANGUAGE::French,
            "es" | "spanish" => LANGUAGE::Spanish,
            "it" | "italian" => LANGUAGE::Italian,
            "pt" | "portuguese" => LANGUAGE::Portuguese,
            "nl" | "dutch" => LANGUAGE::Dutch,
            "ru" | "russian" => LANGUAGE::Russian,
            _ => LANGUAGE::English,
        };

        Self {
            stopwords: get(lang).iter().map(|s| s.to_string().to_lowercase()).collect(),
        }
    }

    /// Create an empty filter
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a filter from a custom list
    pub fn from_list(words: &[&str]) -> Self {
        Self {
            stopwords: words.iter().map(|w| w.to_lowercase()).collect(),
        }
    }

    /// Load a stopword list file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| CompressionError::resource(path, e))?;
        Self::from_reader(BufReader::new(file))
            .map_err(|e| CompressionError::resource(path, e))
    }

    /// Read a stopword list, skipping blank lines and `#` comments
    pub fn from_reader<R: BufRead>(reader: R) -> std::io::Result<Self> {
        let mut stopwords = FxHashSet::default();
        for line in reader.lines() {
            let line = line?;
            if line.starts_with('#') {
                continue;
            }
            let word = line.trim();
            if !word.is_empty() {
                stopwords.insert(word.to_lowercase());
            }
        }
        Ok(Self { stopwords })
    }

    /// Check if a (lowercased) word is a stopword
    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    /// Number of stopwords
    pub fn len(&self) -> usize {
        self.stopwords.len()
    }

    /// Check if the filter is empty
    pub fn is_empty(&self) -> bool {
        self.stopwords.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    #[test]
    fn test_english_builtin() {
        let filter = StopwordFilter::new("en");
        assert!(filter.is_stopword("the"));
        assert!(filter.is_stopword("a"));
        assert!(!filter.is_stopword("warplane"));
    }

    #[test]
    fn test_unknown_language_falls_back_to_english() {
        let filter = StopwordFilter::new("xx");
        assert!(filter.is_stopword("the"));
    }

    #[test]
    fn test_reader_skips_comments_and_blanks() {
        let text = "# English stopwords\nthe\n\n  A  \n#of\non\n";
        let filter = StopwordFilter::from_reader(Cursor::new(text)).unwrap();

        assert_eq!(filter.len(), 3);
        assert!(filter.is_stopword("the"));
        assert!(filter.is_stopword("a"));
        assert!(filter.is_stopword("on"));
        assert!(!filter.is_stopword("of"));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "the\nof").unwrap();

        let filter = StopwordFilter::from_file(file.path()).unwrap();
        assert!(filter.is_stopword("of"));
    }

    #[test]
    fn test_missing_file_is_resource_error() {
        let err = StopwordFilter::from_file("/definitely/not/here.dat").unwrap_err();
        assert!(matches!(err, CompressionError::Resource { .. }));
    }

    #[test]
    fn test_custom_list() {
        let filter = StopwordFilter::from_list(&["The", "of"]);
        assert!(filter.is_stopword("the"));
        assert!(!filter.is_stopword("on"));
        assert!(StopwordFilter::empty().is_empty());
    }
}
