//! Trigram fluency scoring with backoff

use super::model::LanguageModel;

/// Sentence-begin marker used by the model
pub const SENTENCE_START: &str = "<s>";
/// Sentence-end marker used by the model
pub const SENTENCE_END: &str = "</s>";
/// Token substituted for words the model does not know
pub const UNKNOWN_WORD: &str = "<unk>";
/// Log10 probability assumed when neither a word nor `<unk>` is in the model
pub const UNKNOWN_LOG_PROB: f64 = -99.0;

/// Scores how natural a space-separated word sequence reads
///
/// Higher is more fluent. Implementations must be shareable across the
/// threads that compress clusters in parallel.
pub trait FluencyScorer: Sync {
    /// Fluency of `sentence`, without sentence markers
    fn fluency(&self, sentence: &str) -> f64;
}

impl<T: FluencyScorer + ?Sized> FluencyScorer for &T {
    fn fluency(&self, sentence: &str) -> f64 {
        (**self).fluency(sentence)
    }
}

impl LanguageModel {
    /// Log10 probability of `w3` following `w1 w2`
    ///
    /// Falls back from the trigram to the bigram `w1 w2` plus its backoff,
    /// then to the bigram `w2 w3`, then to the unigram backoff of `w2` plus
    /// the unigram probability of `w3`.
    pub fn trigram_log_prob(&self, w1: &str, w2: &str, w3: &str) -> f64 {
        if let Some(entry) = self.get(&format!("{} {} {}", w1, w2, w3)) {
            return entry.log_prob;
        }
        if let Some(entry) = self.get(&format!("{} {}", w1, w2)) {
            return entry.backoff + entry.log_prob;
        }
        if let Some(entry) = self.get(&format!("{} {}", w2, w3)) {
            return entry.log_prob;
        }

        let backoff = self.unigram(w2).map_or(0.0, |e| e.backoff);
        let log_prob = self.unigram(w3).map_or(UNKNOWN_LOG_PROB, |e| e.log_prob);
        backoff + log_prob
    }

    fn unigram(&self, word: &str) -> Option<&super::model::NgramEntry> {
        self.get(word).or_else(|| self.get(UNKNOWN_WORD))
    }

    fn vocabulary_word<'w>(&self, word: &'w str) -> &'w str {
        if word == SENTENCE_START || word == SENTENCE_END || self.contains(word) {
            word
        } else {
            UNKNOWN_WORD
        }
    }
}

impl FluencyScorer for LanguageModel {
    fn fluency(&self, sentence: &str) -> f64 {
        let mut words = Vec::with_capacity(sentence.len() / 4 + 2);
        words.push(SENTENCE_START);
        words.extend(sentence.split_whitespace().map(|w| self.vocabulary_word(w)));
        words.push(SENTENCE_END);

        words
            .windows(3)
            .map(|w| 10f64.powf(self.trigram_log_prob(w[0], w[1], w[2])))
            .sum()
    }
}
