use std::collections::HashSet;

const DEFAULT_STOPWORDS: &[&str] = &[
    // Korean dependent nouns, pronouns and auxiliaries common in news copy
    "것", "수", "등", "및", "때", "중", "더", "그", "이", "저", "들", "년", "월", "일",
    "위해", "통해", "대한", "대해", "관련", "이번", "지난", "오는", "또한", "하지만",
    "그리고", "있다", "없다", "했다", "한다", "하는", "있는", "것으로", "것이다", "밝혔다",
    // English function words
    "the", "a", "an", "and", "or", "but", "to", "of", "in", "on", "for", "with", "is", "it",
    "this", "that", "be", "are", "was", "were", "as", "at", "from", "by", "about", "into",
    "has", "have", "had", "its", "not", "will", "said", "he", "she", "they", "we", "you",
];

pub const DEFAULT_MIN_CHARS: usize = 2;

/// Drops stopwords (compared lowercase) and tokens shorter than `min_chars`
/// Unicode scalar values. Surviving tokens keep their order and spelling.
#[derive(Debug, Clone)]
pub struct StopwordFilter {
    stopwords: HashSet<String>,
    min_chars: usize,
}

impl StopwordFilter {
    pub fn new<I, S>(stopwords: I, min_chars: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            stopwords: stopwords
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
            min_chars,
        }
    }

    /// Built-in vocabulary plus `extra`.
    pub fn with_extra<I, S>(extra: I, min_chars: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut filter = Self::new(DEFAULT_STOPWORDS.iter().copied(), min_chars);
        filter
            .stopwords
            .extend(extra.into_iter().map(|w| w.as_ref().to_lowercase()));
        filter
    }

    pub fn is_noise(&self, token: &str) -> bool {
        token.chars().count() < self.min_chars || self.stopwords.contains(&token.to_lowercase())
    }

    pub fn filter(&self, tokens: Vec<String>) -> Vec<String> {
        tokens.into_iter().filter(|t| !self.is_noise(t)).collect()
    }
}

impl Default for StopwordFilter {
    fn default() -> Self {
        Self::new(DEFAULT_STOPWORDS.iter().copied(), DEFAULT_MIN_CHARS)
    }
}
