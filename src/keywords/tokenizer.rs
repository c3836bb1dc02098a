//! Tokenizer strategies.
//!
//! The ranking pipeline only sees the [`Tokenizer`] trait. Which implementation
//! backs it is decided once from configuration ([`TokenizerKind`]).

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

// `\w` is Unicode-aware in the regex crate, so Hangul and accented letters
// count as word characters.
static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+").expect("word regex is valid"));

pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

/// Splits on runs of non-word characters and returns every run verbatim,
/// single characters included.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimpleTokenizer;

impl Tokenizer for SimpleTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        WORD_RE
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

/// Language-specific morphological analysis, reduced to the one operation the
/// keyword pipeline needs.
pub trait MorphAnalyzer: Send + Sync {
    fn extract_nouns(&self, text: &str) -> Vec<String>;
}

/// Keeps only the noun-like tokens reported by a [`MorphAnalyzer`].
pub struct NounTokenizer<A> {
    analyzer: A,
}

impl<A: MorphAnalyzer> NounTokenizer<A> {
    pub fn new(analyzer: A) -> Self {
        Self { analyzer }
    }
}

impl<A: MorphAnalyzer> Tokenizer for NounTokenizer<A> {
    fn tokenize(&self, text: &str) -> Vec<String> {
        self.analyzer.extract_nouns(text)
    }
}

// Longest first so that "에서" wins over "서".
const PARTICLES: &[&str] = &[
    "에서는", "으로는", "에게서", "까지", "부터", "에서", "에게", "으로", "처럼", "보다",
    "은", "는", "이", "가", "을", "를", "의", "에", "로", "와", "과", "도", "만",
];

const MIN_STEM_CHARS: usize = 2;

/// Heuristic noun extractor for Korean news text.
///
/// Strips a trailing case particle from Hangul words when at least two
/// syllables remain, drops predicate forms ending in `다`, and drops tokens
/// made only of digits. Latin words pass through untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct ParticleStripper;

impl ParticleStripper {
    fn noun_stem(word: &str) -> Option<&str> {
        if word.chars().all(|c| c.is_numeric()) {
            return None;
        }
        if !word.chars().any(is_hangul) {
            return Some(word);
        }
        if word.ends_with('다') {
            return None;
        }
        // 결과, 회의, 도로: a one-syllable remainder means the suffix is part of the noun
        for particle in PARTICLES {
            if let Some(stem) = word.strip_suffix(particle) {
                if stem.chars().count() >= MIN_STEM_CHARS {
                    return Some(stem);
                }
            }
        }
        Some(word)
    }
}

impl MorphAnalyzer for ParticleStripper {
    fn extract_nouns(&self, text: &str) -> Vec<String> {
        WORD_RE
            .find_iter(text)
            .filter_map(|m| Self::noun_stem(m.as_str()))
            .map(str::to_string)
            .collect()
    }
}

fn is_hangul(c: char) -> bool {
    matches!(c, '\u{AC00}'..='\u{D7A3}' | '\u{1100}'..='\u{11FF}' | '\u{3130}'..='\u{318F}')
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenizerKind {
    #[default]
    Simple,
    Nouns,
}

impl TokenizerKind {
    pub fn build(self) -> Arc<dyn Tokenizer> {
        match self {
            TokenizerKind::Simple => Arc::new(SimpleTokenizer),
            TokenizerKind::Nouns => Arc::new(NounTokenizer::new(ParticleStripper)),
        }
    }
}
