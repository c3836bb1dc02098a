use std::collections::HashMap;

use crate::models::KeywordCount;

pub const DEFAULT_TOP_K: usize = 10;

/// Counts each distinct token and returns the `top_k` most frequent.
///
/// Equal counts are ordered by where the token first appeared in `tokens`,
/// so the output is the same on every run.
pub fn rank<S: AsRef<str>>(tokens: &[S], top_k: usize) -> Vec<KeywordCount> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<KeywordCount> = Vec::new();

    for token in tokens {
        let token = token.as_ref();
        match index.get(token) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(token, counts.len());
                counts.push(KeywordCount::new(token, 1));
            }
        }
    }

    // `sort_by` is stable, which keeps first-seen order among ties
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(top_k);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_by_descending_count() {
        let ranked = rank(&["a", "b", "a", "c", "b", "a"], 2);
        assert_eq!(ranked, vec![KeywordCount::new("a", 3), KeywordCount::new("b", 2)]);
    }

    #[test]
    fn ties_follow_first_occurrence() {
        let ranked = rank(&["zeta", "alpha", "mid", "alpha", "zeta", "mid"], 10);
        let words: Vec<_> = ranked.iter().map(|k| k.word.as_str()).collect();
        assert_eq!(words, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn fewer_distinct_tokens_than_top_k() {
        let ranked = rank(&["solo"], DEFAULT_TOP_K);
        assert_eq!(ranked, vec![KeywordCount::new("solo", 1)]);
        assert!(rank::<&str>(&[], DEFAULT_TOP_K).is_empty());
    }

    #[test]
    fn counts_are_case_sensitive() {
        let ranked = rank(&["News", "news", "news"], 10);
        assert_eq!(
            ranked,
            vec![KeywordCount::new("news", 2), KeywordCount::new("News", 1)]
        );
    }
}
