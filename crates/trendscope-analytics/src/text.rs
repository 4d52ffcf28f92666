//! Text normalization and keyword extraction.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

pub use trendscope_core::extract_hashtags;

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)https?://\S+|www\.\S+").expect("valid url regex"));
static PUNCT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid punctuation regex"));

const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "had", "her", "was",
    "one", "our", "out", "day", "get", "has", "him", "his", "how", "its", "may", "new", "now",
    "old", "see", "two", "who", "did", "she", "use", "way", "what", "with", "this", "that",
    "from", "they", "will", "your", "have", "been", "were", "when", "than", "then", "them",
    "into", "just", "like", "more", "most", "over", "some", "such", "only", "also", "about",
    "after", "their", "there", "these", "those", "which", "while", "would", "could", "should",
    "every", "everyone", "here", "where",
];

/// Strips URLs and punctuation and collapses whitespace.
#[must_use]
pub fn clean_text(text: &str) -> String {
    let without_urls = URL_RE.replace_all(text, " ");
    let without_punct = PUNCT_RE.replace_all(&without_urls, " ");
    without_punct.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Counts content words across `texts`: lowercase, at least three characters,
/// not numeric, not a stop word.
///
/// Sorted by count descending, then alphabetically.
#[must_use]
pub fn extract_keywords<'a, I>(texts: I, limit: usize) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    for text in texts {
        for word in clean_text(text).split_whitespace() {
            let word = word.to_lowercase();
            if word.chars().count() < 3
                || word.chars().all(|c| c.is_ascii_digit() || c == '_')
                || STOP_WORDS.contains(&word.as_str())
            {
                continue;
            }
            *counts.entry(word).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_strips_urls_and_punctuation() {
        assert_eq!(
            clean_text("Watch this!! https://youtu.be/abc #viral   now..."),
            "Watch this viral now"
        );
    }

    #[test]
    fn clean_text_of_empty_is_empty() {
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn keywords_skip_stop_words_short_and_numeric_tokens() {
        let keywords = extract_keywords(["The 2024 dance trend is a dance craze"], 10);
        assert_eq!(
            keywords,
            vec![
                ("dance".to_string(), 2),
                ("craze".to_string(), 1),
                ("trend".to_string(), 1),
            ]
        );
    }

    #[test]
    fn keywords_respect_limit() {
        let keywords = extract_keywords(["alpha beta gamma delta", "alpha"], 2);
        assert_eq!(keywords.len(), 2);
        assert_eq!(keywords[0], ("alpha".to_string(), 2));
    }
}
