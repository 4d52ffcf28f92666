//! Lexicon sentiment scorer tuned for entertainment and social content.

use serde::Serialize;

/// Word weights.
///
/// Keys are lowercase single words. Values in `(0.0, 1.0]` are positive,
/// in `[-1.0, 0.0)` are negative. The final score is clamped to `[-1.0, 1.0]`.
pub(crate) const LEXICON: &[(&str, f32)] = &[
    // Positive signals
    ("amazing", 0.5),
    ("awesome", 0.5),
    ("best", 0.5),
    ("love", 0.5),
    ("loved", 0.5),
    ("incredible", 0.5),
    ("brilliant", 0.5),
    ("great", 0.4),
    ("fun", 0.4),
    ("funny", 0.4),
    ("hilarious", 0.5),
    ("beautiful", 0.4),
    ("inspiration", 0.4),
    ("inspiring", 0.4),
    ("motivation", 0.3),
    ("happy", 0.4),
    ("favorite", 0.4),
    ("epic", 0.4),
    ("stunning", 0.4),
    ("good", 0.3),
    ("wow", 0.3),
    ("enjoy", 0.3),
    ("exciting", 0.4),
    ("win", 0.4),
    ("winner", 0.4),
    // Negative signals
    ("awful", -0.6),
    ("terrible", -0.6),
    ("worst", -0.6),
    ("hate", -0.6),
    ("boring", -0.4),
    ("bad", -0.4),
    ("sad", -0.4),
    ("cringe", -0.4),
    ("disappointing", -0.5),
    ("disappointed", -0.5),
    ("fail", -0.4),
    ("failed", -0.4),
    ("scandal", -0.5),
    ("drama", -0.3),
    ("controversy", -0.4),
    ("flop", -0.5),
    ("cancelled", -0.4),
    ("fake", -0.4),
    ("angry", -0.4),
    ("problem", -0.3),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    /// `> 0.1` is positive, `< -0.1` is negative, anything between is neutral.
    #[must_use]
    pub fn classify(score: f32) -> Self {
        if score > 0.1 {
            SentimentLabel::Positive
        } else if score < -0.1 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

/// Score a text string using the lexicon.
///
/// Splits text into lowercase words, sums matching weights, and clamps
/// the result to `[-1.0, 1.0]`. Returns `0.0` for empty or unknown text.
#[must_use]
pub fn lexicon_score(text: &str) -> f32 {
    let mut score = 0.0_f32;
    for word in text.split_whitespace() {
        let w = word
            .trim_matches(|c: char| !c.is_alphabetic())
            .to_lowercase();
        if let Some(&(_, weight)) = LEXICON.iter().find(|(lex_word, _)| *lex_word == w) {
            score += weight;
        }
    }
    score.clamp(-1.0, 1.0)
}
