//! Lexicon sentiment scorer for short social-media texts.

use footprint_core::Sentiment;

/// General word weights. Values in `(0.0, 1.0]` are positive, in
/// `[-1.0, 0.0)` are negative. The summed score is clamped to `[-1.0, 1.0]`.
const LEXICON: &[(&str, f32)] = &[
    // Positive signals
    ("love", 0.5),
    ("loved", 0.5),
    ("great", 0.4),
    ("awesome", 0.5),
    ("amazing", 0.5),
    ("good", 0.3),
    ("excellent", 0.5),
    ("best", 0.5),
    ("happy", 0.4),
    ("excited", 0.4),
    ("beautiful", 0.4),
    ("thanks", 0.3),
    ("thank", 0.3),
    ("congrats", 0.4),
    ("congratulations", 0.4),
    ("win", 0.4),
    ("won", 0.4),
    ("proud", 0.4),
    ("fun", 0.3),
    ("recommend", 0.4),
    // Negative signals
    ("hate", -0.6),
    ("hated", -0.6),
    ("terrible", -0.6),
    ("awful", -0.6),
    ("worst", -0.6),
    ("bad", -0.4),
    ("angry", -0.5),
    ("sad", -0.4),
    ("annoying", -0.4),
    ("broken", -0.4),
    ("scam", -0.7),
    ("fail", -0.4),
    ("failed", -0.4),
    ("failure", -0.4),
    ("problem", -0.3),
    ("disappointed", -0.5),
    ("disappointing", -0.5),
    ("wrong", -0.3),
    ("never", -0.2),
    ("ugh", -0.4),
];

/// Threshold beyond which a summed score counts as non-neutral.
const NEUTRAL_BAND: f32 = 0.05;

/// Score a text using the lexicon.
///
/// Splits into lowercase words, strips non-alphabetic edges, sums matching
/// weights, and clamps to `[-1.0, 1.0]`. Empty or unknown text scores `0.0`.
#[must_use]
pub fn lexicon_score(text: &str) -> f32 {
    let mut score = 0.0_f32;
    for word in text.split_whitespace() {
        let w = word
            .trim_matches(|c: char| !c.is_alphabetic())
            .to_lowercase();
        for &(lex_word, weight) in LEXICON {
            if w == lex_word {
                score += weight;
                break;
            }
        }
    }
    score.clamp(-1.0, 1.0)
}

/// Classify a text into the canonical three-way sentiment.
#[must_use]
pub fn classify_sentiment(text: &str) -> Sentiment {
    let score = lexicon_score(text);
    if score > NEUTRAL_BAND {
        Sentiment::Positive
    } else if score < -NEUTRAL_BAND {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}
