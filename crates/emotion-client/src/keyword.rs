//! Offline keyword classifier.
//!
//! A lexicon scan that lets the recommender run without the model service.
//! Each label whose keywords appear in the text gets a score that grows with
//! the number of hits: 1 hit is 0.35, 2 is 0.55, 3 is 0.70, then +0.05 per
//! extra hit up to 0.85.

use async_trait::async_trait;

use crate::{ClassifierError, EmotionClassifier, EmotionScores};

/// (label, keywords). Labels follow the GoEmotions vocabulary.
const LEXICON: &[(&str, &[&str])] = &[
    (
        "sadness",
        &["sad", "down", "unhappy", "depressed", "miserable", "lonely", "blue", "crying", "gloomy"],
    ),
    (
        "grief",
        &["grieving", "lost someone", "passed away", "mourning", "heartbroken", "funeral"],
    ),
    (
        "fear",
        &["scared", "afraid", "anxious", "worried", "terrified", "panic", "frightened"],
    ),
    ("nervousness", &["nervous", "on edge", "jittery", "uneasy"]),
    (
        "anger",
        &["angry", "furious", "mad", "pissed", "livid", "rage"],
    ),
    ("annoyance", &["annoyed", "frustrated", "irritated", "fed up"]),
    (
        "joy",
        &["happy", "glad", "joyful", "cheerful", "delighted", "great day", "good mood"],
    ),
    ("love", &["love", "in love", "romantic", "crush", "date night", "adore"]),
    (
        "excitement",
        &["excited", "pumped", "hyped", "can't wait", "thrilled", "stoked"],
    ),
    (
        "curiosity",
        &["curious", "wonder", "wondering", "interesting", "fascinating", "learn something"],
    ),
    ("confusion", &["confused", "unsure", "don't know", "not sure", "puzzled"]),
    ("realization", &["realized", "reflecting", "nostalgic", "thinking back"]),
    ("gratitude", &["grateful", "thankful", "thanks", "blessed"]),
    ("optimism", &["hopeful", "optimistic", "looking forward"]),
    ("relief", &["relieved", "finally over", "weight off"]),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordEmotionClassifier;

impl KeywordEmotionClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous scan used by the async trait method
    pub fn scores(&self, text: &str) -> EmotionScores {
        let padded = format!(" {} ", fold(text));

        LEXICON
            .iter()
            .filter_map(|&(label, keywords)| {
                let hits = keywords
                    .iter()
                    .filter(|keyword| padded.contains(&format!(" {keyword} ")))
                    .count();
                (hits > 0).then(|| (label.to_string(), hit_score(hits)))
            })
            .collect()
    }
}

#[async_trait]
impl EmotionClassifier for KeywordEmotionClassifier {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn classify(&self, text: &str) -> Result<EmotionScores, ClassifierError> {
        Ok(self.scores(text))
    }
}

fn hit_score(hits: usize) -> f32 {
    match hits {
        0 => 0.0,
        1 => 0.35,
        2 => 0.55,
        3 => 0.70,
        _ => (0.70 + 0.05 * (hits as f32 - 3.0)).min(0.85),
    }
}

/// Lowercase and turn punctuation (except apostrophes) into spaces
fn fold(text: &str) -> String {
    let lowered: String = text
        .chars()
        .map(|c| match c {
            '\u{2019}' => '\'',
            c if c.is_alphanumeric() || c == '\'' => c,
            _ => ' ',
        })
        .flat_map(char::to_lowercase)
        .collect();
    lowered.split_whitespace().collect::<Vec<_>>().join(" ")
}
