//! Bridge between classifier labels and emotion-ontology individuals.
//!
//! The classifier speaks the fine-grained GoEmotions vocabulary
//! ("gratitude", "remorse", ...). The recommender reasons over a smaller set
//! of ontology individuals, each of which suggests a handful of genres.

use catalog::Genre;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DialogueError;

/// An emotion individual of the ontology (`emo:sadness_1`, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EmotionIndividual {
    Confusion,
    Curiosity,
    Reflective,
    Fear,
    Sadness,
    Grief,
    Distressed,
    Joy,
    Love,
    Excitement,
    Uplifting,
}

impl EmotionIndividual {
    pub const ALL: [EmotionIndividual; 11] = [
        EmotionIndividual::Confusion,
        EmotionIndividual::Curiosity,
        EmotionIndividual::Reflective,
        EmotionIndividual::Fear,
        EmotionIndividual::Sadness,
        EmotionIndividual::Grief,
        EmotionIndividual::Distressed,
        EmotionIndividual::Joy,
        EmotionIndividual::Love,
        EmotionIndividual::Excitement,
        EmotionIndividual::Uplifting,
    ];

    /// Individual name in the knowledge graph
    pub fn id(self) -> &'static str {
        match self {
            EmotionIndividual::Confusion => "confusion_1",
            EmotionIndividual::Curiosity => "curiosity_1",
            EmotionIndividual::Reflective => "reflective_1",
            EmotionIndividual::Fear => "fear_1",
            EmotionIndividual::Sadness => "sadness_1",
            EmotionIndividual::Grief => "grief_1",
            EmotionIndividual::Distressed => "distressed_1",
            EmotionIndividual::Joy => "joy_1",
            EmotionIndividual::Love => "love_1",
            EmotionIndividual::Excitement => "excitement_1",
            EmotionIndividual::Uplifting => "uplifting_1",
        }
    }

    /// Map a classifier label onto an individual.
    ///
    /// Labels without an ontology counterpart (`neutral`, `approval`, ...)
    /// return `None`.
    pub fn from_label(label: &str) -> Option<EmotionIndividual> {
        let individual = match label.trim().to_lowercase().as_str() {
            "confusion" => EmotionIndividual::Confusion,
            "curiosity" => EmotionIndividual::Curiosity,
            "realization" => EmotionIndividual::Reflective,
            "fear" | "nervousness" => EmotionIndividual::Fear,
            "sadness" => EmotionIndividual::Sadness,
            "grief" => EmotionIndividual::Grief,
            "disgust" | "anger" | "annoyance" | "disappointment" | "remorse" | "embarrassment" => {
                EmotionIndividual::Distressed
            }
            "joy" | "amusement" => EmotionIndividual::Joy,
            "love" | "caring" | "admiration" => EmotionIndividual::Love,
            "excitement" | "desire" | "surprise" => EmotionIndividual::Excitement,
            "optimism" | "gratitude" | "relief" | "pride" => EmotionIndividual::Uplifting,
            _ => return None,
        };
        Some(individual)
    }

    /// Genres this emotion suggests
    pub fn suggested_genres(self) -> &'static [Genre] {
        match self {
            EmotionIndividual::Confusion => &[Genre::Mystery, Genre::Documentary],
            EmotionIndividual::Curiosity => &[Genre::Documentary, Genre::SciFi, Genre::Mystery],
            EmotionIndividual::Reflective => &[Genre::Drama, Genre::Documentary, Genre::FilmNoir],
            EmotionIndividual::Fear => &[Genre::Thriller, Genre::Horror, Genre::Mystery],
            EmotionIndividual::Sadness => &[Genre::Drama, Genre::Comedy],
            EmotionIndividual::Grief => &[Genre::Drama, Genre::Romance],
            EmotionIndividual::Distressed => &[Genre::Comedy, Genre::Animation],
            EmotionIndividual::Joy => &[Genre::Comedy, Genre::Musical, Genre::Animation],
            EmotionIndividual::Love => &[Genre::Romance, Genre::Drama],
            EmotionIndividual::Excitement => &[Genre::Action, Genre::Adventure, Genre::SciFi],
            EmotionIndividual::Uplifting => &[Genre::Comedy, Genre::Children, Genre::Animation],
        }
    }
}

impl fmt::Display for EmotionIndividual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for EmotionIndividual {
    type Err = DialogueError;

    /// Accepts the individual id (`sadness_1`), with or without the `emo:`
    /// prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let local = s.trim().trim_start_matches("emo:");
        EmotionIndividual::ALL
            .into_iter()
            .find(|individual| individual.id() == local)
            .ok_or_else(|| DialogueError::UnknownEmotion(s.to_string()))
    }
}
