//! Genre weighting.
//!
//! ## Algorithm
//!
//! 1. Every genre of the catalog universe starts at the neutral prior 1.0
//! 2. Each filled slot adds its table adjustments (positive or negative)
//! 3. Genres suggested by the emotion get +0.5; an emotion picked through
//!    a slot answer replaces the classifier's dominant emotion here
//! 4. `ranked()` keeps genres with weight > 0, highest first, ties by
//!    label; an explicitly mentioned genre is always first
//!
//! Adjustments are purely additive, so the order slots were filled in does
//! not matter and a strong negative can veto a genre however many boosts it
//! collected.

use catalog::Genre;
use dialogue::text;
use dialogue::{EmotionIndividual, SlotId, SlotMap, SlotValue};
use std::cmp::Ordering;
use std::collections::BTreeMap;

pub const NEUTRAL_PRIOR: f32 = 1.0;
pub const EMOTION_SEED_BOOST: f32 = 0.5;

/// Additive adjustments for one slot value
pub fn slot_adjustments(slot: SlotId, value: &str) -> &'static [(Genre, f32)] {
    use Genre::*;

    match (slot, value) {
        (SlotId::DesiredOutcome, "feel_better") => {
            &[(Comedy, 0.8), (Animation, 0.8), (Musical, 0.8), (Romance, 0.8)]
        }
        (SlotId::DesiredOutcome, "process_feelings") => &[(Drama, 0.8), (Romance, 0.8), (Documentary, 0.8)],
        (SlotId::DesiredOutcome, "get_excited") => {
            &[(Action, 0.8), (Thriller, 0.8), (SciFi, 0.8), (Adventure, 0.4)]
        }
        (SlotId::EmotionDirection, "comforting") => &[
            (Comedy, 0.5),
            (Romance, 0.5),
            (Animation, 0.5),
            (Children, 0.5),
            (Horror, -0.5),
            (Thriller, -0.5),
        ],
        (SlotId::EmotionDirection, "intense") => &[(Action, 0.5), (Thriller, 0.5), (Horror, 0.5), (Crime, 0.5)],
        (SlotId::IntensityStyle, "adrenaline") => &[(Action, 0.6), (Adventure, 0.6)],
        (SlotId::IntensityStyle, "suspense") => &[(Thriller, 0.6), (Mystery, 0.6)],
        (SlotId::IntensityStyle, "dark") => &[(Crime, 0.6), (FilmNoir, 0.6), (Horror, 0.6)],
        (SlotId::ComfortStyle, "uplifting") => &[(Comedy, 0.6), (Musical, 0.6)],
        (SlotId::ComfortStyle, "heartwarming") => &[(Romance, 0.6), (Drama, 0.6), (Children, 0.6)],
        (SlotId::ComfortStyle, "calm") => &[(Documentary, 0.6), (Animation, 0.6), (Action, -0.4)],
        (SlotId::CognitiveLoad, "escapist") => &[(Comedy, 0.4), (Fantasy, 0.4), (Adventure, 0.4)],
        (SlotId::CognitiveLoad, "thoughtful") => &[(Drama, 0.4), (Documentary, 0.4), (Mystery, 0.4)],
        (SlotId::PacePreference, "fast") => &[(Action, 0.4), (Thriller, 0.4), (Adventure, 0.4)],
        (SlotId::PacePreference, "slow") => &[(Drama, 0.4), (Documentary, 0.4), (Romance, 0.4)],
        (SlotId::ViolenceTolerance, "none") => &[(Action, -0.7), (Crime, -0.7), (War, -0.7), (Horror, -0.7)],
        (SlotId::ViolenceTolerance, "mild") => &[(Horror, -0.3), (War, -0.3)],
        (SlotId::ContentSensitivity, "avoid_horror") => &[(Horror, -1.0)],
        (SlotId::ContentSensitivity, "avoid_drama") => &[(Drama, -0.8)],
        (SlotId::ContentSensitivity, "avoid_violence") => {
            &[(Action, -0.7), (Crime, -0.7), (War, -0.7), (Horror, -0.7)]
        }
        (SlotId::UsualPreference, "family_friendly") => &[(Children, 0.5), (Animation, 0.5), (Comedy, 0.5)],
        (SlotId::UsualPreference, "action_packed") => &[(Action, 0.5), (Adventure, 0.5)],
        (SlotId::UsualPreference, "thoughtful") => &[(Drama, 0.5)],
        (SlotId::MusicTone, "uplifting") => &[(Musical, 0.3), (Comedy, 0.3)],
        (SlotId::MusicTone, "somber") => &[(Drama, 0.3)],
        (SlotId::MusicTone, "intense") => &[(Thriller, 0.3)],
        _ => &[],
    }
}

/// Signed weight per genre, rebuilt for every recommendation request
#[derive(Debug, Clone, PartialEq)]
pub struct GenreWeights {
    weights: BTreeMap<Genre, f32>,
    mention: Option<Genre>,
}

impl GenreWeights {
    pub fn compute(
        universe: &[Genre],
        slots: &SlotMap,
        dominant: Option<EmotionIndividual>,
        selected: Option<EmotionIndividual>,
        mention: Option<Genre>,
    ) -> Self {
        let mut weights: BTreeMap<Genre, f32> = universe.iter().map(|&g| (g, NEUTRAL_PRIOR)).collect();

        for (&slot, value) in slots {
            let SlotValue::Plain(value) = value else {
                continue;
            };
            for &(genre, delta) in slot_adjustments(slot, value) {
                if let Some(weight) = weights.get_mut(&genre) {
                    *weight += delta;
                }
            }
        }

        if let Some(emotion) = selected.or(dominant) {
            for genre in emotion.suggested_genres() {
                if let Some(weight) = weights.get_mut(genre) {
                    *weight += EMOTION_SEED_BOOST;
                }
            }
        }

        let mention = mention.filter(|g| weights.contains_key(g));
        Self { weights, mention }
    }

    pub fn weight(&self, genre: Genre) -> Option<f32> {
        self.weights.get(&genre).copied()
    }

    pub fn mention(&self) -> Option<Genre> {
        self.mention
    }

    /// All genres with their weights, in catalog order
    pub fn iter(&self) -> impl Iterator<Item = (Genre, f32)> + '_ {
        self.weights.iter().map(|(&g, &w)| (g, w))
    }

    /// Genres worth recommending, best first
    pub fn ranked(&self) -> Vec<Genre> {
        let mut positive: Vec<(Genre, f32)> = self
            .iter()
            .filter(|&(genre, weight)| weight > 0.0 && Some(genre) != self.mention)
            .collect();
        positive.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then_with(|| a.0.cmp(&b.0)));

        self.mention
            .into_iter()
            .chain(positive.into_iter().map(|(genre, _)| genre))
            .collect()
    }
}

/// First genre named in `utterance`, by position in the text.
///
/// Only genres of `universe` are considered. When two names start at the
/// same position the longer one wins.
pub fn detect_genre_mention(utterance: &str, universe: &[Genre]) -> Option<Genre> {
    let normalized = text::normalize(utterance);

    universe
        .iter()
        .flat_map(|&genre| genre.aliases().iter().map(move |alias| (genre, *alias)))
        .filter_map(|(genre, alias)| {
            text::find_phrase(&normalized, alias).map(|pos| (pos, std::cmp::Reverse(alias.len()), genre))
        })
        .min()
        .map(|(_, _, genre)| genre)
}
