//! Declarative slot registry.
//!
//! Every clarifying dimension of the dialogue is described once here: its
//! value domain, the canonical question plus phrasing variants, and a
//! synonym dictionary from free-text fragments to domain values. Both the
//! scoped answer interpreter and the cross-slot detector read from the same
//! table.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::DialogueError;
use crate::ontology::EmotionIndividual;
use crate::text;

/// A named dialogue dimension.
///
/// Declaration order matches `DEFINITIONS`, which lets `SlotRegistry`
/// index definitions directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotId {
    EmotionDirection,
    DesiredOutcome,
    CognitiveLoad,
    PacePreference,
    ViolenceTolerance,
    EraPreference,
    ContentSensitivity,
    IntensityStyle,
    ComfortStyle,
    UsualPreference,
    MusicTone,
}

impl SlotId {
    pub const ALL: [SlotId; 11] = [
        SlotId::EmotionDirection,
        SlotId::DesiredOutcome,
        SlotId::CognitiveLoad,
        SlotId::PacePreference,
        SlotId::ViolenceTolerance,
        SlotId::EraPreference,
        SlotId::ContentSensitivity,
        SlotId::IntensityStyle,
        SlotId::ComfortStyle,
        SlotId::UsualPreference,
        SlotId::MusicTone,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SlotId::EmotionDirection => "emotion_direction",
            SlotId::DesiredOutcome => "desired_outcome",
            SlotId::CognitiveLoad => "cognitive_load",
            SlotId::PacePreference => "pace_preference",
            SlotId::ViolenceTolerance => "violence_tolerance",
            SlotId::EraPreference => "era_preference",
            SlotId::ContentSensitivity => "content_sensitivity",
            SlotId::IntensityStyle => "intensity_style",
            SlotId::ComfortStyle => "comfort_style",
            SlotId::UsualPreference => "usual_preference",
            SlotId::MusicTone => "music_tone",
        }
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SlotId {
    type Err = DialogueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SlotId::ALL
            .into_iter()
            .find(|id| id.as_str() == s.trim())
            .ok_or_else(|| DialogueError::UnknownSlot(s.to_string()))
    }
}

/// Resolved value of a slot.
///
/// `OntologyRef` marks an answer that named an emotion directly; downstream
/// weighting uses it instead of the classifier's dominant emotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotValue {
    Plain(String),
    OntologyRef(EmotionIndividual),
}

impl SlotValue {
    pub fn plain(value: &str) -> Self {
        SlotValue::Plain(value.to_string())
    }

    pub fn as_plain(&self) -> Option<&str> {
        match self {
            SlotValue::Plain(value) => Some(value),
            SlotValue::OntologyRef(_) => None,
        }
    }

    pub fn is(&self, value: &str) -> bool {
        self.as_plain() == Some(value)
    }

    pub fn as_emotion(&self) -> Option<EmotionIndividual> {
        match self {
            SlotValue::OntologyRef(individual) => Some(*individual),
            SlotValue::Plain(_) => None,
        }
    }
}

impl fmt::Display for SlotValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotValue::Plain(value) => f.write_str(value),
            SlotValue::OntologyRef(individual) => write!(f, "emo:{}", individual.id()),
        }
    }
}

/// Filled slots of a session, ordered by slot id
pub type SlotMap = BTreeMap<SlotId, SlotValue>;

/// What a synonym resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynonymTarget {
    Value(&'static str),
    Emotion(EmotionIndividual),
}

impl SynonymTarget {
    fn to_value(self) -> SlotValue {
        match self {
            SynonymTarget::Value(value) => SlotValue::plain(value),
            SynonymTarget::Emotion(individual) => SlotValue::OntologyRef(individual),
        }
    }
}

/// Static description of one slot
#[derive(Debug)]
pub struct SlotDefinition {
    pub id: SlotId,
    pub domain: &'static [&'static str],
    pub question: &'static str,
    pub variants: &'static [&'static str],
    pub synonyms: &'static [(&'static str, SynonymTarget)],
}

impl SlotDefinition {
    /// Canonical question followed by its variants
    pub fn phrasings(&self) -> impl Iterator<Item = &'static str> + '_ {
        std::iter::once(self.question).chain(self.variants.iter().copied())
    }
}

use SynonymTarget::{Emotion, Value};

static DEFINITIONS: [SlotDefinition; 11] = [
    SlotDefinition {
        id: SlotId::EmotionDirection,
        domain: &["comforting", "intense"],
        question: "Are you leaning toward something soothing or something intense?",
        variants: &[
            "What vibe are you in the mood for? gentle and comforting or bold and intense?",
            "Would you like a cozy, easy-going watch or something with higher stakes?",
            "Prefer something soft and reassuring, or something gripping and powerful?",
        ],
        synonyms: &[
            ("comforting", Value("comforting")),
            ("comfort", Value("comforting")),
            ("soothing", Value("comforting")),
            ("gentle", Value("comforting")),
            ("cozy", Value("comforting")),
            ("cosy", Value("comforting")),
            ("soft", Value("comforting")),
            ("easy-going", Value("comforting")),
            ("reassuring", Value("comforting")),
            ("relaxing", Value("comforting")),
            ("intense", Value("intense")),
            ("bold", Value("intense")),
            ("gripping", Value("intense")),
            ("powerful", Value("intense")),
            ("higher stakes", Value("intense")),
            ("high stakes", Value("intense")),
            ("thrilling", Value("intense")),
            ("edgy", Value("intense")),
            ("sad", Emotion(EmotionIndividual::Sadness)),
            ("heartbroken", Emotion(EmotionIndividual::Grief)),
            ("grieving", Emotion(EmotionIndividual::Grief)),
            ("scared", Emotion(EmotionIndividual::Fear)),
            ("anxious", Emotion(EmotionIndividual::Fear)),
            ("happy", Emotion(EmotionIndividual::Joy)),
            ("joyful", Emotion(EmotionIndividual::Joy)),
            ("in love", Emotion(EmotionIndividual::Love)),
            ("excited", Emotion(EmotionIndividual::Excitement)),
            ("curious", Emotion(EmotionIndividual::Curiosity)),
            ("confused", Emotion(EmotionIndividual::Confusion)),
            ("nostalgic", Emotion(EmotionIndividual::Reflective)),
            ("pensive", Emotion(EmotionIndividual::Reflective)),
            ("angry", Emotion(EmotionIndividual::Distressed)),
            ("frustrated", Emotion(EmotionIndividual::Distressed)),
            ("stressed", Emotion(EmotionIndividual::Distressed)),
            ("hopeful", Emotion(EmotionIndividual::Uplifting)),
            ("grateful", Emotion(EmotionIndividual::Uplifting)),
        ],
    },
    SlotDefinition {
        id: SlotId::DesiredOutcome,
        domain: &["feel_better", "process_feelings", "get_excited"],
        question: "Would you like a pick-me-up, something reflective, or a rush?",
        variants: &[
            "What would you like the film to do: lift your spirits, help process feelings, or get your adrenaline going?",
            "Are you looking to feel better, think things through, or get excited?",
            "Should the movie cheer you up, give room to reflect, or energize you?",
        ],
        synonyms: &[
            ("feel better", Value("feel_better")),
            ("pick-me-up", Value("feel_better")),
            ("pick me up", Value("feel_better")),
            ("cheer me up", Value("feel_better")),
            ("cheer up", Value("feel_better")),
            ("lift my spirits", Value("feel_better")),
            ("spirits", Value("feel_better")),
            ("process feelings", Value("process_feelings")),
            ("process", Value("process_feelings")),
            ("reflect", Value("process_feelings")),
            ("think things through", Value("process_feelings")),
            ("a good cry", Value("process_feelings")),
            ("get excited", Value("get_excited")),
            ("excited", Value("get_excited")),
            ("rush", Value("get_excited")),
            ("adrenaline", Value("get_excited")),
            ("energize", Value("get_excited")),
            ("energise", Value("get_excited")),
            ("pumped", Value("get_excited")),
        ],
    },
    SlotDefinition {
        id: SlotId::CognitiveLoad,
        domain: &["escapist", "thoughtful"],
        question: "Do you feel like switching off and escaping, or engaging with something more reflective?",
        variants: &[
            "Are you after an escapist unwind or a thoughtful, reflective watch?",
            "Would you prefer a light, switch-off experience or something to chew on?",
            "Should we go breezy and fun, or more contemplative and layered?",
        ],
        synonyms: &[
            ("escapist", Value("escapist")),
            ("escape", Value("escapist")),
            ("escaping", Value("escapist")),
            ("switch off", Value("escapist")),
            ("switch-off", Value("escapist")),
            ("unwind", Value("escapist")),
            ("breezy", Value("escapist")),
            ("mindless", Value("escapist")),
            ("thoughtful", Value("thoughtful")),
            ("reflective", Value("thoughtful")),
            ("contemplative", Value("thoughtful")),
            ("layered", Value("thoughtful")),
            ("chew on", Value("thoughtful")),
            ("thought-provoking", Value("thoughtful")),
        ],
    },
    SlotDefinition {
        id: SlotId::PacePreference,
        domain: &["fast", "slow", "none"],
        question: "Do you want something brisk and energetic or slow and contemplative?",
        variants: &[
            "Should the pace be fast and lively or slow-burn and reflective?",
            "Are you up for a quick tempo or a steady, unhurried flow?",
            "Prefer a zippier pace or a patient slow burn?",
        ],
        synonyms: &[
            ("fast", Value("fast")),
            ("brisk", Value("fast")),
            ("energetic", Value("fast")),
            ("quick", Value("fast")),
            ("zippy", Value("fast")),
            ("zippier", Value("fast")),
            ("lively", Value("fast")),
            ("fast-paced", Value("fast")),
            ("slow", Value("slow")),
            ("slow burn", Value("slow")),
            ("slow-burn", Value("slow")),
            ("unhurried", Value("slow")),
            ("steady", Value("slow")),
            ("no preference", Value("none")),
            ("none", Value("none")),
            ("either", Value("none")),
            ("whatever", Value("none")),
        ],
    },
    SlotDefinition {
        id: SlotId::ViolenceTolerance,
        domain: &["none", "mild", "strong"],
        question: "How comfortable are you with on-screen violence?",
        variants: &[
            "Should we avoid violence entirely, keep it mild, or is strong okay?",
            "Violence level: none, mild, or strong?",
            "Do you prefer to avoid violence, tolerate a little, or not mind it?",
        ],
        synonyms: &[
            ("none", Value("none")),
            ("no violence", Value("none")),
            ("avoid violence", Value("none")),
            ("avoid it", Value("none")),
            ("not at all", Value("none")),
            ("mild", Value("mild")),
            ("a little", Value("mild")),
            ("a bit", Value("mild")),
            ("some", Value("mild")),
            ("strong", Value("strong")),
            ("don't mind", Value("strong")),
            ("not mind", Value("strong")),
            ("bring it", Value("strong")),
            ("gory", Value("strong")),
        ],
    },
    SlotDefinition {
        id: SlotId::EraPreference,
        domain: &["classic", "modern"],
        question: "Do you have a soft spot for older classics or prefer more contemporary releases?",
        variants: &[
            "Should we lean classic or go modern?",
            "Would you like something vintage or more recent?",
            "In the mood for a classic era or a contemporary one?",
        ],
        synonyms: &[
            ("classic", Value("classic")),
            ("classics", Value("classic")),
            ("older", Value("classic")),
            ("old", Value("classic")),
            ("vintage", Value("classic")),
            ("golden age", Value("classic")),
            ("black and white", Value("classic")),
            ("modern", Value("modern")),
            ("recent", Value("modern")),
            ("newer", Value("modern")),
            ("contemporary", Value("modern")),
        ],
    },
    SlotDefinition {
        id: SlotId::ContentSensitivity,
        domain: &["avoid_horror", "avoid_drama", "avoid_violence", "none"],
        question: "Anything you'd like me to steer clear of?",
        variants: &[
            "Let me know if you'd rather avoid horror, heavy themes, or on-screen violence.",
            "Any content you'd prefer not to see (e.g., horror, heavy drama, violence)?",
            "Tell me if there are topics or tones you'd like me to avoid.",
        ],
        synonyms: &[
            ("avoid horror", Value("avoid_horror")),
            ("no horror", Value("avoid_horror")),
            ("horror", Value("avoid_horror")),
            ("nothing scary", Value("avoid_horror")),
            ("not scary", Value("avoid_horror")),
            ("avoid heavy drama", Value("avoid_drama")),
            ("heavy drama", Value("avoid_drama")),
            ("heavy themes", Value("avoid_drama")),
            ("nothing heavy", Value("avoid_drama")),
            ("avoid violence", Value("avoid_violence")),
            ("violence", Value("avoid_violence")),
            ("violent", Value("avoid_violence")),
            ("no preference", Value("none")),
            ("none", Value("none")),
            ("nothing", Value("none")),
            ("anything goes", Value("none")),
            ("all good", Value("none")),
        ],
    },
    SlotDefinition {
        id: SlotId::IntensityStyle,
        domain: &["adrenaline", "suspense", "dark"],
        question: "For a punchier vibe, are you drawn more to high-octane excitement, edge-of-your-seat tension, or moody-dark tones?",
        variants: &[
            "If we go intense, should it be adrenaline, suspense, or moody and dark?",
            "Thinking intense: more explosive action, taut suspense, or darker ambience?",
            "For an intense feel, do you prefer high energy, tight tension, or darker edges?",
        ],
        synonyms: &[
            ("adrenaline", Value("adrenaline")),
            ("high-octane", Value("adrenaline")),
            ("high octane", Value("adrenaline")),
            ("explosive", Value("adrenaline")),
            ("high energy", Value("adrenaline")),
            ("suspense", Value("suspense")),
            ("suspenseful", Value("suspense")),
            ("tension", Value("suspense")),
            ("tense", Value("suspense")),
            ("edge of my seat", Value("suspense")),
            ("edge-of-your-seat", Value("suspense")),
            ("dark", Value("dark")),
            ("darker", Value("dark")),
            ("moody", Value("dark")),
            ("gritty", Value("dark")),
            ("bleak", Value("dark")),
        ],
    },
    SlotDefinition {
        id: SlotId::ComfortStyle,
        domain: &["uplifting", "heartwarming", "calm"],
        question: "For a gentle vibe, do you prefer feel-good and uplifting, warm and heartwarming, or calm and soothing?",
        variants: &[
            "If we keep it comforting, should it be uplifting, heartwarming, or calm?",
            "A softer tone: more feel-good, warmly sentimental, or quietly soothing?",
            "For comfort, are you leaning toward uplifting, heartwarming, or calm?",
        ],
        synonyms: &[
            ("uplifting", Value("uplifting")),
            ("feel-good", Value("uplifting")),
            ("feel good", Value("uplifting")),
            ("heartwarming", Value("heartwarming")),
            ("warm", Value("heartwarming")),
            ("warmly", Value("heartwarming")),
            ("sentimental", Value("heartwarming")),
            ("sweet", Value("heartwarming")),
            ("calm", Value("calm")),
            ("quiet", Value("calm")),
            ("quietly", Value("calm")),
            ("peaceful", Value("calm")),
            ("chill", Value("calm")),
        ],
    },
    SlotDefinition {
        id: SlotId::UsualPreference,
        domain: &["family_friendly", "action_packed", "thoughtful"],
        question: "What do you usually enjoy: family-friendly, action-packed, or thoughtful drama?",
        variants: &[
            "Do you tend toward family-friendly, action-packed, or more thoughtful movies?",
            "Your baseline taste: cozy family picks, explosive action, or layered drama?",
            "Would you describe your usual picks as family-friendly, action-packed, or thoughtful?",
        ],
        synonyms: &[
            ("family-friendly", Value("family_friendly")),
            ("family friendly", Value("family_friendly")),
            ("family", Value("family_friendly")),
            ("action-packed", Value("action_packed")),
            ("action packed", Value("action_packed")),
            ("action", Value("action_packed")),
            ("thoughtful", Value("thoughtful")),
            ("drama", Value("thoughtful")),
        ],
    },
    SlotDefinition {
        id: SlotId::MusicTone,
        domain: &["uplifting", "somber", "intense"],
        question: "For the film's musical feel, do you prefer uplifting, somber, or intense?",
        variants: &[
            "Score tone: uplifting/feel-good, somber, or intense?",
            "Do you enjoy an uplifting score, something somber, or something more intense?",
            "Music vibe: uplifting, somber, or intense?",
        ],
        synonyms: &[
            ("uplifting", Value("uplifting")),
            ("upbeat", Value("uplifting")),
            ("somber", Value("somber")),
            ("sombre", Value("somber")),
            ("melancholic", Value("somber")),
            ("intense", Value("intense")),
        ],
    },
];

/// Read-only view over the slot definitions
#[derive(Debug, Clone, Copy)]
pub struct SlotRegistry {
    definitions: &'static [SlotDefinition],
}

impl Default for SlotRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl SlotRegistry {
    /// The built-in registry
    pub fn standard() -> Self {
        Self {
            definitions: &DEFINITIONS,
        }
    }

    pub fn definition(&self, id: SlotId) -> &'static SlotDefinition {
        &self.definitions[id as usize]
    }

    pub fn definitions(&self) -> &'static [SlotDefinition] {
        self.definitions
    }

    /// Interpret an answer using only `slot`'s vocabulary.
    ///
    /// When several synonyms match, the longest phrase wins; ties go to the
    /// entry listed first.
    pub fn interpret(&self, slot: SlotId, utterance: &str) -> Option<SlotValue> {
        let normalized = text::normalize(utterance);
        best_match(self.definition(slot), &normalized).map(SynonymTarget::to_value)
    }

    /// Scan every slot except `skip` for an incidental answer.
    ///
    /// Only phrases owned by exactly one slot count, and slots for which
    /// `is_filled` returns true are left alone.
    pub fn detect_incidental(
        &self,
        utterance: &str,
        skip: Option<SlotId>,
        is_filled: impl Fn(SlotId) -> bool,
    ) -> Vec<(SlotId, SlotValue)> {
        let normalized = text::normalize(utterance);
        let mut found = Vec::new();

        for definition in self.definitions {
            if Some(definition.id) == skip || is_filled(definition.id) {
                continue;
            }

            let mut best: Option<(&'static str, SynonymTarget)> = None;
            for &(phrase, target) in definition.synonyms {
                if self.owners(phrase) != 1 || !text::contains_phrase(&normalized, phrase) {
                    continue;
                }
                if best.is_none_or(|(current, _)| phrase.len() > current.len()) {
                    best = Some((phrase, target));
                }
            }

            if let Some((_, target)) = best {
                found.push((definition.id, target.to_value()));
            }
        }

        found
    }

    /// Pick one phrasing for `slot`, uniformly among the canonical
    /// question and its variants
    pub fn pick_question<R: Rng + ?Sized>(&self, slot: SlotId, rng: &mut R) -> &'static str {
        let definition = self.definition(slot);
        let phrasings: Vec<&'static str> = definition.phrasings().collect();
        phrasings.choose(rng).copied().unwrap_or(definition.question)
    }

    /// Validate a raw domain value for a slot
    pub fn parse_value(&self, slot: SlotId, raw: &str) -> Result<SlotValue, DialogueError> {
        let raw = raw.trim();
        if let Some(rest) = raw.strip_prefix("emo:") {
            return rest.parse::<EmotionIndividual>().map(SlotValue::OntologyRef);
        }
        if self.definition(slot).domain.contains(&raw) {
            Ok(SlotValue::plain(raw))
        } else {
            Err(DialogueError::InvalidSlotValue {
                slot: slot.to_string(),
                value: raw.to_string(),
            })
        }
    }

    /// Number of slots whose dictionary contains `phrase`
    fn owners(&self, phrase: &str) -> usize {
        self.definitions
            .iter()
            .filter(|definition| definition.synonyms.iter().any(|(p, _)| *p == phrase))
            .count()
    }
}

fn best_match(definition: &SlotDefinition, normalized: &str) -> Option<SynonymTarget> {
    let mut best: Option<(&'static str, SynonymTarget)> = None;
    for &(phrase, target) in definition.synonyms {
        if !text::contains_phrase(normalized, phrase) {
            continue;
        }
        if best.is_none_or(|(current, _)| phrase.len() > current.len()) {
            best = Some((phrase, target));
        }
    }
    best.map(|(_, target)| target)
}

/// Whether the filled slots express a comfort-seeking intent
pub fn is_comfort_seeking(slots: &SlotMap) -> bool {
    let has = |id: SlotId, value: &str| slots.get(&id).is_some_and(|v| v.is(value));

    has(SlotId::EmotionDirection, "comforting")
        || has(SlotId::DesiredOutcome, "feel_better")
        || has(SlotId::ComfortStyle, "calm")
        || has(SlotId::ComfortStyle, "heartwarming")
}
