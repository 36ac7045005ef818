//! Slot-filling state machine.
//!
//! ## Algorithm
//!
//! Each turn, after the emotion update:
//!
//! 1. If a question is pending, interpret the utterance with that slot's
//!    vocabulary only. A match is written to the session. Without a match
//!    the cross-slot detector may record incidental answers for other
//!    unfilled slots. The pending marker is cleared either way, so an
//!    unanswered question counts as skipped.
//! 2. The session is ready when confidence reaches the threshold, when
//!    enough slots are filled, or when the answer just resolved named an
//!    emotion directly.
//! 3. Otherwise the first unfilled slot of the active flow is asked. The
//!    flow switches once `emotion_direction` resolves to `intense` or
//!    `comforting`. When the flow is exhausted the default slot is asked.

use rand::Rng;
use tracing::debug;

use crate::ontology::EmotionIndividual;
use crate::session::Session;
use crate::slots::{SlotId, SlotMap, SlotRegistry};

pub const DEFAULT_READINESS_THRESHOLD: f32 = 0.9;
pub const DEFAULT_MINIMUM_SLOTS: usize = 3;

/// Slot asked once the active flow has nothing left
pub const FALLBACK_SLOT: SlotId = SlotId::UsualPreference;

/// Where the dialogue for a session currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogueState {
    AwaitingAnswer(SlotId),
    NeedsQuestion,
    Ready,
}

/// Outcome of one controller step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Ask {
        slot: SlotId,
        question: String,
    },
    Ready {
        /// Emotion named directly through a slot answer
        selected_emotion: Option<EmotionIndividual>,
    },
}

impl Decision {
    pub fn is_ready(&self) -> bool {
        matches!(self, Decision::Ready { .. })
    }
}

/// Ordered list of slots to ask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Base,
    Intense,
    Comforting,
}

impl Flow {
    pub fn slots(self) -> &'static [SlotId] {
        match self {
            Flow::Base => &[
                SlotId::EmotionDirection,
                SlotId::DesiredOutcome,
                SlotId::ContentSensitivity,
                SlotId::EraPreference,
                SlotId::PacePreference,
            ],
            Flow::Intense => &[
                SlotId::EmotionDirection,
                SlotId::IntensityStyle,
                SlotId::DesiredOutcome,
                SlotId::ViolenceTolerance,
                SlotId::EraPreference,
                SlotId::PacePreference,
            ],
            Flow::Comforting => &[
                SlotId::EmotionDirection,
                SlotId::ComfortStyle,
                SlotId::DesiredOutcome,
                SlotId::ContentSensitivity,
                SlotId::EraPreference,
                SlotId::CognitiveLoad,
            ],
        }
    }

    /// Flow selected by the `emotion_direction` answer
    pub fn for_slots(slots: &SlotMap) -> Flow {
        match slots.get(&SlotId::EmotionDirection) {
            Some(value) if value.is("intense") => Flow::Intense,
            Some(value) if value.is("comforting") => Flow::Comforting,
            _ => Flow::Base,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SlotFillingController {
    registry: SlotRegistry,
    readiness_threshold: f32,
    minimum_slots: usize,
    cross_slot_detection: bool,
}

impl Default for SlotFillingController {
    fn default() -> Self {
        Self::new(SlotRegistry::standard())
    }
}

impl SlotFillingController {
    pub fn new(registry: SlotRegistry) -> Self {
        Self {
            registry,
            readiness_threshold: DEFAULT_READINESS_THRESHOLD,
            minimum_slots: DEFAULT_MINIMUM_SLOTS,
            cross_slot_detection: true,
        }
    }

    pub fn with_readiness_threshold(mut self, threshold: f32) -> Self {
        self.readiness_threshold = threshold;
        self
    }

    pub fn with_minimum_slots(mut self, minimum_slots: usize) -> Self {
        self.minimum_slots = minimum_slots;
        self
    }

    pub fn with_cross_slot_detection(mut self, enabled: bool) -> Self {
        self.cross_slot_detection = enabled;
        self
    }

    pub fn registry(&self) -> &SlotRegistry {
        &self.registry
    }

    /// Either readiness signal crossed its threshold
    pub fn is_ready(&self, session: &Session) -> bool {
        session.confidence >= self.readiness_threshold
            || session.filled_slot_count() >= self.minimum_slots
    }

    pub fn state(&self, session: &Session) -> DialogueState {
        match session.pending_question {
            Some(slot) => DialogueState::AwaitingAnswer(slot),
            None if self.is_ready(session) => DialogueState::Ready,
            None => DialogueState::NeedsQuestion,
        }
    }

    /// Advance the dialogue by one utterance
    pub fn step<R: Rng + ?Sized>(&self, session: &mut Session, utterance: &str, rng: &mut R) -> Decision {
        let mut resolved_emotion = None;

        if let Some(slot) = session.pending_question.take() {
            match self.registry.interpret(slot, utterance) {
                Some(value) => {
                    debug!(session_id = %session.id, slot = %slot, value = %value, "Slot answered");
                    resolved_emotion = value.as_emotion();
                    session.set_slot(slot, value);
                }
                None if self.cross_slot_detection => {
                    let detected = self
                        .registry
                        .detect_incidental(utterance, Some(slot), |id| session.is_filled(id));
                    for (id, value) in detected {
                        debug!(session_id = %session.id, slot = %id, value = %value, "Incidental slot answer");
                        session.set_slot(id, value);
                    }
                }
                None => {
                    debug!(session_id = %session.id, slot = %slot, "Question skipped");
                }
            }
        }

        if resolved_emotion.is_some() || self.is_ready(session) {
            session.pending_question = None;
            return Decision::Ready {
                selected_emotion: session.selected_emotion(),
            };
        }

        let slot = self.next_slot(&session.slots);
        let question = self.registry.pick_question(slot, rng).to_string();
        session.pending_question = Some(slot);
        debug!(session_id = %session.id, slot = %slot, "Asking question");

        Decision::Ask { slot, question }
    }

    /// First unfilled slot of the active flow
    pub fn next_slot(&self, slots: &SlotMap) -> SlotId {
        Flow::for_slots(slots)
            .slots()
            .iter()
            .copied()
            .find(|id| !slots.contains_key(id))
            .unwrap_or(FALLBACK_SLOT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slots::SlotValue;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn controller() -> SlotFillingController {
        SlotFillingController::default()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn asked(decision: &Decision) -> SlotId {
        match decision {
            Decision::Ask { slot, .. } => *slot,
            Decision::Ready { .. } => panic!("expected a question, got {decision:?}"),
        }
    }

    #[test]
    fn test_first_turn_asks_emotion_direction() {
        let mut session = Session::new("s", 10);
        session.confidence = 0.4;
        let decision = controller().step(&mut session, "hi there", &mut rng());

        assert_eq!(asked(&decision), SlotId::EmotionDirection);
        assert_eq!(session.pending_question, Some(SlotId::EmotionDirection));
        assert_eq!(controller().state(&session), DialogueState::AwaitingAnswer(SlotId::EmotionDirection));
    }

    #[test]
    fn test_intense_answer_switches_flow() {
        let mut session = Session::new("s", 10);
        let controller = controller();
        let mut rng = rng();

        controller.step(&mut session, "hello", &mut rng);
        let decision = controller.step(&mut session, "something intense", &mut rng);

        assert_eq!(session.slot(SlotId::EmotionDirection), Some(&SlotValue::plain("intense")));
        assert_eq!(asked(&decision), SlotId::IntensityStyle);
    }

    #[test]
    fn test_comforting_answer_switches_flow() {
        let mut session = Session::new("s", 10);
        let controller = controller();
        let mut rng = rng();

        controller.step(&mut session, "hello", &mut rng);
        let decision = controller.step(&mut session, "cozy please", &mut rng);
        assert_eq!(asked(&decision), SlotId::ComfortStyle);
    }

    #[test]
    fn test_ready_after_minimum_slots() {
        let mut session = Session::new("s", 10);
        let controller = controller();
        let mut rng = rng();

        controller.step(&mut session, "hello", &mut rng);
        controller.step(&mut session, "intense", &mut rng);
        controller.step(&mut session, "suspense", &mut rng);
        let decision = controller.step(&mut session, "I want to get excited", &mut rng);

        assert_eq!(decision, Decision::Ready { selected_emotion: None });
        assert_eq!(session.pending_question, None);
        assert_eq!(controller.state(&session), DialogueState::Ready);
    }

    #[test]
    fn test_high_confidence_is_ready_immediately() {
        let mut session = Session::new("s", 10);
        session.confidence = 0.95;
        let decision = controller().step(&mut session, "hello", &mut rng());
        assert!(decision.is_ready());
    }

    #[test]
    fn test_ontology_answer_short_circuits() {
        let mut session = Session::new("s", 10);
        let controller = controller();
        let mut rng = rng();

        controller.step(&mut session, "hello", &mut rng);
        let decision = controller.step(&mut session, "honestly I'm just sad", &mut rng);

        assert_eq!(
            decision,
            Decision::Ready {
                selected_emotion: Some(EmotionIndividual::Sadness)
            }
        );
    }

    #[test]
    fn test_unmatched_answer_skips_and_detects_incidental() {
        let mut session = Session::new("s", 10);
        let controller = controller();
        let mut rng = rng();

        controller.step(&mut session, "hello", &mut rng);
        let decision = controller.step(&mut session, "not sure, maybe a vintage one", &mut rng);

        assert!(!session.is_filled(SlotId::EmotionDirection));
        assert_eq!(session.slot(SlotId::EraPreference), Some(&SlotValue::plain("classic")));
        // emotion_direction was skipped but remains first unfilled in the flow
        assert_eq!(asked(&decision), SlotId::EmotionDirection);
    }

    #[test]
    fn test_detection_can_be_disabled() {
        let mut session = Session::new("s", 10);
        let controller = controller().with_cross_slot_detection(false);
        let mut rng = rng();

        controller.step(&mut session, "hello", &mut rng);
        controller.step(&mut session, "maybe a vintage one", &mut rng);
        assert!(!session.is_filled(SlotId::EraPreference));
    }

    #[test]
    fn test_fallback_slot_when_flow_exhausted() {
        let controller = controller().with_minimum_slots(100);
        let mut slots = SlotMap::new();
        for id in Flow::Base.slots() {
            slots.insert(*id, SlotValue::plain("none"));
        }
        assert_eq!(controller.next_slot(&slots), FALLBACK_SLOT);
    }

    #[test]
    fn test_never_asks_once_ready() {
        let controller = controller();
        let mut rng = rng();
        let answers = ["hi", "intense", "dark", "rush", "whatever", "classic", "none", "fast"];

        let mut session = Session::new("s", 10);
        let mut ready = false;
        for answer in answers {
            let decision = controller.step(&mut session, answer, &mut rng);
            if ready {
                assert!(decision.is_ready(), "asked again after readiness: {decision:?}");
            }
            ready = ready || decision.is_ready();
            // at most one pending question, and none once ready
            assert_eq!(session.pending_question.is_some(), !decision.is_ready());
        }
        assert!(ready);
    }
}
