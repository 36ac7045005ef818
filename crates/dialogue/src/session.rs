use std::collections::{BTreeMap, HashSet, VecDeque};
use std::time::SystemTime;

use crate::slots::{SlotId, SlotMap, SlotValue};

/// Default cap on remembered titles per session
pub const DEFAULT_SEEN_CAPACITY: usize = 50;

/// One classifier score for a label, tagged with the turn it arrived on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub turn: u64,
    pub score: f32,
}

/// Conversation state for one session key
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    /// Label -> scores in arrival order
    pub emotion_history: BTreeMap<String, Vec<Observation>>,
    /// Highest single label score seen so far, in [0, 1]
    pub confidence: f32,
    pub slots: SlotMap,
    pub pending_question: Option<SlotId>,
    pub seen_items: SeenItems,
    /// Completed turns
    pub turns: u64,
    pub created_at: SystemTime,
}

impl Session {
    pub fn new(id: impl Into<String>, seen_capacity: usize) -> Self {
        Self {
            id: id.into(),
            emotion_history: BTreeMap::new(),
            confidence: 0.0,
            slots: SlotMap::new(),
            pending_question: None,
            seen_items: SeenItems::with_capacity(seen_capacity),
            turns: 0,
            created_at: SystemTime::now(),
        }
    }

    pub fn filled_slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn slot(&self, id: SlotId) -> Option<&SlotValue> {
        self.slots.get(&id)
    }

    pub fn is_filled(&self, id: SlotId) -> bool {
        self.slots.contains_key(&id)
    }

    /// Write a slot value, replacing any earlier answer
    pub fn set_slot(&mut self, id: SlotId, value: SlotValue) {
        self.slots.insert(id, value);
    }

    /// The emotion individual selected through a slot answer, if any
    pub fn selected_emotion(&self) -> Option<crate::EmotionIndividual> {
        self.slots.values().find_map(SlotValue::as_emotion)
    }
}

/// Bounded, insertion-ordered set of shown titles.
///
/// Re-recording a title moves it to the newest position. Once the cap is
/// exceeded the oldest title is dropped.
#[derive(Debug, Clone)]
pub struct SeenItems {
    capacity: usize,
    order: VecDeque<String>,
    members: HashSet<String>,
}

impl Default for SeenItems {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_SEEN_CAPACITY)
    }
}

impl SeenItems {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            order: VecDeque::with_capacity(capacity.min(1024)),
            members: HashSet::new(),
        }
    }

    pub fn record(&mut self, title: &str) {
        if self.members.contains(title) {
            self.order.retain(|t| t != title);
        } else {
            self.members.insert(title.to_string());
        }
        self.order.push_back(title.to_string());

        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.members.remove(&oldest);
            }
        }
    }

    pub fn contains(&self, title: &str) -> bool {
        self.members.contains(title)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}
