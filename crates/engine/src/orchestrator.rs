//! # Conversation Orchestrator
//!
//! This module coordinates one conversation turn end to end:
//! 1. Validate the input
//! 2. Classify the utterance (no session lock held, bounded by a timeout)
//! 3. Under the session lock: fold the emotion scores in and step the
//!    slot-filling controller
//! 4. On a question, reply with it
//! 5. Otherwise compute genre weights from a session snapshot and run the
//!    retrieval cascade without the lock
//! 6. Re-acquire the lock to rank, diversify and record the shown titles
//! 7. Compose the reply
//!
//! ## Failure handling
//!
//! Blank input is the only error returned to the caller. Classifier and
//! knowledge-store failures degrade to empty data inside their stages, and
//! any other fault during a turn is turned into a generic reply.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::OnceCell;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use catalog::{Era, EraFilter, Genre};
use dialogue::{
    Decision, EmotionAggregator, InMemorySessionStore, NEUTRAL_LABEL, SessionHandle, SessionStore,
    SlotFillingController, SlotRegistry,
};
use emotion_client::{EmotionClassifier, EmotionScores};
use pipeline::{GenreWeights, RankingContext, RankingPipeline, Recommendation, detect_genre_mention};
use retrieval::{KnowledgeStore, RetrievalAdapter};

use crate::api::{ChatRequest, ChatResponse};
use crate::config::EngineConfig;
use crate::error::EngineError;

const FALLBACK_REPLY: &str =
    "Sorry, something went wrong on my side. Could you tell me a little more about how you're feeling?";

/// Coordinates classifier, dialogue state, retrieval and ranking
pub struct ConversationEngine {
    config: EngineConfig,
    classifier: Arc<dyn EmotionClassifier>,
    sessions: Arc<dyn SessionStore>,
    retrieval: RetrievalAdapter,
    controller: SlotFillingController,
    aggregator: EmotionAggregator,
    ranking: RankingPipeline,
    genre_universe: OnceCell<Vec<Genre>>,
    rng: Mutex<StdRng>,
}

impl ConversationEngine {
    /// Create an engine with an in-memory session store
    ///
    /// # Arguments
    /// * `config` - Validated before anything is built
    /// * `classifier` - Emotion classifier consulted once per turn
    /// * `live` - Knowledge store for the first three retrieval stages
    /// * `snapshot` - Local store used as the last resort
    ///
    /// # Errors
    /// `EngineError::InvalidConfig` when `config.validate()` rejects it.
    pub fn new(
        config: EngineConfig,
        classifier: Arc<dyn EmotionClassifier>,
        live: Arc<dyn KnowledgeStore>,
        snapshot: Arc<dyn KnowledgeStore>,
    ) -> Result<Self, EngineError> {
        config.validate()?;

        let sessions = Arc::new(
            InMemorySessionStore::new(config.session_capacity).with_seen_capacity(config.seen_capacity),
        );
        let retrieval = RetrievalAdapter::new(live, snapshot)
            .with_timeout(config.query_timeout)
            .with_limit(config.query_limit);
        let controller = SlotFillingController::new(SlotRegistry::standard())
            .with_readiness_threshold(config.readiness_threshold)
            .with_minimum_slots(config.minimum_slots)
            .with_cross_slot_detection(config.cross_slot_detection);
        let aggregator = EmotionAggregator::new(config.aggregation);
        let ranking = RankingPipeline::standard().with_modern_cutoff(config.modern_cutoff);
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Ok(Self {
            config,
            classifier,
            sessions,
            retrieval,
            controller,
            aggregator,
            ranking,
            genre_universe: OnceCell::new(),
            rng: Mutex::new(rng),
        })
    }

    /// Replace the session store (e.g. to share one across engines)
    pub fn with_session_store(mut self, sessions: Arc<dyn SessionStore>) -> Self {
        self.sessions = sessions;
        self
    }

    pub fn with_ranking_pipeline(mut self, ranking: RankingPipeline) -> Self {
        self.ranking = ranking;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    /// Main entry point: handle one user utterance
    ///
    /// # Returns
    /// The reply for this turn. Fails only with `EngineError::EmptyInput`,
    /// before any session state is touched.
    #[instrument(skip(self, request), fields(request_id, session_id))]
    pub async fn handle(&self, request: ChatRequest) -> Result<ChatResponse, EngineError> {
        let text = request.text.trim();
        if text.is_empty() {
            return Err(EngineError::EmptyInput);
        }

        let request_id = Uuid::new_v4();
        let session_id = request
            .session_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let span = tracing::Span::current();
        span.record("request_id", tracing::field::display(request_id));
        span.record("session_id", session_id.as_str());

        let top_k = self.config.resolve_top_k(request.top_k);
        let start_time = Instant::now();

        let response = match self.run_turn(request_id, &session_id, text, top_k).await {
            Ok(response) => response,
            Err(e) => {
                error!("Turn failed, replying with fallback: {:#}", e);
                ChatResponse {
                    request_id,
                    session_id,
                    reply: FALLBACK_REPLY.to_string(),
                    dominant_emotion: NEUTRAL_LABEL.to_string(),
                    genres: Vec::new(),
                    movies: Vec::new(),
                }
            }
        };

        info!(
            movies = response.movies.len(),
            "Turn handled in {:.2?}",
            start_time.elapsed()
        );
        Ok(response)
    }

    async fn run_turn(&self, request_id: Uuid, session_id: &str, text: &str, top_k: usize) -> Result<ChatResponse> {
        let scores = self.classify(text).await;
        let universe = self.genre_universe().await;
        let mention = detect_genre_mention(text, universe);
        let mut rng = self.turn_rng();

        let handle = self.sessions.handle(session_id);
        let (decision, dominant_emotion) = handle
            .update(|session| {
                self.aggregator.update(session, &scores);
                let decision = self.controller.step(session, text, &mut rng);
                (decision, self.aggregator.dominant_label(session))
            })
            .await;

        let selected_emotion = match decision {
            Decision::Ask { slot, question } => {
                debug!(slot = %slot, "Replying with a question");
                return Ok(ChatResponse {
                    request_id,
                    session_id: session_id.to_string(),
                    reply: question,
                    dominant_emotion,
                    genres: Vec::new(),
                    movies: Vec::new(),
                });
            }
            Decision::Ready { selected_emotion } => selected_emotion,
        };

        let snapshot = handle.snapshot().await;
        let dominant = self.aggregator.dominant_individual(&snapshot);
        let weights = GenreWeights::compute(universe, &snapshot.slots, dominant, selected_emotion, mention);
        let genres: Vec<Genre> = weights
            .ranked()
            .into_iter()
            .take(self.config.genre_query_count)
            .collect();

        let context = RankingContext::new(snapshot.slots);
        let era = era_filter(context.era_preference());
        let retrieval = self.retrieval.retrieve(&genres, era).await;
        debug!(stage = ?retrieval.stage, "Retrieved {} candidates", retrieval.candidates.len());

        let movies = self
            .rank(&handle, retrieval.candidates, &weights, &context, top_k, &mut rng)
            .await
            .context("Failed to rank candidates")?;

        let genres: Vec<String> = genres.iter().map(|g| g.label().to_string()).collect();
        Ok(ChatResponse {
            request_id,
            session_id: session_id.to_string(),
            reply: compose_reply(&dominant_emotion, &genres, &movies),
            dominant_emotion,
            genres,
            movies,
        })
    }

    /// Best-effort classification: failures and timeouts yield no scores
    async fn classify(&self, text: &str) -> EmotionScores {
        let name = self.classifier.name();
        match tokio::time::timeout(self.config.classifier_timeout, self.classifier.classify(text)).await {
            Ok(Ok(scores)) => scores,
            Ok(Err(e)) => {
                warn!(classifier = name, "Emotion classification failed: {}", e);
                HashMap::new()
            }
            Err(_) => {
                warn!(
                    classifier = name,
                    "Emotion classification timed out after {}ms",
                    self.config.classifier_timeout.as_millis()
                );
                HashMap::new()
            }
        }
    }

    async fn rank(
        &self,
        handle: &SessionHandle,
        candidates: Vec<retrieval::Candidate>,
        weights: &GenreWeights,
        context: &RankingContext,
        top_k: usize,
        rng: &mut StdRng,
    ) -> Result<Vec<Recommendation>> {
        handle
            .update(|session| {
                self.ranking
                    .rank(candidates, weights, context, &mut session.seen_items, top_k, rng)
            })
            .await
    }

    /// Genres known to the catalog, loaded on first use.
    ///
    /// Tries the live store, then the snapshot, then the static genre list.
    pub async fn genre_universe(&self) -> &[Genre] {
        self.genre_universe
            .get_or_init(|| async {
                for store in [self.retrieval.live_store(), self.retrieval.snapshot_store()] {
                    match tokio::time::timeout(self.config.query_timeout, store.genre_universe()).await {
                        Ok(Ok(genres)) if !genres.is_empty() => {
                            info!(store = store.name(), "Loaded {} catalog genres", genres.len());
                            return genres;
                        }
                        Ok(Ok(_)) => debug!(store = store.name(), "Store reported no genres"),
                        Ok(Err(e)) => warn!(store = store.name(), "Failed to load genres: {}", e),
                        Err(_) => warn!(store = store.name(), "Loading genres timed out"),
                    }
                }
                warn!("Falling back to the static genre list");
                Genre::ALL.to_vec()
            })
            .await
    }

    /// Independent rng for one turn, drawn from the engine's master rng
    fn turn_rng(&self) -> StdRng {
        let mut master = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        StdRng::seed_from_u64(master.random())
    }
}

fn era_filter(preference: Option<Era>) -> EraFilter {
    match preference {
        Some(Era::Classic) => EraFilter::Classic,
        Some(Era::Modern) => EraFilter::Modern,
        None => EraFilter::Any,
    }
}

fn compose_reply(dominant_emotion: &str, genres: &[String], movies: &[Recommendation]) -> String {
    let mood = if dominant_emotion == NEUTRAL_LABEL {
        String::new()
    } else {
        format!(" for a {dominant_emotion} mood")
    };

    match (movies.is_empty(), genres.is_empty()) {
        (false, _) => format!(
            "Here are {} movie{} I picked{}. Enjoy!",
            movies.len(),
            if movies.len() == 1 { "" } else { "s" },
            mood
        ),
        (true, false) => format!(
            "I couldn't find specific movies right now, but {} might suit you{}.",
            genres.join(", "),
            mood
        ),
        (true, true) => {
            "I couldn't find any movies that fit right now. Tell me a bit more about what you'd like?".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::Genre;

    fn movie(title: &str) -> Recommendation {
        Recommendation {
            title: title.to_string(),
            genre: Genre::Comedy.label().to_string(),
            year: Some(1995),
        }
    }

    #[test]
    fn test_era_filter_mapping() {
        assert_eq!(era_filter(None), EraFilter::Any);
        assert_eq!(era_filter(Some(Era::Classic)), EraFilter::Classic);
        assert_eq!(era_filter(Some(Era::Modern)), EraFilter::Modern);
    }

    #[test]
    fn test_reply_mentions_count_and_mood() {
        let reply = compose_reply("joy", &["Comedy".to_string()], &[movie("A"), movie("B")]);
        assert!(reply.contains("2 movies"));
        assert!(reply.contains("joy"));

        let reply = compose_reply(NEUTRAL_LABEL, &[], &[movie("A")]);
        assert!(reply.contains("1 movie "));
        assert!(!reply.contains(NEUTRAL_LABEL));
    }

    #[test]
    fn test_reply_without_movies() {
        let reply = compose_reply("sadness", &["Drama".to_string(), "Romance".to_string()], &[]);
        assert!(reply.contains("Drama, Romance"));

        let reply = compose_reply(NEUTRAL_LABEL, &[], &[]);
        assert!(reply.contains("couldn't find"));
    }
}
