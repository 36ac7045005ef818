//! Whole-turn tests for the conversation engine.
//!
//! Collaborators are stubbed: a scripted classifier, an in-memory snapshot
//! catalog, and stores that come back empty.

use anyhow::anyhow;
use async_trait::async_trait;
use catalog::{CatalogIndex, Genre, Movie};
use dialogue::{SlotId, SlotValue};
use emotion_client::{ClassifierError, EmotionClassifier, EmotionScores};
use engine::{ChatRequest, ConversationEngine, EngineConfig, EngineError};
use pipeline::{Diversifier, Filter, FilterPipeline, RankingContext, RankingPipeline};
use retrieval::{CatalogQuery, CatalogRow, KnowledgeStore, SnapshotStore};
use std::collections::{BTreeSet, VecDeque};
use std::sync::{Arc, Mutex};

// ============================================================================
// Test Fixtures
// ============================================================================

/// Returns queued score maps in order, then `fallback` forever
struct ScriptedClassifier {
    queue: Mutex<VecDeque<EmotionScores>>,
    fallback: EmotionScores,
}

impl ScriptedClassifier {
    fn constant(label: &str, score: f32) -> Arc<Self> {
        Self::script(&[], scores(label, score))
    }

    fn script(turns: &[(&str, f32)], fallback: EmotionScores) -> Arc<Self> {
        Arc::new(Self {
            queue: Mutex::new(turns.iter().map(|&(l, s)| scores(l, s)).collect()),
            fallback,
        })
    }
}

#[async_trait]
impl EmotionClassifier for ScriptedClassifier {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn classify(&self, _text: &str) -> Result<EmotionScores, ClassifierError> {
        let next = self.queue.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| self.fallback.clone()))
    }
}

struct FailingClassifier;

#[async_trait]
impl EmotionClassifier for FailingClassifier {
    fn name(&self) -> &str {
        "failing"
    }

    async fn classify(&self, _text: &str) -> Result<EmotionScores, ClassifierError> {
        Err(ClassifierError::ConnectionError("service unavailable".into()))
    }
}

/// Knows nothing at all
struct EmptyStore;

#[async_trait]
impl KnowledgeStore for EmptyStore {
    fn name(&self) -> &str {
        "empty"
    }

    async fn query(&self, _query: &CatalogQuery) -> retrieval::Result<Vec<CatalogRow>> {
        Ok(Vec::new())
    }

    async fn genre_universe(&self) -> retrieval::Result<Vec<Genre>> {
        Ok(Vec::new())
    }
}

struct FailingFilter;

impl Filter for FailingFilter {
    fn name(&self) -> &str {
        "FailingFilter"
    }

    fn apply(
        &self,
        _candidates: Vec<retrieval::Candidate>,
        _context: &RankingContext,
    ) -> anyhow::Result<Vec<retrieval::Candidate>> {
        Err(anyhow!("filter exploded"))
    }
}

fn scores(label: &str, score: f32) -> EmotionScores {
    [(label.to_string(), score)].into_iter().collect()
}

fn catalog_movies() -> Vec<Movie> {
    use Genre::*;

    let rows: Vec<(&str, u16, Vec<Genre>)> = vec![
        ("Toy Story", 1995, vec![Animation, Children, Comedy]),
        ("Aladdin", 1992, vec![Animation, Children, Comedy, Musical]),
        ("The Sound of Music", 1965, vec![Musical, Romance]),
        ("Singin' in the Rain", 1952, vec![Comedy, Musical, Romance]),
        ("Raiders of the Lost Ark", 1981, vec![Action, Adventure]),
        ("Die Hard", 1988, vec![Action, Thriller]),
        ("Heat", 1995, vec![Action, Crime, Thriller]),
        ("Groundhog Day", 1993, vec![Comedy, Romance]),
        ("Some Like It Hot", 1959, vec![Comedy, Crime]),
        ("The Princess Bride", 1987, vec![Action, Adventure, Comedy, Romance]),
        ("Babe", 1995, vec![Children, Comedy, Drama]),
        ("Spirited Away", 2001, vec![Adventure, Animation, Fantasy]),
        ("The General", 1926, vec![Action, Adventure, Comedy, War]),
        ("Casablanca", 1942, vec![Drama, Romance, War]),
        ("Alien", 1979, vec![Action, Horror, SciFi]),
        ("Amelie", 2001, vec![Comedy, Romance]),
        ("Shrek", 2001, vec![Adventure, Animation, Children, Comedy, Fantasy]),
        ("Chicken Run", 2000, vec![Animation, Children, Comedy]),
    ];

    rows.into_iter()
        .enumerate()
        .map(|(i, (title, year, genres))| Movie {
            id: i as u32 + 1,
            title: title.to_string(),
            year: Some(year),
            genres,
        })
        .collect()
}

fn genres_of(title: &str) -> Vec<Genre> {
    catalog_movies()
        .into_iter()
        .find(|m| m.title == title)
        .map(|m| m.genres)
        .unwrap_or_default()
}

fn snapshot_store() -> Arc<SnapshotStore> {
    Arc::new(SnapshotStore::new(Arc::new(CatalogIndex::from_movies(catalog_movies()).unwrap())))
}

fn config() -> EngineConfig {
    EngineConfig::default().with_seed(42)
}

fn build_engine(classifier: Arc<dyn EmotionClassifier>) -> ConversationEngine {
    let store = snapshot_store();
    ConversationEngine::new(config(), classifier, store.clone(), store).unwrap()
}

fn titles(response: &engine::ChatResponse) -> BTreeSet<String> {
    response.movies.iter().map(|m| m.title.clone()).collect()
}

// ============================================================================
// Questions
// ============================================================================

#[tokio::test]
async fn test_first_turn_for_new_session_asks_a_question() {
    let engine = build_engine(ScriptedClassifier::constant("sadness", 0.6));

    let response = engine.handle(ChatRequest::new("I had a long day")).await.unwrap();

    assert!(!response.session_id.is_empty());
    assert!(!response.reply.is_empty());
    assert_eq!(response.dominant_emotion, "sadness");
    assert!(response.genres.is_empty());
    assert!(response.movies.is_empty());

    let session = engine.sessions().get(&response.session_id).unwrap().snapshot().await;
    assert_eq!(session.pending_question, Some(SlotId::EmotionDirection));
    assert_eq!(session.turns, 1);
}

#[tokio::test]
async fn test_answer_is_recorded_and_flow_adapts() {
    let engine = build_engine(ScriptedClassifier::constant("sadness", 0.3));

    let first = engine.handle(ChatRequest::new("hello")).await.unwrap();
    let second = engine
        .handle(ChatRequest::new("something intense please").with_session(&first.session_id))
        .await
        .unwrap();

    assert_eq!(second.session_id, first.session_id);
    assert!(second.movies.is_empty());

    let session = engine.sessions().get(&first.session_id).unwrap().snapshot().await;
    assert_eq!(session.slot(SlotId::EmotionDirection), Some(&SlotValue::plain("intense")));
    assert_eq!(session.pending_question, Some(SlotId::IntensityStyle));
}

#[tokio::test]
async fn test_emotion_answer_goes_straight_to_recommendations() {
    let engine = build_engine(ScriptedClassifier::constant("neutral", 0.2));

    let first = engine.handle(ChatRequest::new("hi there")).await.unwrap();
    assert!(first.movies.is_empty());

    let second = engine
        .handle(ChatRequest::new("honestly I'm sad").with_session(&first.session_id))
        .await
        .unwrap();
    assert!(!second.movies.is_empty());
    // sadness seeds drama and comedy
    assert!(second.genres.iter().any(|g| g == "Comedy"));

    let session = engine.sessions().get(&first.session_id).unwrap().snapshot().await;
    assert_eq!(session.pending_question, None);
}

#[tokio::test]
async fn test_minimum_slots_stop_questions() {
    let engine = build_engine(ScriptedClassifier::constant("curiosity", 0.2));
    let session_id = "quota";

    engine
        .sessions()
        .handle(session_id)
        .update(|s| {
            s.set_slot(SlotId::EmotionDirection, SlotValue::plain("comforting"));
            s.set_slot(SlotId::ComfortStyle, SlotValue::plain("uplifting"));
            s.set_slot(SlotId::DesiredOutcome, SlotValue::plain("feel_better"));
        })
        .await;

    let response = engine
        .handle(ChatRequest::new("anything good?").with_session(session_id))
        .await
        .unwrap();
    assert!(!response.movies.is_empty());
    for movie in &response.movies {
        let genres = genres_of(&movie.title);
        assert!(!genres.contains(&Genre::Horror));
        assert!(!genres.contains(&Genre::War));
        assert!(!genres.contains(&Genre::Crime));
    }
}

// ============================================================================
// Recommendations
// ============================================================================

#[tokio::test]
async fn test_confident_turn_recommends_top_k() {
    let engine = build_engine(ScriptedClassifier::constant("joy", 0.95));

    let response = engine
        .handle(ChatRequest::new("what a great day").with_top_k(3))
        .await
        .unwrap();

    assert_eq!(response.movies.len(), 3);
    assert_eq!(response.dominant_emotion, "joy");
    // joy seeds animation, comedy and musical; ties fall back to label order
    assert_eq!(&response.genres[..3], &["Animation", "Comedy", "Musical"]);
    assert_eq!(response.genres.len(), 5);
}

#[tokio::test]
async fn test_no_violence_vetoes_violent_genres() {
    let engine = build_engine(ScriptedClassifier::constant("excitement", 0.95));
    let session_id = "gentle";

    engine
        .sessions()
        .handle(session_id)
        .update(|s| s.set_slot(SlotId::ViolenceTolerance, SlotValue::plain("none")))
        .await;

    let response = engine
        .handle(ChatRequest::new("surprise me").with_session(session_id).with_top_k(20))
        .await
        .unwrap();

    assert!(!response.movies.is_empty());
    for movie in &response.movies {
        let genres = genres_of(&movie.title);
        for blocked in [Genre::Action, Genre::Crime, Genre::War, Genre::Horror] {
            assert!(!genres.contains(&blocked), "{} should have been vetoed", movie.title);
        }
    }
}

#[tokio::test]
async fn test_comfort_seeking_blocks_dark_genres() {
    let engine = build_engine(ScriptedClassifier::constant("sadness", 0.95));
    let session_id = "cozy";

    engine
        .sessions()
        .handle(session_id)
        .update(|s| s.set_slot(SlotId::ComfortStyle, SlotValue::plain("calm")))
        .await;

    let response = engine
        .handle(ChatRequest::new("rough week").with_session(session_id).with_top_k(20))
        .await
        .unwrap();

    // sadness seeds drama and comedy, so both are retrieved and must be dropped
    assert!(response.genres.iter().any(|g| g == "Drama"));
    assert!(response.genres.iter().any(|g| g == "Comedy"));
    let picked = titles(&response);
    assert!(!picked.is_empty());
    assert!(!picked.contains("Casablanca"));
    assert!(!picked.contains("Some Like It Hot"));
    for movie in &response.movies {
        let genres = genres_of(&movie.title);
        for blocked in [Genre::Horror, Genre::War, Genre::Crime] {
            assert!(!genres.contains(&blocked), "{} should have been blocked", movie.title);
        }
    }
}

#[tokio::test]
async fn test_explicit_genre_mention_leads_genres() {
    let engine = build_engine(ScriptedClassifier::constant("joy", 0.95));

    let response = engine.handle(ChatRequest::new("maybe a horror movie")).await.unwrap();
    assert_eq!(response.genres[0], "Horror");
}

#[tokio::test]
async fn test_seen_titles_are_not_repeated() {
    let engine = build_engine(ScriptedClassifier::constant("joy", 0.95));

    let first = engine
        .handle(ChatRequest::new("feeling great").with_session("repeat").with_top_k(3))
        .await
        .unwrap();
    let second = engine
        .handle(ChatRequest::new("more please").with_session("repeat").with_top_k(3))
        .await
        .unwrap();

    assert_eq!(first.movies.len(), 3);
    assert_eq!(second.movies.len(), 3);
    assert!(titles(&first).is_disjoint(&titles(&second)));

    let session = engine.sessions().get("repeat").unwrap().snapshot().await;
    assert_eq!(session.seen_items.len(), 6);
}

#[tokio::test]
async fn test_previously_seen_title_is_excluded() {
    let engine = build_engine(ScriptedClassifier::constant("joy", 0.95));

    let baseline = engine
        .handle(ChatRequest::new("feeling great").with_top_k(3))
        .await
        .unwrap();
    let shown = baseline.movies[0].title.clone();

    engine
        .sessions()
        .handle("fresh")
        .update(|s| s.seen_items.record(&shown))
        .await;
    let response = engine
        .handle(ChatRequest::new("feeling great").with_session("fresh").with_top_k(3))
        .await
        .unwrap();

    assert_eq!(response.movies.len(), 3);
    assert!(!titles(&response).contains(&shown));
}

#[tokio::test]
async fn test_empty_catalog_still_replies() {
    let engine = ConversationEngine::new(
        config(),
        ScriptedClassifier::constant("joy", 0.95),
        Arc::new(EmptyStore),
        Arc::new(EmptyStore),
    )
    .unwrap();

    let response = engine.handle(ChatRequest::new("anything")).await.unwrap();
    assert!(response.movies.is_empty());
    assert!(!response.reply.is_empty());
    assert!(!response.genres.is_empty());
    assert_eq!(engine.genre_universe().await, &Genre::ALL[..]);
}

// ============================================================================
// Degradation and errors
// ============================================================================

#[tokio::test]
async fn test_empty_input_is_rejected_before_any_state() {
    let engine = build_engine(ScriptedClassifier::constant("joy", 0.5));

    assert_eq!(engine.handle(ChatRequest::new("")).await, Err(EngineError::EmptyInput));
    assert_eq!(
        engine.handle(ChatRequest::new("   \n").with_session("s")).await,
        Err(EngineError::EmptyInput)
    );
    assert!(engine.sessions().is_empty());
}

#[test]
fn test_invalid_config_is_rejected_at_construction() {
    let store = snapshot_store();
    let mut zero_genres = config();
    zero_genres.genre_query_count = 0;

    for bad in [config().with_top_k(0), zero_genres] {
        let result = ConversationEngine::new(
            bad,
            ScriptedClassifier::constant("joy", 0.95),
            store.clone(),
            store.clone(),
        );
        assert!(matches!(result, Err(EngineError::InvalidConfig(_))));
    }
}

#[tokio::test]
async fn test_classifier_failure_degrades_to_neutral() {
    let store = snapshot_store();
    let engine = ConversationEngine::new(config(), Arc::new(FailingClassifier), store.clone(), store).unwrap();

    let response = engine.handle(ChatRequest::new("hello")).await.unwrap();
    assert_eq!(response.dominant_emotion, "neutral");
    assert!(response.movies.is_empty());

    let session = engine.sessions().get(&response.session_id).unwrap().snapshot().await;
    assert_eq!(session.confidence, 0.0);
}

#[tokio::test]
async fn test_internal_fault_becomes_generic_reply() {
    let failing = RankingPipeline::new(FilterPipeline::new().add_filter(FailingFilter), Diversifier::new());
    let engine = build_engine(ScriptedClassifier::constant("joy", 0.95)).with_ranking_pipeline(failing);

    let response = engine.handle(ChatRequest::new("recommend something")).await.unwrap();
    assert_eq!(response.dominant_emotion, "neutral");
    assert!(response.genres.is_empty());
    assert!(response.movies.is_empty());
    assert!(!response.reply.is_empty());
}

// ============================================================================
// Session properties
// ============================================================================

#[tokio::test]
async fn test_confidence_is_monotonic_and_bounded() {
    let classifier = ScriptedClassifier::script(
        &[("sadness", 0.5), ("joy", 0.2), ("fear", 0.7), ("love", 0.1), ("joy", 1.7)],
        EmotionScores::new(),
    );
    let store = snapshot_store();
    let engine = ConversationEngine::new(
        config().with_minimum_slots(100).with_readiness_threshold(1.0),
        classifier,
        store.clone(),
        store,
    )
    .unwrap();

    let mut previous = 0.0_f32;
    for text in ["hmm", "well", "hmm", "well", "hmm", "well"] {
        engine
            .handle(ChatRequest::new(text).with_session("mono"))
            .await
            .unwrap();
        let confidence = engine.sessions().get("mono").unwrap().snapshot().await.confidence;
        assert!(confidence >= previous);
        assert!((0.0..=1.0).contains(&confidence));
        previous = confidence;
    }
    assert_eq!(previous, 1.0);
}

#[tokio::test]
async fn test_request_ids_are_unique() {
    let engine = build_engine(ScriptedClassifier::constant("joy", 0.4));

    let a = engine.handle(ChatRequest::new("hi").with_session("same")).await.unwrap();
    let b = engine.handle(ChatRequest::new("hi").with_session("same")).await.unwrap();
    assert_ne!(a.request_id, b.request_id);
    assert_eq!(a.session_id, b.session_id);
}

#[tokio::test]
async fn test_concurrent_sessions_are_independent() {
    let engine = Arc::new(build_engine(ScriptedClassifier::constant("joy", 0.95)));

    let mut handles = Vec::new();
    for i in 0..16 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            engine
                .handle(ChatRequest::new("great day").with_session(format!("s{i}")).with_top_k(2))
                .await
        }));
    }

    for handle in handles {
        let response = handle.await.unwrap().unwrap();
        assert_eq!(response.movies.len(), 2);
    }
    assert_eq!(engine.sessions().len(), 16);
}

#[test]
fn test_request_deserializes_with_defaults() {
    let request: ChatRequest = serde_json::from_str(r#"{ "text": "hello", "top_k": 3 }"#).unwrap();
    assert_eq!(request.session_id, None);
    assert_eq!(request.top_k, Some(3));
}
