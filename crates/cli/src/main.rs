use anyhow::{Context, Result, bail};
use catalog::CatalogIndex;
use clap::{Parser, Subcommand};
use colored::Colorize;
use dialogue::AggregationPolicy;
use emotion_client::{EmotionClassifier, GrpcEmotionClassifier, KeywordEmotionClassifier};
use engine::{ChatRequest, ChatResponse, ConversationEngine, EngineConfig};
use rand::seq::IndexedRandom;
use retrieval::{KnowledgeStore, SnapshotStore, SparqlStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

/// MoodReel - emotion-aware movie recommendations
#[derive(Parser)]
#[command(name = "moodreel")]
#[command(about = "Conversational movie recommender driven by how you feel", long_about = None)]
struct Cli {
    /// Path to the local catalog snapshot
    #[arg(long, default_value = "data/snapshot.dat")]
    snapshot: PathBuf,

    /// Address of the gRPC emotion classifier (offline keyword classifier if unset)
    #[arg(long)]
    classifier_addr: Option<String>,

    /// SPARQL endpoint of the movie knowledge graph (snapshot only if unset)
    #[arg(long)]
    sparql_endpoint: Option<String>,

    /// Number of movies per recommendation
    #[arg(long, default_value = "5")]
    top_k: usize,

    /// Confidence at which questions stop
    #[arg(long, default_value = "0.9")]
    readiness_threshold: f32,

    /// Answered questions after which questions stop
    #[arg(long, default_value = "3")]
    min_slots: usize,

    /// Aggregate emotions with per-turn decay instead of a plain mean
    #[arg(long)]
    decay: Option<f32>,

    /// Seed for question choice and shuffling
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive conversation on stdin
    Chat,

    /// Send a single message
    Ask {
        /// Message text
        #[arg(long)]
        text: String,

        /// Continue an existing session
        #[arg(long)]
        session: Option<String>,

        /// Print the raw response as JSON
        #[arg(long)]
        json: bool,
    },

    /// List catalog genres
    Genres,

    /// Search for movies by title
    Search {
        /// Movie title to search for (case-insensitive substring match)
        #[arg(long)]
        title: String,
    },

    /// Run concurrent sessions to measure turn latency
    Benchmark {
        /// Number of concurrent sessions
        #[arg(long, default_value = "50")]
        sessions: usize,

        /// Turns per session
        #[arg(long, default_value = "4")]
        turns: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let start = Instant::now();
    let index = Arc::new(
        CatalogIndex::load_from_file(&cli.snapshot)
            .with_context(|| format!("Failed to load catalog snapshot {}", cli.snapshot.display()))?,
    );
    println!(
        "{} Loaded {} movies in {:?}",
        "✓".green(),
        index.len(),
        start.elapsed()
    );

    match &cli.command {
        Commands::Genres => return handle_genres(&index),
        Commands::Search { title } => return handle_search(&index, title),
        _ => {}
    }

    let engine = Arc::new(build_engine(&cli, index).await?);
    match cli.command {
        Commands::Chat => handle_chat(&engine).await?,
        Commands::Ask { text, session, json } => handle_ask(&engine, text, session, json).await?,
        Commands::Benchmark { sessions, turns } => handle_benchmark(engine, sessions, turns).await?,
        Commands::Genres | Commands::Search { .. } => {}
    }

    Ok(())
}

fn engine_config(cli: &Cli) -> EngineConfig {
    let mut config = EngineConfig::default()
        .with_top_k(cli.top_k)
        .with_readiness_threshold(cli.readiness_threshold)
        .with_minimum_slots(cli.min_slots);
    if let Some(factor) = cli.decay {
        config = config.with_aggregation(AggregationPolicy::Decay { factor });
    }
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    config
}

async fn build_engine(cli: &Cli, index: Arc<CatalogIndex>) -> Result<ConversationEngine> {
    let config = engine_config(cli);

    let snapshot: Arc<dyn KnowledgeStore> =
        Arc::new(SnapshotStore::new(index).with_modern_cutoff(config.modern_cutoff));
    let live: Arc<dyn KnowledgeStore> = match &cli.sparql_endpoint {
        Some(endpoint) => Arc::new(
            SparqlStore::new(endpoint.as_str())?
                .with_timeout(config.query_timeout)?
                .with_modern_cutoff(config.modern_cutoff),
        ),
        None => snapshot.clone(),
    };

    let classifier: Arc<dyn EmotionClassifier> = match &cli.classifier_addr {
        Some(addr) => match GrpcEmotionClassifier::connect(addr.as_str()).await {
            Ok(client) => Arc::new(client),
            Err(e) => {
                warn!("{}; using the keyword classifier instead", e);
                Arc::new(KeywordEmotionClassifier::new())
            }
        },
        None => Arc::new(KeywordEmotionClassifier::new()),
    };

    Ok(ConversationEngine::new(config, classifier, live, snapshot)?)
}

/// Handle the 'chat' command
async fn handle_chat(engine: &ConversationEngine) -> Result<()> {
    println!("{}", "Tell me how you're feeling. Type 'quit' to leave.".bold().blue());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut session_id: Option<String> = None;

    while let Some(line) = lines.next_line().await? {
        let text = line.trim();
        if text.eq_ignore_ascii_case("quit") || text.eq_ignore_ascii_case("exit") {
            break;
        }
        if text.is_empty() {
            continue;
        }

        let mut request = ChatRequest::new(text);
        if let Some(id) = &session_id {
            request = request.with_session(id.as_str());
        }
        let response = engine.handle(request).await?;
        session_id = Some(response.session_id.clone());
        print_response(&response);
    }

    Ok(())
}

/// Handle the 'ask' command
async fn handle_ask(engine: &ConversationEngine, text: String, session: Option<String>, json: bool) -> Result<()> {
    let mut request = ChatRequest::new(text);
    if let Some(id) = session {
        request = request.with_session(id);
    }
    let response = engine.handle(request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("{} {}", "session:".dimmed(), response.session_id);
        print_response(&response);
    }
    Ok(())
}

/// Handle the 'genres' command
fn handle_genres(index: &CatalogIndex) -> Result<()> {
    println!("{}", "Catalog genres:".bold().blue());
    for genre in index.genre_universe() {
        println!(
            "{}{:<12} {} movies",
            "• ".green(),
            genre.label(),
            index.get_movies_by_genre(genre).len()
        );
    }
    Ok(())
}

/// Handle the 'search' command
fn handle_search(index: &CatalogIndex, title: &str) -> Result<()> {
    let matches = index.search_titles(title);
    println!("{}", format!("Search results for '{}':", title).bold().blue());
    if matches.is_empty() {
        println!("  no matches");
    }
    for movie in matches.iter().take(20) {
        let genres = movie
            .genres
            .iter()
            .map(|g| g.label())
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{}: {} ({}) [{}]",
            movie.id,
            movie.title,
            movie.year.map(|y| y.to_string()).unwrap_or_else(|| "n/a".to_string()),
            genres
        );
    }
    Ok(())
}

const BENCHMARK_OPENERS: [&str; 5] = [
    "I had a stressful week at work",
    "feeling kind of lonely tonight",
    "I'm so excited, we won the game",
    "a bit bored, nothing to do",
    "I miss my family",
];

const BENCHMARK_ANSWERS: [&str; 4] = [
    "something comforting",
    "I want to feel better",
    "a classic please",
    "keep it slow and calm",
];

/// Handle the 'benchmark' command
async fn handle_benchmark(engine: Arc<ConversationEngine>, sessions: usize, turns: usize) -> Result<()> {
    if sessions == 0 || turns == 0 {
        bail!("sessions and turns must both be positive");
    }

    let start = Instant::now();
    let mut handles = Vec::with_capacity(sessions);
    for i in 0..sessions {
        let engine = engine.clone();
        let opener = BENCHMARK_OPENERS.choose(&mut rand::rng()).copied().unwrap_or("hello");
        let handle = tokio::spawn(async move {
            let session_id = format!("bench-{i}");
            let mut timings = Vec::with_capacity(turns);
            for turn in 0..turns {
                let text = if turn == 0 {
                    opener
                } else {
                    BENCHMARK_ANSWERS[(turn - 1) % BENCHMARK_ANSWERS.len()]
                };
                let turn_start = Instant::now();
                engine
                    .handle(ChatRequest::new(text).with_session(session_id.as_str()))
                    .await?;
                timings.push(turn_start.elapsed());
            }
            Ok::<_, anyhow::Error>(timings)
        });
        handles.push(handle);
    }

    let mut timings: Vec<Duration> = Vec::with_capacity(sessions * turns);
    for handle in handles {
        timings.extend(handle.await??);
    }
    let wall_time = start.elapsed();

    timings.sort();
    let total: Duration = timings.iter().sum();
    let avg = total / timings.len() as u32;
    let percentile = |p: f32| timings[((timings.len() as f32 * p) as usize).min(timings.len() - 1)];
    let throughput = timings.len() as f32 / wall_time.as_secs_f32();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Sessions: {}, turns per session: {}", sessions, turns);
    println!("Wall time: {:?}", wall_time);
    println!("Average latency: {:?}", avg);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} turns/second", throughput);

    Ok(())
}

/// Helper function to format and print one reply
fn print_response(response: &ChatResponse) {
    println!("{} {}", "»".cyan(), response.reply);
    if response.movies.is_empty() {
        return;
    }

    println!(
        "  {} {}  {} {}",
        "mood:".dimmed(),
        response.dominant_emotion,
        "genres:".dimmed(),
        response.genres.join(", ")
    );
    for (rank, movie) in response.movies.iter().enumerate() {
        let year = movie.year.map(|y| format!(" ({y})")).unwrap_or_default();
        println!(
            "  {}. {}{} [{}]",
            (rank + 1).to_string().green(),
            movie.title.bold(),
            year,
            movie.genre
        );
    }
}
