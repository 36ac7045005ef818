//! Conversation engine for the MoodReel recommender.
//!
//! This crate wires the dialogue, classifier, retrieval and ranking crates
//! into one turn-handling entry point, `ConversationEngine::handle`.
//!
//! ## Example Usage
//! ```ignore
//! use engine::{ChatRequest, ConversationEngine, EngineConfig};
//!
//! let engine = ConversationEngine::new(EngineConfig::default(), classifier, live, snapshot)?;
//! let response = engine.handle(ChatRequest::new("I had a rough day")).await?;
//! println!("{}", response.reply);
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod orchestrator;

pub use api::{ChatRequest, ChatResponse};
pub use config::EngineConfig;
pub use error::EngineError;
pub use orchestrator::ConversationEngine;
