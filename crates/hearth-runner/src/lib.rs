//! NPC decision and dialogue runtime.
//!
//! Autonomous agents periodically need a behavior decision, and the player
//! can talk to any of them at any time. Both can come from a remote
//! chat-completions service or from a deterministic local engine. Remote
//! calls draw on one shared hourly budget, and every path ends in a valid
//! decision or reply even when the service is absent, exhausted, or answers
//! with garbage.
//!
//! # Architecture
//!
//! ```text
//! tick --> Scheduler --> due agents --> gate (available? budget?)
//!                                         |            |
//!                                   local engine   spawn: Prompt --> LLM --> Parser
//!                                         |                                     |
//!                                         +--------> EventNotifier <------------+
//! ```
//!
//! # Modules
//!
//! - [`config`] -- Environment-driven configuration
//! - [`fallback`] -- Deterministic decision rules and dialogue templates
//! - [`budget`] -- Shared remote-call budget
//! - [`parse`] -- Free-text response parsing
//! - [`prompt`] -- `minijinja` prompt templates
//! - [`llm`] -- Chat-completions transport
//! - [`client`] -- Decision and dialogue clients with fallback
//! - [`scheduler`] -- Per-agent cooldowns
//! - [`dialogue`] -- Active conversation and its history
//! - [`world`] -- World and notification interfaces
//! - [`orchestrator`] -- The per-tick pipeline

pub mod budget;
pub mod client;
pub mod config;
pub mod dialogue;
pub mod error;
pub mod fallback;
pub mod llm;
pub mod orchestrator;
pub mod parse;
pub mod prompt;
pub mod scheduler;
pub mod world;

pub use budget::{BudgetSnapshot, RateBudget};
pub use client::{DecisionClient, DialogueClient, Resolution};
pub use config::HearthConfig;
pub use dialogue::{DialogueReply, DialogueSession, DialogueSessions};
pub use error::MindError;
pub use orchestrator::Orchestrator;
pub use scheduler::DecisionScheduler;
pub use world::{ChannelNotifier, EventNotifier, TracingNotifier, WorldView};
