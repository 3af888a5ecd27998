//! Shared type definitions for the Hearth NPC decision runtime.
//!
//! Everything that crosses a component boundary lives here: agent identity
//! and vitals, the world snapshot, decision contexts and results, and the
//! dialogue request/reply pair.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers and injectable id generators
//! - [`enums`] -- Action, weather, role, and mood enumerations
//! - [`structs`] -- Agents, vitals, personas, positions, world snapshot
//! - [`decision`] -- Decision context, behavior decision, decision record
//! - [`dialogue`] -- Dialogue context and response

pub mod decision;
pub mod dialogue;
pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use decision::{BehaviorDecision, DecisionContext, DecisionRecord, DecisionSource};
pub use dialogue::{DialogueContext, DialogueResponse};
pub use enums::{ActionKind, AgentRole, Mood, WeatherKind};
pub use ids::{AgentId, IdGenerator, SequentialIds, TimeOrderedIds};
pub use structs::{
    AgentProfile, AgentVitals, Persona, Position, Rapport, VITAL_MAX, Weather, WorldSnapshot,
};
