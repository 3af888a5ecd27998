//! Decision inputs and outputs.
//!
//! A [`DecisionContext`] is built fresh for every evaluation and thrown away
//! afterwards. The resulting [`BehaviorDecision`] is always fully populated,
//! whichever path produced it; [`DecisionRecord`] wraps it with provenance
//! for publication.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::ActionKind;
use crate::ids::AgentId;
use crate::structs::{AgentVitals, Weather};

/// Snapshot of one agent and its surroundings at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionContext {
    /// The agent being evaluated.
    pub agent_id: AgentId,
    /// Vitals at the moment of evaluation.
    pub vitals: AgentVitals,
    /// Hour of day, `0.0..24.0`.
    pub world_time: f32,
    /// Current weather.
    pub weather: Weather,
    /// Distance from the agent to the reference actor (the player).
    pub distance_to_player: f32,
}

impl DecisionContext {
    /// Distance used when the world cannot place the agent. Far enough that
    /// no proximity rule ever fires.
    pub const UNKNOWN_DISTANCE: f32 = f32::MAX;

    /// Whether the world could place the agent relative to the player.
    pub const fn player_distance_known(&self) -> bool {
        self.distance_to_player.is_finite() && self.distance_to_player < Self::UNKNOWN_DISTANCE
    }
}

/// What an agent should do next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviorDecision {
    /// Action tag.
    pub action: ActionKind,
    /// Free-text target or identifier, empty when unspecified.
    pub target: String,
    /// Urgency; higher preempts lower.
    pub priority: i32,
    /// How many seconds the action should run.
    pub duration: u32,
    /// Human-readable justification.
    pub reasoning: String,
}

impl BehaviorDecision {
    /// Build a decision from its parts.
    pub fn new(
        action: ActionKind,
        target: impl Into<String>,
        priority: i32,
        duration: u32,
        reasoning: impl Into<String>,
    ) -> Self {
        Self {
            action,
            target: target.into(),
            priority,
            duration,
            reasoning: reasoning.into(),
        }
    }
}

/// Where a resolved decision or reply came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    /// Parsed from the remote reasoning service.
    Remote,
    /// A remote call was attempted and failed; the local fallback was used.
    RemoteFallback,
    /// No credential configured; went straight to the local fallback.
    Disabled,
    /// The shared call budget was empty; went straight to the local fallback.
    BudgetExhausted,
}

impl DecisionSource {
    /// Label for logs and metrics.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::RemoteFallback => "remote_fallback",
            Self::Disabled => "disabled",
            Self::BudgetExhausted => "budget_exhausted",
        }
    }

    /// Whether the payload came from the local fallback path.
    pub const fn is_fallback(self) -> bool {
        !matches!(self, Self::Remote)
    }
}

/// Event published after every resolved evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRecord {
    /// The evaluated agent.
    pub agent_id: AgentId,
    /// The decision to execute.
    pub decision: BehaviorDecision,
    /// How it was produced.
    pub source: DecisionSource,
    /// When it was resolved.
    pub decided_at: DateTime<Utc>,
}
