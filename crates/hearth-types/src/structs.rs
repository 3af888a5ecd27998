//! Core entity structs: agents, vitals, and world state as seen by the
//! decision runtime.

use serde::{Deserialize, Serialize};

use crate::enums::{AgentRole, Mood, WeatherKind};
use crate::ids::AgentId;

/// Upper bound of every vital stat.
pub const VITAL_MAX: f32 = 100.0;

// ---------------------------------------------------------------------------
// Agents
// ---------------------------------------------------------------------------

/// Physiological state of an agent on a 0-100 scale.
///
/// `health` counts down toward death; `hunger` and `fatigue` count up
/// toward need.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentVitals {
    /// Remaining health. Below 40 the agent flees.
    pub health: f32,
    /// Hunger level. Above 70 the agent looks for food.
    pub hunger: f32,
    /// Tiredness. Above 60 at night the agent sleeps.
    pub fatigue: f32,
}

impl AgentVitals {
    /// Build vitals, clamping each stat into `0..=100`.
    pub fn new(health: f32, hunger: f32, fatigue: f32) -> Self {
        Self {
            health: clamp_vital(health),
            hunger: clamp_vital(hunger),
            fatigue: clamp_vital(fatigue),
        }
    }

    /// Raise hunger and fatigue by the given amounts, staying in range.
    pub fn drift(&mut self, hunger: f32, fatigue: f32) {
        self.hunger = clamp_vital(self.hunger + hunger);
        self.fatigue = clamp_vital(self.fatigue + fatigue);
    }
}

impl Default for AgentVitals {
    fn default() -> Self {
        Self {
            health: VITAL_MAX,
            hunger: 0.0,
            fatigue: 0.0,
        }
    }
}

/// Clamp a stat into `0..=100`; NaN collapses to 0.
fn clamp_vital(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, VITAL_MAX)
    }
}

/// Who an agent is, for prompts and dialogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    /// Display name.
    pub name: String,
    /// Occupation, e.g. `"blacksmith"`.
    pub profession: String,
    /// Short temperament description.
    pub personality: String,
    /// A few sentences of history.
    pub backstory: String,
}

/// Everything the runtime needs to know about an agent at registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Agent identifier.
    pub id: AgentId,
    /// Entity role; decides whether the agent is scheduled at all.
    pub role: AgentRole,
    /// Persona used for dialogue.
    pub persona: Persona,
}

/// The player's standing with an agent at the moment a conversation opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rapport {
    /// Affection score, 0-100.
    pub affection: u8,
    /// Current mood of the agent.
    pub mood: Mood,
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// A point in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl Position {
    /// Create a position.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position.
    pub fn distance_to(self, other: Self) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Current weather: a kind plus how far one can see (0 = nothing, 1 = clear).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    /// Weather type.
    #[serde(rename = "type")]
    pub kind: WeatherKind,
    /// Visibility in `0.0..=1.0`.
    pub visibility: f32,
}

impl Default for Weather {
    fn default() -> Self {
        Self {
            kind: WeatherKind::Clear,
            visibility: 1.0,
        }
    }
}

/// World state sampled once per tick by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Hour of day in `0.0..24.0`.
    pub time_of_day: f32,
    /// Current weather.
    pub weather: Weather,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vitals_are_clamped() {
        let v = AgentVitals::new(150.0, -5.0, f32::NAN);
        assert!(v.health <= VITAL_MAX);
        assert!(v.hunger >= 0.0 && v.hunger < 0.001);
        assert!(v.fatigue >= 0.0 && v.fatigue < 0.001);
    }

    #[test]
    fn drift_saturates_at_max() {
        let mut v = AgentVitals::new(100.0, 99.0, 10.0);
        v.drift(5.0, 1.5);
        assert!((v.hunger - VITAL_MAX).abs() < f32::EPSILON);
        assert!((v.fatigue - 11.5).abs() < 0.001);
    }

    #[test]
    fn distance_is_euclidean() {
        let d = Position::new(0.0, 0.0).distance_to(Position::new(3.0, 4.0));
        assert!((d - 5.0).abs() < 0.001);
    }

    #[test]
    fn weather_uses_type_key_on_the_wire() {
        let json = serde_json::to_value(Weather::default()).unwrap_or_default();
        assert_eq!(json.get("type").and_then(|v| v.as_str()), Some("clear"));
    }
}
