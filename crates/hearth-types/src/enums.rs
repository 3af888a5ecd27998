//! Enumeration types for the Hearth runtime.
//!
//! Wire casing matters here: these values appear verbatim in prompts sent to
//! the reasoning service and in the JSON it sends back.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// The behavior an agent performs next.
///
/// Closed set. The remote service is told to pick one of these by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    /// Walk somewhere (patrol, wander, travel to a target).
    Move,
    /// Engage with another actor, usually the player.
    Interact,
    /// Go to bed and recover fatigue.
    Sleep,
    /// Find and consume food.
    Eat,
    /// Run from danger toward safety.
    Flee,
    /// Carry out the agent's profession.
    Work,
    /// Stand still and do nothing in particular.
    Idle,
}

impl ActionKind {
    /// Every action, in prompt order.
    pub const ALL: [Self; 7] = [
        Self::Move,
        Self::Interact,
        Self::Sleep,
        Self::Eat,
        Self::Flee,
        Self::Work,
        Self::Idle,
    ];

    /// Upper-case tag used on the wire (`"MOVE"`, `"EAT"`, ...).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Move => "MOVE",
            Self::Interact => "INTERACT",
            Self::Sleep => "SLEEP",
            Self::Eat => "EAT",
            Self::Flee => "FLEE",
            Self::Work => "WORK",
            Self::Idle => "IDLE",
        }
    }

    /// Case-insensitive lookup by tag. Surrounding whitespace is ignored.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(tag))
    }
}

impl core::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// Weather type reported by the world snapshot provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherKind {
    /// No precipitation, full visibility.
    Clear,
    /// Overcast.
    Cloudy,
    /// Rainfall.
    Rain,
    /// Heavy rain and wind.
    Storm,
    /// Low-lying fog.
    Fog,
    /// Snowfall.
    Snow,
}

impl WeatherKind {
    /// Lower-case name used in prompts.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::Cloudy => "cloudy",
            Self::Rain => "rain",
            Self::Storm => "storm",
            Self::Fog => "fog",
            Self::Snow => "snow",
        }
    }
}

impl core::fmt::Display for WeatherKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// What kind of entity an agent is.
///
/// Carried on the agent profile so the orchestrator can ask a capability
/// question ([`AgentRole::is_autonomous`]) instead of inspecting types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    /// The human-controlled actor. Never evaluated.
    Player,
    /// Ordinary resident.
    Villager,
    /// Shopkeeper or travelling trader.
    Merchant,
    /// Watchman or soldier.
    Guard,
}

impl AgentRole {
    /// Whether the decision scheduler drives this role.
    pub const fn is_autonomous(self) -> bool {
        !matches!(self, Self::Player)
    }
}

// ---------------------------------------------------------------------------
// Mood
// ---------------------------------------------------------------------------

/// Emotional tag attached to dialogue contexts and replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    /// Cheerful.
    Happy,
    /// Even-tempered.
    #[default]
    Neutral,
    /// Downcast.
    Sad,
    /// Irritated or hostile.
    Angry,
    /// Frightened.
    Afraid,
    /// Worn out.
    Tired,
}

impl Mood {
    /// Lower-case name used in prompts and logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Neutral => "neutral",
            Self::Sad => "sad",
            Self::Angry => "angry",
            Self::Afraid => "afraid",
            Self::Tired => "tired",
        }
    }
}

impl core::fmt::Display for Mood {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_tags_round_trip_case_insensitively() {
        for kind in ActionKind::ALL {
            assert_eq!(ActionKind::from_tag(kind.as_str()), Some(kind));
            assert_eq!(
                ActionKind::from_tag(&kind.as_str().to_lowercase()),
                Some(kind)
            );
        }
        assert_eq!(ActionKind::from_tag("  sleep "), Some(ActionKind::Sleep));
        assert_eq!(ActionKind::from_tag("DANCE"), None);
    }

    #[test]
    fn action_serde_uses_wire_tag() {
        let json = serde_json::to_string(&ActionKind::Interact).unwrap_or_default();
        assert_eq!(json, "\"INTERACT\"");
    }

    #[test]
    fn weather_serde_is_lowercase() {
        let parsed: Result<WeatherKind, _> = serde_json::from_str("\"clear\"");
        assert!(matches!(parsed, Ok(WeatherKind::Clear)));
    }

    #[test]
    fn only_player_is_not_autonomous() {
        assert!(!AgentRole::Player.is_autonomous());
        assert!(AgentRole::Villager.is_autonomous());
        assert!(AgentRole::Merchant.is_autonomous());
        assert!(AgentRole::Guard.is_autonomous());
    }
}
