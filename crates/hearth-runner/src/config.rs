//! Configuration types for the decision runtime.
//!
//! All configuration is loaded from environment variables. Each remote
//! reasoning variant (decision, dialogue) is configured independently; a
//! missing or empty API key disables that variant entirely, which is a
//! normal operating mode rather than an error.

use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use crate::error::MindError;

/// Default chat-completions endpoint for both variants.
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Default model identifier for both variants.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default shared remote-call ceiling per window.
pub const DEFAULT_HOURLY_CALL_BUDGET: u32 = 100;

/// Length of one budget window.
pub const BUDGET_WINDOW: Duration = Duration::from_secs(60 * 60);

/// Complete runtime configuration loaded from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct HearthConfig {
    /// Behavior-decision remote variant.
    pub decision: RemoteConfig,
    /// Dialogue-generation remote variant.
    pub dialogue: RemoteConfig,
    /// Shared rate budget settings.
    pub budget: BudgetConfig,
    /// Optional directory with prompt template overrides.
    pub templates_dir: Option<String>,
    /// Decision cadence settings.
    pub scheduler: SchedulerConfig,
    /// Per-second vitals drift applied on every tick.
    pub drift: DriftConfig,
    /// Wall-clock interval between driver loop ticks.
    pub tick_interval: Duration,
}

/// Configuration for one remote reasoning variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    /// Bearer credential. `None` disables the variant.
    pub api_key: Option<String>,
    /// Full chat-completions URL.
    pub endpoint: String,
    /// Model identifier.
    pub model: String,
}

impl RemoteConfig {
    /// A variant with no credential (always falls back locally).
    pub fn disabled() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
        }
    }
}

/// Shared remote-call budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetConfig {
    /// Calls allowed per window, shared by both variants.
    pub max_calls: u32,
    /// Window length after which the allowance refills.
    pub window: Duration,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            max_calls: DEFAULT_HOURLY_CALL_BUDGET,
            window: BUDGET_WINDOW,
        }
    }
}

/// Scheduler cadence and seeding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerConfig {
    /// Seed for the cooldown random source.
    pub seed: u64,
    /// Bounds (seconds) of the cooldown assigned at registration.
    pub initial_cooldown_secs: (f32, f32),
    /// Bounds (seconds) of the cooldown assigned after each evaluation.
    pub cooldown_secs: (f32, f32),
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            initial_cooldown_secs: (0.5, 2.0),
            cooldown_secs: (8.0, 12.0),
        }
    }
}

/// How fast needs build up while an agent is alive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriftConfig {
    /// Hunger gained per second.
    pub hunger_per_sec: f32,
    /// Fatigue gained per second.
    pub fatigue_per_sec: f32,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            hunger_per_sec: 0.05,
            fatigue_per_sec: 0.03,
        }
    }
}

impl Default for HearthConfig {
    fn default() -> Self {
        Self {
            decision: RemoteConfig::disabled(),
            dialogue: RemoteConfig::disabled(),
            budget: BudgetConfig::default(),
            templates_dir: None,
            scheduler: SchedulerConfig::default(),
            drift: DriftConfig::default(),
            tick_interval: Duration::from_millis(250),
        }
    }
}

impl HearthConfig {
    /// Load configuration from environment variables.
    ///
    /// All variables are optional:
    /// - `DECISION_LLM_API_KEY` / `DIALOGUE_LLM_API_KEY` -- bearer credential;
    ///   absent or empty disables the variant
    /// - `DECISION_LLM_ENDPOINT` / `DIALOGUE_LLM_ENDPOINT` -- endpoint override
    /// - `DECISION_LLM_MODEL` / `DIALOGUE_LLM_MODEL` -- model override
    /// - `LLM_HOURLY_CALL_BUDGET` -- shared call ceiling (default 100)
    /// - `TEMPLATES_DIR` -- prompt template override directory
    /// - `SCHEDULER_SEED` -- cooldown random seed (default 42)
    /// - `TICK_INTERVAL_MS` -- driver loop interval (default 250)
    pub fn from_env() -> Result<Self, MindError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// [`HearthConfig::from_env`] delegates here; tests pass a map instead
    /// of touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, MindError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let decision = load_remote_config(&lookup, "DECISION_LLM");
        let dialogue = load_remote_config(&lookup, "DIALOGUE_LLM");

        let max_calls = parse_var(&lookup, "LLM_HOURLY_CALL_BUDGET", DEFAULT_HOURLY_CALL_BUDGET)?;
        let seed = parse_var(&lookup, "SCHEDULER_SEED", defaults.scheduler.seed)?;
        let tick_interval_ms: u64 = parse_var(&lookup, "TICK_INTERVAL_MS", 250)?;
        if tick_interval_ms == 0 {
            return Err(MindError::Config(
                "TICK_INTERVAL_MS must be at least 1".to_owned(),
            ));
        }

        let templates_dir = lookup("TEMPLATES_DIR").filter(|dir| !dir.trim().is_empty());

        Ok(Self {
            decision,
            dialogue,
            budget: BudgetConfig {
                max_calls,
                window: BUDGET_WINDOW,
            },
            templates_dir,
            scheduler: SchedulerConfig {
                seed,
                ..defaults.scheduler
            },
            drift: defaults.drift,
            tick_interval: Duration::from_millis(tick_interval_ms),
        })
    }
}

/// Load one remote variant from a set of prefixed variables.
fn load_remote_config<F>(lookup: &F, prefix: &str) -> RemoteConfig
where
    F: Fn(&str) -> Option<String>,
{
    let api_key = lookup(&format!("{prefix}_API_KEY"))
        .map(|key| key.trim().to_owned())
        .filter(|key| !key.is_empty());
    let endpoint = lookup(&format!("{prefix}_ENDPOINT"))
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_owned());
    let model = lookup(&format!("{prefix}_MODEL"))
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_MODEL.to_owned());

    RemoteConfig {
        api_key,
        endpoint,
        model,
    }
}

/// Read an optional variable and parse it, falling back to `default`.
fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T, MindError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(name) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| MindError::Config(format!("invalid {name}: {e}"))),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = HearthConfig::from_lookup(lookup_from(&[]));
        assert!(config.is_ok());
        let config = config.unwrap_or_default();
        assert_eq!(config.decision.api_key, None);
        assert_eq!(config.dialogue.api_key, None);
        assert_eq!(config.decision.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.budget.max_calls, DEFAULT_HOURLY_CALL_BUDGET);
        assert_eq!(config.budget.window, BUDGET_WINDOW);
        assert_eq!(config.scheduler.seed, 42);
        assert_eq!(config.tick_interval, Duration::from_millis(250));
    }

    #[test]
    fn variants_are_configured_independently() {
        let config = HearthConfig::from_lookup(lookup_from(&[
            ("DECISION_LLM_API_KEY", "sk-decide"),
            ("DECISION_LLM_MODEL", "small-model"),
            ("DIALOGUE_LLM_ENDPOINT", "http://localhost:9000/v1/chat/completions"),
            ("LLM_HOURLY_CALL_BUDGET", "12"),
        ]))
        .unwrap_or_default();

        assert_eq!(config.decision.api_key.as_deref(), Some("sk-decide"));
        assert_eq!(config.decision.model, "small-model");
        assert_eq!(config.decision.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.dialogue.api_key, None);
        assert_eq!(
            config.dialogue.endpoint,
            "http://localhost:9000/v1/chat/completions"
        );
        assert_eq!(config.dialogue.model, DEFAULT_MODEL);
        assert_eq!(config.budget.max_calls, 12);
    }

    #[test]
    fn blank_api_key_disables_variant() {
        let config =
            HearthConfig::from_lookup(lookup_from(&[("DIALOGUE_LLM_API_KEY", "   ")]))
                .unwrap_or_default();
        assert_eq!(config.dialogue.api_key, None);
    }

    #[test]
    fn invalid_budget_is_rejected() {
        let result = HearthConfig::from_lookup(lookup_from(&[("LLM_HOURLY_CALL_BUDGET", "lots")]));
        assert!(matches!(result, Err(MindError::Config(_))));
    }

    #[test]
    fn zero_tick_interval_is_rejected() {
        let result = HearthConfig::from_lookup(lookup_from(&[("TICK_INTERVAL_MS", "0")]));
        assert!(result.is_err());
    }
}
