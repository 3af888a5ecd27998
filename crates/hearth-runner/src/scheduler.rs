//! Per-agent decision cadence.
//!
//! Every scheduled agent carries a countdown in seconds. The orchestrator
//! advances all countdowns each tick and evaluates the agents whose
//! countdown reached zero, then gives each of them a fresh one. Countdowns
//! are drawn from a seeded [`StdRng`] so agents do not all re-think on the
//! same tick, and so a run can be replayed exactly.

use std::collections::BTreeMap;
use std::time::Duration;

use hearth_types::AgentId;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::SchedulerConfig;

/// Cooldown bookkeeping for every autonomous agent.
pub struct DecisionScheduler {
    /// Seconds left before each agent is due. Ordered by id so due lists
    /// come out in a stable order.
    cooldowns: BTreeMap<AgentId, f32>,
    rng: StdRng,
    initial_secs: (f32, f32),
    cooldown_secs: (f32, f32),
}

impl DecisionScheduler {
    /// Create an empty scheduler seeded from config.
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            cooldowns: BTreeMap::new(),
            rng: StdRng::seed_from_u64(config.seed),
            initial_secs: config.initial_cooldown_secs,
            cooldown_secs: config.cooldown_secs,
        }
    }

    /// Start tracking an agent with a short initial cooldown.
    ///
    /// Re-registering an agent restarts its countdown. Returns the cooldown
    /// assigned.
    pub fn register(&mut self, agent_id: AgentId) -> f32 {
        let secs = self.draw(self.initial_secs);
        self.cooldowns.insert(agent_id, secs);
        secs
    }

    /// Stop tracking an agent. Returns whether it was tracked.
    pub fn remove(&mut self, agent_id: AgentId) -> bool {
        self.cooldowns.remove(&agent_id).is_some()
    }

    /// Subtract `elapsed` from every countdown and return the agents that
    /// are now due, in id order.
    ///
    /// Due agents stay due (and keep appearing here) until they are
    /// [`reschedule`](Self::reschedule)d.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<AgentId> {
        let step = elapsed.as_secs_f32();
        let mut due = Vec::new();
        for (id, remaining) in &mut self.cooldowns {
            *remaining -= step;
            if *remaining <= 0.0 {
                due.push(*id);
            }
        }
        due
    }

    /// Give an agent a fresh full-length cooldown after an evaluation.
    ///
    /// Returns the cooldown assigned, or `None` for an unknown agent.
    pub fn reschedule(&mut self, agent_id: AgentId) -> Option<f32> {
        let secs = self.draw(self.cooldown_secs);
        let slot = self.cooldowns.get_mut(&agent_id)?;
        *slot = secs;
        Some(secs)
    }

    /// Seconds left for an agent, if tracked.
    pub fn cooldown(&self, agent_id: AgentId) -> Option<f32> {
        self.cooldowns.get(&agent_id).copied()
    }

    /// Number of tracked agents.
    pub fn len(&self) -> usize {
        self.cooldowns.len()
    }

    /// Whether no agents are tracked.
    pub fn is_empty(&self) -> bool {
        self.cooldowns.is_empty()
    }

    /// Uniform draw from `[lo, hi)`; a degenerate range yields `lo`.
    fn draw(&mut self, (lo, hi): (f32, f32)) -> f32 {
        if hi > lo {
            self.rng.random_range(lo..hi)
        } else {
            lo
        }
    }
}
