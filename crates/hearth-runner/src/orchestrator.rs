//! Orchestrator: the per-tick decision pipeline.
//!
//! Each call to [`Orchestrator::tick`]:
//! 1. Advances the shared rate budget window
//! 2. Reaps remote attempts that finished since the last tick
//! 3. Drifts every agent's hunger and fatigue
//! 4. Advances the scheduler and collects the agents that are due
//! 5. Builds a [`DecisionContext`] for each due agent from its vitals and
//!    the world snapshot
//! 6. Gates on client availability and budget, then either resolves
//!    locally right away or spawns a remote attempt
//! 7. Reschedules each evaluated agent
//!
//! The tick never awaits a remote call. Remote attempts run on the tokio
//! runtime inside a [`JoinSet`] and publish their [`DecisionRecord`] when
//! they resolve, in whatever order that happens. A budget slot is reserved
//! before the attempt is spawned, so the number of calls in flight can
//! never exceed what the budget allows.
//!
//! Player dialogue follows the same rule: [`Orchestrator::open_dialogue`]
//! returns at once with a [`DialogueReply`] the caller may await elsewhere,
//! so a slow conversation never holds up the village.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use hearth_types::{
    AgentId, AgentProfile, AgentVitals, BehaviorDecision, DecisionContext, DecisionRecord,
    DecisionSource, DialogueContext, Persona, Rapport,
};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::budget::RateBudget;
use crate::client::{DecisionClient, DialogueClient, Resolution};
use crate::config::{DriftConfig, HearthConfig};
use crate::dialogue::{DialogueReply, DialogueSessions};
use crate::error::MindError;
use crate::fallback::{self, fallback_reply};
use crate::prompt::PromptEngine;
use crate::scheduler::DecisionScheduler;
use crate::world::{EventNotifier, WorldView};

/// How often the budget snapshot is written to the log.
const STATUS_INTERVAL: Duration = Duration::from_secs(60);

/// A registered agent.
struct AgentState {
    profile: AgentProfile,
    vitals: AgentVitals,
}

/// Drives decision cycles and dialogue for every registered agent.
pub struct Orchestrator {
    agents: BTreeMap<AgentId, AgentState>,
    scheduler: DecisionScheduler,
    decisions: Arc<DecisionClient>,
    dialogue: DialogueSessions,
    budget: Arc<RateBudget>,
    notifier: Arc<dyn EventNotifier>,
    drift: DriftConfig,
    in_flight: JoinSet<()>,
    since_status: Duration,
}

impl Orchestrator {
    /// Build an orchestrator and its clients from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MindError::Template`] if a configured template directory
    /// cannot be loaded.
    pub fn new(config: &HearthConfig, notifier: Arc<dyn EventNotifier>) -> Result<Self, MindError> {
        let prompts = Arc::new(PromptEngine::new(config.templates_dir.as_deref())?);
        let decisions = Arc::new(DecisionClient::new(&config.decision, Arc::clone(&prompts)));
        let dialogue_client = Arc::new(DialogueClient::new(&config.dialogue, prompts));
        let budget = Arc::new(RateBudget::new(config.budget));

        info!(
            decision_remote = decisions.is_available(),
            dialogue_remote = dialogue_client.is_available(),
            max_calls = config.budget.max_calls,
            "orchestrator configured"
        );

        Ok(Self {
            agents: BTreeMap::new(),
            scheduler: DecisionScheduler::new(config.scheduler),
            dialogue: DialogueSessions::new(dialogue_client, Arc::clone(&budget)),
            decisions,
            budget,
            notifier,
            drift: config.drift,
            in_flight: JoinSet::new(),
            since_status: Duration::ZERO,
        })
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    /// Add an agent. Autonomous roles are scheduled for evaluation; the
    /// player is tracked for dialogue lookups only.
    ///
    /// Registering an existing id replaces its profile and vitals; a
    /// role change to the player takes it off the schedule.
    pub fn register(&mut self, profile: AgentProfile, vitals: AgentVitals) {
        let agent_id = profile.id;
        let scheduled = profile.role.is_autonomous();
        if scheduled {
            self.scheduler.register(agent_id);
        } else {
            self.scheduler.remove(agent_id);
        }
        debug!(
            agent_id = %agent_id,
            name = profile.persona.name,
            scheduled = scheduled,
            "agent registered"
        );
        self.agents.insert(agent_id, AgentState { profile, vitals });
    }

    /// Forget an agent. Returns whether it was registered.
    ///
    /// A remote attempt already in flight for the agent still publishes.
    pub fn remove(&mut self, agent_id: AgentId) -> bool {
        self.scheduler.remove(agent_id);
        let removed = self.agents.remove(&agent_id).is_some();
        if removed {
            debug!(agent_id = %agent_id, "agent removed");
        }
        removed
    }

    // -----------------------------------------------------------------------
    // Decision cycle
    // -----------------------------------------------------------------------

    /// Advance the world by `elapsed` and evaluate every agent that is due.
    ///
    /// Must be called from within a tokio runtime. Returns how many agents
    /// were evaluated this tick.
    pub fn tick(&mut self, elapsed: Duration, world: &impl WorldView) -> usize {
        self.budget.tick(elapsed);
        self.reap_finished();
        self.apply_drift(elapsed);

        let due = self.scheduler.advance(elapsed);
        if !due.is_empty() {
            let snapshot = world.snapshot();
            let reference = world.reference_position();

            for &agent_id in &due {
                let Some(state) = self.agents.get(&agent_id) else {
                    continue;
                };
                let distance_to_player = world
                    .agent_position(agent_id)
                    .map_or(DecisionContext::UNKNOWN_DISTANCE, |p| p.distance_to(reference));
                let context = DecisionContext {
                    agent_id,
                    vitals: state.vitals,
                    world_time: snapshot.time_of_day,
                    weather: snapshot.weather,
                    distance_to_player,
                };
                self.dispatch(context);
                self.scheduler.reschedule(agent_id);
            }
        }

        self.log_status(elapsed);
        due.len()
    }

    /// Gate one evaluation and resolve it locally or spawn a remote attempt.
    fn dispatch(&mut self, context: DecisionContext) {
        if !self.decisions.is_available() {
            let decision = fallback::evaluate(&context);
            publish(
                self.notifier.as_ref(),
                context.agent_id,
                Resolution::local(decision, DecisionSource::Disabled),
            );
            return;
        }

        if !self.budget.try_consume() {
            debug!(agent_id = %context.agent_id, "rate budget exhausted, using local engine");
            let decision = fallback::evaluate(&context);
            publish(
                self.notifier.as_ref(),
                context.agent_id,
                Resolution::local(decision, DecisionSource::BudgetExhausted),
            );
            return;
        }

        let client = Arc::clone(&self.decisions);
        let notifier = Arc::clone(&self.notifier);
        self.in_flight.spawn(async move {
            let resolution = client
                .request(&context, || fallback::evaluate(&context))
                .await;
            publish(notifier.as_ref(), context.agent_id, resolution);
        });
    }

    /// Collect remote attempts that have already completed.
    fn reap_finished(&mut self) {
        while let Some(result) = self.in_flight.try_join_next() {
            if let Err(e) = result {
                warn!(error = %e, "remote decision task did not complete");
            }
        }
        self.dialogue.reap_finished();
    }

    fn apply_drift(&mut self, elapsed: Duration) {
        let secs = elapsed.as_secs_f32();
        let hunger = self.drift.hunger_per_sec * secs;
        let fatigue = self.drift.fatigue_per_sec * secs;
        for state in self.agents.values_mut() {
            state.vitals.drift(hunger, fatigue);
        }
    }

    fn log_status(&mut self, elapsed: Duration) {
        self.since_status = self.since_status.saturating_add(elapsed);
        if self.since_status < STATUS_INTERVAL {
            return;
        }
        self.since_status = Duration::ZERO;
        info!(
            agents = self.agents.len(),
            in_flight = self.in_flight(),
            "{}",
            self.budget.snapshot()
        );
    }

    /// Wait for every remote attempt in flight to publish and every
    /// pending dialogue reply to land.
    pub async fn settle(&mut self) {
        while let Some(result) = self.in_flight.join_next().await {
            if let Err(e) = result {
                warn!(error = %e, "remote decision task did not complete");
            }
        }
        self.dialogue.settle().await;
    }

    /// Number of remote attempts, decisions and dialogue, not yet reaped.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len().saturating_add(self.dialogue.pending())
    }

    // -----------------------------------------------------------------------
    // Dialogue
    // -----------------------------------------------------------------------

    /// Ask an agent for its reply to the player.
    ///
    /// Returns without waiting on the remote service; await the
    /// [`DialogueReply`] for the text. The reply is recorded in the active
    /// dialogue session, replacing it when the player switches partners.
    /// An unregistered agent answers with a stranger's template line and
    /// no session is touched.
    ///
    /// Must be called from within a tokio runtime.
    pub fn open_dialogue(
        &mut self,
        agent_id: AgentId,
        message: &str,
        rapport: Rapport,
    ) -> DialogueReply {
        let Some(state) = self.agents.get(&agent_id) else {
            warn!(agent_id = %agent_id, "dialogue with unknown agent, using stranger reply");
            let context = DialogueContext::new(&stranger(), rapport, message);
            return DialogueReply::ready(fallback_reply(&context));
        };

        let context = DialogueContext::new(&state.profile.persona, rapport, message);
        self.dialogue.open(agent_id, context)
    }

    /// The dialogue session manager.
    pub const fn dialogue(&self) -> &DialogueSessions {
        &self.dialogue
    }

    /// End the active conversation.
    pub fn close_dialogue(&mut self) {
        if let Some(session) = self.dialogue.close() {
            debug!(
                agent_id = %session.agent_id,
                replies = session.history.len(),
                "dialogue closed"
            );
        }
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    /// Current vitals of a registered agent.
    pub fn vitals(&self, agent_id: AgentId) -> Option<AgentVitals> {
        self.agents.get(&agent_id).map(|s| s.vitals)
    }

    /// Number of registered agents, player included.
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// The shared rate budget.
    pub fn budget(&self) -> &RateBudget {
        &self.budget
    }
}

/// Wrap a resolution in a record and hand it to the notifier.
fn publish(
    notifier: &dyn EventNotifier,
    agent_id: AgentId,
    resolution: Resolution<BehaviorDecision>,
) {
    debug!(
        agent_id = %agent_id,
        action = %resolution.value.action,
        decision_source = resolution.source.as_str(),
        "decision resolved"
    );
    notifier.publish(&DecisionRecord {
        agent_id,
        decision: resolution.value,
        source: resolution.source,
        decided_at: Utc::now(),
    });
}

/// Persona used when the player addresses someone the runtime never met.
fn stranger() -> Persona {
    Persona {
        name: "Stranger".to_owned(),
        profession: "traveler".to_owned(),
        personality: "reserved".to_owned(),
        backstory: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::ChannelNotifier;
    use hearth_types::{
        ActionKind, AgentRole, IdGenerator, Mood, Position, SequentialIds, Weather,
        WorldSnapshot,
    };

    struct StillWorld {
        hour: f32,
        positions: BTreeMap<AgentId, Position>,
    }

    impl WorldView for StillWorld {
        fn snapshot(&self) -> WorldSnapshot {
            WorldSnapshot {
                time_of_day: self.hour,
                weather: Weather::default(),
            }
        }

        fn reference_position(&self) -> Position {
            Position::new(0.0, 0.0)
        }

        fn agent_position(&self, agent_id: AgentId) -> Option<Position> {
            self.positions.get(&agent_id).copied()
        }
    }

    fn profile(id: AgentId, role: AgentRole, name: &str) -> AgentProfile {
        AgentProfile {
            id,
            role,
            persona: Persona {
                name: name.to_owned(),
                profession: "farmer".to_owned(),
                personality: "steady".to_owned(),
                backstory: String::new(),
            },
        }
    }

    fn orchestrator() -> (
        Orchestrator,
        tokio::sync::mpsc::UnboundedReceiver<DecisionRecord>,
    ) {
        let (notifier, rx) = ChannelNotifier::new();
        let Ok(orch) = Orchestrator::new(&HearthConfig::default(), Arc::new(notifier)) else {
            panic!("default config should build");
        };
        (orch, rx)
    }

    #[tokio::test]
    async fn disabled_remote_publishes_local_decisions() {
        let mut ids = SequentialIds::new();
        let a = ids.next_agent_id();
        let (mut orch, mut rx) = orchestrator();
        orch.register(profile(a, AgentRole::Villager, "Ada"), AgentVitals::new(30.0, 0.0, 0.0));

        let world = StillWorld {
            hour: 12.0,
            positions: BTreeMap::new(),
        };
        assert_eq!(orch.tick(Duration::from_secs(3), &world), 1);
        assert_eq!(orch.in_flight(), 0);

        let record = rx.try_recv().ok();
        assert_eq!(record.as_ref().map(|r| r.decision.action), Some(ActionKind::Flee));
        assert_eq!(record.map(|r| r.source), Some(DecisionSource::Disabled));
        assert_eq!(orch.budget().remaining(), orch.budget().max_calls());
    }

    #[tokio::test]
    async fn player_is_never_evaluated() {
        let mut ids = SequentialIds::new();
        let (mut orch, mut rx) = orchestrator();
        orch.register(
            profile(ids.next_agent_id(), AgentRole::Player, "You"),
            AgentVitals::default(),
        );

        let world = StillWorld {
            hour: 12.0,
            positions: BTreeMap::new(),
        };
        for _ in 0..10 {
            assert_eq!(orch.tick(Duration::from_secs(5), &world), 0);
        }
        assert!(rx.try_recv().is_err());
        assert_eq!(orch.agent_count(), 1);
    }

    #[tokio::test]
    async fn reregistering_as_player_unschedules() {
        let mut ids = SequentialIds::new();
        let a = ids.next_agent_id();
        let (mut orch, mut rx) = orchestrator();
        orch.register(profile(a, AgentRole::Villager, "Ada"), AgentVitals::default());
        orch.register(profile(a, AgentRole::Player, "Ada"), AgentVitals::default());

        let world = StillWorld {
            hour: 12.0,
            positions: BTreeMap::new(),
        };
        for _ in 0..5 {
            assert_eq!(orch.tick(Duration::from_secs(5), &world), 0);
        }
        assert!(rx.try_recv().is_err());
        assert_eq!(orch.agent_count(), 1);

        orch.register(profile(a, AgentRole::Guard, "Ada"), AgentVitals::default());
        assert_eq!(orch.tick(Duration::from_secs(2), &world), 1);
    }

    #[tokio::test]
    async fn agent_is_reevaluated_after_cooldown() {
        let mut ids = SequentialIds::new();
        let a = ids.next_agent_id();
        let (mut orch, mut rx) = orchestrator();
        orch.register(profile(a, AgentRole::Guard, "Gus"), AgentVitals::default());

        let world = StillWorld {
            hour: 12.0,
            positions: BTreeMap::from([(a, Position::new(30.0, 40.0))]),
        };
        assert_eq!(orch.tick(Duration::from_secs(2), &world), 1);
        assert_eq!(orch.tick(Duration::from_secs(7), &world), 0);
        assert_eq!(orch.tick(Duration::from_secs(5), &world), 1);

        let first = rx.try_recv().ok();
        assert_eq!(first.map(|r| r.decision.action), Some(ActionKind::Interact));
        assert!(rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn drift_raises_needs() {
        let mut ids = SequentialIds::new();
        let a = ids.next_agent_id();
        let (mut orch, _rx) = orchestrator();
        orch.register(profile(a, AgentRole::Merchant, "Mo"), AgentVitals::default());

        let world = StillWorld {
            hour: 12.0,
            positions: BTreeMap::new(),
        };
        orch.tick(Duration::from_secs(100), &world);

        let vitals = orch.vitals(a).unwrap_or_default();
        assert!((vitals.hunger - 5.0).abs() < 0.01);
        assert!((vitals.fatigue - 3.0).abs() < 0.01);
    }

    #[tokio::test]
    async fn removed_agent_stops_publishing() {
        let mut ids = SequentialIds::new();
        let a = ids.next_agent_id();
        let (mut orch, mut rx) = orchestrator();
        orch.register(profile(a, AgentRole::Villager, "Ada"), AgentVitals::default());
        assert!(orch.remove(a));
        assert!(!orch.remove(a));

        let world = StillWorld {
            hour: 12.0,
            positions: BTreeMap::new(),
        };
        assert_eq!(orch.tick(Duration::from_secs(30), &world), 0);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn unknown_dialogue_partner_gets_stranger_reply() {
        let mut ids = SequentialIds::new();
        let (mut orch, _rx) = orchestrator();
        let reply = orch
            .open_dialogue(ids.next_agent_id(), "Who are you?", Rapport::default())
            .await;
        assert_eq!(reply.speaker, "Stranger");
        assert!(!reply.text.is_empty());
        assert_eq!(orch.dialogue().active_agent(), None);
    }

    #[tokio::test]
    async fn dialogue_uses_registered_persona() {
        let mut ids = SequentialIds::new();
        let a = ids.next_agent_id();
        let (mut orch, _rx) = orchestrator();
        orch.register(profile(a, AgentRole::Villager, "Ada"), AgentVitals::default());

        let reply = orch
            .open_dialogue(
                a,
                "Nice day",
                Rapport {
                    affection: 90,
                    mood: Mood::Happy,
                },
            )
            .await;
        assert_eq!(reply.speaker, "Ada");
        assert_eq!(reply.emotion, Mood::Happy);
        assert!(reply.text.contains("farmer"));
        assert_eq!(orch.dialogue().history().len(), 1);

        orch.close_dialogue();
        assert!(orch.dialogue().history().is_empty());
    }
}
