//! Demo driver for the Hearth NPC runtime.
//!
//! Builds a small seeded village, registers its residents with the
//! orchestrator, and ticks it on a fixed wall-clock interval until Ctrl-C.
//! Every decision is written to the log through [`TracingNotifier`]; every
//! so often the player strikes up a conversation with whoever is nearest.
//!
//! Remote reasoning is optional. Without `DECISION_LLM_API_KEY` and
//! `DIALOGUE_LLM_API_KEY` the whole village runs on the local engine.

mod demo;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use hearth_runner::{HearthConfig, Orchestrator, TracingNotifier};
use hearth_types::{
    AgentProfile, AgentRole, AgentVitals, IdGenerator, Mood, Persona, Rapport, TimeOrderedIds,
};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::demo::{DemoWorld, demo_profiles};

/// Residents spawned when `DEMO_AGENT_COUNT` is unset.
const DEFAULT_AGENT_COUNT: usize = 5;

/// Real time between player conversations.
const CHAT_PERIOD: Duration = Duration::from_secs(90);

/// Lines the player cycles through.
const PLAYER_LINES: [&str; 3] = [
    "Good morning! Any news from the road?",
    "Do you know where I can find something to eat?",
    "Is it safe to travel after dark?",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    info!("hearth-runner starting");

    let config = HearthConfig::from_env().context("failed to load configuration")?;
    let agent_count = demo_agent_count()?;
    info!(
        decision_remote = config.decision.api_key.is_some(),
        dialogue_remote = config.dialogue.api_key.is_some(),
        max_calls = config.budget.max_calls,
        templates_dir = config.templates_dir.as_deref().unwrap_or("<builtin>"),
        seed = config.scheduler.seed,
        tick_interval_ms = config.tick_interval.as_millis(),
        agent_count = agent_count,
        "configuration loaded"
    );

    let mut orchestrator = Orchestrator::new(&config, Arc::new(TracingNotifier))
        .context("failed to build orchestrator")?;
    let mut world = DemoWorld::new(config.scheduler.seed, 7.5);
    let mut ids = TimeOrderedIds;

    orchestrator.register(
        AgentProfile {
            id: ids.next_agent_id(),
            role: AgentRole::Player,
            persona: Persona {
                name: "Player".to_owned(),
                profession: "adventurer".to_owned(),
                personality: String::new(),
                backstory: String::new(),
            },
        },
        AgentVitals::default(),
    );
    for profile in demo_profiles(agent_count, || ids.next_agent_id()) {
        let position = world.spawn(profile.id);
        info!(
            agent_id = %profile.id,
            name = profile.persona.name,
            role = ?profile.role,
            x = position.x,
            y = position.y,
            "resident spawned"
        );
        orchestrator.register(profile, AgentVitals::default());
    }

    let mut interval = tokio::time::interval(config.tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_tick = Instant::now();
    let mut since_chat = Duration::ZERO;
    let mut lines = PLAYER_LINES.iter().cycle();

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown requested");
                break;
            }
        }

        let now = Instant::now();
        let elapsed = now.saturating_duration_since(last_tick);
        last_tick = now;

        world.advance(elapsed);
        orchestrator.tick(elapsed, &world);

        since_chat = since_chat.saturating_add(elapsed);
        if since_chat >= CHAT_PERIOD
            && let Some(agent_id) = world.nearest_agent()
            && let Some(&line) = lines.next()
        {
            since_chat = Duration::ZERO;
            let pending = orchestrator.open_dialogue(
                agent_id,
                line,
                Rapport {
                    affection: 55,
                    mood: Mood::Neutral,
                },
            );
            // The village keeps ticking while the reply is on its way.
            tokio::spawn(async move {
                let reply = pending.await;
                info!(
                    agent_id = %agent_id,
                    player = line,
                    speaker = reply.speaker,
                    emotion = reply.emotion.as_str(),
                    reply = reply.text,
                    "conversation"
                );
            });
        }
    }

    orchestrator.settle().await;
    let budget = orchestrator.budget().snapshot();
    info!(budget = %budget, "hearth-runner stopped");
    Ok(())
}

/// Install the global subscriber. `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// Read `DEMO_AGENT_COUNT`, defaulting when absent.
fn demo_agent_count() -> anyhow::Result<usize> {
    match std::env::var("DEMO_AGENT_COUNT") {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid DEMO_AGENT_COUNT: {raw}")),
        _ => Ok(DEFAULT_AGENT_COUNT),
    }
}
