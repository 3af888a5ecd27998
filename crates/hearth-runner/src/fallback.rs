//! Deterministic local decision engine and dialogue templates.
//!
//! Used whenever the remote reasoning service is disabled, out of budget,
//! or fails. Rules are evaluated in strict order and the first match wins;
//! priorities and durations are fixed per rule, never computed.
//!
//! Nothing in this module can fail.

use hearth_types::{
    ActionKind, BehaviorDecision, DecisionContext, DialogueContext, DialogueResponse, Mood,
};
use tracing::debug;

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Health below which the agent flees.
const FLEE_HEALTH: f32 = 40.0;

/// Hunger above which the agent goes looking for food.
const EAT_HUNGER: f32 = 70.0;

/// Fatigue above which the agent sleeps, at night only.
const SLEEP_FATIGUE: f32 = 60.0;

/// Night starts after this hour...
const NIGHT_START_HOUR: f32 = 22.0;

/// ...and ends before this one.
const NIGHT_END_HOUR: f32 = 6.0;

/// Distance to the player under which the agent walks over to interact.
const INTERACT_DISTANCE: f32 = 120.0;

/// Visibility required to notice the player.
const INTERACT_VISIBILITY: f32 = 0.5;

/// Affection at or above which replies are warm.
const WARM_AFFECTION: u8 = 70;

/// Affection below which replies are curt.
const COLD_AFFECTION: u8 = 30;

// ---------------------------------------------------------------------------
// Behavior
// ---------------------------------------------------------------------------

/// Compute a behavior decision from a context without any remote help.
///
/// # Rules (in priority order)
///
/// 1. **Injured**: health < 40 -- flee to the safe zone
/// 2. **Hungry**: hunger > 70 -- go eat
/// 3. **Tired at night**: fatigue > 60 and hour > 22 or < 6 -- sleep at home
/// 4. **Player nearby**: distance < 120 and visibility > 0.5 -- interact
/// 5. Otherwise -- patrol
pub fn evaluate(context: &DecisionContext) -> BehaviorDecision {
    let (rule, decision) = select_rule(context);
    debug!(
        agent_id = %context.agent_id,
        rule = rule,
        action = %decision.action,
        "fallback engine matched rule"
    );
    decision
}

/// Match the first applicable rule, returning its name and decision.
fn select_rule(context: &DecisionContext) -> (&'static str, BehaviorDecision) {
    let vitals = &context.vitals;

    if vitals.health < FLEE_HEALTH {
        return (
            "injured",
            BehaviorDecision::new(
                ActionKind::Flee,
                "safe_zone",
                10,
                8,
                "Badly hurt, getting somewhere safe.",
            ),
        );
    }

    if vitals.hunger > EAT_HUNGER {
        return (
            "hungry",
            BehaviorDecision::new(
                ActionKind::Eat,
                "nearest_food",
                8,
                6,
                "Starving, need to find something to eat.",
            ),
        );
    }

    if vitals.fatigue > SLEEP_FATIGUE && is_night(context.world_time) {
        return (
            "tired_at_night",
            BehaviorDecision::new(
                ActionKind::Sleep,
                "home",
                7,
                12,
                "Exhausted and it is late, heading home to sleep.",
            ),
        );
    }

    if context.distance_to_player < INTERACT_DISTANCE
        && context.weather.visibility > INTERACT_VISIBILITY
    {
        return (
            "player_nearby",
            BehaviorDecision::new(
                ActionKind::Interact,
                "player",
                6,
                4,
                "Someone is close by, going to say hello.",
            ),
        );
    }

    (
        "patrol",
        BehaviorDecision::new(
            ActionKind::Move,
            "patrol_route",
            4,
            5,
            "Nothing pressing, walking the usual route.",
        ),
    )
}

/// Night is strictly after 22:00 or strictly before 06:00.
fn is_night(hour: f32) -> bool {
    hour > NIGHT_START_HOUR || hour < NIGHT_END_HOUR
}

// ---------------------------------------------------------------------------
// Dialogue
// ---------------------------------------------------------------------------

/// Produce an in-character reply from fixed templates.
///
/// The template is picked by affection band and mood. The reply always
/// names the speaker's profession so different agents sound different even
/// without the remote service.
pub fn fallback_reply(context: &DialogueContext) -> DialogueResponse {
    let profession = if context.profession.trim().is_empty() {
        "villager"
    } else {
        context.profession.trim()
    };

    let opener = match context.mood {
        Mood::Happy => "Ha, good to see you!",
        Mood::Neutral => "Hm?",
        Mood::Sad => "Oh... hello.",
        Mood::Angry => "What now?",
        Mood::Afraid => "Keep your voice down!",
        Mood::Tired => "*yawns*",
    };

    let body = if context.affection >= WARM_AFFECTION {
        format!("Always a pleasure, friend. This {profession} has time for you.")
    } else if context.affection < COLD_AFFECTION {
        format!("I'm a {profession}, not a storyteller. Make it quick.")
    } else {
        format!("I'm busy with {profession} work, but go on.")
    };

    let speaker = if context.agent_name.trim().is_empty() {
        "Stranger".to_owned()
    } else {
        context.agent_name.clone()
    };

    DialogueResponse {
        speaker,
        text: format!("{opener} {body}"),
        emotion: context.mood,
    }
}
