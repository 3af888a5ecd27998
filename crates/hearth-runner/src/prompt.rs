//! Prompt template loading and rendering via `minijinja`.
//!
//! Four templates drive the two remote variants: a system instruction and a
//! user message for decisions, and the same pair for dialogue. Built-in
//! versions are compiled into the binary. When a templates directory is
//! configured, all four are read from disk instead.

use hearth_types::{ActionKind, DecisionContext, DialogueContext};
use minijinja::Environment;
use serde_json::json;

use crate::error::MindError;

/// Template name and on-disk file name for each prompt part.
const TEMPLATES: [(&str, &str); 4] = [
    ("decision_system", "decision_system.j2"),
    ("decision_user", "decision_user.j2"),
    ("dialogue_system", "dialogue_system.j2"),
    ("dialogue_user", "dialogue_user.j2"),
];

const DECISION_SYSTEM: &str = "\
You are the behavior planner for a non-player character in a small simulated village. \
You always answer with a single JSON object and nothing else. \
The object has exactly these fields: \
\"action\" (string), \"target\" (string), \"priority\" (integer, higher is more urgent), \
\"duration\" (integer seconds) and \"reasoning\" (one short sentence).";

const DECISION_USER: &str = "\
Agent: {{ agent_id }}
Health: {{ health }}/100
Hunger: {{ hunger }}/100
Fatigue: {{ fatigue }}/100
World time: {{ world_time }} (0-24)
Weather: {{ weather_type }}
Visibility: {{ visibility }} (0-1)
Distance to player: {{ distance_to_player }}

Decide what this agent does next. \
Return a JSON object with fields action, target, priority, duration, reasoning. \
action must be one of: {{ actions | join(\", \") }}.";

const DIALOGUE_SYSTEM: &str = "\
You voice a non-player character in a small simulated village. \
Stay in character at all times. Reply with the spoken line only: \
no stage directions, no quotation marks, at most two short sentences, casual and colloquial.";

const DIALOGUE_USER: &str = "\
You are {{ agent_name }}, the village {{ profession }}.
Personality: {{ personality }}
Backstory: {{ backstory }}
Current mood: {{ mood }}
Affection toward the player: {{ affection }}/100

The player says: \"{{ player_message }}\"

Reply in character.";

/// Manages prompt template loading and rendering.
///
/// Wraps a `minijinja` [`Environment`] with all four prompt templates
/// pre-loaded.
pub struct PromptEngine {
    env: Environment<'static>,
}

/// The complete rendered prompt ready to send to an LLM backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    /// Fixed system instruction for the task.
    pub system: String,
    /// User message rendered from the context.
    pub user: String,
}

impl PromptEngine {
    /// Create a prompt engine from the compiled-in templates.
    pub fn builtin() -> Result<Self, MindError> {
        let sources = [DECISION_SYSTEM, DECISION_USER, DIALOGUE_SYSTEM, DIALOGUE_USER];
        let mut env = Environment::new();
        for ((name, _), source) in TEMPLATES.into_iter().zip(sources) {
            env.add_template_owned(name, source)
                .map_err(|e| MindError::Template(format!("failed to add {name} template: {e}")))?;
        }
        Ok(Self { env })
    }

    /// Create a prompt engine, loading templates from `templates_dir` when
    /// given and using the built-ins otherwise.
    ///
    /// The directory must contain `decision_system.j2`, `decision_user.j2`,
    /// `dialogue_system.j2` and `dialogue_user.j2`.
    pub fn new(templates_dir: Option<&str>) -> Result<Self, MindError> {
        let Some(dir) = templates_dir else {
            return Self::builtin();
        };

        let mut env = Environment::new();
        for (name, file) in TEMPLATES {
            let source = load_template(dir, file)?;
            env.add_template_owned(name, source)
                .map_err(|e| MindError::Template(format!("failed to add {name} template: {e}")))?;
        }
        Ok(Self { env })
    }

    /// Render the behavior-decision prompt for one agent.
    pub fn render_decision(&self, context: &DecisionContext) -> Result<RenderedPrompt, MindError> {
        let actions: Vec<&str> = ActionKind::ALL.into_iter().map(ActionKind::as_str).collect();
        let distance = if context.player_distance_known() {
            format!("{:.0}", context.distance_to_player)
        } else {
            "unknown".to_owned()
        };
        let view = json!({
            "agent_id": context.agent_id.to_string(),
            "health": format!("{:.0}", context.vitals.health),
            "hunger": format!("{:.0}", context.vitals.hunger),
            "fatigue": format!("{:.0}", context.vitals.fatigue),
            "world_time": format!("{:.1}", context.world_time),
            "weather_type": context.weather.kind.as_str(),
            "visibility": format!("{:.2}", context.weather.visibility),
            "distance_to_player": distance,
            "actions": actions,
        });

        Ok(RenderedPrompt {
            system: self.render_one("decision_system", &view)?,
            user: self.render_one("decision_user", &view)?,
        })
    }

    /// Render the dialogue prompt for one player line.
    pub fn render_dialogue(&self, context: &DialogueContext) -> Result<RenderedPrompt, MindError> {
        let view = json!({
            "agent_name": context.agent_name,
            "profession": context.profession,
            "personality": context.personality,
            "backstory": context.backstory,
            "mood": context.mood.as_str(),
            "affection": context.affection,
            "player_message": context.player_message,
        });

        Ok(RenderedPrompt {
            system: self.render_one("dialogue_system", &view)?,
            user: self.render_one("dialogue_user", &view)?,
        })
    }

    /// Render a single named template.
    fn render_one(&self, name: &str, view: &serde_json::Value) -> Result<String, MindError> {
        self.env
            .get_template(name)
            .map_err(|e| MindError::Template(format!("missing {name} template: {e}")))?
            .render(view)
            .map_err(|e| MindError::Template(format!("{name} render failed: {e}")))
    }
}

/// Read a template file from disk.
fn load_template(dir: &str, filename: &str) -> Result<String, MindError> {
    let path = format!("{dir}/{filename}");
    std::fs::read_to_string(&path)
        .map_err(|e| MindError::Template(format!("failed to read {path}: {e}")))
}
