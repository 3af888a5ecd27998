//! Dialogue request and reply types.

use serde::{Deserialize, Serialize};

use crate::enums::Mood;
use crate::structs::{Persona, Rapport};

/// Persona plus the player's line, as handed to a reply generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueContext {
    /// Speaking agent's name.
    pub agent_name: String,
    /// Speaking agent's profession.
    pub profession: String,
    /// Speaking agent's temperament.
    pub personality: String,
    /// Speaking agent's history.
    pub backstory: String,
    /// What the player just said.
    pub player_message: String,
    /// Affection toward the player, 0-100.
    pub affection: u8,
    /// Current mood.
    pub mood: Mood,
}

impl DialogueContext {
    /// Assemble a context from a persona, the player's standing, and the message.
    pub fn new(persona: &Persona, rapport: Rapport, player_message: impl Into<String>) -> Self {
        Self {
            agent_name: persona.name.clone(),
            profession: persona.profession.clone(),
            personality: persona.personality.clone(),
            backstory: persona.backstory.clone(),
            player_message: player_message.into(),
            affection: rapport.affection.min(100),
            mood: rapport.mood,
        }
    }
}

/// One reply in a conversation. `text` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueResponse {
    /// Who is speaking.
    pub speaker: String,
    /// What they say.
    pub text: String,
    /// Emotion the line is delivered with.
    pub emotion: Mood,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_copies_persona_and_caps_affection() {
        let persona = Persona {
            name: "Mira".to_owned(),
            profession: "baker".to_owned(),
            personality: "warm".to_owned(),
            backstory: "Runs the bakery on the square.".to_owned(),
        };
        let ctx = DialogueContext::new(
            &persona,
            Rapport {
                affection: 250,
                mood: Mood::Happy,
            },
            "Hello!",
        );
        assert_eq!(ctx.agent_name, "Mira");
        assert_eq!(ctx.profession, "baker");
        assert_eq!(ctx.affection, 100);
        assert_eq!(ctx.player_message, "Hello!");
    }
}
