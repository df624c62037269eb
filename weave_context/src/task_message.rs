//! Task-message construction (§4.3): the final instruction message,
//! templated per `input_mode`.

/// How the user's turn input should be interpreted (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// User is speaking/acting as their character.
    Character,
    /// User describes events impersonally; treat input as scene narration.
    Narration,
    /// User issues meta-instructions ("director" mode); guidance, not dialogue.
    Direction,
}

/// Builds the task message for one turn (§4.3 "Task-message construction").
/// `active_roster` lists who is active this turn; `user_input` is the user's
/// literal text, wrapped in delimiters for `character`/`narration` modes.
pub fn build_task_message(mode: InputMode, active_roster: &[String], user_input: &str) -> String {
    let roster_line = if active_roster.is_empty() {
        "No characters are active this turn.".to_string()
    } else {
        format!("Active this turn: {}.", active_roster.join(", "))
    };

    match mode {
        InputMode::Character => format!(
            "{roster_line}\nThe user is speaking/acting as their character. Respond as the active \
             AI characters, reacting to the following in-character input:\n<<<\n{user_input}\n>>>\n\
             Keep responses in scene, matching each character's established voice and length norms."
        ),
        InputMode::Narration => format!(
            "{roster_line}\nThe following is impersonal scene narration describing events, not \
             dialogue from any character:\n<<<\n{user_input}\n>>>\n\
             Continue the scene from the active characters' perspectives, reacting naturally to \
             what just happened."
        ),
        InputMode::Direction => format!(
            "{roster_line}\nThe user has issued an out-of-character directorial instruction. Use it \
             as guidance for the scene rather than dialogue or narration to react to:\n<<<\n{user_input}\n>>>\n\
             Follow the direction while keeping every active character's voice and motivations intact."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn character_mode_wraps_input_verbatim() {
        let msg = build_task_message(InputMode::Character, &["Mira".to_string()], "I draw my sword.");
        assert!(msg.contains("I draw my sword."));
        assert!(msg.contains("Mira"));
    }

    #[test]
    fn narration_mode_mentions_impersonal_narration() {
        let msg = build_task_message(InputMode::Narration, &[], "A storm rolls in over the harbor.");
        assert!(msg.contains("impersonal scene narration"));
        assert!(msg.contains("No characters are active"));
    }

    #[test]
    fn direction_mode_mentions_guidance_not_dialogue() {
        let msg = build_task_message(InputMode::Direction, &["Gareth".to_string()], "Make this scene tenser.");
        assert!(msg.contains("directorial instruction"));
        assert!(msg.contains("guidance"));
    }
}
