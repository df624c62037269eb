//! Text verification: mapping an LLM-extracted NPC candidate to the scenes
//! that actually mention it (§4.2).
//!
//! A case-insensitive proper-noun scan for the candidate's full name
//! (falling back to its last "word" as a surname heuristic), dialogue
//! detection via a quoted span within 15 words of a name occurrence or a
//! dialogue-tag regex, and action detection via a small action-verb lexicon
//! occurring after the name within the same sentence.

use once_cell::sync::Lazy;
use regex::Regex;
use weave_core::{SceneId, SceneSequence};

/// One verified (candidate, scene) pairing, ready to become an `NPCMention`.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedMention {
    pub scene_id: SceneId,
    pub sequence: SceneSequence,
    pub name_form_used: String,
    pub mention_count: u32,
    pub has_dialogue: bool,
    pub has_actions: bool,
    /// Up to 3 short excerpts around a name occurrence.
    pub context_snippets: Vec<String>,
}

static DIALOGUE_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(said|replied|asked|whispered|shouted|muttered|answered)\b").unwrap()
});

static QUOTED_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r#"["“][^"”]{1,400}["”]"#).unwrap());

const ACTION_VERBS: &[&str] = &[
    "walked", "ran", "grabbed", "drew", "struck", "turned", "reached", "stepped", "nodded",
    "pulled", "pushed", "threw", "raised", "lowered", "gestured", "pointed", "moved", "leaned",
    "crouched", "knelt", "stood", "sat", "stared", "glanced", "smiled", "frowned",
];

fn name_form_regex(name_form: &str) -> Option<Regex> {
    let escaped = regex::escape(name_form);
    Regex::new(&format!(r"(?i)\b{escaped}\b")).ok()
}

/// Walks `idx` down to the nearest char boundary at or before it, so a
/// byte-offset window (e.g. `match.start() - N`) never lands mid-codepoint.
fn floor_char_boundary(text: &str, mut idx: usize) -> usize {
    if idx >= text.len() {
        return text.len();
    }
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

/// Walks `idx` up to the nearest char boundary at or after it, clamped to
/// `text.len()`.
fn ceil_char_boundary(text: &str, mut idx: usize) -> usize {
    if idx >= text.len() {
        return text.len();
    }
    while idx < text.len() && !text.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}

/// Attempts to verify a candidate name's presence in one scene's text. `None`
/// if the name (full or surname) never occurs.
pub fn verify_candidate_in_scene(
    candidate_name: &str,
    scene_text: &str,
    scene_id: SceneId,
    sequence: SceneSequence,
) -> Option<VerifiedMention> {
    let full_re = name_form_regex(candidate_name)?;
    let (name_form_used, re) = if full_re.is_match(scene_text) {
        (candidate_name.to_string(), full_re)
    } else {
        let surname = candidate_name.split_whitespace().last()?;
        if surname.eq_ignore_ascii_case(candidate_name) {
            return None;
        }
        let surname_re = name_form_regex(surname)?;
        if surname_re.is_match(scene_text) {
            (surname.to_string(), surname_re)
        } else {
            return None;
        }
    };

    let occurrences: Vec<_> = re.find_iter(scene_text).collect();
    if occurrences.is_empty() {
        return None;
    }
    let mention_count = occurrences.len() as u32;

    let has_dialogue = occurrences.iter().any(|m| {
        let window_start = floor_char_boundary(scene_text, m.start().saturating_sub(120));
        let window_end = ceil_char_boundary(scene_text, (m.end() + 120).min(scene_text.len()));
        let window = &scene_text[window_start..window_end];
        QUOTED_SPAN.is_match(window) || DIALOGUE_TAG.is_match(window)
    });

    let has_actions = occurrences.iter().any(|m| {
        let sentence_end = scene_text[m.end()..]
            .find(['.', '!', '?'])
            .map(|idx| m.end() + idx)
            .unwrap_or(scene_text.len());
        let after = &scene_text[m.end()..sentence_end];
        let after_lower = after.to_lowercase();
        ACTION_VERBS.iter().any(|verb| after_lower.contains(verb))
    });

    let context_snippets = occurrences
        .iter()
        .take(3)
        .map(|m| {
            let start = floor_char_boundary(scene_text, m.start().saturating_sub(40));
            let end = ceil_char_boundary(scene_text, (m.end() + 40).min(scene_text.len()));
            scene_text[start..end].trim().to_string()
        })
        .collect();

    Some(VerifiedMention {
        scene_id,
        sequence,
        name_form_used,
        mention_count,
        has_dialogue,
        has_actions,
        context_snippets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_full_name_occurrence() {
        let text = "Mira walked into the tavern. \"Welcome,\" Mira said, smiling.";
        let result =
            verify_candidate_in_scene("Mira", text, SceneId::new(1), SceneSequence::new(1)).unwrap();
        assert_eq!(result.mention_count, 2);
        assert!(result.has_dialogue);
        assert!(result.has_actions);
    }

    #[test]
    fn falls_back_to_surname_when_full_name_absent() {
        let text = "Sheriff Reynolds raised his hand and walked toward the door.";
        let result = verify_candidate_in_scene(
            "Sheriff Reynolds",
            text,
            SceneId::new(1),
            SceneSequence::new(1),
        )
        .unwrap();
        assert_eq!(result.name_form_used, "Sheriff Reynolds");
        assert!(result.has_actions);
    }

    #[test]
    fn returns_none_when_name_never_appears() {
        let text = "The tavern was quiet that night.";
        assert!(verify_candidate_in_scene("Mira", text, SceneId::new(1), SceneSequence::new(1)).is_none());
    }

    #[test]
    fn detects_dialogue_tag_without_quotes() {
        let text = "Gareth muttered something under his breath and left.";
        let result =
            verify_candidate_in_scene("Gareth", text, SceneId::new(1), SceneSequence::new(1)).unwrap();
        assert!(result.has_dialogue);
    }

    #[test]
    fn does_not_panic_on_multibyte_text_near_a_name_occurrence() {
        // Curly quotes and accented names are multi-byte in UTF-8; padding the
        // surrounding text with them pushes the ±40/±120 window edges to land
        // mid-codepoint unless they're clamped to a char boundary first.
        let padding: String = std::iter::repeat("café ").take(30).collect();
        let text = format!("{padding}“Zoë, wait—” Mira whispered, and Zoë turned around.");
        let result =
            verify_candidate_in_scene("Zoë", &text, SceneId::new(1), SceneSequence::new(1)).unwrap();
        assert_eq!(result.mention_count, 2);
        assert!(result.has_dialogue);
        assert!(!result.context_snippets.is_empty());
    }
}

/// One LLM-identified appearance of a non-roster character in one scene
/// (§3). Immutable after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct NpcMention {
    pub scene_id: SceneId,
    pub character_name: String,
    pub sequence: SceneSequence,
    pub mention_count: u32,
    pub has_dialogue: bool,
    pub has_actions: bool,
    pub has_relationships: bool,
    pub context_snippets: Vec<String>,
    pub extracted_role: Option<String>,
    pub extracted_description: Option<String>,
}

impl NpcMention {
    pub fn from_verified(character_name: String, verified: &VerifiedMention, has_relationships: bool) -> Self {
        NpcMention {
            scene_id: verified.scene_id,
            character_name,
            sequence: verified.sequence,
            mention_count: verified.mention_count,
            has_dialogue: verified.has_dialogue,
            has_actions: verified.has_actions,
            has_relationships,
            context_snippets: verified.context_snippets.clone(),
            extracted_role: None,
            extracted_description: None,
        }
    }
}
