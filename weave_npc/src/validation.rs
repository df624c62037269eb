//! Validation filters applied before an extracted NPC candidate is accepted
//! into the tracker (§4.2).
//!
//! Grounded on `npc_tracking_service.py::_validate_npcs`: reject non-CHARACTER
//! entity types, reject names that partially overlap the explicit roster,
//! reject a generic-noun blocklist and lowercase plural nouns, require at
//! least one capitalized word.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// `entity_type` as reported by the extraction LLM (§4.2, §9: advisory,
/// always stored; only the tiering function filters to `Character`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityType {
    Character,
    Entity,
}

/// Generic nouns the extractor sometimes mistakes for named NPCs.
static BLOCKLIST: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "guards", "shadows", "plasma bolts", "elongated figures", "villagers", "soldiers",
        "bandits", "travelers", "merchants", "children", "strangers", "figures", "voices",
        "crowd", "onlookers", "attackers", "defenders",
    ]
    .into_iter()
    .collect()
});

/// Heuristic: a proper noun has at least one capitalized word.
pub fn looks_like_proper_noun(name: &str) -> bool {
    name.split_whitespace().any(|w| w.chars().next().is_some_and(|c| c.is_uppercase()))
}

fn is_lowercase_plural_noun(name: &str) -> bool {
    let trimmed = name.trim();
    !trimmed.is_empty()
        && trimmed.chars().next().is_some_and(|c| c.is_lowercase())
        && trimmed.ends_with('s')
        && !trimmed.contains(' ')
}

fn word_set(name: &str) -> HashSet<String> {
    name.split_whitespace().map(|w| w.to_lowercase()).collect()
}

/// True if `candidate_name`'s word set overlaps any existing roster member's
/// name (partial-word matching) — it belongs to the explicit roster, not the
/// NPC tracker.
pub fn overlaps_roster(candidate_name: &str, roster_names: &[&str]) -> bool {
    let candidate_words = word_set(candidate_name);
    roster_names.iter().any(|roster_name| {
        let roster_words = word_set(roster_name);
        candidate_words.intersection(&roster_words).next().is_some()
    })
}

/// Applies every validation filter in §4.2 order. Returns `true` if the
/// candidate survives and should proceed to text verification.
pub fn validate_candidate(name: &str, entity_type: EntityType, roster_names: &[&str]) -> bool {
    if entity_type != EntityType::Character {
        return false;
    }
    if overlaps_roster(name, roster_names) {
        return false;
    }
    let lower = name.to_lowercase();
    if BLOCKLIST.contains(lower.as_str()) {
        return false;
    }
    if is_lowercase_plural_noun(name) {
        return false;
    }
    looks_like_proper_noun(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_character_entities() {
        assert!(!validate_candidate("Mira", EntityType::Entity, &[]));
    }

    #[test]
    fn rejects_roster_overlap_even_partial() {
        assert!(!validate_candidate(
            "Reynolds",
            EntityType::Character,
            &["Sheriff Reynolds"]
        ));
    }

    #[test]
    fn rejects_blocklisted_generic_nouns() {
        assert!(!validate_candidate("guards", EntityType::Character, &[]));
        assert!(!validate_candidate("Shadows", EntityType::Character, &[]));
    }

    #[test]
    fn rejects_lowercase_plural_nouns() {
        assert!(!validate_candidate("villagers", EntityType::Character, &[]));
    }

    #[test]
    fn accepts_plausible_proper_noun() {
        assert!(validate_candidate("Dr. Vesna", EntityType::Character, &["Mira"]));
    }

    #[test]
    fn rejects_names_with_no_capitalization() {
        assert!(!validate_candidate("the old man", EntityType::Character, &[]));
    }
}
