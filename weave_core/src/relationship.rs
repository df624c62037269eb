//! Relationship value type shared by [`crate::domain::StoryCharacter`] (§3).
//!
//! Clamp-on-construct idiom grounded on the teacher's `Stats`/`Traits`
//! hand-written `clamp()` methods (`types.rs`).

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// One relationship a [`crate::domain::StoryCharacter`] holds toward another
/// character, keyed by the other character's name in the owning map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipEntry {
    pub relationship_type: CompactString,
    /// Always in `[0, 1]`; enforced at construction and on every mutator.
    strength: f32,
    pub arc_summary: CompactString,
}

impl RelationshipEntry {
    pub fn new(relationship_type: impl Into<CompactString>, strength: f32, arc_summary: impl Into<CompactString>) -> Self {
        RelationshipEntry {
            relationship_type: relationship_type.into(),
            strength: strength.clamp(0.0, 1.0),
            arc_summary: arc_summary.into(),
        }
    }

    pub fn strength(&self) -> f32 {
        self.strength
    }

    pub fn set_strength(&mut self, value: f32) {
        self.strength = value.clamp(0.0, 1.0);
    }

    pub fn adjust_strength(&mut self, delta: f32) {
        self.set_strength(self.strength + delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strength_clamps_on_construct() {
        let rel = RelationshipEntry::new("ally", 4.0, "met in chapter 1");
        assert_eq!(rel.strength(), 1.0);
    }

    #[test]
    fn adjust_strength_clamps_both_directions() {
        let mut rel = RelationshipEntry::new("rival", 0.1, "");
        rel.adjust_strength(-5.0);
        assert_eq!(rel.strength(), 0.0);
        rel.adjust_strength(5.0);
        assert_eq!(rel.strength(), 1.0);
    }
}
