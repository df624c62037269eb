//! Newtype identifiers for every entity in the data model (§3).
//!
//! Arena/id-based references rather than owning object-graph cycles: the
//! Story/Branch/Scene/Variant/Flow graph is expressed as plain structs that
//! refer to each other by id, looked up through the store rather than via
//! back-pointers.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_type {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl $name {
            /// Build an id from a raw value.
            pub fn new(raw: u64) -> Self {
                $name(raw)
            }

            /// The raw numeric value.
            pub fn raw(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}:{}", stringify!($name), self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                $name(raw)
            }
        }
    };
}

id_type!(StoryId, "Identifies a Story.");
id_type!(BranchId, "Identifies a Branch within a Story.");
id_type!(SceneId, "Identifies a Scene (sequence position holder, no text).");
id_type!(SceneVariantId, "Identifies a concrete textual SceneVariant.");
id_type!(ChapterId, "Identifies a Chapter grouping scenes.");
id_type!(CharacterId, "Identifies a library Character.");
id_type!(StoryCharacterId, "Identifies a Character's association with a Story+Branch.");
id_type!(NpcTrackingId, "Identifies an NPCTracking aggregate row.");
id_type!(WorldId, "Identifies a World that groups sibling stories for cross-story augmentation.");

/// Monotonically increasing position of a scene within a (story, branch).
/// Dense starting at 1; soft-deletion preserves sequence stability (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SceneSequence(pub u32);

impl SceneSequence {
    pub fn new(n: u32) -> Self {
        SceneSequence(n)
    }

    pub fn next(self) -> Self {
        SceneSequence(self.0 + 1)
    }
}

impl fmt::Display for SceneSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_display_includes_type_name() {
        let id = StoryId::new(7);
        assert_eq!(format!("{id}"), "StoryId:7");
    }

    #[test]
    fn scene_sequence_next_increments() {
        let seq = SceneSequence::new(3);
        assert_eq!(seq.next(), SceneSequence::new(4));
    }
}
