//! Cross-story (world-scope) tier augmentation (§4.2).
//!
//! Sibling stories are reached only through the `&dyn SiblingStorySource`
//! trait object, so this module never depends on a concrete store.

use weave_core::StoryId;

use crate::tiering::TieredNpc;

/// One threshold-crossed, unconverted, CHARACTER NPC from a sibling story in
/// the same world, as reported by its canonical branch.
#[derive(Debug, Clone, PartialEq)]
pub struct NpcTrackingRef {
    pub story_id: StoryId,
    pub story_title: String,
    pub name: String,
    pub role: String,
    pub importance_score: f32,
}

/// Storage-agnostic source of sibling-story NPC data, so the tiering
/// function itself never touches a store directly.
pub trait SiblingStorySource {
    /// Canonical-branch, threshold-crossed, unconverted CHARACTER NPCs from
    /// every sibling story in `world_id`, excluding `exclude_story`.
    fn canonical_tracked_npcs(&self, world_id: u64, exclude_story: StoryId) -> Vec<NpcTrackingRef>;
}

/// Appends up to `remaining_capacity` cross-story NPCs to the inactive tier,
/// deduplicated against `current_inactive` and `roster_names`, labeled
/// `[From 'Story Title']` (§4.2).
pub fn augment_with_world_scope(
    source: &dyn SiblingStorySource,
    world_id: u64,
    current_story: StoryId,
    current_active: &[TieredNpc],
    current_inactive: &mut Vec<TieredNpc>,
    roster_names: &[&str],
    remaining_capacity: usize,
) {
    if remaining_capacity == 0 {
        return;
    }
    let known: std::collections::HashSet<String> = current_active
        .iter()
        .chain(current_inactive.iter())
        .map(|n| n.name.to_lowercase())
        .chain(roster_names.iter().map(|n| n.to_lowercase()))
        .collect();

    let mut candidates = source.canonical_tracked_npcs(world_id, current_story);
    candidates.sort_by(|a, b| b.importance_score.partial_cmp(&a.importance_score).unwrap_or(std::cmp::Ordering::Equal));

    for candidate in candidates {
        if current_inactive.len() >= remaining_capacity {
            break;
        }
        if known.contains(&candidate.name.to_lowercase()) {
            continue;
        }
        current_inactive.push(TieredNpc {
            name: candidate.name,
            role: candidate.role,
            description: String::new(),
            personality: Vec::new(),
            goals: String::new(),
            relationships: String::new(),
            importance_score: candidate.importance_score,
            from_story_title: Some(candidate.story_title),
        });
    }
}
