//! Bridges the live [`tracking::NpcTracking`]/[`tiering::TieredNpc`] types to
//! the rkyv-archived [`weave_core::snapshot`] payload written at each scene
//! boundary (§6).

use weave_core::snapshot::{NpcTrackingSnapshotData, SnapshotNpcState, SnapshotTierEntry};
use weave_core::ChapterId;

use crate::tiering::TieredNpc;
use crate::tracking::NpcTracking;
use crate::validation::EntityType;

fn to_snapshot_state(tracking: &NpcTracking) -> SnapshotNpcState {
    SnapshotNpcState {
        name: tracking.name.clone(),
        total_mentions: tracking.total_mentions,
        scene_count: tracking.scene_count,
        first_appearance_scene: tracking.first_appearance_scene,
        last_appearance_scene: tracking.last_appearance_scene,
        dialogue_scene_count: tracking.dialogue_scene_count,
        action_scene_count: tracking.action_scene_count,
        is_character: tracking.entity_type == EntityType::Character,
        importance_score: tracking.importance_score,
        crossed_threshold: tracking.crossed_threshold,
        profile_extracted: tracking.profile_extracted,
        converted_to_character: tracking.converted_to_character,
    }
}

fn to_tier_entry(npc: &TieredNpc) -> SnapshotTierEntry {
    SnapshotTierEntry {
        name: npc.name.clone(),
        role: npc.role.clone(),
        description: npc.description.clone(),
        personality: npc.personality.clone(),
        goals: npc.goals.clone(),
        relationships: npc.relationships.clone(),
        from_story_title: npc.from_story_title.clone(),
    }
}

/// Assembles the full snapshot payload for one scene boundary: the two
/// pre-computed tier lists plus every tracking row's raw state, so a scene
/// deletion can roll tracking back without recomputing from full history.
pub fn build_snapshot(
    trackings: &[NpcTracking],
    active: &[TieredNpc],
    inactive: &[TieredNpc],
    snapshot_scene_sequence: u32,
    chapter_id: ChapterId,
) -> NpcTrackingSnapshotData {
    NpcTrackingSnapshotData {
        snapshot_scene_sequence,
        chapter_id: chapter_id.0,
        active_npcs_for_context: active.iter().map(to_tier_entry).collect(),
        inactive_npcs_for_context: inactive.iter().map(to_tier_entry).collect(),
        all_npc_state: trackings.iter().map(to_snapshot_state).collect(),
    }
}
