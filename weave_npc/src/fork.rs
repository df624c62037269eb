//! Fork support for NPC-tracking rows (§4.1 priority 60/70): clone
//! descriptors plus the id-remapping clone functions themselves, kept here
//! rather than in `weave_query` per the orphan-rule note on
//! [`weave_query::CloneDescriptor`].

use weave_core::SceneId;
use weave_query::{CloneDescriptor, EntityKind, ForkContext};

use crate::mention::NpcMention;
use crate::tracking::NpcTracking;

/// Marker implementing [`CloneDescriptor`] for NPC mention rows.
pub struct NpcMentionDescriptor;

impl CloneDescriptor for NpcMentionDescriptor {
    fn entity_kind(&self) -> EntityKind {
        EntityKind::NpcMention
    }
}

/// Marker implementing [`CloneDescriptor`] for NPC tracking aggregates.
pub struct NpcTrackingDescriptor;

impl CloneDescriptor for NpcTrackingDescriptor {
    fn entity_kind(&self) -> EntityKind {
        EntityKind::NpcTracking
    }
}

/// Clones mentions whose scene survived the fork, remapping `scene_id` via
/// `ctx`; mentions pointing at a scene that didn't survive are dropped.
pub fn clone_npc_mentions(source: &[NpcMention], ctx: &ForkContext) -> Vec<NpcMention> {
    source
        .iter()
        .filter_map(|m| ctx.get_scene(m.scene_id).map(|new_scene| (m, new_scene)))
        .map(|(m, new_scene)| NpcMention { scene_id: new_scene, ..m.clone() })
        .collect()
}

/// Clones tracking aggregates whose `first_appearance_scene` survived the
/// fork (§4.1 filter predicate: `first_appearance_scene <= fork_seq`),
/// clamping `last_appearance_scene` to the fork point and resetting `id` so
/// storage assigns a fresh row rather than colliding with the source
/// branch's primary key.
pub fn clone_npc_trackings(source: &[NpcTracking], ctx: &ForkContext) -> Vec<NpcTracking> {
    source
        .iter()
        .filter(|t| t.first_appearance_scene <= ctx.fork_at_sequence.0)
        .map(|t| {
            let mut cloned = t.clone();
            cloned.id = None;
            cloned.last_appearance_scene = cloned.last_appearance_scene.min(ctx.fork_at_sequence.0);
            cloned
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_core::{BranchId, SceneSequence, StoryId};

    #[test]
    fn drops_mentions_for_scenes_that_did_not_survive() {
        let mut ctx = ForkContext::new(StoryId::new(1), BranchId::new(1), BranchId::new(2), SceneSequence::new(3), 1000);
        let _ = ctx.map_scene(SceneId::new(1));
        let mentions = vec![
            NpcMention {
                scene_id: SceneId::new(1),
                character_name: "Mira".into(),
                sequence: SceneSequence::new(1),
                mention_count: 1,
                has_dialogue: false,
                has_actions: false,
                has_relationships: false,
                context_snippets: Vec::new(),
                extracted_role: None,
                extracted_description: None,
            },
            NpcMention {
                scene_id: SceneId::new(99), // never cloned
                character_name: "Gareth".into(),
                sequence: SceneSequence::new(5),
                mention_count: 1,
                has_dialogue: false,
                has_actions: false,
                has_relationships: false,
                context_snippets: Vec::new(),
                extracted_role: None,
                extracted_description: None,
            },
        ];
        let cloned = clone_npc_mentions(&mentions, &ctx);
        assert_eq!(cloned.len(), 1);
        assert_eq!(cloned[0].character_name, "Mira");
    }

    #[test]
    fn drops_trackings_whose_first_appearance_is_beyond_the_fork_point() {
        let ctx = ForkContext::new(StoryId::new(1), BranchId::new(1), BranchId::new(2), SceneSequence::new(3), 1000);
        let mut survives = NpcTracking::new("Mira".into());
        survives.record_mention(SceneSequence::new(2), 1, false, false);
        let mut dropped = NpcTracking::new("Gareth".into());
        dropped.record_mention(SceneSequence::new(4), 1, false, false);

        let cloned = clone_npc_trackings(&[survives, dropped], &ctx);
        assert_eq!(cloned.len(), 1);
        assert_eq!(cloned[0].name, "Mira");
    }

    #[test]
    fn clamps_last_appearance_scene_to_the_fork_point() {
        let ctx = ForkContext::new(StoryId::new(1), BranchId::new(1), BranchId::new(2), SceneSequence::new(3), 1000);
        let mut tracking = NpcTracking::new("Mira".into());
        tracking.record_mention(SceneSequence::new(1), 1, false, false);
        tracking.record_mention(SceneSequence::new(3), 1, false, false);
        // last_appearance_scene would exceed fork_at_sequence without clamping.
        tracking.last_appearance_scene = 5;

        let cloned = clone_npc_trackings(&[tracking], &ctx);
        assert_eq!(cloned.len(), 1);
        assert_eq!(cloned[0].last_appearance_scene, 3);
        assert!(cloned[0].id.is_none());
    }
}
