//! Branch-fork algorithm (§4.1): clone descriptors, priority ordering, id
//! remapping, and the per-entity filter/transform functions.
//!
//! Clone descriptors carry a priority and a dependency declaration, resolved
//! by a stable sort rather than a `BinaryHeap` — forking is not hot-path
//! enough to need one — over the fixed entity list §4.1 names. The actual
//! storage-transaction wrapper lives in `weave_storage::fork_txn`, which
//! calls the pure functions below inside one `begin_write`/`commit` pair.

use std::collections::HashMap;
use std::fmt;

use weave_core::{
    BranchId, Chapter, ChapterId, Scene, SceneId, SceneSequence, SceneVariant, SceneVariantId,
    StoryCharacter, StoryCharacterId, StoryFlow, StoryId, SummaryBatch,
};

/// Every branch-scoped entity kind that participates in forking (§4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Scene,
    Chapter,
    StoryCharacter,
    SceneVariant,
    StoryFlow,
    NpcMention,
    NpcTracking,
    NpcTrackingSnapshot,
}

impl EntityKind {
    /// Declared clone priority (§4.1): lower runs first.
    pub fn priority(self) -> u16 {
        match self {
            EntityKind::Scene => 10,
            EntityKind::Chapter => 10,
            EntityKind::StoryCharacter => 20,
            EntityKind::SceneVariant => 31,
            EntityKind::StoryFlow => 40,
            EntityKind::NpcMention => 60,
            EntityKind::NpcTracking => 70,
            EntityKind::NpcTrackingSnapshot => 80,
        }
    }

    /// Entity kinds that must be cloned before this one (their new-id maps
    /// must already exist in the [`ForkContext`]).
    pub fn dependencies(self) -> &'static [EntityKind] {
        match self {
            EntityKind::Scene | EntityKind::Chapter => &[],
            EntityKind::StoryCharacter => &[],
            EntityKind::SceneVariant => &[EntityKind::Scene],
            EntityKind::StoryFlow => &[EntityKind::Scene, EntityKind::SceneVariant],
            EntityKind::NpcMention => &[EntityKind::Scene],
            EntityKind::NpcTracking => &[EntityKind::NpcMention],
            EntityKind::NpcTrackingSnapshot => &[EntityKind::NpcTracking, EntityKind::Chapter],
        }
    }
}

/// Declares how one entity kind participates in a fork. Implementations live
/// wherever the concrete row type is defined (`weave_query` for the
/// `weave_core` domain types, `weave_npc` for NPC rows) since the orphan rule
/// requires the impl and the type to share a crate with at least one of
/// them; this trait itself has no associated data, only ordering metadata, so
/// it stays here as the single source of truth for §4.1's priority table.
pub trait CloneDescriptor {
    fn entity_kind(&self) -> EntityKind;
}

/// Stable-sorts descriptors by declared priority, preserving declaration
/// order among ties — "forking is not performance critical enough to
/// warrant a priority queue" (SPEC_FULL.md §4.1).
pub fn order_descriptors<'a>(descriptors: &'a [Box<dyn CloneDescriptor>]) -> Vec<&'a dyn CloneDescriptor> {
    let mut ordered: Vec<&dyn CloneDescriptor> = descriptors.iter().map(|d| d.as_ref()).collect();
    ordered.sort_by_key(|d| d.entity_kind().priority());
    ordered
}

/// Old-id -> new-id maps built incrementally as fork stages run, plus the
/// fork parameters every stage's filter predicate needs.
#[derive(Debug, Default)]
pub struct ForkContext {
    pub story_id: StoryId,
    pub source_branch_id: BranchId,
    pub new_branch_id: BranchId,
    pub fork_at_sequence: SceneSequence,
    scene_ids: HashMap<SceneId, SceneId>,
    chapter_ids: HashMap<ChapterId, ChapterId>,
    story_character_ids: HashMap<StoryCharacterId, StoryCharacterId>,
    scene_variant_ids: HashMap<SceneVariantId, SceneVariantId>,
    next_scene_id: u64,
    next_chapter_id: u64,
    next_story_character_id: u64,
    next_scene_variant_id: u64,
}

impl ForkContext {
    pub fn new(
        story_id: StoryId,
        source_branch_id: BranchId,
        new_branch_id: BranchId,
        fork_at_sequence: SceneSequence,
        id_floor: u64,
    ) -> Self {
        ForkContext {
            story_id,
            source_branch_id,
            new_branch_id,
            fork_at_sequence,
            scene_ids: HashMap::new(),
            chapter_ids: HashMap::new(),
            story_character_ids: HashMap::new(),
            scene_variant_ids: HashMap::new(),
            next_scene_id: id_floor,
            next_chapter_id: id_floor,
            next_story_character_id: id_floor,
            next_scene_variant_id: id_floor,
        }
    }

    fn fresh(counter: &mut u64) -> u64 {
        *counter += 1;
        *counter
    }

    pub fn map_scene(&mut self, old: SceneId) -> SceneId {
        let next = &mut self.next_scene_id;
        *self
            .scene_ids
            .entry(old)
            .or_insert_with(|| SceneId::new(Self::fresh(next)))
    }

    pub fn map_chapter(&mut self, old: ChapterId) -> ChapterId {
        let next = &mut self.next_chapter_id;
        *self
            .chapter_ids
            .entry(old)
            .or_insert_with(|| ChapterId::new(Self::fresh(next)))
    }

    pub fn map_story_character(&mut self, old: StoryCharacterId) -> StoryCharacterId {
        let next = &mut self.next_story_character_id;
        *self
            .story_character_ids
            .entry(old)
            .or_insert_with(|| StoryCharacterId::new(Self::fresh(next)))
    }

    pub fn map_scene_variant(&mut self, old: SceneVariantId) -> SceneVariantId {
        let next = &mut self.next_scene_variant_id;
        *self
            .scene_variant_ids
            .entry(old)
            .or_insert_with(|| SceneVariantId::new(Self::fresh(next)))
    }

    /// Looks up an already-mapped scene id without creating a new mapping;
    /// used by dependent stages (story flow, mentions) that must never
    /// invent a scene that wasn't cloned.
    pub fn get_scene(&self, old: SceneId) -> Option<SceneId> {
        self.scene_ids.get(&old).copied()
    }

    pub fn get_scene_variant(&self, old: SceneVariantId) -> Option<SceneVariantId> {
        self.scene_variant_ids.get(&old).copied()
    }

    pub fn get_chapter(&self, old: ChapterId) -> Option<ChapterId> {
        self.chapter_ids.get(&old).copied()
    }
}

/// Errors raised while forking; any of these aborts the whole fork and
/// leaves the source branch untouched (§4.1 failure semantics).
#[derive(Debug)]
pub enum ForkError {
    InvalidInput(String),
    DanglingReference(String),
}

impl fmt::Display for ForkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForkError::InvalidInput(m) => write!(f, "invalid fork input: {m}"),
            ForkError::DanglingReference(m) => write!(f, "dangling reference during fork: {m}"),
        }
    }
}

impl std::error::Error for ForkError {}

/// Clones scenes with `sequence <= fork_at_sequence` (§4.1 filter predicate),
/// assigning new ids and recording the mapping in `ctx`.
pub fn clone_scenes(source: &[Scene], ctx: &mut ForkContext) -> Vec<Scene> {
    source
        .iter()
        .filter(|s| s.story_id == ctx.story_id && s.branch_id == ctx.source_branch_id)
        .filter(|s| s.sequence <= ctx.fork_at_sequence)
        .map(|s| {
            let new_id = ctx.map_scene(s.id);
            let new_chapter = ctx.map_chapter(s.chapter_id);
            Scene {
                id: new_id,
                story_id: s.story_id,
                branch_id: ctx.new_branch_id,
                chapter_id: new_chapter,
                sequence: s.sequence,
                is_deleted: s.is_deleted,
            }
        })
        .collect()
}

/// Clones chapters: "include chapter if any of its scenes survive the
/// filter, OR it is chapter 1" (§4.1).
pub fn clone_chapters(source: &[Chapter], surviving_chapter_ids: &[ChapterId], ctx: &mut ForkContext) -> Vec<Chapter> {
    source
        .iter()
        .filter(|c| c.story_id == ctx.story_id && c.branch_id == ctx.source_branch_id)
        .filter(|c| surviving_chapter_ids.contains(&c.id) || c.number == 1)
        .map(|c| {
            let new_id = ctx.map_chapter(c.id);
            Chapter {
                id: new_id,
                story_id: c.story_id,
                branch_id: ctx.new_branch_id,
                number: c.number,
                title: c.title.clone(),
                plot_point: c.plot_point.clone(),
                story_so_far_summary: c.story_so_far_summary.clone(),
                auto_summary: c.auto_summary.clone(),
                last_summary_scene_count: c.last_summary_scene_count,
                last_extraction_scene_count: c.last_extraction_scene_count,
                scenario_text: c.scenario_text.clone(),
                summary_batches: clone_summary_batches(&c.summary_batches, ctx.fork_at_sequence),
            }
        })
        .collect()
}

/// Summary-batch filter predicate (§4.1): `end_scene_sequence <= fork_seq`.
fn clone_summary_batches(batches: &[SummaryBatch], fork_at_sequence: SceneSequence) -> Vec<SummaryBatch> {
    batches
        .iter()
        .filter(|b| b.end_scene_sequence <= fork_at_sequence)
        .cloned()
        .collect()
}

/// Clones story-character rows unconditionally within the source branch
/// (no scene-sequence filter applies to the explicit roster).
pub fn clone_story_characters(source: &[StoryCharacter], ctx: &mut ForkContext) -> Vec<StoryCharacter> {
    source
        .iter()
        .filter(|c| c.story_id == ctx.story_id && c.branch_id == ctx.source_branch_id)
        .map(|c| {
            let new_id = ctx.map_story_character(c.id);
            let mut cloned = c.clone();
            cloned.id = new_id;
            cloned.branch_id = ctx.new_branch_id;
            cloned
        })
        .collect()
}

/// Clones scene variants belonging to surviving (already-cloned) scenes.
pub fn clone_scene_variants(source: &[SceneVariant], ctx: &mut ForkContext) -> Result<Vec<SceneVariant>, ForkError> {
    source
        .iter()
        .filter_map(|v| ctx.get_scene(v.scene_id).map(|new_scene| (v, new_scene)))
        .map(|(v, new_scene_id)| {
            let new_id = ctx.map_scene_variant(v.id);
            Ok(SceneVariant {
                id: new_id,
                scene_id: new_scene_id,
                variant_number: v.variant_number,
                is_original: v.is_original,
                content: v.content.clone(),
                title: v.title.clone(),
                generation_method: v.generation_method,
                original_content: v.original_content.clone(),
                user_edited: v.user_edited,
                context_snapshot: v.context_snapshot.clone(),
            })
        })
        .collect()
}

/// Rebuilds story flow for the new branch: "each cloned scene has an active
/// flow entry pointing at the cloned active variant" (§4.1 step 3).
pub fn rebuild_story_flow(
    source_flow: &[StoryFlow],
    ctx: &ForkContext,
) -> Result<Vec<StoryFlow>, ForkError> {
    source_flow
        .iter()
        .filter(|f| f.story_id == ctx.story_id && f.branch_id == ctx.source_branch_id && f.is_active)
        .filter(|f| f.sequence <= ctx.fork_at_sequence)
        .map(|f| {
            let new_scene = ctx
                .get_scene(f.scene_id)
                .ok_or_else(|| ForkError::DanglingReference(format!("scene {} not cloned", f.scene_id)))?;
            let new_variant = ctx.get_scene_variant(f.variant_id).ok_or_else(|| {
                ForkError::DanglingReference(format!("variant {} not cloned", f.variant_id))
            })?;
            Ok(StoryFlow {
                story_id: f.story_id,
                branch_id: ctx.new_branch_id,
                sequence: f.sequence,
                scene_id: new_scene,
                variant_id: new_variant,
                is_active: true,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_core::{CharacterId, GenerationMethod};

    fn seeded_ctx() -> ForkContext {
        ForkContext::new(
            StoryId::new(1),
            BranchId::new(1),
            BranchId::new(2),
            SceneSequence::new(3),
            1000,
        )
    }

    fn scene(seq: u32) -> Scene {
        Scene {
            id: SceneId::new(seq as u64),
            story_id: StoryId::new(1),
            branch_id: BranchId::new(1),
            chapter_id: ChapterId::new(1),
            sequence: SceneSequence::new(seq),
            is_deleted: false,
        }
    }

    #[test]
    fn clone_scenes_keeps_only_at_or_below_fork_point() {
        let mut ctx = seeded_ctx();
        let source = vec![scene(1), scene(2), scene(3), scene(4), scene(5)];
        let cloned = clone_scenes(&source, &mut ctx);
        assert_eq!(cloned.len(), 3);
        assert!(cloned.iter().all(|s| s.sequence <= SceneSequence::new(3)));
        assert!(cloned.iter().all(|s| s.branch_id == BranchId::new(2)));
    }

    #[test]
    fn clone_scene_variants_skips_scenes_that_were_not_cloned() {
        let mut ctx = seeded_ctx();
        let source_scenes = vec![scene(1), scene(4)];
        let _ = clone_scenes(&source_scenes, &mut ctx); // only scene(1) survives
        let variants = vec![SceneVariant {
            id: SceneVariantId::new(1),
            scene_id: SceneId::new(4), // never cloned
            variant_number: 1,
            is_original: true,
            content: "x".into(),
            title: None,
            generation_method: GenerationMethod::Auto,
            original_content: None,
            user_edited: false,
            context_snapshot: Vec::new(),
        }];
        let cloned = clone_scene_variants(&variants, &mut ctx).unwrap();
        assert!(cloned.is_empty());
    }

    #[test]
    fn order_descriptors_is_stable_by_priority() {
        struct D(EntityKind);
        impl CloneDescriptor for D {
            fn entity_kind(&self) -> EntityKind {
                self.0
            }
        }
        let descriptors: Vec<Box<dyn CloneDescriptor>> = vec![
            Box::new(D(EntityKind::NpcTracking)),
            Box::new(D(EntityKind::Scene)),
            Box::new(D(EntityKind::StoryCharacter)),
        ];
        let ordered = order_descriptors(&descriptors);
        let kinds: Vec<_> = ordered.iter().map(|d| d.entity_kind().priority()).collect();
        assert_eq!(kinds, vec![10, 20, 70]);
    }

    #[test]
    fn chapter_always_includes_number_one_even_with_no_surviving_scenes() {
        let mut ctx = seeded_ctx();
        let chapters = vec![Chapter {
            id: ChapterId::new(1),
            story_id: StoryId::new(1),
            branch_id: BranchId::new(1),
            number: 1,
            title: None,
            plot_point: None,
            story_so_far_summary: None,
            auto_summary: None,
            last_summary_scene_count: 0,
            last_extraction_scene_count: 0,
            scenario_text: None,
            summary_batches: Vec::new(),
        }];
        let cloned = clone_chapters(&chapters, &[], &mut ctx);
        assert_eq!(cloned.len(), 1);
    }

    #[test]
    fn story_character_clone_rewrites_branch_id() {
        let mut ctx = seeded_ctx();
        let sc = StoryCharacter::new(
            StoryCharacterId::new(1),
            StoryId::new(1),
            BranchId::new(1),
            CharacterId::new(1),
            "villain",
            0.4,
        );
        let cloned = clone_story_characters(&[sc], &mut ctx);
        assert_eq!(cloned.len(), 1);
        assert_eq!(cloned[0].branch_id, BranchId::new(2));
        assert_ne!(cloned[0].id, StoryCharacterId::new(1));
    }
}
