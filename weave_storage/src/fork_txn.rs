//! Transactional branch forking (§4.1): wraps `weave_query::fork`'s and
//! `weave_npc::fork`'s pure clone functions in one redb write transaction so
//! "a partially forked branch must never be observable" is enforced at the
//! storage boundary, not just hoped for by the caller.
//!
//! Reuses the hybrid store's existing `begin_write`/`commit` idiom from
//! `hot/redb_hot_store.rs`, so a fork commits or rolls back exactly like any
//! other hot-store write.

use weave_core::{BranchId, SceneSequence, StoryId};
use weave_query::fork::{clone_chapters, clone_scene_variants, clone_scenes, clone_story_characters, rebuild_story_flow};
use weave_query::{ForkContext, ForkError};
use weave_npc::fork::{clone_npc_mentions, clone_npc_trackings};

use crate::hot::redb_hot_store::{branch_key, CHAPTERS, NPC_MENTIONS, NPC_TRACKING, SCENES, SCENE_VARIANTS, STORY_CHARACTERS, STORY_FLOW};
use crate::hot::RedbHotStore;
use crate::storage_error::StorageError;

/// Forks `source_branch` of `story_id` into a brand-new branch at
/// `fork_at_sequence`, running every descriptor named in §4.1 inside one
/// redb write transaction. Returns the new branch's id; any failure leaves
/// `store` exactly as it was (the transaction is simply dropped, never
/// committed).
pub fn fork_branch(store: &RedbHotStore, story_id: StoryId, source_branch: BranchId, new_branch: BranchId, fork_at_sequence: SceneSequence, id_floor: u64) -> Result<BranchId, StorageError> {
    let source_scenes = store.scenes_in_branch(source_branch)?;
    let source_chapters = store.chapters_in_branch(source_branch)?;
    let source_story_characters = store.story_characters_in_branch(source_branch)?;
    let source_variants = store.scene_variants_in_branch(source_branch)?;
    let source_flow = store.story_flow_in_branch(source_branch)?;
    let source_mentions = store.npc_mentions_in_branch(source_branch)?;
    let source_trackings = store.npc_tracking_in_branch(source_branch)?;

    let mut ctx = ForkContext::new(story_id, source_branch, new_branch, fork_at_sequence, id_floor);

    let cloned_scenes = clone_scenes(&source_scenes, &mut ctx);
    let surviving_chapter_ids: Vec<_> = cloned_scenes.iter().map(|s| s.chapter_id).collect();
    let cloned_chapters = clone_chapters(&source_chapters, &surviving_chapter_ids, &mut ctx);
    let cloned_story_characters = clone_story_characters(&source_story_characters, &mut ctx);
    let cloned_variants = clone_scene_variants(&source_variants, &mut ctx).map_err(fork_error)?;
    let cloned_flow = rebuild_story_flow(&source_flow, &ctx).map_err(fork_error)?;
    let cloned_mentions = clone_npc_mentions(&source_mentions, &ctx);
    let cloned_trackings = clone_npc_trackings(&source_trackings, &ctx);

    let txn = store.write_transaction()?;
    {
        let mut scenes_table = txn.open_table(SCENES)?;
        for scene in &cloned_scenes {
            scenes_table.insert(branch_key(scene.branch_id, scene.id.raw()).as_slice(), bincode::serialize(scene)?.as_slice())?;
        }
        let mut chapters_table = txn.open_table(CHAPTERS)?;
        for chapter in &cloned_chapters {
            chapters_table.insert(branch_key(chapter.branch_id, chapter.id.raw()).as_slice(), bincode::serialize(chapter)?.as_slice())?;
        }
        let mut sc_table = txn.open_table(STORY_CHARACTERS)?;
        for sc in &cloned_story_characters {
            sc_table.insert(branch_key(sc.branch_id, sc.id.raw()).as_slice(), bincode::serialize(sc)?.as_slice())?;
        }
        let mut variants_table = txn.open_table(SCENE_VARIANTS)?;
        for variant in &cloned_variants {
            variants_table.insert(branch_key(new_branch, variant.id.raw()).as_slice(), bincode::serialize(variant)?.as_slice())?;
        }
        let mut flow_table = txn.open_table(STORY_FLOW)?;
        for flow in &cloned_flow {
            flow_table.insert(branch_key(flow.branch_id, flow.sequence.0 as u64).as_slice(), bincode::serialize(flow)?.as_slice())?;
        }
        let mut mentions_table = txn.open_table(NPC_MENTIONS)?;
        for (i, mention) in cloned_mentions.iter().enumerate() {
            mentions_table.insert(branch_key(new_branch, i as u64).as_slice(), bincode::serialize(mention)?.as_slice())?;
        }
        let mut tracking_table = txn.open_table(NPC_TRACKING)?;
        for (i, tracking) in cloned_trackings.iter().enumerate() {
            tracking_table.insert(branch_key(new_branch, i as u64).as_slice(), bincode::serialize(tracking)?.as_slice())?;
        }
    }
    txn.commit()?;

    Ok(new_branch)
}

fn fork_error(e: ForkError) -> StorageError {
    StorageError::Fork(e.to_string())
}
