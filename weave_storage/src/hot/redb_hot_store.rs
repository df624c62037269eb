//! Redb-backed hot storage for the active branch of every story (§6
//! persistence contract): scenes, chapters, story characters, scene
//! variants, story flow, and NPC tracking/mention rows.
//!
//! One table per branch-scoped entity kind named in §4.1, each a
//! single-table, bincode-serialized-value store. Composite keys are
//! big-endian `(branch_id, entity_id)` byte pairs rather than a tuple `Key`
//! impl, keeping range scans (`list_by_branch`) a simple prefix range over a
//! plain `&[u8]` value column.

use redb::{Database, ReadableTable, TableDefinition};

use weave_core::{
    BranchId, Chapter, ChapterId, Scene, SceneId, SceneSequence, SceneVariant, SceneVariantId,
    StoryCharacter, StoryCharacterId, StoryFlow,
};
use weave_npc::{NpcMention, NpcTracking};

use crate::storage_error::StorageError;

pub(crate) const SCENES: TableDefinition<&[u8], &[u8]> = TableDefinition::new("scenes");
pub(crate) const CHAPTERS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("chapters");
pub(crate) const STORY_CHARACTERS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("story_characters");
pub(crate) const SCENE_VARIANTS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("scene_variants");
pub(crate) const STORY_FLOW: TableDefinition<&[u8], &[u8]> = TableDefinition::new("story_flow");
pub(crate) const NPC_TRACKING: TableDefinition<&[u8], &[u8]> = TableDefinition::new("npc_tracking");
pub(crate) const NPC_MENTIONS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("npc_mentions");

/// Big-endian `(branch_id, key)` composite so a range over one branch's rows
/// is a contiguous prefix scan.
pub(crate) fn branch_key(branch_id: BranchId, key: u64) -> [u8; 16] {
    let mut buf = [0u8; 16];
    buf[..8].copy_from_slice(&branch_id.raw().to_be_bytes());
    buf[8..].copy_from_slice(&key.to_be_bytes());
    buf
}

pub(crate) fn branch_range(branch_id: BranchId) -> std::ops::RangeInclusive<[u8; 16]> {
    branch_key(branch_id, u64::MIN)..=branch_key(branch_id, u64::MAX)
}

/// Active-branch store using redb for low-latency point lookups and
/// branch-scoped range scans.
pub struct RedbHotStore {
    db: Database,
}

impl RedbHotStore {
    /// Creates or opens a redb database at `path`.
    pub fn new(path: &str) -> Result<Self, StorageError> {
        let db = Database::create(path)?;
        Ok(Self { db })
    }

    /// A throwaway database backed by a temp file, for tests.
    #[cfg(test)]
    pub fn in_memory() -> Result<Self, StorageError> {
        let path = tempfile::NamedTempFile::new().expect("create temp db file").into_temp_path();
        // Leak the path so the file outlives the returned store; test
        // databases are cleaned up with the OS temp dir.
        let path_buf = path.keep().expect("persist temp path");
        Self::new(path_buf.to_str().expect("temp path is valid utf-8"))
    }

    /// Opens one write transaction spanning every table, for callers (the
    /// fork transaction) that must write several entity kinds atomically.
    pub fn write_transaction(&self) -> Result<redb::WriteTransaction, StorageError> {
        Ok(self.db.begin_write()?)
    }

    /// Opens one read transaction spanning every table, for callers that
    /// must read a consistent view across entity kinds (the fork source
    /// read and the eventual archive-then-delete of a forked-away branch).
    pub fn read_transaction(&self) -> Result<redb::ReadTransaction, StorageError> {
        Ok(self.db.begin_read()?)
    }

    pub fn put_scene(&self, scene: &Scene) -> Result<(), StorageError> {
        self.put(SCENES, branch_key(scene.branch_id, scene.id.raw()), scene)
    }

    pub fn get_scene(&self, branch_id: BranchId, id: SceneId) -> Result<Option<Scene>, StorageError> {
        self.get(SCENES, branch_key(branch_id, id.raw()))
    }

    pub fn scenes_in_branch(&self, branch_id: BranchId) -> Result<Vec<Scene>, StorageError> {
        self.scan_range(SCENES, branch_range(branch_id))
    }

    pub fn put_chapter(&self, chapter: &Chapter) -> Result<(), StorageError> {
        self.put(CHAPTERS, branch_key(chapter.branch_id, chapter.id.raw()), chapter)
    }

    pub fn get_chapter(&self, branch_id: BranchId, id: ChapterId) -> Result<Option<Chapter>, StorageError> {
        self.get(CHAPTERS, branch_key(branch_id, id.raw()))
    }

    pub fn chapters_in_branch(&self, branch_id: BranchId) -> Result<Vec<Chapter>, StorageError> {
        self.scan_range(CHAPTERS, branch_range(branch_id))
    }

    pub fn put_story_character(&self, sc: &StoryCharacter) -> Result<(), StorageError> {
        self.put(STORY_CHARACTERS, branch_key(sc.branch_id, sc.id.raw()), sc)
    }

    pub fn get_story_character(&self, branch_id: BranchId, id: StoryCharacterId) -> Result<Option<StoryCharacter>, StorageError> {
        self.get(STORY_CHARACTERS, branch_key(branch_id, id.raw()))
    }

    pub fn story_characters_in_branch(&self, branch_id: BranchId) -> Result<Vec<StoryCharacter>, StorageError> {
        self.scan_range(STORY_CHARACTERS, branch_range(branch_id))
    }

    /// Scene variants are keyed by their owning scene's branch, looked up
    /// via `scene_branch` since `SceneVariant` itself carries no branch id.
    pub fn put_scene_variant(&self, scene_branch: BranchId, variant: &SceneVariant) -> Result<(), StorageError> {
        self.put(SCENE_VARIANTS, branch_key(scene_branch, variant.id.raw()), variant)
    }

    pub fn get_scene_variant(&self, scene_branch: BranchId, id: SceneVariantId) -> Result<Option<SceneVariant>, StorageError> {
        self.get(SCENE_VARIANTS, branch_key(scene_branch, id.raw()))
    }

    pub fn scene_variants_in_branch(&self, branch_id: BranchId) -> Result<Vec<SceneVariant>, StorageError> {
        self.scan_range(SCENE_VARIANTS, branch_range(branch_id))
    }

    pub fn put_story_flow(&self, flow: &StoryFlow) -> Result<(), StorageError> {
        self.put(STORY_FLOW, branch_key(flow.branch_id, flow.sequence.0 as u64), flow)
    }

    pub fn story_flow_in_branch(&self, branch_id: BranchId) -> Result<Vec<StoryFlow>, StorageError> {
        self.scan_range(STORY_FLOW, branch_range(branch_id))
    }

    pub fn put_npc_tracking(&self, branch_id: BranchId, tracking: &NpcTracking) -> Result<(), StorageError> {
        let id = tracking.id.map(|i| i.raw()).unwrap_or(0);
        self.put(NPC_TRACKING, branch_key(branch_id, id), tracking)
    }

    pub fn npc_tracking_in_branch(&self, branch_id: BranchId) -> Result<Vec<NpcTracking>, StorageError> {
        self.scan_range(NPC_TRACKING, branch_range(branch_id))
    }

    pub fn put_npc_mention(&self, branch_id: BranchId, seq: u64, mention: &NpcMention) -> Result<(), StorageError> {
        self.put(NPC_MENTIONS, branch_key(branch_id, seq), mention)
    }

    pub fn npc_mentions_in_branch(&self, branch_id: BranchId) -> Result<Vec<NpcMention>, StorageError> {
        self.scan_range(NPC_MENTIONS, branch_range(branch_id))
    }

    fn put<T: serde::Serialize>(&self, table: TableDefinition<&[u8], &[u8]>, key: [u8; 16], value: &T) -> Result<(), StorageError> {
        let bytes = bincode::serialize(value)?;
        let txn = self.db.begin_write()?;
        {
            let mut t = txn.open_table(table)?;
            t.insert(key.as_slice(), bytes.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    fn get<T: serde::de::DeserializeOwned>(&self, table: TableDefinition<&[u8], &[u8]>, key: [u8; 16]) -> Result<Option<T>, StorageError> {
        let txn = self.db.begin_read()?;
        let t = txn.open_table(table)?;
        match t.get(key.as_slice())? {
            Some(value) => Ok(Some(bincode::deserialize(value.value())?)),
            None => Ok(None),
        }
    }

    fn scan_range<T: serde::de::DeserializeOwned>(
        &self,
        table: TableDefinition<&[u8], &[u8]>,
        range: std::ops::RangeInclusive<[u8; 16]>,
    ) -> Result<Vec<T>, StorageError> {
        let txn = self.db.begin_read()?;
        let t = txn.open_table(table)?;
        let (lo, hi) = range.into_inner();
        let mut out = Vec::new();
        for entry in t.range(lo.as_slice()..=hi.as_slice())? {
            let (_, value) = entry?;
            out.push(bincode::deserialize(value.value())?);
        }
        Ok(out)
    }
}
