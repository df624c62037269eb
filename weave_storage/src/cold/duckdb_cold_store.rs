//! DuckDB-backed cold storage: archived branches, NPC snapshot blobs, and
//! the small world/story directory that backs cross-story augmentation
//! (§4.2 "Cross-story augmentation").
//!
//! One table per concern, written with an `INSERT OR REPLACE` upsert so a
//! re-archive of the same branch or snapshot never produces a duplicate row.

use duckdb::{params, Connection};

use weave_core::{BranchId, ChapterId, SceneSequence, StoryId};
use weave_npc::NpcTrackingRef;

use crate::storage_error::StorageError;

/// Cold-tier store: archived (forked-away or completed) branches, NPC
/// tracking snapshot blobs, and the cross-story directory.
pub struct DuckDbColdStore {
    conn: Connection,
}

impl DuckDbColdStore {
    /// Creates or opens a DuckDB database at `path`.
    pub fn new(path: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS npc_snapshots (
                story_id BIGINT,
                branch_id BIGINT,
                chapter_id BIGINT,
                scene_sequence INTEGER,
                payload BLOB,
                PRIMARY KEY (story_id, branch_id, chapter_id)
            );
            CREATE TABLE IF NOT EXISTS archived_scenes (
                story_id BIGINT,
                branch_id BIGINT,
                scene_id BIGINT,
                chapter_id BIGINT,
                sequence INTEGER,
                is_deleted BOOLEAN,
                PRIMARY KEY (branch_id, scene_id)
            );
            CREATE TABLE IF NOT EXISTS story_directory (
                story_id BIGINT PRIMARY KEY,
                world_id BIGINT,
                title VARCHAR,
                active_branch_id BIGINT
            );
            CREATE TABLE IF NOT EXISTS canonical_npcs (
                story_id BIGINT,
                name VARCHAR,
                role VARCHAR,
                importance_score DOUBLE,
                PRIMARY KEY (story_id, name)
            );",
        )?;
        Ok(Self { conn })
    }

    /// An in-memory database, for tests.
    #[cfg(test)]
    pub fn in_memory() -> Result<Self, StorageError> {
        Self::new(":memory:")
    }

    /// Upserts one chapter's NPC tracking snapshot blob (rkyv bytes, see
    /// `weave_core::snapshot::save_snapshot`).
    pub fn save_npc_snapshot(&self, story_id: StoryId, branch_id: BranchId, chapter_id: ChapterId, scene_sequence: SceneSequence, payload: &[u8]) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO npc_snapshots (story_id, branch_id, chapter_id, scene_sequence, payload) VALUES (?, ?, ?, ?, ?)",
            params![story_id.raw() as i64, branch_id.raw() as i64, chapter_id.raw() as i64, scene_sequence.0 as i32, payload],
        )?;
        Ok(())
    }

    /// Loads the most recent snapshot blob for one chapter.
    pub fn load_npc_snapshot(&self, story_id: StoryId, branch_id: BranchId, chapter_id: ChapterId) -> Result<Option<Vec<u8>>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT payload FROM npc_snapshots WHERE story_id = ? AND branch_id = ? AND chapter_id = ?")?;
        let mut rows = stmt.query(params![story_id.raw() as i64, branch_id.raw() as i64, chapter_id.raw() as i64])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    /// Archives a branch's scenes into columnar storage once it's no longer
    /// the active branch (forked-away history, §4.1).
    pub fn archive_scenes(&self, story_id: StoryId, branch_id: BranchId, scenes: &[(u64, u64, u32, bool)]) -> Result<(), StorageError> {
        for (scene_id, chapter_id, sequence, is_deleted) in scenes {
            self.conn.execute(
                "INSERT OR REPLACE INTO archived_scenes (story_id, branch_id, scene_id, chapter_id, sequence, is_deleted) VALUES (?, ?, ?, ?, ?, ?)",
                params![story_id.raw() as i64, branch_id.raw() as i64, *scene_id as i64, *chapter_id as i64, *sequence as i32, is_deleted],
            )?;
        }
        Ok(())
    }

    /// Range query over an archived branch's scene sequence numbers.
    pub fn archived_scene_range(&self, branch_id: BranchId, from_sequence: u32, to_sequence: u32) -> Result<Vec<(u64, u32)>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT scene_id, sequence FROM archived_scenes WHERE branch_id = ? AND sequence BETWEEN ? AND ? ORDER BY sequence")?;
        let rows = stmt.query_map(params![branch_id.raw() as i64, from_sequence as i32, to_sequence as i32], |row| {
            let scene_id: i64 = row.get(0)?;
            let sequence: i32 = row.get(1)?;
            Ok((scene_id as u64, sequence as u32))
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(StorageError::from)
    }

    /// Registers or updates a story's directory entry (world membership,
    /// title, current active branch), kept current as the caller's
    /// `weave_core::Story` row changes.
    pub fn upsert_story_directory(&self, story_id: StoryId, world_id: Option<u64>, title: &str, active_branch_id: BranchId) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO story_directory (story_id, world_id, title, active_branch_id) VALUES (?, ?, ?, ?)",
            params![story_id.raw() as i64, world_id.map(|w| w as i64), title, active_branch_id.raw() as i64],
        )?;
        Ok(())
    }

    /// Upserts one canonical (active-branch), threshold-crossed NPC's
    /// cross-story projection, called whenever `weave_npc::tracking` latches
    /// a new NPC past the importance threshold.
    pub fn upsert_canonical_npc(&self, story_id: StoryId, name: &str, role: &str, importance_score: f32) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO canonical_npcs (story_id, name, role, importance_score) VALUES (?, ?, ?, ?)",
            params![story_id.raw() as i64, name, role, importance_score as f64],
        )?;
        Ok(())
    }

    /// Every canonical, threshold-crossed CHARACTER NPC from sibling stories
    /// sharing `world_id`, excluding `exclude_story` (§4.2 cross-story block).
    pub fn canonical_tracked_npcs(&self, world_id: u64, exclude_story: StoryId) -> Result<Vec<NpcTrackingRef>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT d.story_id, d.title, n.name, n.role, n.importance_score
             FROM story_directory d JOIN canonical_npcs n ON d.story_id = n.story_id
             WHERE d.world_id = ? AND d.story_id != ?",
        )?;
        let rows = stmt.query_map(params![world_id as i64, exclude_story.raw() as i64], |row| {
            let story_id: i64 = row.get(0)?;
            let story_title: String = row.get(1)?;
            let name: String = row.get(2)?;
            let role: String = row.get(3)?;
            let importance_score: f64 = row.get(4)?;
            Ok(NpcTrackingRef { story_id: StoryId::new(story_id as u64), story_title, name, role, importance_score: importance_score as f32 })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(StorageError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_round_trips() {
        let store = DuckDbColdStore::in_memory().unwrap();
        let payload = vec![1, 2, 3, 4];
        store.save_npc_snapshot(StoryId::new(1), BranchId::new(1), ChapterId::new(1), SceneSequence::new(10), &payload).unwrap();
        let loaded = store.load_npc_snapshot(StoryId::new(1), BranchId::new(1), ChapterId::new(1)).unwrap();
        assert_eq!(loaded, Some(payload));
    }

    #[test]
    fn missing_snapshot_returns_none() {
        let store = DuckDbColdStore::in_memory().unwrap();
        assert!(store.load_npc_snapshot(StoryId::new(1), BranchId::new(1), ChapterId::new(9)).unwrap().is_none());
    }

    #[test]
    fn cross_story_lookup_excludes_current_story_and_other_worlds() {
        let store = DuckDbColdStore::in_memory().unwrap();
        store.upsert_story_directory(StoryId::new(1), Some(7), "Story One", BranchId::new(1)).unwrap();
        store.upsert_story_directory(StoryId::new(2), Some(7), "Story Two", BranchId::new(1)).unwrap();
        store.upsert_story_directory(StoryId::new(3), Some(9), "Other World", BranchId::new(1)).unwrap();
        store.upsert_canonical_npc(StoryId::new(1), "Mira", "innkeeper", 80.0).unwrap();
        store.upsert_canonical_npc(StoryId::new(2), "Corvin", "smith", 60.0).unwrap();
        store.upsert_canonical_npc(StoryId::new(3), "Ghost", "spirit", 90.0).unwrap();

        let refs = store.canonical_tracked_npcs(7, StoryId::new(1)).unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].name, "Corvin");
    }

    #[test]
    fn archived_scene_range_filters_by_sequence() {
        let store = DuckDbColdStore::in_memory().unwrap();
        store.archive_scenes(StoryId::new(1), BranchId::new(1), &[(1, 1, 1, false), (2, 1, 2, false), (3, 1, 3, false)]).unwrap();
        let range = store.archived_scene_range(BranchId::new(1), 2, 3).unwrap();
        assert_eq!(range, vec![(2, 2), (3, 3)]);
    }
}
