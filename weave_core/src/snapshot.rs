//! NPC tracker snapshot type and zero-copy (de)serialization (§3 NPCTrackingSnapshot,
//! §6 reserved keys).
//!
//! Free functions (`save_snapshot`/`load_snapshot`/`deserialize_snapshot`)
//! over an archived payload, so a snapshot can be read back without
//! deserializing anything beyond the fields a given caller touches.

use crate::ids::{ChapterId, SceneSequence};
use rkyv::{rancor, Archive, Deserialize, Serialize};

/// One NPC's state at the moment a snapshot was taken, rkyv-archived.
///
/// Field-for-field with `NPCTracking` (§3) minus the extracted-profile blob,
/// which is large and optional and therefore serialized separately alongside
/// rather than inline in the hot snapshot path.
#[derive(Archive, Deserialize, Serialize, Debug, Clone, PartialEq)]
#[rkyv(compare(PartialEq), derive(Debug))]
pub struct SnapshotNpcState {
    pub name: String,
    pub total_mentions: u32,
    pub scene_count: u32,
    pub first_appearance_scene: u32,
    pub last_appearance_scene: u32,
    pub dialogue_scene_count: u32,
    pub action_scene_count: u32,
    pub is_character: bool,
    pub importance_score: f32,
    pub crossed_threshold: bool,
    pub profile_extracted: bool,
    pub converted_to_character: bool,
}

/// A pre-computed tier entry formatted for direct inclusion in context
/// assembly; active entries carry full detail, inactive entries are brief.
#[derive(Archive, Deserialize, Serialize, Debug, Clone, PartialEq)]
#[rkyv(compare(PartialEq), derive(Debug))]
pub struct SnapshotTierEntry {
    pub name: String,
    pub role: String,
    pub description: String,
    pub personality: Vec<String>,
    pub goals: String,
    pub relationships: String,
    /// Set for cross-story (world-scope) entries: `Some("Story Title")`.
    pub from_story_title: Option<String>,
}

/// The full snapshot payload (§6 reserved keys: `_active_npcs_for_context`,
/// `_inactive_npcs_for_context`, `_snapshot_scene_sequence`, `_chapter_id`),
/// plus the full per-name state map used to roll back on scene deletion.
#[derive(Archive, Deserialize, Serialize, Debug, Clone, PartialEq)]
#[rkyv(compare(PartialEq), derive(Debug))]
pub struct NpcTrackingSnapshotData {
    pub snapshot_scene_sequence: u32,
    pub chapter_id: u64,
    pub active_npcs_for_context: Vec<SnapshotTierEntry>,
    pub inactive_npcs_for_context: Vec<SnapshotTierEntry>,
    pub all_npc_state: Vec<SnapshotNpcState>,
}

impl NpcTrackingSnapshotData {
    pub fn scene_sequence(&self) -> SceneSequence {
        SceneSequence::new(self.snapshot_scene_sequence)
    }

    pub fn chapter_id(&self) -> ChapterId {
        ChapterId::new(self.chapter_id)
    }
}

/// Error type for snapshot (de)serialization.
#[derive(Debug)]
pub enum SnapshotError {
    SerializeError(String),
    DeserializeError(String),
    VersionMismatch { expected: u32, found: u32 },
    IoError(std::io::Error),
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SerializeError(e) => write!(f, "serialize error: {e}"),
            Self::DeserializeError(e) => write!(f, "deserialize error: {e}"),
            Self::VersionMismatch { expected, found } => {
                write!(f, "version mismatch: expected {expected}, found {found}")
            }
            Self::IoError(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for SnapshotError {}

impl From<std::io::Error> for SnapshotError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

/// Serializes a snapshot to rkyv bytes.
pub fn save_snapshot(snapshot: &NpcTrackingSnapshotData) -> Result<Vec<u8>, SnapshotError> {
    rkyv::to_bytes::<rancor::Error>(snapshot)
        .map(|v| v.to_vec())
        .map_err(|e| SnapshotError::SerializeError(e.to_string()))
}

/// Zero-copy validating access into an archived snapshot. The returned
/// reference borrows from `bytes`.
pub fn load_snapshot(bytes: &[u8]) -> Result<&ArchivedNpcTrackingSnapshotData, SnapshotError> {
    rkyv::access::<ArchivedNpcTrackingSnapshotData, rancor::Error>(bytes)
        .map_err(|e| SnapshotError::DeserializeError(e.to_string()))
}

/// Deserializes a snapshot from bytes into an owned value.
pub fn deserialize_snapshot(bytes: &[u8]) -> Result<NpcTrackingSnapshotData, SnapshotError> {
    let archived = load_snapshot(bytes)?;
    rkyv::deserialize::<NpcTrackingSnapshotData, rancor::Error>(archived)
        .map_err(|e| SnapshotError::DeserializeError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NpcTrackingSnapshotData {
        NpcTrackingSnapshotData {
            snapshot_scene_sequence: 12,
            chapter_id: 2,
            active_npcs_for_context: vec![SnapshotTierEntry {
                name: "Mira".into(),
                role: "innkeeper".into(),
                description: "runs the tavern".into(),
                personality: vec!["blunt".into()],
                goals: "protect her regulars".into(),
                relationships: String::new(),
                from_story_title: None,
            }],
            inactive_npcs_for_context: Vec::new(),
            all_npc_state: Vec::new(),
        }
    }

    #[test]
    fn round_trips_through_bytes() {
        let snap = sample();
        let bytes = save_snapshot(&snap).expect("serialize");
        let restored = deserialize_snapshot(&bytes).expect("deserialize");
        assert_eq!(restored, snap);
    }

    #[test]
    fn zero_copy_access_reads_scalars() {
        let snap = sample();
        let bytes = save_snapshot(&snap).expect("serialize");
        let archived = load_snapshot(&bytes).expect("access");
        assert_eq!(archived.snapshot_scene_sequence, 12);
        assert_eq!(archived.active_npcs_for_context.len(), 1);
    }
}
