//! Plain data structs for the entities enumerated in §3.
//!
//! Identifier-based references throughout (Design Notes item 2): no entity
//! owns another by value or back-pointer, everything is looked up through a
//! store keyed by id.

use crate::ids::{
    BranchId, ChapterId, CharacterId, SceneId, SceneSequence, SceneVariantId, StoryCharacterId,
    StoryId, WorldId,
};
use crate::relationship::RelationshipEntry;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Narrative mode of a [`Story`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoryMode {
    Dynamic,
    Structured,
    Roleplay,
}

/// Content rating of a [`Story`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentRating {
    Sfw,
    Nsfw,
}

/// Who is selected to respond on a given turn (§4.3 turn-mode resolution).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnMode {
    Natural,
    RoundRobin,
    Manual,
}

/// Root container for a narrative (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Story {
    pub id: StoryId,
    pub title: CompactString,
    pub owner_id: CompactString,
    pub mode: StoryMode,
    pub content_rating: ContentRating,
    pub active_branch_id: BranchId,
    /// Cross-story sharing scope; `None` means the story does not belong to a world.
    pub world_id: Option<WorldId>,
    /// Monotonic counter advanced on every generation turn.
    pub creation_step: u64,
    pub turn_mode: TurnMode,
    /// Open Question 3 (§9): resolved as story-scoped, not per-branch.
    pub last_responder_idx: Option<u32>,
}

impl Story {
    pub fn new(id: StoryId, title: impl Into<CompactString>, owner_id: impl Into<CompactString>, active_branch_id: BranchId) -> Self {
        Story {
            id,
            title: title.into(),
            owner_id: owner_id.into(),
            mode: StoryMode::Dynamic,
            content_rating: ContentRating::Sfw,
            active_branch_id,
            world_id: None,
            creation_step: 0,
            turn_mode: TurnMode::Natural,
            last_responder_idx: None,
        }
    }
}

/// Named version of a story (§3, §4.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    pub id: BranchId,
    pub story_id: StoryId,
    pub name: CompactString,
    pub is_main: bool,
    pub is_active: bool,
    pub forked_from_branch_id: Option<BranchId>,
    pub forked_at_scene_sequence: Option<SceneSequence>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Branch {
    pub fn new_main(id: BranchId, story_id: StoryId, name: impl Into<CompactString>, now: i64) -> Self {
        Branch {
            id,
            story_id,
            name: name.into(),
            is_main: true,
            is_active: true,
            forked_from_branch_id: None,
            forked_at_scene_sequence: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// The fundamental narrative unit; holds no text directly (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    pub id: SceneId,
    pub story_id: StoryId,
    pub branch_id: BranchId,
    pub chapter_id: ChapterId,
    pub sequence: SceneSequence,
    pub is_deleted: bool,
}

/// How a [`SceneVariant`] was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationMethod {
    Auto,
    Regenerate,
    UserWritten,
    Direction,
    Custom,
}

/// A concrete textual version of a scene (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneVariant {
    pub id: SceneVariantId,
    pub scene_id: SceneId,
    pub variant_number: u32,
    pub is_original: bool,
    pub content: String,
    pub title: Option<CompactString>,
    pub generation_method: GenerationMethod,
    /// Pre-edit snapshot of `content`, set the first time a user edits the variant.
    pub original_content: Option<String>,
    pub user_edited: bool,
    /// Opaque prompt-state blob captured at generation time; required for
    /// deterministic regeneration (§3 invariant).
    pub context_snapshot: Vec<u8>,
}

impl SceneVariant {
    /// Mark this variant user-edited, stashing the pre-edit text exactly once.
    pub fn apply_user_edit(&mut self, new_content: String) {
        if self.original_content.is_none() {
            self.original_content = Some(self.content.clone());
        }
        self.content = new_content;
        self.user_edited = true;
    }
}

/// Selects which variant is active at each scene position (§3).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StoryFlow {
    pub story_id: StoryId,
    pub branch_id: BranchId,
    pub sequence: SceneSequence,
    pub scene_id: SceneId,
    pub variant_id: SceneVariantId,
    pub is_active: bool,
}

/// Preset voice-style buckets layered under free-form overrides (§3, new).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoiceStylePreset {
    Formal,
    Casual,
    Poetic,
    Blunt,
    Custom,
}

/// Dialogue-style descriptor rendered in context-assembly message 4 (§4.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceStyle {
    pub preset: VoiceStylePreset,
    pub formality: Option<CompactString>,
    pub vocabulary: Option<CompactString>,
    pub tone: Option<CompactString>,
    pub profanity: Option<CompactString>,
    pub secondary_language: Option<CompactString>,
    pub mixing: Option<CompactString>,
}

impl Default for VoiceStyle {
    fn default() -> Self {
        VoiceStyle {
            preset: VoiceStylePreset::Casual,
            formality: None,
            vocabulary: None,
            tone: None,
            profanity: None,
            secondary_language: None,
            mixing: None,
        }
    }
}

/// A library entry, independent of any story (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: CompactString,
    pub description: String,
    pub personality_traits: Vec<CompactString>,
    pub background: String,
    pub goals: String,
    pub fears: String,
    pub appearance: String,
    pub voice_style: Option<VoiceStyle>,
    pub owner_id: CompactString,
}

/// One entry in a character's development history (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevelopmentEntry {
    pub entry_type: CompactString,
    pub description: String,
    pub is_defining: bool,
}

/// Associates a [`Character`] with a Story+Branch (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryCharacter {
    pub id: StoryCharacterId,
    pub story_id: StoryId,
    pub branch_id: BranchId,
    pub character_id: CharacterId,
    pub role: CompactString,
    pub voice_style_override: Option<VoiceStyle>,
    pub emotional_state: CompactString,
    pub current_location: CompactString,
    pub current_goals: String,
    pub relationships: HashMap<CompactString, RelationshipEntry>,
    pub development: Vec<DevelopmentEntry>,
    pub is_player_character: bool,
    pub is_active: bool,
    pub source_story_id: Option<StoryId>,
    /// In `[0,1]`; clamped on construction by [`StoryCharacter::new`] and
    /// [`StoryCharacter::set_talkativeness`].
    talkativeness: f32,
}

impl StoryCharacter {
    pub fn new(
        id: StoryCharacterId,
        story_id: StoryId,
        branch_id: BranchId,
        character_id: CharacterId,
        role: impl Into<CompactString>,
        talkativeness: f32,
    ) -> Self {
        StoryCharacter {
            id,
            story_id,
            branch_id,
            character_id,
            role: role.into(),
            voice_style_override: None,
            emotional_state: CompactString::const_new(""),
            current_location: CompactString::const_new(""),
            current_goals: String::new(),
            relationships: HashMap::new(),
            development: Vec::new(),
            is_player_character: false,
            is_active: true,
            source_story_id: None,
            talkativeness: talkativeness.clamp(0.0, 1.0),
        }
    }

    pub fn talkativeness(&self) -> f32 {
        self.talkativeness
    }

    pub fn set_talkativeness(&mut self, value: f32) {
        self.talkativeness = value.clamp(0.0, 1.0);
    }
}

/// Groups scenes; holds summary batches for partial regeneration (§3, §4.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    pub id: ChapterId,
    pub story_id: StoryId,
    pub branch_id: BranchId,
    pub number: u32,
    pub title: Option<CompactString>,
    pub plot_point: Option<String>,
    pub story_so_far_summary: Option<String>,
    pub auto_summary: Option<String>,
    /// Scene count at which the last auto-summary ran.
    pub last_summary_scene_count: u32,
    /// Scene count at which the last NPC/moment extraction ran.
    pub last_extraction_scene_count: u32,
    pub scenario_text: Option<String>,
    pub summary_batches: Vec<SummaryBatch>,
}

/// A partial-regeneration unit for chapter summarization (§4.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryBatch {
    pub start_scene_sequence: SceneSequence,
    pub end_scene_sequence: SceneSequence,
    pub summary_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn story_character_clamps_talkativeness() {
        let sc = StoryCharacter::new(
            StoryCharacterId::new(1),
            StoryId::new(1),
            BranchId::new(1),
            CharacterId::new(1),
            "villain",
            1.5,
        );
        assert_eq!(sc.talkativeness(), 1.0);
    }

    #[test]
    fn variant_edit_stashes_original_once() {
        let mut v = SceneVariant {
            id: SceneVariantId::new(1),
            scene_id: SceneId::new(1),
            variant_number: 1,
            is_original: true,
            content: "first".into(),
            title: None,
            generation_method: GenerationMethod::Auto,
            original_content: None,
            user_edited: false,
            context_snapshot: Vec::new(),
        };
        v.apply_user_edit("second".into());
        v.apply_user_edit("third".into());
        assert_eq!(v.original_content.as_deref(), Some("first"));
        assert_eq!(v.content, "third");
    }
}
