//! Extraction-LLM contract schemas (§6): NPC batches, character moments, and
//! full NPC profiles. Every field tolerates the extractor omitting it
//! (`#[serde(default)]`) so a partially-filled response is still usable
//! rather than a hard parse failure.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Advisory classification from the extractor (§3, §9 Open Question: always
/// stored, filtered to `Character` only at tiering time).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExtractionEntityType {
    Character,
    Entity,
    /// Anything else the extractor returns; treated like `Entity`.
    #[serde(other)]
    Unknown,
}

impl Default for ExtractionEntityType {
    fn default() -> Self {
        ExtractionEntityType::Unknown
    }
}

/// `properties{role, description}` on one extracted NPC (§6).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedNpcProperties {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub description: String,
}

/// One entry of `{npcs: [...]}` (§6 NPC batch schema).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedNpc {
    pub name: String,
    #[serde(default)]
    pub entity_type: ExtractionEntityType,
    #[serde(default)]
    pub mention_count: u32,
    #[serde(default)]
    pub has_dialogue: bool,
    #[serde(default)]
    pub has_actions: bool,
    #[serde(default)]
    pub has_relationships: bool,
    #[serde(default)]
    pub context_snippets: Vec<String>,
    #[serde(default)]
    pub properties: ExtractedNpcProperties,
}

/// `{npcs: [{name, entity_type, ...}]}` (§6).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NpcBatchResponse {
    #[serde(default)]
    pub npcs: Vec<ExtractedNpc>,
}

/// `moment_type ∈ {action, dialogue, development, relationship}` (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MomentType {
    Action,
    Dialogue,
    Development,
    Relationship,
}

/// One entry of `{moments: [...]}` (§6 character-moment schema).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterMoment {
    pub character_name: String,
    pub moment_type: MomentType,
    pub content: String,
    /// `confidence ∈ [0, 100]`; clamped on construction, not trusted raw.
    #[serde(rename = "confidence", default)]
    confidence_raw: f32,
}

impl CharacterMoment {
    /// Confidence clamped into `[0, 100]` regardless of what the extractor sent.
    pub fn confidence(&self) -> f32 {
        self.confidence_raw.clamp(0.0, 100.0)
    }

    /// Whether this moment clears the configured acceptance bar
    /// (`extraction_confidence_threshold`, §6 tunable configuration).
    pub fn meets_threshold(&self, threshold: f32) -> bool {
        self.confidence() >= threshold
    }
}

/// `{moments: [...]}` (§6).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CharacterMomentsResponse {
    #[serde(default)]
    pub moments: Vec<CharacterMoment>,
}

/// Full NPC profile extracted once a tracking row crosses the importance
/// threshold (§4.2 "threshold crossing"). `relationships` is a map from the
/// other character's name to a short relationship description, matching the
/// extractor's `relationships{}` shape; conversion to the tracker's flat
/// `NpcProfile.relationships` string happens in `weave_npc`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NpcProfileResponse {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub personality: Vec<String>,
    #[serde(default)]
    pub background: String,
    #[serde(default)]
    pub goals: String,
    #[serde(default)]
    pub relationships: HashMap<String, String>,
    #[serde(default)]
    pub appearance: String,
}

impl NpcProfileResponse {
    /// §4.2: "require at least one non-empty field" before a profile is
    /// accepted by the tracker.
    pub fn has_any_field(&self) -> bool {
        !self.role.is_empty()
            || !self.description.is_empty()
            || !self.personality.is_empty()
            || !self.background.is_empty()
            || !self.goals.is_empty()
            || !self.relationships.is_empty()
            || !self.appearance.is_empty()
    }

    /// Renders `relationships{}` into the flat, ordered string the tracker
    /// stores (`"Mira: old rival; Gareth: trusted ally"`).
    pub fn relationships_summary(&self) -> String {
        let mut pairs: Vec<_> = self.relationships.iter().collect();
        pairs.sort_by(|a, b| a.0.cmp(b.0));
        pairs
            .into_iter()
            .map(|(name, desc)| format!("{name}: {desc}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}
