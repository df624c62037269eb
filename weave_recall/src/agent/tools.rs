//! The recall agent's fixed tool set (§4.4 "Tools").
//!
//! Each tool is a small struct wrapping a storage-agnostic source trait
//! object, so the agent runner never touches a concrete store directly.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::search::{DenseSearch, SparseEventIndex};
use weave_core::{BranchId, SceneSequence, StoryId};

/// A scene's content/metadata, as needed by the four read-oriented tools.
/// Storage-agnostic: the agent runner never touches a concrete store.
#[async_trait]
pub trait SceneSource {
    /// Full content of one scene, or `None` if the sequence doesn't exist
    /// (or was soft-deleted).
    async fn full_content(&self, sequence: SceneSequence) -> Option<String>;

    /// `(chapter_number, characters_present, preview_text)` for one scene.
    async fn preview(&self, sequence: SceneSequence) -> Option<(u32, Vec<String>, String)>;

    /// Every scene sequence belonging to `chapter_number`, in order.
    async fn chapter_scenes(&self, chapter_number: u32) -> Vec<SceneSequence>;
}

/// A fixed, named tool the recall agent may invoke (§4.4 "Tools").
#[async_trait]
pub trait RecallTool: Send + Sync {
    fn name(&self) -> &'static str;
    /// Executes the tool against parsed `Action Input` kwargs, returning the
    /// formatted observation text (pre-truncation; the runner truncates to
    /// 6000 chars per §4.4 step 4) or a human-readable error.
    async fn call(&self, input: &Value) -> Result<String, String>;
}

fn field_str<'a>(input: &'a Value, key: &str) -> Result<&'a str, String> {
    input.get(key).and_then(Value::as_str).ok_or_else(|| format!("missing or non-string field `{key}`"))
}

fn field_u64(input: &Value, key: &str) -> Result<u64, String> {
    input.get(key).and_then(Value::as_u64).ok_or_else(|| format!("missing or non-integer field `{key}`"))
}

fn split_comma_list(raw: &str) -> Vec<String> {
    raw.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect()
}

/// `search_scenes(query, top_k<=15)`.
pub struct SearchScenesTool {
    pub dense: Arc<dyn DenseSearch + Send + Sync>,
    pub story_id: StoryId,
    pub branch_id: BranchId,
}

#[async_trait]
impl RecallTool for SearchScenesTool {
    fn name(&self) -> &'static str {
        "search_scenes"
    }

    async fn call(&self, input: &Value) -> Result<String, String> {
        let query = field_str(input, "query")?;
        let top_k = input.get("top_k").and_then(Value::as_u64).unwrap_or(8).min(15) as u32;
        let hits = self.dense.search(query, self.story_id, self.branch_id, top_k, &[]).await;
        if hits.is_empty() {
            return Ok("No matching scenes found.".to_string());
        }
        let mut out = String::new();
        for hit in &hits {
            out.push_str(&format!(
                "scene {seq} (chapter {ch}, score {score:.2}, characters: {chars})\n",
                seq = hit.sequence.0,
                ch = hit.chapter_id,
                score = hit.similarity_score,
                chars = hit.characters.join(", "),
            ));
        }
        Ok(out.trim_end().to_string())
    }
}

/// `search_events(queries: comma-list, keywords: comma-list)`.
pub struct SearchEventsTool {
    pub sparse: Arc<dyn SparseEventIndex + Send + Sync>,
}

#[async_trait]
impl RecallTool for SearchEventsTool {
    fn name(&self) -> &'static str {
        "search_events"
    }

    async fn call(&self, input: &Value) -> Result<String, String> {
        let queries_raw = field_str(input, "queries")?;
        let keywords = input.get("keywords").and_then(Value::as_str).map(split_comma_list).unwrap_or_default();
        let mut out = String::new();
        for query in split_comma_list(queries_raw) {
            let hits = self.sparse.scan(&query, &keywords).await;
            for hit in hits {
                out.push_str(&format!("scene {seq} (event score {score:.2})\n", seq = hit.sequence.0, score = hit.score));
            }
        }
        if out.is_empty() {
            Ok("No matching events found.".to_string())
        } else {
            Ok(out.trim_end().to_string())
        }
    }
}

/// `read_scene(sequence)` truncated to 4000 chars (§4.4 tool contract).
pub struct ReadSceneTool {
    pub source: Arc<dyn SceneSource + Send + Sync>,
}

#[async_trait]
impl RecallTool for ReadSceneTool {
    fn name(&self) -> &'static str {
        "read_scene"
    }

    async fn call(&self, input: &Value) -> Result<String, String> {
        let sequence = SceneSequence::new(field_u64(input, "sequence")? as u32);
        match self.source.full_content(sequence).await {
            Some(content) => Ok(truncate_chars(&content, 4000)),
            None => Err(format!("scene {} does not exist", sequence.0)),
        }
    }
}

/// `read_scenes(sequences: comma-list, max 8)`.
pub struct ReadScenesTool {
    pub source: Arc<dyn SceneSource + Send + Sync>,
}

#[async_trait]
impl RecallTool for ReadScenesTool {
    fn name(&self) -> &'static str {
        "read_scenes"
    }

    async fn call(&self, input: &Value) -> Result<String, String> {
        let raw = field_str(input, "sequences")?;
        let sequences: Vec<u32> = split_comma_list(raw).into_iter().filter_map(|s| s.parse().ok()).take(8).collect();
        let mut out = String::new();
        for seq in sequences {
            if let Some((chapter, characters, preview)) = self.source.preview(SceneSequence::new(seq)).await {
                out.push_str(&format!(
                    "scene {seq} (chapter {chapter}, characters: {chars}): {preview}\n",
                    chars = characters.join(", "),
                ));
            }
        }
        if out.is_empty() {
            Ok("None of the requested scenes exist.".to_string())
        } else {
            Ok(out.trim_end().to_string())
        }
    }
}

/// `get_nearby_scenes(sequence, radius<=5)`.
pub struct GetNearbyScenesTool {
    pub source: Arc<dyn SceneSource + Send + Sync>,
}

#[async_trait]
impl RecallTool for GetNearbyScenesTool {
    fn name(&self) -> &'static str {
        "get_nearby_scenes"
    }

    async fn call(&self, input: &Value) -> Result<String, String> {
        let sequence = field_u64(input, "sequence")? as u32;
        let radius = input.get("radius").and_then(Value::as_u64).unwrap_or(1).min(5) as u32;
        let low = sequence.saturating_sub(radius).max(1);
        let high = sequence + radius;
        let mut out = String::new();
        for seq in low..=high {
            if seq == sequence {
                continue;
            }
            if let Some((chapter, characters, preview)) = self.source.preview(SceneSequence::new(seq)).await {
                out.push_str(&format!("scene {seq} (chapter {chapter}, characters: {chars}): {preview}\n", chars = characters.join(", ")));
            }
        }
        if out.is_empty() {
            Ok("No neighboring scenes exist.".to_string())
        } else {
            Ok(out.trim_end().to_string())
        }
    }
}

/// `list_chapter_scenes(chapter_number)`.
pub struct ListChapterScenesTool {
    pub source: Arc<dyn SceneSource + Send + Sync>,
}

#[async_trait]
impl RecallTool for ListChapterScenesTool {
    fn name(&self) -> &'static str {
        "list_chapter_scenes"
    }

    async fn call(&self, input: &Value) -> Result<String, String> {
        let chapter_number = field_u64(input, "chapter_number")? as u32;
        let sequences = self.source.chapter_scenes(chapter_number).await;
        if sequences.is_empty() {
            return Ok(format!("Chapter {chapter_number} has no scenes."));
        }
        let mut out = String::new();
        for seq in sequences {
            if let Some((chapter, characters, preview)) = self.source.preview(seq).await {
                out.push_str(&format!("scene {s} (chapter {chapter}, characters: {chars}): {preview}\n", s = seq.0, chars = characters.join(", ")));
            }
        }
        Ok(out.trim_end().to_string())
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}
