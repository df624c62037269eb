//! Deterministic multi-query search pipeline (§4.4).
//!
//! Dense + sparse retrieval per sub-query, reciprocal-rank fusion across
//! sub-queries, an optional rerank pass, a quality gate, and ±1 neighbor
//! expansion. The `SubQueryHits -> FusedCandidate -> GatedCandidates`
//! progression below narrows a candidate set one stage at a time, the same
//! shape used for stage narrowing elsewhere in this workspace.

use std::collections::HashMap;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use weave_core::{BranchId, SceneSequence, StoryId};

/// LLM-classified intent of the user's turn (§4.4 "Query decomposition").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentType {
    /// No past scene is relevant; bypasses retrieval entirely.
    Direct,
    Recall,
    Reference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalHint {
    Past,
    Recent,
    Any,
}

/// Output of sending the user intent plus a short character roster to the
/// extraction LLM for pronoun resolution (§4.4).
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDecomposition {
    pub intent_type: IntentType,
    pub temporal_hint: Option<TemporalHint>,
    /// 1-5 natural-language sub-queries.
    pub sub_queries: Vec<String>,
    pub keywords: Option<Vec<String>>,
}

/// One embedding-service hit (§6 embedding contract).
#[derive(Debug, Clone, PartialEq)]
pub struct DenseHit {
    pub scene_id: u64,
    pub sequence: SceneSequence,
    pub chapter_id: u64,
    pub characters: Vec<String>,
    pub similarity_score: f32,
}

/// One sparse event-index hit, scored by token-overlap or keyword substring
/// match (§4.4 step 2).
#[derive(Debug, Clone, PartialEq)]
pub struct SparseEventHit {
    pub scene_id: u64,
    pub sequence: SceneSequence,
    pub score: f32,
}

/// Dense semantic search over a vector store of per-scene embeddings (§6).
#[async_trait]
pub trait DenseSearch {
    async fn search(
        &self,
        query: &str,
        story_id: StoryId,
        branch_id: BranchId,
        top_k: u32,
        exclude_sequences: &[SceneSequence],
    ) -> Vec<DenseHit>;
}

/// Sparse per-scene event-list lookup (§4.4 step 2): token-overlap scoring
/// plus substring matching on keywords.
#[async_trait]
pub trait SparseEventIndex {
    async fn scan(&self, sub_query: &str, keywords: &[String]) -> Vec<SparseEventHit>;
}

/// Cross-encoder rerank of the top-M fused candidates (§4.4 step 5,
/// optional). `NoopReranker` is the default since reranker model weights
/// are out of scope for this core.
#[async_trait]
pub trait Reranker {
    async fn rerank(&self, query: &str, candidates: Vec<FusedCandidate>) -> Vec<FusedCandidate>;
}

pub struct NoopReranker;

#[async_trait]
impl Reranker for NoopReranker {
    async fn rerank(&self, _query: &str, candidates: Vec<FusedCandidate>) -> Vec<FusedCandidate> {
        candidates
    }
}

/// A scene surviving fusion, with its accumulated RRF score (§4.4 step 4).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusedCandidate {
    pub scene_id: u64,
    pub rrf_score: f32,
}

/// Reciprocal Rank Fusion (§4.4 step 4, GLOSSARY): `score = Σ 1/(60 + rank)`
/// over every sub-query ranking the scene appears in, rank counted from 1.
pub fn reciprocal_rank_fusion(per_subquery_rankings: &[Vec<u64>]) -> Vec<FusedCandidate> {
    let mut scores: HashMap<u64, f32> = HashMap::new();
    for ranking in per_subquery_rankings {
        for (idx, scene_id) in ranking.iter().enumerate() {
            let rank = (idx + 1) as f32;
            *scores.entry(*scene_id).or_insert(0.0) += 1.0 / (60.0 + rank);
        }
    }
    let mut fused: Vec<FusedCandidate> = scores
        .into_iter()
        .map(|(scene_id, rrf_score)| FusedCandidate { scene_id, rrf_score })
        .collect();
    fused.sort_by(|a, b| b.rrf_score.partial_cmp(&a.rrf_score).unwrap_or(std::cmp::Ordering::Equal));
    fused
}

/// §4.4 step 6: "if best score < 0.60, return nothing".
pub fn passes_quality_gate(best_score: f32, quality_threshold: f32) -> bool {
    best_score >= quality_threshold
}

static STOPWORDS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["this", "that", "with", "from", "what", "when", "where", "have", "does", "were", "been", "about"].into_iter().collect());

/// Auto-synthesizes a keyword list from sub-queries when none were provided:
/// words ≥ 4 chars, minus a short stopword set (§4.4 step 2).
pub fn synthesize_keywords(sub_queries: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for query in sub_queries {
        for raw in query.split_whitespace() {
            let word: String = raw.chars().filter(|c| c.is_alphanumeric()).collect::<String>().to_lowercase();
            if word.len() >= 4 && !STOPWORDS.contains(word.as_str()) && seen.insert(word.clone()) {
                out.push(word);
            }
        }
    }
    out
}

/// Expands a surviving scene to include its ±`radius` neighbors (§4.4 step
/// 7 "narrative context"), clamped at sequence 1.
pub fn expand_neighbors(sequence: SceneSequence, radius: u32) -> Vec<SceneSequence> {
    let center = sequence.0;
    let low = center.saturating_sub(radius).max(1);
    let high = center + radius;
    (low..=high).map(SceneSequence::new).collect()
}

/// Deduplicates dense and sparse hits for one sub-query into a single
/// ranking of scene ids, dense results first (§4.4 step 3 "union, dedup").
pub fn union_candidates(dense: &[DenseHit], sparse: &[SparseEventHit]) -> Vec<u64> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for hit in dense {
        if seen.insert(hit.scene_id) {
            out.push(hit.scene_id);
        }
    }
    for hit in sparse {
        if seen.insert(hit.scene_id) {
            out.push(hit.scene_id);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rrf_sums_across_subqueries_appearing_in_both() {
        let rankings = vec![vec![1, 2, 3], vec![2, 1]];
        let fused = reciprocal_rank_fusion(&rankings);
        // scene 1: rank1 in q1 (1/61) + rank2 in q2 (1/62); scene 2: rank2 q1 (1/62) + rank1 q2 (1/61)
        let scene1 = fused.iter().find(|f| f.scene_id == 1).unwrap();
        let scene2 = fused.iter().find(|f| f.scene_id == 2).unwrap();
        assert!((scene1.rrf_score - scene2.rrf_score).abs() < 1e-6);
        let scene3 = fused.iter().find(|f| f.scene_id == 3).unwrap();
        assert!(scene3.rrf_score < scene1.rrf_score);
    }

    #[test]
    fn quality_gate_rejects_below_threshold() {
        assert!(!passes_quality_gate(0.48, 0.60));
        assert!(passes_quality_gate(0.60, 0.60));
    }

    #[test]
    fn synthesize_keywords_drops_short_words_and_stopwords() {
        let sub_queries = vec!["what happened with the kitchen fight".to_string()];
        let keywords = synthesize_keywords(&sub_queries);
        assert!(keywords.contains(&"kitchen".to_string()));
        assert!(keywords.contains(&"fight".to_string()));
        assert!(!keywords.contains(&"what".to_string()));
        assert!(!keywords.contains(&"the".to_string()));
    }

    #[test]
    fn expand_neighbors_clamps_at_one() {
        let neighbors = expand_neighbors(SceneSequence::new(1), 1);
        assert_eq!(neighbors, vec![SceneSequence::new(1), SceneSequence::new(2)]);
    }

    #[test]
    fn union_candidates_dedupes_preferring_dense_order() {
        let dense = vec![
            DenseHit { scene_id: 1, sequence: SceneSequence::new(1), chapter_id: 1, characters: vec![], similarity_score: 0.9 },
            DenseHit { scene_id: 2, sequence: SceneSequence::new(2), chapter_id: 1, characters: vec![], similarity_score: 0.8 },
        ];
        let sparse = vec![SparseEventHit { scene_id: 2, sequence: SceneSequence::new(2), score: 0.5 }, SparseEventHit { scene_id: 3, sequence: SceneSequence::new(3), score: 0.4 }];
        let union = union_candidates(&dense, &sparse);
        assert_eq!(union, vec![1, 2, 3]);
    }
}
