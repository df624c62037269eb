//! weave_recall: semantic recall and the ReAct recall agent (§4.4).
//!
//! Two retrieval paths share one quality bar: the deterministic multi-query
//! pipeline (dense + sparse + RRF fusion + optional rerank + quality gate +
//! neighbor expansion) in [`search`], and the alternative ReAct tool-calling
//! agent in [`agent`] for `recall`-intent queries. Both are entirely
//! best-effort (§4.4, §7 kind 3): any failure degrades to no
//! "Relevant past turns" message rather than surfacing an error.

pub mod agent;
pub mod search;

pub use search::{
    passes_quality_gate, reciprocal_rank_fusion, synthesize_keywords, DenseHit, DenseSearch,
    FusedCandidate, IntentType, NoopReranker, QueryDecomposition, Reranker, SparseEventHit,
    SparseEventIndex, TemporalHint,
};

pub use agent::{
    parse_react_output, try_parse_json, AgentLlm, AgentResult, AgentRunner, FinalAnswer,
    GetNearbyScenesTool, ListChapterScenesTool, ReactStep, ReadScenesTool, ReadSceneTool,
    RecallTool, SceneSource, SearchEventsTool, SearchScenesTool, ToolCall,
};
