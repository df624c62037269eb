//! Typed configuration aggregate (§6 Tunable Configuration, new ambient stack).
//!
//! Sub-config-per-subsystem (NPC tracking, context assembly, recall) composed
//! into one top-level [`EngineConfig`], with a `::new()`/`Default` pair and a
//! `::for_testing()` preset on every level so fixtures don't have to build
//! each layer by hand.

use serde::{Deserialize, Serialize};

/// Top-level configuration aggregate for the whole engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub npc_tracking: NpcTrackingConfig,
    pub context_assembly: ContextAssemblyConfig,
    pub recall: RecallConfig,
}

impl EngineConfig {
    pub fn new() -> Self {
        EngineConfig {
            npc_tracking: NpcTrackingConfig::default(),
            context_assembly: ContextAssemblyConfig::default(),
            recall: RecallConfig::default(),
        }
    }

    /// Faster, deterministic settings for tests: no recency decay surprises,
    /// small windows so fixtures stay short.
    pub fn for_testing() -> Self {
        EngineConfig {
            npc_tracking: NpcTrackingConfig {
                importance_threshold: 10.0,
                active_recency_window: 3,
                inactive_recency_window: 6,
                use_chapter_awareness: true,
                use_recency_decay: false,
            },
            context_assembly: ContextAssemblyConfig {
                keep_recent_scenes: 3,
                summary_threshold_scenes: 6,
                ..ContextAssemblyConfig::default()
            },
            recall: RecallConfig {
                trigger_turn_count: 2,
                ..RecallConfig::default()
            },
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Tuning for the NPC tracking & tiering engine (§4.2, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpcTrackingConfig {
    /// `npc_importance_threshold`: cutoff for crossing into `crossed_threshold=true`.
    pub importance_threshold: f32,
    /// `npc_active_recency_window`: Δ-scene limit for Tier 1.
    pub active_recency_window: u32,
    /// `npc_inactive_recency_window`: Δ-scene limit for Tier 2 (and decay window).
    pub inactive_recency_window: u32,
    /// `npc_use_chapter_awareness`: whether chapter membership auto-activates a tier.
    pub use_chapter_awareness: bool,
    /// Whether recency decay (§4.2) is applied to the base importance score.
    pub use_recency_decay: bool,
}

impl Default for NpcTrackingConfig {
    fn default() -> Self {
        NpcTrackingConfig {
            importance_threshold: 30.0,
            active_recency_window: 5,
            inactive_recency_window: 15,
            use_chapter_awareness: true,
            use_recency_decay: true,
        }
    }
}

/// Tiers capped at this many entries each (§4.2).
pub const TIER_CAP: usize = 10;

/// Tuning for the context assembly pipeline (§4.3, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextAssemblyConfig {
    /// `context_max_tokens`: overall input-token budget for one turn.
    pub max_tokens: u32,
    /// `context_keep_recent_scenes`: N of "last N" scenes to include unsummarized.
    pub keep_recent_scenes: u32,
    /// `context_summary_threshold` (scenes): when to switch to progressive summary.
    pub summary_threshold_scenes: u32,
    /// `context_summary_threshold_tokens`.
    pub summary_threshold_tokens: u32,
    /// Turn count at which a conversation summary is first considered (§4.3 msg 7).
    pub summary_turn_threshold: u32,
    /// Scenes between automatic chapter-summary regenerations.
    pub summary_interval: u32,
    /// How many oldest-first scenes make up one summary batch.
    pub summary_batch_size: u32,
    /// Character budget reserved for the inline conversation summary.
    pub summary_budget_chars: u32,
    /// Character budget reserved for the semantic-recall block.
    pub semantic_recall_budget_chars: u32,
    /// Fraction of the remaining budget given to "recent turns".
    pub recent_turns_fraction: f32,
}

impl Default for ContextAssemblyConfig {
    fn default() -> Self {
        ContextAssemblyConfig {
            max_tokens: 8000,
            keep_recent_scenes: 10,
            summary_threshold_scenes: 30,
            summary_threshold_tokens: 6000,
            summary_turn_threshold: 30,
            summary_interval: 20,
            summary_batch_size: 20,
            summary_budget_chars: 800,
            semantic_recall_budget_chars: 1500,
            recent_turns_fraction: 0.4,
        }
    }
}

/// Tuning for semantic recall and the ReAct agent (§4.4, §6).
///
/// `recall_agent_quality_score` and `recall_quality_gate` are deliberately
/// separate fields even though the original configuration table names them
/// almost identically: the first is the ReAct agent's own acceptance bar
/// (0.85, applied to whatever the agent itself judges good enough to return),
/// the second is the deterministic multi-query pipeline's fused/reranked
/// score floor (0.60, applied before ±1 neighbor expansion). Collapsing them
/// into one field would silently couple two independently-tuned gates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecallConfig {
    /// Turn count beyond which semantic recall activates.
    pub trigger_turn_count: u32,
    /// `recall_agent.enabled`. Disabled by default: the deterministic
    /// pipeline alone satisfies §4.4 unless a deployment opts into the
    /// heavier ReAct agent path.
    pub agent_enabled: bool,
    /// Minimum score the ReAct agent itself accepts before returning a
    /// `Final Answer` as successful.
    pub recall_agent_quality_score: f32,
    /// Minimum fused/reranked score the deterministic pipeline keeps before
    /// ±1 neighbor expansion.
    pub recall_quality_gate: f32,
    /// `recall_agent.max_turns`.
    pub agent_max_turns: u32,
    /// `recall_agent.timeout` in seconds.
    pub agent_timeout_secs: u64,
    /// Dense-search top-k per sub-query, before the hard cap.
    pub dense_top_k: u32,
    /// Absolute cap on dense-search top-k per sub-query.
    pub dense_top_k_cap: u32,
    /// `extraction_confidence_threshold`: minimum confidence on moment/NPC acceptance.
    pub extraction_confidence_threshold: f32,
}

impl Default for RecallConfig {
    fn default() -> Self {
        RecallConfig {
            trigger_turn_count: 15,
            agent_enabled: false,
            recall_agent_quality_score: 0.85,
            recall_quality_gate: 0.60,
            agent_max_turns: 8,
            agent_timeout_secs: 45,
            dense_top_k: 8,
            dense_top_k_cap: 15,
            extraction_confidence_threshold: 50.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_spec_constants() {
        let cfg = EngineConfig::new();
        assert_eq!(cfg.npc_tracking.importance_threshold, 30.0);
        assert_eq!(cfg.context_assembly.summary_turn_threshold, 30);
        assert_eq!(cfg.recall.trigger_turn_count, 15);
        assert_eq!(cfg.recall.recall_quality_gate, 0.60);
        assert_eq!(cfg.recall.recall_agent_quality_score, 0.85);
        assert!(!cfg.recall.agent_enabled);
    }

    #[test]
    fn for_testing_shrinks_windows() {
        let cfg = EngineConfig::for_testing();
        assert!(cfg.npc_tracking.active_recency_window < NpcTrackingConfig::default().active_recency_window);
    }
}
