//! Summarization gate (§4.3): when a conversation summary message is
//! included, and when a chapter's cached auto-summary is stale enough to
//! regenerate.

use weave_core::config::ContextAssemblyConfig;

/// §4.3 message 7: the conversation summary is inserted only once the total
/// turn count exceeds `summary_turn_threshold` (default 30).
pub fn should_include_conversation_summary(total_turn_count: u32, cfg: &ContextAssemblyConfig) -> bool {
    total_turn_count > cfg.summary_turn_threshold
}

/// §4.3 "Summarization gate": chapter auto-summaries regenerate only once
/// `turns_since_last_summary >= summary_interval`.
pub fn needs_chapter_resummary(turns_since_last_summary: u32, cfg: &ContextAssemblyConfig) -> bool {
    turns_since_last_summary >= cfg.summary_interval
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_included_only_past_threshold() {
        let cfg = ContextAssemblyConfig::default();
        assert!(!should_include_conversation_summary(cfg.summary_turn_threshold, &cfg));
        assert!(should_include_conversation_summary(cfg.summary_turn_threshold + 1, &cfg));
    }

    #[test]
    fn resummary_gate_fires_at_interval() {
        let cfg = ContextAssemblyConfig::default();
        assert!(!needs_chapter_resummary(cfg.summary_interval - 1, &cfg));
        assert!(needs_chapter_resummary(cfg.summary_interval, &cfg));
    }
}
