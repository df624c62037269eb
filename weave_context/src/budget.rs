//! Token budgeting and overflow cascade (§4.3 "Token budgeting").
//!
//! Budgets are allocated top-down: the stable prefix (messages 1-6) consumes
//! its natural size, and the remainder is split between recent turns,
//! summary, and semantic recall. `tiktoken-rs`'s cl100k_base encoding is used
//! when available; `CharDiv4Counter` is the documented fallback approximation.

use once_cell::sync::OnceCell;
use tiktoken_rs::CoreBPE;
use weave_core::config::ContextAssemblyConfig;

/// Counts tokens in a piece of text. Implementations may be exact (an actual
/// tokenizer) or approximate (char/4), per §4.3.
pub trait TokenCounter {
    fn count(&self, text: &str) -> u32;
}

/// Exact cl100k_base counting via `tiktoken-rs`. The encoder is a
/// process-wide registry, loaded once on first use and shared by every
/// counter instance (Design Notes item 5).
pub struct TiktokenCounter;

static ENCODER: OnceCell<CoreBPE> = OnceCell::new();

impl TiktokenCounter {
    /// Builds a counter backed by the process-wide cl100k_base encoder,
    /// loading it on first use.
    pub fn new() -> Result<Self, String> {
        ENCODER.get_or_try_init(|| tiktoken_rs::cl100k_base().map_err(|e| e.to_string()))?;
        Ok(TiktokenCounter)
    }
}

impl TokenCounter for TiktokenCounter {
    fn count(&self, text: &str) -> u32 {
        let bpe = ENCODER.get().expect("TiktokenCounter::new must run before count");
        bpe.encode_with_special_tokens(text).len() as u32
    }
}

/// Fallback approximation used when a tokenizer isn't available (§4.3: "else
/// a char/4 approximation").
#[derive(Debug, Clone, Copy, Default)]
pub struct CharDiv4Counter;

impl TokenCounter for CharDiv4Counter {
    fn count(&self, text: &str) -> u32 {
        (text.chars().count() as u32).div_ceil(4)
    }
}

/// Token budget split for the dynamic portion of the prompt (messages 7-9),
/// computed after the stable prefix's natural size is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DynamicBudget {
    pub recent_turns_tokens: u32,
    pub summary_tokens: u32,
    pub recall_tokens: u32,
}

/// Splits `max_tokens - stable_prefix_tokens` between recent turns (~40% by
/// default), the inline summary (~800 chars worth, when present), and
/// semantic recall (~1500 chars worth, when present) (§4.3).
pub fn allocate_dynamic_budget(
    max_tokens: u32,
    stable_prefix_tokens: u32,
    summary_present: bool,
    recall_present: bool,
    cfg: &ContextAssemblyConfig,
) -> DynamicBudget {
    let remaining = max_tokens.saturating_sub(stable_prefix_tokens);
    let recent_turns_tokens = ((remaining as f32) * cfg.recent_turns_fraction) as u32;
    let summary_tokens = if summary_present { cfg.summary_budget_chars / 4 } else { 0 };
    let recall_tokens = if recall_present { cfg.semantic_recall_budget_chars / 4 } else { 0 };
    DynamicBudget { recent_turns_tokens, summary_tokens, recall_tokens }
}

/// Overflow cascade (§4.3: "Overflow is handled by dropping the oldest
/// recent turn first, then shrinking the semantic recall budget, then
/// truncating character descriptions"). Callers walk this in order, applying
/// one step and re-measuring, stopping once back under budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShrinkStep {
    DropOldestRecentTurn,
    ShrinkSemanticRecallBudget,
    TruncateCharacterDescriptions,
}

pub const SHRINK_CASCADE: [ShrinkStep; 3] = [
    ShrinkStep::DropOldestRecentTurn,
    ShrinkStep::ShrinkSemanticRecallBudget,
    ShrinkStep::TruncateCharacterDescriptions,
];
