//! weave_context: the multi-message prompt assembly pipeline (§4.3).
//!
//! Produces the `{role, content}` message list the main LLM receives for one
//! generation turn, holding to the stable-to-dynamic ordering discipline that
//! lets provider-side prefix caches hit on consecutive turns. Each builder
//! stage method fills in exactly one ordered slot, so the message list is
//! always appended to, never reordered or mutated in place.

pub mod budget;
pub mod npc_block;
pub mod pipeline;
pub mod summary;
pub mod task_message;
pub mod turn_mode;

pub use budget::{allocate_dynamic_budget, CharDiv4Counter, DynamicBudget, ShrinkStep, TiktokenCounter, TokenCounter, SHRINK_CASCADE};
pub use npc_block::format_npc_tier_block;
pub use pipeline::{AssembledPrompt, Message, MessageAssemblyBuilder, PipelineError, Role};
pub use summary::{needs_chapter_resummary, should_include_conversation_summary};
pub use task_message::{build_task_message, InputMode};
pub use turn_mode::{resolve_manual, resolve_natural, resolve_round_robin, ScriptedRoll, TalkRoll, Xorshift64Roll};
