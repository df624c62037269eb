//! weave_content: extraction-LLM schemas, the prompt template catalog, and
//! the small text utilities shared between the NPC tracker and the context
//! assembler (§6 extraction-LLM contract; §2 "misc collaborators").
//!
//! Nothing here talks to a network or a store: every type is plain data and
//! every function is pure, so the parsing/validation/chunking rules can be
//! exercised without any of the I/O-boundary crates.

pub mod chunker;
pub mod content_filter;
pub mod prompt_catalog;
pub mod repair;
pub mod schemas;
pub mod text_scan;

pub use chunker::{chunk_text, TextChunk};
pub use content_filter::{
    has_disallowed_keywords, nsfw_prevention_clause, validate_title_and_description, ContentVerdict,
};
pub use prompt_catalog::{CatalogLoadError, PromptCatalog};
pub use repair::parse_with_repair;
pub use schemas::{
    CharacterMoment, CharacterMomentsResponse, ExtractedNpc, ExtractedNpcProperties, ExtractionEntityType,
    MomentType, NpcBatchResponse, NpcProfileResponse,
};
pub use text_scan::{find_name_occurrence, mentioned_names_ordered, word_boundary_regex};
