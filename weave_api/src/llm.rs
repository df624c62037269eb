//! Capability-set interfaces for the three external services this engine
//! calls out to (§6): extraction LLM, main LLM, embedding service. Each is a
//! trait rather than a concrete client, so a provider can be swapped — or
//! replaced with a scripted stand-in in tests — without touching any caller.
//!
//! All three are `async_trait`-annotated and `Send + Sync` (§5): suspension
//! points at these boundaries are exactly where the engine's cooperative
//! scheduling model expects to yield.

use async_trait::async_trait;
use futures_core::Stream;
use std::pin::Pin;

use crate::error::{EmbeddingError, ExtractionLlmError, MainLlmError};

/// A single chat-style message exchanged with the main or extraction LLM.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage { role: ChatRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage { role: ChatRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        ChatMessage { role: ChatRole::Assistant, content: content.into() }
    }
}

/// The extraction-LLM boundary (§6): structured-output calls used by NPC
/// batch extraction, character-moment extraction, and profile generation.
/// Every caller parses the response through `weave_content::repair`, so this
/// trait only needs to return the raw text.
#[async_trait]
pub trait ExtractionLlm: Send + Sync {
    async fn generate_with_messages(&self, messages: &[ChatMessage]) -> Result<String, ExtractionLlmError>;
}

/// One chunk of a streamed main-LLM generation (§6, Design Notes item 4).
/// The original sentinel-prefix discipline (`__THINKING__:`, text for reasoning,
/// `__AUTO_TURN_START__:N` for an auto-advanced turn boundary) is realized
/// here as explicit enum variants: receivers match on the variant instead of
/// parsing a string prefix.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationChunk {
    /// Reasoning/thinking content, not part of the final narrative text.
    Thinking(String),
    /// A new turn was started automatically (e.g. round-robin auto-advance);
    /// carries the 1-based turn index that just began.
    AutoTurnStart(u32),
    /// Narrative text to append to the in-progress generation.
    Text(String),
}

pub type GenerationStream = Pin<Box<dyn Stream<Item = Result<GenerationChunk, MainLlmError>> + Send>>;

/// The main-LLM boundary (§6): scene generation for the active story.
#[async_trait]
pub trait MainLlm: Send + Sync {
    /// Single-prompt convenience call; equivalent to `generate_with_messages`
    /// with a single user message.
    async fn generate(&self, prompt: &str) -> Result<String, MainLlmError> {
        let response = self.generate_with_messages(&[ChatMessage::user(prompt)]).await?;
        Ok(response)
    }

    async fn generate_with_messages(&self, messages: &[ChatMessage]) -> Result<String, MainLlmError>;

    /// Pull-based streaming generation; the caller drives consumption by
    /// polling the returned stream rather than registering a callback.
    async fn generate_stream(&self, messages: &[ChatMessage]) -> Result<GenerationStream, MainLlmError>;
}

/// One embedding-space search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingHit {
    pub id: u64,
    pub score: f32,
}

/// The embedding-service boundary (§6): powers `weave_recall`'s dense search
/// stage and the embedding writes that happen when a scene is saved.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    async fn search(&self, query_embedding: &[f32], top_k: u32) -> Result<Vec<EmbeddingHit>, EmbeddingError>;
}
