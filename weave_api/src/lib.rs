//! weave_api: the external-interface boundary (§6).
//!
//! Three capability-set traits (`ExtractionLlm`, `MainLlm`,
//! `EmbeddingService`) stand in for whichever concrete LLM or embedding
//! provider a deployment wires up, and `ProviderRouter` composes a chosen
//! implementation of each per user setting. Nothing in this crate talks to a
//! real provider: it is the seam other crates call through and tests fill
//! with scripted stand-ins.

pub mod error;
pub mod llm;
pub mod router;

pub use error::{EmbeddingError, ExtractionLlmError, MainLlmError, RouterError};
pub use llm::{ChatMessage, ChatRole, EmbeddingHit, EmbeddingService, ExtractionLlm, GenerationChunk, GenerationStream, MainLlm};
pub use router::{ProviderRegistry, ProviderRouter, ProviderSelection};
