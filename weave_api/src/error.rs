//! Unified error type for the external-interface boundary (§7 I/O-boundary idiom).

use thiserror::Error;

/// Error surfaced by an `ExtractionLlm` call.
#[derive(Error, Debug)]
pub enum ExtractionLlmError {
    #[error("extraction LLM request failed: {0}")]
    Request(String),
    #[error("extraction LLM response could not be parsed: {0}")]
    Parse(String),
    #[error("extraction LLM request timed out after {0}s")]
    Timeout(u64),
}

/// Error surfaced by a `MainLlm` call. Per §7, a failure here is the one
/// kind of internal error allowed to propagate all the way to the caller
/// rather than degrading to an empty result.
#[derive(Error, Debug)]
pub enum MainLlmError {
    #[error("main LLM request failed: {0}")]
    Request(String),
    #[error("main LLM stream ended unexpectedly: {0}")]
    StreamClosed(String),
    #[error("main LLM request timed out after {0}s")]
    Timeout(u64),
}

/// Error surfaced by an `EmbeddingService` call.
#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("embedding request failed: {0}")]
    Request(String),
    #[error("embedding request timed out after {0}s")]
    Timeout(u64),
}

/// Error raised by `ProviderRouter` construction or provider selection.
#[derive(Error, Debug)]
pub enum RouterError {
    #[error("no provider configured for capability `{0}`")]
    NoProvider(&'static str),
    #[error("unknown provider setting: {0}")]
    UnknownProvider(String),
}
