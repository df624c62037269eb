//! Composes concrete provider implementations per user setting (§6, Design
//! Notes item 3: "a router that composes (main, extraction, embedding) per
//! user setting"). The router itself never calls out to a provider; it only
//! resolves three named choices into the trait objects the rest of the
//! engine calls.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::RouterError;
use crate::llm::{EmbeddingService, ExtractionLlm, MainLlm};

/// A named, ready-to-use provider implementation of one capability.
struct Registry<T: ?Sized> {
    providers: HashMap<String, Arc<T>>,
}

impl<T: ?Sized> Registry<T> {
    fn new() -> Self {
        Registry { providers: HashMap::new() }
    }

    fn register(&mut self, name: impl Into<String>, provider: Arc<T>) {
        self.providers.insert(name.into(), provider);
    }

    fn get(&self, name: &str) -> Result<Arc<T>, RouterError> {
        self.providers.get(name).cloned().ok_or_else(|| RouterError::UnknownProvider(name.to_string()))
    }
}

/// The user-facing choice of provider per capability (e.g. from account
/// settings), resolved against a [`ProviderRegistry`] to build a
/// [`ProviderRouter`].
#[derive(Debug, Clone)]
pub struct ProviderSelection {
    pub main: String,
    pub extraction: String,
    pub embedding: String,
}

/// Holds every registered provider implementation, keyed by name. Built once
/// at startup; a [`ProviderSelection`] is resolved against it per user.
pub struct ProviderRegistry {
    main: Registry<dyn MainLlm>,
    extraction: Registry<dyn ExtractionLlm>,
    embedding: Registry<dyn EmbeddingService>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        ProviderRegistry { main: Registry::new(), extraction: Registry::new(), embedding: Registry::new() }
    }

    pub fn register_main(&mut self, name: impl Into<String>, provider: Arc<dyn MainLlm>) {
        self.main.register(name, provider);
    }

    pub fn register_extraction(&mut self, name: impl Into<String>, provider: Arc<dyn ExtractionLlm>) {
        self.extraction.register(name, provider);
    }

    pub fn register_embedding(&mut self, name: impl Into<String>, provider: Arc<dyn EmbeddingService>) {
        self.embedding.register(name, provider);
    }

    /// Resolves a [`ProviderSelection`] into a [`ProviderRouter`], failing if
    /// any of the three named providers was never registered.
    pub fn compose(&self, selection: &ProviderSelection) -> Result<ProviderRouter, RouterError> {
        let router = ProviderRouter {
            main: self.main.get(&selection.main).inspect_err(|e| tracing::warn!(%e, "provider resolution failed"))?,
            extraction: self.extraction.get(&selection.extraction).inspect_err(|e| tracing::warn!(%e, "provider resolution failed"))?,
            embedding: self.embedding.get(&selection.embedding).inspect_err(|e| tracing::warn!(%e, "provider resolution failed"))?,
        };
        Ok(router)
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// One user's resolved (main, extraction, embedding) provider set — the
/// capability surface every other crate in this workspace calls through.
#[derive(Clone)]
pub struct ProviderRouter {
    main: Arc<dyn MainLlm>,
    extraction: Arc<dyn ExtractionLlm>,
    embedding: Arc<dyn EmbeddingService>,
}

impl ProviderRouter {
    pub fn main(&self) -> &Arc<dyn MainLlm> {
        &self.main
    }

    pub fn extraction(&self) -> &Arc<dyn ExtractionLlm> {
        &self.extraction
    }

    pub fn embedding(&self) -> &Arc<dyn EmbeddingService> {
        &self.embedding
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ChatMessage, EmbeddingHit, GenerationStream, MainLlmError};
    use async_trait::async_trait;
    use crate::error::{EmbeddingError, ExtractionLlmError};

    struct StubMain;

    #[async_trait]
    impl MainLlm for StubMain {
        async fn generate_with_messages(&self, _messages: &[ChatMessage]) -> Result<String, MainLlmError> {
            Ok("stub".to_string())
        }

        async fn generate_stream(&self, _messages: &[ChatMessage]) -> Result<GenerationStream, MainLlmError> {
            Err(MainLlmError::Request("unsupported".to_string()))
        }
    }

    struct StubExtraction;

    #[async_trait]
    impl ExtractionLlm for StubExtraction {
        async fn generate_with_messages(&self, _messages: &[ChatMessage]) -> Result<String, ExtractionLlmError> {
            Ok("{}".to_string())
        }
    }

    struct StubEmbedding;

    #[async_trait]
    impl EmbeddingService for StubEmbedding {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(texts.iter().map(|_| vec![0.0]).collect())
        }

        async fn search(&self, _query_embedding: &[f32], _top_k: u32) -> Result<Vec<EmbeddingHit>, EmbeddingError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn compose_resolves_a_registered_selection() {
        let mut registry = ProviderRegistry::new();
        registry.register_main("openai", Arc::new(StubMain));
        registry.register_extraction("openai", Arc::new(StubExtraction));
        registry.register_embedding("local", Arc::new(StubEmbedding));

        let selection = ProviderSelection { main: "openai".to_string(), extraction: "openai".to_string(), embedding: "local".to_string() };
        assert!(registry.compose(&selection).is_ok());
    }

    #[test]
    fn compose_fails_on_unknown_provider_name() {
        let registry = ProviderRegistry::new();
        let selection = ProviderSelection { main: "missing".to_string(), extraction: "missing".to_string(), embedding: "missing".to_string() };
        assert!(matches!(registry.compose(&selection), Err(RouterError::UnknownProvider(_))));
    }
}
