pub mod embeddings;
pub mod retriever;
pub mod vector_store;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use uuid::Uuid;

use self::embeddings::EmbeddingProvider;
use self::retriever::retrieve;
use self::vector_store::VectorStore;
use crate::config::AppConfig;
use crate::error::{ProviderError, RagError, RagResult};
use crate::models::{ChatRequest, Message};
use crate::proxy::CompletionProvider;

const CONTEXT_SEPARATOR: &str = "\n---\n";
const SYSTEM_INSTRUCTION: &str = "You are a helpful assistant. Use the following context to answer the user's question. If the answer is not in the context, say you don't know.";
const NO_RESPONSE: &str = "No valid response received from API";

#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_k: usize,
    pub request_timeout: Duration,
}

impl From<&AppConfig> for GenerationSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            top_k: config.top_k,
            request_timeout: config.request_timeout(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub answer: String,
    pub retrieved_docs: Vec<String>,
}

/// Owns the document store and drives upload and search through the providers.
pub struct RAGEngine {
    embeddings: Arc<dyn EmbeddingProvider>,
    completions: Arc<dyn CompletionProvider>,
    store: RwLock<VectorStore>,
    settings: GenerationSettings,
}

async fn with_timeout<T, F>(limit: Duration, call: F) -> Result<T, ProviderError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| ProviderError::Timeout(limit))?
}

pub fn build_context(docs: &[String]) -> String {
    docs.join(CONTEXT_SEPARATOR)
}

pub fn system_prompt(context: &str) -> String {
    format!("{}\n\nContext:\n{}", SYSTEM_INSTRUCTION, context)
}

impl RAGEngine {
    pub fn new(
        embeddings: Arc<dyn EmbeddingProvider>,
        completions: Arc<dyn CompletionProvider>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            embeddings,
            completions,
            store: RwLock::new(VectorStore::new()),
            settings,
        }
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub async fn document_count(&self) -> usize {
        self.store.read().await.size()
    }

    pub async fn embeddings_available(&self) -> bool {
        self.store.read().await.dimension().is_some()
    }

    async fn embed(&self, text: &str) -> RagResult<Vec<f32>> {
        with_timeout(self.settings.request_timeout, self.embeddings.embed(text))
            .await
            .map_err(RagError::Embedding)
    }

    /// Embeds `text` and appends it to the store, returning its index.
    pub async fn add_document(&self, text: String) -> RagResult<usize> {
        if text.trim().is_empty() {
            return Err(RagError::EmptyInput("Document"));
        }

        let embedding = self.embed(&text).await?;
        tracing::debug!(
            model = self.embeddings.model_name(),
            "Document embedding dimension: {}",
            embedding.len()
        );

        let mut store = self.store.write().await;
        let index = store.append(text, embedding)?;
        tracing::info!(
            "Stored document and embedding. Total documents: {}",
            store.size()
        );
        Ok(index)
    }

    /// Retrieves the closest documents for `query` and asks the completion
    /// provider to answer with them as context.
    pub async fn search(&self, query: &str) -> RagResult<SearchOutcome> {
        let request_id = Uuid::new_v4();
        tracing::info!(%request_id, "Received search query: {}", query);

        if query.trim().is_empty() {
            return Err(RagError::EmptyInput("Search query"));
        }

        let size = self.document_count().await;
        tracing::info!(%request_id, "Documents indexed: {}", size);
        if size == 0 {
            return Err(RagError::EmptyStore);
        }

        let query_embedding = self.embed(query).await?;
        tracing::info!(%request_id, "Query embedding dimension: {}", query_embedding.len());

        let retrieved_docs: Vec<String> = {
            let store = self.store.read().await;
            retrieve(&query_embedding, &store, self.settings.top_k)?
                .into_iter()
                .map(|hit| hit.document)
                .collect()
        };
        tracing::info!(%request_id, "Retrieved {} documents", retrieved_docs.len());

        let request = ChatRequest {
            model: self.settings.model.clone(),
            messages: vec![
                Message::system(system_prompt(&build_context(&retrieved_docs))),
                Message::user(query),
            ],
            temperature: Some(self.settings.temperature),
            max_tokens: Some(self.settings.max_tokens),
        };

        let response = with_timeout(
            self.settings.request_timeout,
            self.completions.chat_completion(request),
        )
        .await
        .map_err(RagError::Completion)?;
        tracing::info!(%request_id, "Completion received from model {}", response.model);

        let answer = match response.choices.into_iter().next() {
            Some(choice) => choice.message.content,
            None => {
                tracing::error!(%request_id, "{}", NO_RESPONSE);
                NO_RESPONSE.to_string()
            }
        };

        Ok(SearchOutcome {
            answer,
            retrieved_docs,
        })
    }
}
