use anyhow::Result;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use rag_search::config::AppConfig;
use rag_search::proxy::OpenAiChat;
use rag_search::rag::embeddings::OpenAiEmbeddings;
use rag_search::rag::{GenerationSettings, RAGEngine};
use rag_search::server::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    if config.api_key.is_none() {
        tracing::error!("CHATLLM_API_KEY not configured. Provider calls will likely fail.");
    }

    tracing::info!("Provider base URL: {}", config.api_url);
    tracing::info!(
        "Completion model: {} (temperature {}, max_tokens {})",
        config.model,
        config.temperature,
        config.max_tokens
    );
    tracing::info!("Embedding model: {}", config.embedding_model);

    let client = reqwest::Client::builder()
        .timeout(config.request_timeout())
        .build()?;

    let embeddings = OpenAiEmbeddings::new(
        client.clone(),
        config.api_url.clone(),
        config.api_key.clone(),
        config.embedding_model.clone(),
    );
    let completions = OpenAiChat::new(client, config.api_url.clone(), config.api_key.clone());

    let state = Arc::new(AppState {
        rag_engine: RAGEngine::new(
            Arc::new(embeddings),
            Arc::new(completions),
            GenerationSettings::from(&config),
        ),
        max_upload_bytes: config.max_upload_bytes,
    });

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Search API listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
