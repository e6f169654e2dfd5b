use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::{Method, StatusCode},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::{ApiError, RagError};
use crate::models::{
    Endpoints, ModelConfig, SearchQuery, SearchResponse, StatusResponse, SystemState,
    UploadResponse,
};
use crate::rag::RAGEngine;

pub struct AppState {
    pub rag_engine: RAGEngine,
    pub max_upload_bytes: usize,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(status_handler))
        .route("/api/search", post(search_handler))
        .route(
            "/api/upload",
            post(upload_handler).layer(DefaultBodyLimit::max(state.max_upload_bytes)),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let engine = &state.rag_engine;
    let settings = engine.settings();

    Json(StatusResponse {
        message: "Welcome to the Search API".to_string(),
        status: "active".to_string(),
        endpoints: Endpoints {
            search: "/api/search".to_string(),
            upload: "/api/upload".to_string(),
        },
        system_state: SystemState {
            documents_indexed: engine.document_count().await,
            embeddings_available: engine.embeddings_available().await,
        },
        config: ModelConfig {
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        },
    })
}

async fn search_handler(
    State(state): State<Arc<AppState>>,
    Json(query): Json<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    let outcome = state.rag_engine.search(&query.query).await?;
    Ok(Json(SearchResponse::new(outcome.answer, outcome.retrieved_docs)))
}

async fn upload_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let (filename, content) = read_upload(multipart)
        .await
        .map_err(ApiError::upload_failed)?;
    tracing::info!("Successfully read file: {}", filename);

    state
        .rag_engine
        .add_document(content)
        .await
        .map_err(ApiError::upload_failed)?;
    tracing::info!("Successfully created embedding for file: {}", filename);

    Ok(Json(UploadResponse {
        message: "Document uploaded and embedded successfully".to_string(),
    }))
}

fn multipart_error(err: MultipartError) -> RagError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        RagError::PayloadTooLarge(err.body_text())
    } else {
        RagError::Decode(err.body_text())
    }
}

/// Pulls the uploaded file out of the form: the `file` field, or failing
/// that the first field that carries a filename.
async fn read_upload(mut multipart: Multipart) -> Result<(String, String), RagError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        let is_file = field.name() == Some("file") || field.file_name().is_some();
        if !is_file {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;
        let content =
            String::from_utf8(bytes.to_vec()).map_err(|e| RagError::Decode(e.to_string()))?;
        return Ok((filename, content));
    }

    Err(RagError::MissingFile)
}
