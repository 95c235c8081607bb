//! HTTP boundary: thin axum adapters over [`RagBooksService`].
//!
//! No pipeline logic lives here — handlers deserialize, delegate, and map
//! [`RagError`] kinds onto caller-facing statuses.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use crate::service::RagBooksService;
use crate::types::{BookRef, LoadSummary, RagError};

#[derive(Debug, Serialize)]
pub struct SearchBooksResponse {
    pub books: Vec<BookRef>,
}

#[derive(Debug, Deserialize)]
pub struct LoadBooksRequest {
    pub ids: Vec<u64>,
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

/// Builds the API router over a shared service instance.
///
/// CORS is wide open; the service is meant to sit behind a dev frontend.
pub fn router(service: Arc<RagBooksService>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/books", get(books))
        .route("/load_books", post(load_books))
        .route("/ask", post(ask))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(service)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[derive(Debug, Default, Deserialize)]
struct BooksQuery {
    #[serde(default)]
    search: String,
}

async fn books(
    State(service): State<Arc<RagBooksService>>,
    Query(params): Query<BooksQuery>,
) -> Result<Json<SearchBooksResponse>, ApiError> {
    let books = service.search_catalog(&params.search).await?;
    Ok(Json(SearchBooksResponse { books }))
}

async fn load_books(
    State(service): State<Arc<RagBooksService>>,
    Json(request): Json<LoadBooksRequest>,
) -> Result<Json<LoadSummary>, ApiError> {
    let summary = service.load(&request.ids).await?;
    Ok(Json(summary))
}

async fn ask(
    State(service): State<Arc<RagBooksService>>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    let answer = service.ask(&request.question).await?;
    Ok(Json(AskResponse { answer }))
}

/// Maps pipeline errors onto HTTP statuses; bodies carry only the category
/// and human-readable reason, never internals.
struct ApiError(RagError);

impl From<RagError> for ApiError {
    fn from(err: RagError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            RagError::EmptyInput | RagError::NotReady | RagError::NoPlainText(_) => {
                StatusCode::BAD_REQUEST
            }
            RagError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RagError::Upstream(_) => StatusCode::BAD_GATEWAY,
        };
        (
            status,
            Json(ErrorBody {
                detail: self.0.to_string(),
            }),
        )
            .into_response()
    }
}
