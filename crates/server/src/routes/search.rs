use actix_web::{get, post, web, HttpResponse};
use expertsearch_common::SearchError;
use std::sync::Arc;
use tracing::{error, warn};

use crate::error::ApiError;
use crate::state::AppState;
use crate::types::{SearchQuery, StatsResponse};

fn log_failure(mode: &str, err: &SearchError) {
    match err {
        SearchError::EmptyQuery | SearchError::InvalidInput(_) => {
            warn!("{} search rejected: {}", mode, err)
        }
        _ => error!("{} search error: {}", mode, err),
    }
}

/// Semantic (vector) search
#[post("/api/search")]
pub async fn vector_search(
    body: web::Json<SearchQuery>,
    state: web::Data<Arc<AppState>>,
) -> Result<HttpResponse, ApiError> {
    let results = state
        .vector_search
        .search(&body.query)
        .await
        .inspect_err(|e| log_failure("Vector", e))?;

    Ok(HttpResponse::Ok().json(results))
}

/// Literal (substring) search
#[post("/api/traditional_search")]
pub async fn traditional_search(
    body: web::Json<SearchQuery>,
    state: web::Data<Arc<AppState>>,
) -> Result<HttpResponse, ApiError> {
    let results = state
        .profiles
        .literal_search(&body.query, state.config.literal_profile_max_chars)
        .await
        .inspect_err(|e| log_failure("Traditional", e))?;

    Ok(HttpResponse::Ok().json(results))
}

/// Embedding store statistics
#[get("/api/search/stats")]
pub async fn search_stats(state: web::Data<Arc<AppState>>) -> actix_web::Result<HttpResponse> {
    let (stats, model) = state.vector_search.stats();

    Ok(HttpResponse::Ok().json(StatsResponse {
        total_documents: stats.total_documents,
        ranked_documents: stats.ranked_documents,
        label_embeddings: stats.label_embeddings,
        dimension: stats.dimension,
        embedding_model: model,
        embedding_provider: state.vector_search.provider_name().to_string(),
        loaded_at: stats.loaded_at,
        excluded: state.vector_search.store().warnings().to_vec(),
    }))
}
