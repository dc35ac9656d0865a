//! Paper listing handler

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::AppState;
use paperdash_common::{
    errors::{AppError, Result},
    models::Paper,
};

#[derive(Debug, Deserialize)]
pub struct ListPapersQuery {
    /// Number of papers wanted; the dashboard grid size when absent
    pub max_results: Option<usize>,
}

#[derive(Serialize)]
pub struct ListPapersResponse {
    pub total_results: usize,
    pub papers: Vec<Paper>,
}

/// List enriched papers in display order
pub async fn list_papers(
    State(state): State<AppState>,
    Query(query): Query<ListPapersQuery>,
) -> Result<Json<ListPapersResponse>> {
    let fetch = &state.config.fetch;
    let max_results = query.max_results.unwrap_or(fetch.default_max_results);

    if max_results > fetch.max_results_limit {
        return Err(AppError::Validation {
            message: format!(
                "max_results must be at most {}",
                fetch.max_results_limit
            ),
            field: Some("max_results".to_string()),
        });
    }

    let papers = state
        .papers
        .fetch_papers_with_timeout(max_results, state.config.fetch_timeout())
        .await?;

    Ok(Json(ListPapersResponse {
        total_results: papers.len(),
        papers,
    }))
}
