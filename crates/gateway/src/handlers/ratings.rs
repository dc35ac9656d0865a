//! Rating handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use paperdash_common::{
    errors::{AppError, Result},
    models::{RatingRecord, Sentiment},
};

/// Request to set a paper's rating
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRatingRequest {
    #[validate(range(min = 1, max = 5))]
    pub rating: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingResponse {
    pub paper_id: String,
    pub rating: u8,
    pub label: &'static str,
    /// False while the paper still shows the default rating
    pub rated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl RatingResponse {
    fn new(paper_id: String, rating: u8, record: Option<&RatingRecord>) -> Self {
        Self {
            paper_id,
            rating,
            label: Sentiment::from_rating(rating)
                .map(Sentiment::label)
                .unwrap_or("Unknown"),
            rated: record.is_some(),
            timestamp: record.map(|r| r.timestamp),
        }
    }
}

/// All stored ratings
pub async fn list_ratings(State(state): State<AppState>) -> Json<Vec<RatingRecord>> {
    let store = state.ratings.read().await;
    Json(store.get_all_ratings())
}

/// Rating of one paper, the neutral default when never rated
pub async fn get_rating(
    State(state): State<AppState>,
    Path(paper_id): Path<String>,
) -> Json<RatingResponse> {
    let store = state.ratings.read().await;
    let rating = store.get_rating(&paper_id);
    let record = store.get_record(&paper_id);
    Json(RatingResponse::new(paper_id, rating, record))
}

/// Set the rating of one paper
pub async fn update_rating(
    State(state): State<AppState>,
    Path(paper_id): Path<String>,
    Json(request): Json<UpdateRatingRequest>,
) -> Result<Json<RatingResponse>> {
    request.validate().map_err(|_| AppError::InvalidRating {
        rating: request.rating,
    })?;

    // Range checked above
    let rating = request.rating as u8;

    let mut store = state.ratings.write().await;
    store.update_rating(&paper_id, rating)?;

    tracing::info!(paper_id = %paper_id, rating, "Paper rated");

    let record = store.get_record(&paper_id);
    Ok(Json(RatingResponse::new(paper_id, rating, record)))
}

/// Remove every rating and the durable slot
pub async fn clear_ratings(State(state): State<AppState>) -> Result<StatusCode> {
    let mut store = state.ratings.write().await;
    store.clear_ratings()?;
    Ok(StatusCode::NO_CONTENT)
}
