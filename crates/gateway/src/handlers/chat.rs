//! Chat-with-paper handler
//!
//! Stateless: the client sends the transcript it holds and gets it back
//! with the new turn appended.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use paperdash_common::{
    chat::{ChatMessage, ChatSession},
    errors::{AppError, Result},
};

#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(max = 4000))]
    pub message: String,

    /// Transcript so far; a fresh conversation when empty
    #[serde(default)]
    #[validate(length(max = 200))]
    pub messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub paper_id: String,
    /// Absent when the message was blank
    pub reply: Option<ChatMessage>,
    pub messages: Vec<ChatMessage>,
}

pub async fn chat(
    State(state): State<AppState>,
    Path(paper_id): Path<String>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    request.validate().map_err(|e| AppError::Validation {
        field: e.field_errors().keys().next().map(|f| f.to_string()),
        message: e.to_string(),
    })?;

    let paper = state.papers.find_paper(&paper_id).await?;

    let mut session = ChatSession::resume(
        &paper.title,
        request.messages,
        state.config.chat_reply_delay(),
        state.config.chat.canned_reply.clone(),
    );
    let reply = session.send(&request.message).await?;

    Ok(Json(ChatResponse {
        paper_id,
        reply,
        messages: session.into_messages(),
    }))
}
