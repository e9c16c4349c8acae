use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json, Response},
};

use crate::error::Error;
use crate::AppState;

/// Recruiter dashboard listing, newest first.
#[axum::debug_handler]
pub async fn list_submissions(State(state): State<AppState>) -> crate::error::Result<Response> {
    let submissions = state.store.list_submissions().await?;
    Ok(Json(submissions).into_response())
}

#[axum::debug_handler]
pub async fn get_submission(
    State(state): State<AppState>,
    Path(submission_id): Path<String>,
) -> crate::error::Result<Response> {
    let submission = state
        .store
        .get_submission(&submission_id)
        .await
        .ok_or_else(|| Error::NotFound(format!("Submission not found: {}", submission_id)))?;
    Ok(Json(submission).into_response())
}
