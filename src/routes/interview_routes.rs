use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json, Response},
};
use validator::Validate;

use crate::dto::interview_dto::{
    DraftResponse, SendMessageRequest, TranscriptResponse, VoiceTranscriptRequest,
};
use crate::services::speech::VoiceTranscript;
use crate::AppState;

#[axum::debug_handler]
pub async fn start_interview(
    State(state): State<AppState>,
    Path(submission_id): Path<String>,
) -> crate::error::Result<Response> {
    let messages = state.interviews.start(&submission_id).await?;
    Ok(Json(TranscriptResponse { messages }).into_response())
}

#[axum::debug_handler]
pub async fn send_message(
    State(state): State<AppState>,
    Path(submission_id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let messages = state.interviews.send(&submission_id, &req.text).await?;
    Ok(Json(TranscriptResponse { messages }).into_response())
}

#[axum::debug_handler]
pub async fn finish_interview(
    State(state): State<AppState>,
    Path(submission_id): Path<String>,
) -> crate::error::Result<Response> {
    let submission = state.interviews.finish(&submission_id).await?;
    Ok(Json(submission).into_response())
}

#[axum::debug_handler]
pub async fn start_voice_capture(
    State(state): State<AppState>,
    Path(submission_id): Path<String>,
) -> crate::error::Result<Response> {
    state.interviews.start_recording(&submission_id).await?;
    Ok(Json(serde_json::json!({ "recording": true })).into_response())
}

#[axum::debug_handler]
pub async fn stop_voice_capture(
    State(state): State<AppState>,
    Path(submission_id): Path<String>,
) -> crate::error::Result<Response> {
    state.interviews.stop_recording(&submission_id).await?;
    Ok(Json(serde_json::json!({ "recording": false })).into_response())
}

#[axum::debug_handler]
pub async fn push_voice_transcript(
    State(state): State<AppState>,
    Path(submission_id): Path<String>,
    Json(req): Json<VoiceTranscriptRequest>,
) -> crate::error::Result<Response> {
    let update = VoiceTranscript {
        interim: req.interim,
        r#final: req.final_text,
    };
    let draft = state
        .interviews
        .apply_voice_transcript(&submission_id, &update)
        .await?;
    Ok(Json(DraftResponse { draft }).into_response())
}
