use axum::{
    extract::{Multipart, Path, State},
    response::{IntoResponse, Json, Response},
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::session_dto::{
    OpenSessionResponse, ResumeAnalyzeResponse, RunResponse, SavedResponse, SetCodeRequest,
    SwitchLanguageRequest, SwitchLanguageResponse,
};
use crate::error::Error;
use crate::models::submission::Submission;
use crate::AppState;

/// Accepts a resume PDF, extracts text and skills, and parks the
/// analysis on the transient current-submission marker until a coding
/// submission exists to own it.
#[axum::debug_handler]
pub async fn analyze_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> crate::error::Result<Response> {
    let mut file: Option<(Vec<u8>, String)> = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            let mime = field.content_type().unwrap_or_default().to_string();
            let data = field.bytes().await?;
            file = Some((data.to_vec(), mime));
        }
    }
    let Some((data, mime)) = file else {
        return Err(Error::BadRequest("Missing 'file' field".into()));
    };
    if mime != "application/pdf" {
        return Err(Error::BadRequest("Please upload a PDF file".into()));
    }

    let analysis = state.ai.analyze_resume(&data, &mime).await?;
    tracing::info!(skills = analysis.skills.len(), "Resume analyzed");

    state
        .store
        .put_current(&Submission {
            resume_text: analysis.text.clone(),
            resume_skills: analysis.skills.clone(),
            ..Default::default()
        })
        .await?;

    Ok(Json(ResumeAnalyzeResponse {
        extracted_text: analysis.text,
        skills: analysis.skills,
    })
    .into_response())
}

#[axum::debug_handler]
pub async fn open_session(
    State(state): State<AppState>,
    Path(test_id): Path<String>,
) -> crate::error::Result<Response> {
    let opened = state.sessions.open(&test_id).await?;
    Ok(Json(OpenSessionResponse {
        session_id: opened.session_id,
        test: opened.test,
        problem: opened.problem,
        language: opened.language,
        code: opened.code,
        restored: opened.restored,
    })
    .into_response())
}

#[axum::debug_handler]
pub async fn switch_language(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<SwitchLanguageRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let code = state
        .sessions
        .switch_language(session_id, &req.language)
        .await?;
    Ok(Json(SwitchLanguageResponse {
        language: req.language,
        code,
    })
    .into_response())
}

#[axum::debug_handler]
pub async fn set_code(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<SetCodeRequest>,
) -> crate::error::Result<Response> {
    state.sessions.set_code(session_id, &req.code).await?;
    Ok(Json(serde_json::json!({ "updated": true })).into_response())
}

#[axum::debug_handler]
pub async fn run_code(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let results = state.sessions.run(session_id).await?;
    let passed = results.iter().filter(|r| r.passed).count();
    let total = results.len();
    Ok(Json(RunResponse {
        results,
        passed,
        total,
    })
    .into_response())
}

#[axum::debug_handler]
pub async fn save_progress(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    state.sessions.save(session_id).await?;
    Ok(Json(SavedResponse {
        saved: true,
        timestamp: chrono::Utc::now(),
    })
    .into_response())
}

#[axum::debug_handler]
pub async fn submit_test(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let submission = state.sessions.submit(session_id).await?;
    Ok(Json(submission).into_response())
}
