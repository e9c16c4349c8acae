use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;

use assessment_backend::error::Result;
use assessment_backend::models::message::Message;
use assessment_backend::models::score::InterviewScore;
use assessment_backend::models::submission::Submission;
use assessment_backend::services::ai_service::{InterviewAi, ResumeAnalysis, ResumeContext};
use assessment_backend::services::grading_service::GradingService;
use assessment_backend::services::speech::DisabledSpeech;
use assessment_backend::store::{RecordStore, SubmissionStore};
use assessment_backend::{app, AppState};

/// Deterministic AI collaborator for end-to-end tests.
struct ScriptedAi;

#[async_trait]
impl InterviewAi for ScriptedAi {
    async fn opening_turn(&self, context: &ResumeContext) -> Result<String> {
        Ok(if context.skills.is_empty() {
            "Welcome! Tell me about yourself.".to_string()
        } else {
            format!("Welcome! I see you know {}.", context.skills.join(", "))
        })
    }

    async fn reply(
        &self,
        _context: &ResumeContext,
        history: &[Message],
        _message: &str,
    ) -> Result<String> {
        Ok(format!("Interesting, tell me more. ({} so far)", history.len()))
    }

    async fn score_transcript(&self, _transcript: &[Message]) -> Result<InterviewScore> {
        Ok(InterviewScore {
            communication: 85,
            technical_knowledge: 75,
            problem_solving: 80,
            overall_score: 80,
            feedback: "Good session".into(),
            strengths: vec!["clear answers".into()],
            areas_for_improvement: vec!["system design depth".into()],
            learning_recommendations: vec![],
        })
    }

    async fn analyze_resume(&self, _data: &[u8], _mime_type: &str) -> Result<ResumeAnalysis> {
        Ok(ResumeAnalysis {
            text: "Five years of backend work.".into(),
            skills: vec!["Rust".into(), "PostgreSQL".into()],
        })
    }
}

fn test_app() -> (tempfile::TempDir, Router, SubmissionStore) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SubmissionStore::new(RecordStore::new(dir.path()));
    let state = AppState::assemble(
        store.clone(),
        Arc::new(ScriptedAi),
        GradingService::new("node", Duration::from_secs(5)),
        Arc::new(DisabledSpeech),
    );
    (dir, app(state), store)
}

async fn request(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<JsonValue>,
) -> (StatusCode, JsonValue) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let value = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

fn multipart_upload(uri: &str, field_name: &str, content_type: &str, data: &[u8]) -> Request<Body> {
    let boundary = "candidate-flow-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{field_name}\"; \
             filename=\"resume.pdf\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .expect("request")
}

#[tokio::test]
async fn resume_analysis_parks_context_on_the_marker() {
    let (_dir, app, store) = test_app();

    // Non-PDF uploads are rejected before any collaborator call.
    let response = app
        .clone()
        .oneshot(multipart_upload(
            "/api/resume/analyze",
            "file",
            "text/plain",
            b"just some text",
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let body: JsonValue = serde_json::from_slice(&bytes).expect("json body");
    assert!(body["error"].as_str().expect("error").contains("PDF"));
    assert!(store.get_current().await.is_none());

    // A request without the `file` field is rejected too.
    let response = app
        .clone()
        .oneshot(multipart_upload(
            "/api/resume/analyze",
            "attachment",
            "application/pdf",
            b"%PDF-1.4",
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(store.get_current().await.is_none());

    // A PDF upload returns the analysis and parks it on the transient
    // current-submission marker for the later coding submit.
    let response = app
        .clone()
        .oneshot(multipart_upload(
            "/api/resume/analyze",
            "file",
            "application/pdf",
            b"%PDF-1.4 stub resume",
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let body: JsonValue = serde_json::from_slice(&bytes).expect("json body");
    assert_eq!(body["extracted_text"], "Five years of backend work.");
    assert_eq!(body["skills"][0], "Rust");
    assert_eq!(body["skills"][1], "PostgreSQL");

    let marker = store.get_current().await.expect("marker");
    assert_eq!(marker.resume_text, "Five years of backend work.");
    assert_eq!(
        marker.resume_skills,
        vec!["Rust".to_string(), "PostgreSQL".to_string()]
    );
}

#[tokio::test]
async fn health_and_catalog_are_served() {
    let (_dir, app, _store) = test_app();

    let (status, body) = request(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = request(&app, Method::GET, "/api/catalog/tests", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().expect("array").len(), 5);

    let (status, body) = request(&app, Method::GET, "/api/catalog/tests?kind=practice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().expect("array").len(), 3);

    let (status, body) =
        request(&app, Method::GET, "/api/catalog/problems/two-sum", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Two Sum");
    assert!(body["starter_code"]["javascript"]
        .as_str()
        .expect("starter")
        .contains("var twoSum = function"));

    let (status, _) = request(&app, Method::GET, "/api/catalog/tests/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn coding_flow_end_to_end() {
    let (_dir, app, store) = test_app();

    // Resume context parked by an earlier dashboard upload.
    store
        .put_current(&Submission {
            resume_text: "Five years of backend work.".into(),
            resume_skills: vec!["Rust".into()],
            ..Default::default()
        })
        .await
        .expect("seed current");

    let (status, opened) =
        request(&app, Method::POST, "/api/tests/rec-test-1/session", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(opened["language"], "javascript");
    assert_eq!(opened["restored"], false);
    let session_id = opened["session_id"].as_str().expect("session id").to_string();

    // Submitting before any run is rejected.
    let uri = format!("/api/sessions/{}/submit", session_id);
    let (status, body) = request(&app, Method::POST, &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().expect("error").contains("Run your code"));

    // Switch to python: starter code replaces the editor content, and
    // the mocked backend grades without a node binary.
    let uri = format!("/api/sessions/{}/language", session_id);
    let (status, body) = request(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "language": "python" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["code"].as_str().expect("code").contains("class Solution"));

    let uri = format!("/api/sessions/{}/language", session_id);
    let (status, _) = request(&app, Method::PUT, &uri, Some(json!({ "language": "cpp" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/api/sessions/{}/code", session_id);
    let (status, _) = request(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "code": "class Solution:\n    pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let uri = format!("/api/sessions/{}/save", session_id);
    let (status, body) = request(&app, Method::POST, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["saved"], true);

    // Reopening the same test restores the saved editor state verbatim.
    let (status, reopened) =
        request(&app, Method::POST, "/api/tests/rec-test-1/session", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reopened["restored"], true);
    assert_eq!(reopened["language"], "python");
    assert_eq!(reopened["code"], "class Solution:\n    pass");

    let uri = format!("/api/sessions/{}/run", session_id);
    let (status, body) = request(&app, Method::POST, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 4);
    assert_eq!(body["results"].as_array().expect("results").len(), 4);

    let uri = format!("/api/sessions/{}/submit", session_id);
    let (status, submission) = request(&app, Method::POST, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let submission_id = submission["id"].as_str().expect("id").to_string();
    let score = submission["coding_score"].as_i64().expect("score");
    assert!((0..=100).contains(&score));
    assert_eq!(submission["resume_text"], "Five years of backend work.");
    assert_eq!(submission["resume_skills"][0], "Rust");

    // Saved progress is consumed by the submit.
    assert!(store.get_progress("rec-test-1", "two-sum").await.is_none());

    let uri = format!("/api/submissions/{}", submission_id);
    let (status, body) = request(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], submission_id.as_str());

    let (status, _) = request(&app, Method::GET, "/api/submissions/unknown", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn interview_flow_end_to_end() {
    let (_dir, app, store) = test_app();

    store
        .put_submission(&Submission {
            id: "sub-1".into(),
            resume_text: "Backend engineer.".into(),
            resume_skills: vec!["Rust".into(), "SQL".into()],
            coding_score: 75,
            ..Default::default()
        })
        .await
        .expect("seed submission");

    let (status, _) = request(&app, Method::POST, "/api/interviews/missing/start", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = request(&app, Method::POST, "/api/interviews/sub-1/start", None).await;
    assert_eq!(status, StatusCode::OK);
    let messages = body["messages"].as_array().expect("messages");
    assert_eq!(messages.len(), 1);
    assert!(messages[0]["text"]
        .as_str()
        .expect("text")
        .contains("Rust, SQL"));

    // Finishing with only the opening message is rejected.
    let (status, _) = request(&app, Method::POST, "/api/interviews/sub-1/finish", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = request(
        &app,
        Method::POST,
        "/api/interviews/sub-1/message",
        Some(json!({ "text": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = request(
        &app,
        Method::POST,
        "/api/interviews/sub-1/message",
        Some(json!({ "text": "I maintain a Rust service in production." })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let messages = body["messages"].as_array().expect("messages");
    assert_eq!(messages.len(), 3);
    assert!(!messages.iter().any(|m| m["is_typing"] == true));

    // Voice capture drafts text without sending it.
    let (status, _) = request(
        &app,
        Method::POST,
        "/api/interviews/sub-1/voice/start",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = request(
        &app,
        Method::PUT,
        "/api/interviews/sub-1/voice/transcript",
        Some(json!({ "interim": "I also wor", "final": "I also worked on Kafka" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["draft"], "I also worked on Kafka");

    // Sending is blocked while the microphone is open.
    let (status, _) = request(
        &app,
        Method::POST,
        "/api/interviews/sub-1/message",
        Some(json!({ "text": "typed while recording" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = request(
        &app,
        Method::POST,
        "/api/interviews/sub-1/voice/stop",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) =
        request(&app, Method::POST, "/api/interviews/sub-1/finish", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["interview_score"]["overallScore"], 80);

    let persisted = store.get_submission("sub-1").await.expect("persisted");
    assert_eq!(
        persisted.interview_score.expect("score").overall_score,
        80
    );
    assert_eq!(persisted.interview_transcript.len(), 3);

    // Finished interviews accept no further messages.
    let (status, _) = request(
        &app,
        Method::POST,
        "/api/interviews/sub-1/message",
        Some(json!({ "text": "one more thing" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = request(&app, Method::GET, "/api/submissions", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().expect("array").len(), 1);
}
