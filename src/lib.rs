pub mod catalog;
pub mod config;
pub mod dto;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use reqwest::Client;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::catalog::Catalog;
use crate::services::ai_service::{GeminiService, InterviewAi};
use crate::services::grading_service::GradingService;
use crate::services::interview_service::InterviewService;
use crate::services::session_service::TestSessionService;
use crate::services::speech::{DisabledSpeech, SpeechSynthesizer};
use crate::store::{RecordStore, SubmissionStore};

#[derive(Clone)]
pub struct AppState {
    pub store: SubmissionStore,
    pub catalog: Arc<Catalog>,
    pub ai: Arc<dyn InterviewAi>,
    pub sessions: TestSessionService,
    pub interviews: InterviewService,
}

impl AppState {
    pub fn new() -> Self {
        let config = crate::config::get_config();
        let http_client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap();

        let ai: Arc<dyn InterviewAi> = Arc::new(GeminiService::new(
            config.gemini_api_key.clone(),
            config.gemini_model.clone(),
            http_client,
        ));
        let store = SubmissionStore::new(RecordStore::new(config.data_dir.clone()));
        let grading = GradingService::new(
            config.node_binary.clone(),
            Duration::from_millis(config.case_timeout_ms),
        );
        Self::assemble(store, ai, grading, Arc::new(DisabledSpeech))
    }

    /// Wires the state from explicit parts. Tests use this to swap the
    /// AI collaborator and speech synthesizer for doubles.
    pub fn assemble(
        store: SubmissionStore,
        ai: Arc<dyn InterviewAi>,
        grading: GradingService,
        speech: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        let catalog = Arc::new(Catalog::builtin());
        let sessions = TestSessionService::new(catalog.clone(), grading, store.clone());
        let interviews = InterviewService::new(ai.clone(), speech, store.clone());
        Self {
            store,
            catalog,
            ai,
            sessions,
            interviews,
        }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/api/catalog/tests", get(routes::catalog_routes::list_tests))
        .route(
            "/api/catalog/tests/:id",
            get(routes::catalog_routes::get_test),
        )
        .route(
            "/api/catalog/problems/:id",
            get(routes::catalog_routes::get_problem),
        )
        .route(
            "/api/resume/analyze",
            post(routes::candidate_routes::analyze_resume),
        )
        .route(
            "/api/tests/:id/session",
            post(routes::candidate_routes::open_session),
        )
        .route(
            "/api/sessions/:id/language",
            put(routes::candidate_routes::switch_language),
        )
        .route(
            "/api/sessions/:id/code",
            put(routes::candidate_routes::set_code),
        )
        .route("/api/sessions/:id/run", post(routes::candidate_routes::run_code))
        .route(
            "/api/sessions/:id/save",
            post(routes::candidate_routes::save_progress),
        )
        .route(
            "/api/sessions/:id/submit",
            post(routes::candidate_routes::submit_test),
        )
        .route(
            "/api/interviews/:submission_id/start",
            post(routes::interview_routes::start_interview),
        )
        .route(
            "/api/interviews/:submission_id/message",
            post(routes::interview_routes::send_message),
        )
        .route(
            "/api/interviews/:submission_id/finish",
            post(routes::interview_routes::finish_interview),
        )
        .route(
            "/api/interviews/:submission_id/voice/start",
            post(routes::interview_routes::start_voice_capture),
        )
        .route(
            "/api/interviews/:submission_id/voice/stop",
            post(routes::interview_routes::stop_voice_capture),
        )
        .route(
            "/api/interviews/:submission_id/voice/transcript",
            put(routes::interview_routes::push_voice_transcript),
        )
        .route(
            "/api/submissions",
            get(routes::submission_routes::list_submissions),
        )
        .route(
            "/api/submissions/:id",
            get(routes::submission_routes::get_submission),
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
}
