use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::models::problem::Problem;
use crate::models::submission::{SavedProgress, Submission, TestResult};
use crate::models::test::{Test, TestKind};
use crate::services::grading_service::GradingService;
use crate::store::SubmissionStore;

/// One candidate working one problem of one test. Editor state lives
/// here between requests; saved progress lives in the store.
pub struct TestSession {
    test_id: String,
    problem_id: String,
    language: String,
    code: String,
    results: Vec<TestResult>,
    has_run: bool,
    running: bool,
    submitted: bool,
}

/// Snapshot handed to the transport layer after opening a session.
#[derive(Debug, Clone)]
pub struct OpenedSession {
    pub session_id: Uuid,
    pub test: Test,
    pub problem: Problem,
    pub language: String,
    pub code: String,
    pub restored: bool,
}

type SharedTestSession = Arc<Mutex<TestSession>>;

/// Drives the coding-test flow: open with progress restore, edit,
/// language switch, run, save, submit.
#[derive(Clone)]
pub struct TestSessionService {
    catalog: Arc<Catalog>,
    grading: GradingService,
    store: SubmissionStore,
    sessions: Arc<Mutex<HashMap<Uuid, SharedTestSession>>>,
}

impl TestSessionService {
    pub fn new(catalog: Arc<Catalog>, grading: GradingService, store: SubmissionStore) -> Self {
        Self {
            catalog,
            grading,
            store,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    async fn session(&self, session_id: Uuid) -> Result<SharedTestSession> {
        self.sessions
            .lock()
            .await
            .get(&session_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Test session not found: {}", session_id)))
    }

    /// Opens a session on the test's first problem. Saved progress is
    /// restored verbatim (code and language together, with no
    /// starter-code reset); otherwise the editor starts on the test's
    /// default language with that language's starter code. Practice
    /// tests clear any pending resume marker so no stale context leaks
    /// into a later interview.
    pub async fn open(&self, test_id: &str) -> Result<OpenedSession> {
        let test = self.catalog.test(test_id)?.clone();
        let problem = self.catalog.first_problem_of(&test)?.clone();

        if test.kind == TestKind::Practice {
            self.store.clear_current().await?;
        }

        let saved = self.store.get_progress(&test.id, &problem.id).await;
        let restored = saved.is_some();
        let (language, code) = match saved {
            Some(progress) => (progress.language, progress.code),
            None => {
                let language = test
                    .default_language()
                    .ok_or_else(|| {
                        Error::Internal(format!("Test allows no languages: {}", test.id))
                    })?
                    .to_string();
                let code = problem.starter_for(&language).unwrap_or_default().to_string();
                (language, code)
            }
        };

        let session_id = Uuid::new_v4();
        let session = TestSession {
            test_id: test.id.clone(),
            problem_id: problem.id.clone(),
            language: language.clone(),
            code: code.clone(),
            results: Vec::new(),
            has_run: false,
            running: false,
            submitted: false,
        };
        self.sessions
            .lock()
            .await
            .insert(session_id, Arc::new(Mutex::new(session)));

        tracing::info!(test_id, problem_id = %problem.id, restored, "Opened test session");
        Ok(OpenedSession {
            session_id,
            test,
            problem,
            language,
            code,
            restored,
        })
    }

    /// Explicitly switching language replaces the editor content with
    /// that language's starter code and clears previous run results.
    pub async fn switch_language(&self, session_id: Uuid, language: &str) -> Result<String> {
        let session = self.session(session_id).await?;
        let mut guard = session.lock().await;
        guard.ensure_open()?;

        let test = self.catalog.test(&guard.test_id)?;
        if !test.allows_language(language) {
            return Err(Error::BadRequest(format!(
                "Language not allowed for this test: {}",
                language
            )));
        }
        let problem = self.catalog.problem(&guard.problem_id)?;

        guard.language = language.to_string();
        guard.code = problem.starter_for(language).unwrap_or_default().to_string();
        guard.results.clear();
        guard.has_run = false;
        Ok(guard.code.clone())
    }

    pub async fn set_code(&self, session_id: Uuid, code: &str) -> Result<()> {
        let session = self.session(session_id).await?;
        let mut guard = session.lock().await;
        guard.ensure_open()?;
        guard.code = code.to_string();
        Ok(())
    }

    /// Grades the current editor content against the problem's cases.
    /// Rejected while a previous run is still in flight.
    pub async fn run(&self, session_id: Uuid) -> Result<Vec<TestResult>> {
        let session = self.session(session_id).await?;

        let (code, language, cases) = {
            let mut guard = session.lock().await;
            guard.ensure_open()?;
            if guard.running {
                return Err(Error::Conflict("A run is already in progress".into()));
            }
            guard.running = true;
            let problem = match self.catalog.problem(&guard.problem_id) {
                Ok(p) => p,
                Err(e) => {
                    guard.running = false;
                    return Err(e);
                }
            };
            (
                guard.code.clone(),
                guard.language.clone(),
                problem.test_cases.clone(),
            )
        };

        // Grading completes on a detached task so a dropped request
        // cannot leave the in-flight flag set forever.
        let grading = self.grading.clone();
        let grade = tokio::spawn(async move {
            let results = grading.grade(&code, &language, &cases).await;
            let mut guard = session.lock().await;
            guard.results = results.clone();
            guard.has_run = true;
            guard.running = false;
            results
        });
        grade
            .await
            .map_err(|e| Error::Internal(format!("Grading run failed: {}", e)))
    }

    /// Persists the current editor state so a later session on the same
    /// test/problem restores it.
    pub async fn save(&self, session_id: Uuid) -> Result<()> {
        let session = self.session(session_id).await?;
        let guard = session.lock().await;
        let progress = SavedProgress {
            code: guard.code.clone(),
            language: guard.language.clone(),
        };
        self.store
            .put_progress(&guard.test_id, &guard.problem_id, &progress)
            .await
    }

    /// Finalizes the test: scores the latest run, folds in any pending
    /// resume context, persists the submission, and clears saved
    /// progress. Requires at least one completed run.
    pub async fn submit(&self, session_id: Uuid) -> Result<Submission> {
        let session = self.session(session_id).await?;
        let mut guard = session.lock().await;
        guard.ensure_open()?;
        if guard.running {
            return Err(Error::Conflict("A run is already in progress".into()));
        }
        if !guard.has_run {
            return Err(Error::BadRequest(
                "Run your code at least once before submitting".into(),
            ));
        }

        let problem = self.catalog.problem(&guard.problem_id)?;
        let score = GradingService::coding_score(&guard.results, problem.test_cases.len());

        // Resume context uploaded on the dashboard rides the transient
        // marker until a submission exists to own it.
        let current = self.store.get_current().await.unwrap_or_default();
        let now = Utc::now();
        let submission = Submission {
            id: Uuid::new_v4().to_string(),
            resume_text: current.resume_text,
            resume_skills: current.resume_skills,
            coding_score: score,
            coding_results: guard.results.clone(),
            interview_score: None,
            interview_transcript: Vec::new(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        self.store.put_submission(&submission).await?;
        self.store
            .clear_progress(&guard.test_id, &guard.problem_id)
            .await?;
        guard.submitted = true;

        tracing::info!(
            submission_id = %submission.id,
            coding_score = score,
            "Test submitted"
        );
        Ok(submission)
    }
}

impl TestSession {
    fn ensure_open(&self) -> Result<()> {
        if self.submitted {
            return Err(Error::Conflict("Test has already been submitted".into()));
        }
        Ok(())
    }
}
