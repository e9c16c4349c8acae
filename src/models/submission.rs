use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::message::Message;
use crate::models::score::InterviewScore;

/// Graded outcome of one test case. `test_case_id` is the 1-based
/// ordinal of the case within its problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub test_case_id: usize,
    pub passed: bool,
    pub output: String,
}

/// One candidate's full attempt: resume context, coding outcome and
/// interview outcome, persisted under its own id. Fields default so a
/// partially-built record (resume analysis only) still decodes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Submission {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub resume_text: String,
    #[serde(default)]
    pub resume_skills: Vec<String>,
    #[serde(default)]
    pub coding_score: i32,
    #[serde(default)]
    pub coding_results: Vec<TestResult>,
    #[serde(default)]
    pub interview_score: Option<InterviewScore>,
    #[serde(default)]
    pub interview_transcript: Vec<Message>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// In-progress editor state saved for a test+problem pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedProgress {
    pub code: String,
    pub language: String,
}
