use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::problem::Problem;
use crate::models::submission::TestResult;
use crate::models::test::Test;

#[derive(Debug, Clone, Serialize)]
pub struct OpenSessionResponse {
    pub session_id: uuid::Uuid,
    pub test: Test,
    pub problem: Problem,
    pub language: String,
    pub code: String,
    pub restored: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SwitchLanguageRequest {
    #[validate(length(min = 1, message = "language is required"))]
    pub language: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SwitchLanguageResponse {
    pub language: String,
    pub code: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SetCodeRequest {
    pub code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunResponse {
    pub results: Vec<TestResult>,
    pub passed: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SavedResponse {
    pub saved: bool,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResumeAnalyzeResponse {
    pub extracted_text: String,
    pub skills: Vec<String>,
}
