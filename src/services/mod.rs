pub mod ai_service;
pub mod execution;
pub mod grading_service;
pub mod interview_service;
pub mod session_service;
pub mod speech;
