pub mod interview_dto;
pub mod session_dto;
