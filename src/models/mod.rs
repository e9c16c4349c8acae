pub mod message;
pub mod problem;
pub mod score;
pub mod submission;
