use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::message::Message;

#[derive(Debug, Clone, Serialize)]
pub struct TranscriptResponse {
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[validate(length(min = 1, message = "text is required"))]
    pub text: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct VoiceTranscriptRequest {
    #[serde(default)]
    pub interim: String,
    #[serde(rename = "final", default)]
    pub final_text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DraftResponse {
    pub draft: String,
}
