use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    Candidate,
    Ai,
}

/// One turn in an interview conversation. `is_typing` marks the
/// transient placeholder shown while a reply is pending; it carries no
/// text and must never survive into a finished transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    #[serde(default)]
    pub is_typing: bool,
    #[serde(default)]
    pub spoken: bool,
}

impl Message {
    pub fn candidate(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            sender: Sender::Candidate,
            is_typing: false,
            spoken: false,
        }
    }

    pub fn ai(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            sender: Sender::Ai,
            is_typing: false,
            spoken: false,
        }
    }

    pub fn typing_placeholder(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: String::new(),
            sender: Sender::Ai,
            is_typing: true,
            spoken: false,
        }
    }
}
