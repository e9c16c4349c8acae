use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::Client;
use serde_json::{json, Value as JsonValue};
use std::time::Duration;

use crate::error::Result;
use crate::models::message::{Message, Sender};
use crate::models::score::InterviewScore;

/// Resume-derived personalization block attached to an interview.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResumeContext {
    pub text: String,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ResumeAnalysis {
    pub text: String,
    pub skills: Vec<String>,
}

/// Thin client for the generative-AI collaborator. The caller owns the
/// transcript; every request carries the explicit history, so no state
/// lives behind this seam.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InterviewAi: Send + Sync {
    /// Opens an interview and returns the interviewer's first turn. An
    /// empty context means no personalization.
    async fn opening_turn(&self, context: &ResumeContext) -> Result<String>;

    /// One free-text turn against the running conversation.
    async fn reply(
        &self,
        context: &ResumeContext,
        history: &[Message],
        message: &str,
    ) -> Result<String>;

    /// Structured evaluation of a finished transcript.
    async fn score_transcript(&self, transcript: &[Message]) -> Result<InterviewScore>;

    /// Extracts full text and key technical skills from a resume
    /// document.
    async fn analyze_resume(&self, data: &[u8], mime_type: &str) -> Result<ResumeAnalysis>;
}

const BASE_SYSTEM_INSTRUCTION: &str = "You are an experienced technical interviewer for a senior software engineer role. \n\
Your goal is to assess the candidate's skills and experience.\n\
- Start by introducing yourself and setting the agenda for the interview.\n\
- Ask a mix of behavioral and technical questions.\n\
- Ask follow-up questions to probe deeper into their answers.\n\
- Keep your questions and responses concise.\n\
- Be friendly and encouraging.\n\
- Do not ask for personal information.\n\
- After a few questions, conclude the interview and thank the candidate.";

pub fn interview_system_instruction(context: &ResumeContext) -> String {
    let mut instruction = BASE_SYSTEM_INSTRUCTION.to_string();
    if !context.text.is_empty() || !context.skills.is_empty() {
        instruction.push_str(
            "\n\nIMPORTANT: You have the candidate's resume information. Personalize the \
             interview by asking 1-2 questions specifically based on their skills and \
             experience.",
        );
        if !context.skills.is_empty() {
            instruction.push_str(&format!(
                "\n- Key skills identified: {}. Ask about their experience with some of these.",
                context.skills.join(", ")
            ));
        }
        if !context.text.is_empty() {
            instruction.push_str(&format!(
                "\n- Full resume text for context:\n---RESUME START---\n{}\n---RESUME END---",
                context.text
            ));
        }
    }
    instruction
}

#[derive(Clone)]
pub struct GeminiService {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiService {
    pub fn new(api_key: String, model: String, client: Client) -> Self {
        Self {
            client,
            api_key,
            model,
        }
    }

    async fn generate(&self, payload: JsonValue) -> Result<String> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            self.model
        );
        let res = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .timeout(Duration::from_secs(120))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Gemini API Error {}: {}", status, text).into());
        }

        let body: JsonValue = res.json().await?;
        body.get("candidates")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("content"))
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.get(0))
            .and_then(|p| p.get("text"))
            .and_then(|t| t.as_str())
            .map(|s| s.trim().to_string())
            .ok_or_else(|| anyhow::anyhow!("Invalid Gemini response format").into())
    }

    fn history_contents(history: &[Message], next_message: &str) -> Vec<JsonValue> {
        let mut contents: Vec<JsonValue> = history
            .iter()
            .filter(|m| !m.is_typing && !m.text.trim().is_empty())
            .map(|m| {
                let role = match m.sender {
                    Sender::Candidate => "user",
                    Sender::Ai => "model",
                };
                json!({ "role": role, "parts": [{ "text": m.text }] })
            })
            .collect();
        contents.push(json!({ "role": "user", "parts": [{ "text": next_message }] }));
        contents
    }
}

#[async_trait]
impl InterviewAi for GeminiService {
    async fn opening_turn(&self, context: &ResumeContext) -> Result<String> {
        let payload = json!({
            "system_instruction": { "parts": [{ "text": interview_system_instruction(context) }] },
            "contents": Self::history_contents(&[], "Hello, let's start the interview."),
        });
        self.generate(payload).await
    }

    async fn reply(
        &self,
        context: &ResumeContext,
        history: &[Message],
        message: &str,
    ) -> Result<String> {
        let payload = json!({
            "system_instruction": { "parts": [{ "text": interview_system_instruction(context) }] },
            "contents": Self::history_contents(history, message),
        });
        self.generate(payload).await
    }

    async fn score_transcript(&self, transcript: &[Message]) -> Result<InterviewScore> {
        let conversation = transcript
            .iter()
            .filter(|m| !m.is_typing && !m.text.trim().is_empty())
            .map(|m| {
                let speaker = match m.sender {
                    Sender::Candidate => "Candidate",
                    Sender::Ai => "Interviewer",
                };
                format!("{}: {}", speaker, m.text)
            })
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = format!(
            "Based on the following interview transcript, please evaluate the candidate's \
             performance. Provide a score from 0 to 100 for each of the following categories: \
             Communication, Technical Knowledge, and Problem Solving. Also provide an overall \
             score (average of the three). Finally, provide constructive feedback including a \
             brief summary, a list of strengths, areas for improvement, and specific, \
             actionable learning recommendations (with reasons) for topics or technologies the \
             candidate should focus on.\n\nRespond with a JSON object with integer fields \
             'communication', 'technicalKnowledge', 'problemSolving', 'overallScore', a string \
             'feedback', string arrays 'strengths' and 'areasForImprovement', and \
             'learningRecommendations' as an array of objects with 'topic' and 'reason'.\
             \n\nTranscript:\n{}",
            conversation
        );

        let payload = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": { "responseMimeType": "application/json" },
        });

        let text = self.generate(payload).await?;
        let score: InterviewScore = serde_json::from_str(&text)?;
        Ok(score)
    }

    async fn analyze_resume(&self, data: &[u8], mime_type: &str) -> Result<ResumeAnalysis> {
        let prompt = "Extract the full text content from the provided PDF document. Then, \
                      analyze the extracted text, which is a resume, and identify the key \
                      technical skills. Focus on programming languages, frameworks, libraries, \
                      databases, and other relevant technologies. Respond with a JSON object \
                      with a string field 'extractedText' and a string array 'skills'.";

        let payload = json!({
            "contents": [{
                "role": "user",
                "parts": [
                    { "text": prompt },
                    { "inline_data": { "mime_type": mime_type, "data": BASE64.encode(data) } },
                ],
            }],
            "generationConfig": { "responseMimeType": "application/json" },
        });

        let text = self.generate(payload).await?;
        let parsed: JsonValue = serde_json::from_str(&text)?;
        Ok(ResumeAnalysis {
            text: parsed
                .get("extractedText")
                .and_then(|t| t.as_str())
                .unwrap_or_default()
                .to_string(),
            skills: parsed
                .get("skills")
                .and_then(|s| s.as_array())
                .map(|a| {
                    a.iter()
                        .filter_map(|v| v.as_str().map(|s| s.to_string()))
                        .collect()
                })
                .unwrap_or_default(),
        })
    }
}
