use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::models::message::{Message, Sender};
use crate::models::submission::Submission;
use crate::services::ai_service::{InterviewAi, ResumeContext};
use crate::services::speech::{SpeechSynthesizer, VoiceTranscript};
use crate::store::SubmissionStore;

const CONNECT_FAILURE_TEXT: &str =
    "Sorry, I'm having trouble connecting. Please refresh the page.";
const REPLY_FAILURE_TEXT: &str = "Sorry, an error occurred. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingInput,
    Sending,
    Scoring,
    Finished,
}

/// Turn-taking state machine for one interview session. Transitions
/// are synchronous; the service performs the collaborator calls in
/// between `begin_*` and `complete_*` so turns stay strictly
/// sequential per session.
pub struct InterviewSession {
    submission_id: String,
    context: ResumeContext,
    transcript: Vec<Message>,
    state: SessionState,
    draft: String,
    recording: bool,
    next_id: u64,
}

impl InterviewSession {
    pub fn new(submission_id: impl Into<String>, context: ResumeContext) -> Self {
        Self {
            submission_id: submission_id.into(),
            context,
            transcript: Vec::new(),
            state: SessionState::AwaitingInput,
            draft: String::new(),
            recording: false,
            next_id: 0,
        }
    }

    fn next_message_id(&mut self) -> String {
        self.next_id += 1;
        format!("m{}", self.next_id)
    }

    pub fn submission_id(&self) -> &str {
        &self.submission_id
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// First AI turn. A failed opening degrades to a single apologetic
    /// message; the session stays usable either way.
    pub fn push_opening(&mut self, opening: Result<String>) {
        let id = self.next_message_id();
        let message = match opening {
            Ok(text) => Message::ai(id, text),
            Err(e) => {
                tracing::error!(error = ?e, "Failed to open interview conversation");
                Message::ai(id, CONNECT_FAILURE_TEXT)
            }
        };
        self.transcript.push(message);
        self.state = SessionState::AwaitingInput;
    }

    /// Validates and stages a candidate turn: appends the candidate
    /// message plus a transient typing placeholder, clears the draft,
    /// and hands back the history snapshot for the collaborator call.
    /// Rejections leave the session untouched.
    pub fn begin_send(&mut self, text: &str) -> Result<(ResumeContext, Vec<Message>)> {
        match self.state {
            SessionState::Finished => {
                return Err(Error::Conflict("Interview has already finished".into()))
            }
            SessionState::Sending | SessionState::Scoring => {
                return Err(Error::Conflict("A previous action is still pending".into()))
            }
            SessionState::AwaitingInput => {}
        }
        if self.recording {
            return Err(Error::Conflict("Voice capture is active".into()));
        }
        if text.trim().is_empty() {
            return Err(Error::BadRequest("Message text is empty".into()));
        }

        let history: Vec<Message> = self
            .transcript
            .iter()
            .filter(|m| !m.is_typing)
            .cloned()
            .collect();

        let candidate_id = self.next_message_id();
        self.transcript.push(Message::candidate(candidate_id, text));
        let placeholder_id = self.next_message_id();
        self.transcript
            .push(Message::typing_placeholder(placeholder_id));
        self.draft.clear();
        self.state = SessionState::Sending;
        Ok((self.context.clone(), history))
    }

    /// Replaces the typing placeholder with the real reply, or with a
    /// generic error message when the collaborator faulted.
    pub fn complete_send(&mut self, reply: Result<String>) {
        self.transcript.retain(|m| !m.is_typing);
        let id = self.next_message_id();
        let message = match reply {
            Ok(text) => Message::ai(id, text),
            Err(e) => {
                tracing::error!(error = ?e, "Failed to get interview reply");
                Message::ai(id, REPLY_FAILURE_TEXT)
            }
        };
        self.transcript.push(message);
        self.state = SessionState::AwaitingInput;
    }

    /// Stages scoring. Requires at least one prior exchange (two total
    /// messages).
    pub fn begin_finish(&mut self) -> Result<Vec<Message>> {
        match self.state {
            SessionState::Finished => {
                return Err(Error::Conflict("Interview has already finished".into()))
            }
            SessionState::Sending | SessionState::Scoring => {
                return Err(Error::Conflict("A previous action is still pending".into()))
            }
            SessionState::AwaitingInput => {}
        }
        if self.transcript.len() < 2 {
            return Err(Error::BadRequest(
                "Please answer at least one question before finishing".into(),
            ));
        }
        self.state = SessionState::Scoring;
        Ok(self
            .transcript
            .iter()
            .filter(|m| !m.is_typing)
            .cloned()
            .collect())
    }

    pub fn fail_finish(&mut self) {
        self.state = SessionState::AwaitingInput;
    }

    pub fn complete_finish(&mut self) {
        self.state = SessionState::Finished;
    }

    /// Starting voice capture cancels synthesis and clears the draft.
    /// Only one of {recording, sending} may be active.
    pub fn start_recording(&mut self, speech: &dyn SpeechSynthesizer) -> Result<()> {
        match self.state {
            SessionState::AwaitingInput => {}
            _ => return Err(Error::Conflict("A previous action is still pending".into())),
        }
        speech.cancel();
        self.draft.clear();
        self.recording = true;
        Ok(())
    }

    pub fn stop_recording(&mut self) {
        self.recording = false;
    }

    /// Voice capture continuously overwrites the draft with the best
    /// available transcript.
    pub fn apply_voice_transcript(&mut self, update: &VoiceTranscript) {
        if self.recording {
            self.draft = update.best().to_string();
        }
    }

    /// Speaks every not-yet-spoken, non-placeholder AI message exactly
    /// once, cancelling any in-flight synthesis first.
    pub fn speak_unspoken(&mut self, speech: &dyn SpeechSynthesizer) {
        for message in &mut self.transcript {
            if message.sender == Sender::Ai && !message.is_typing && !message.spoken {
                speech.cancel();
                speech.speak(&message.text);
                message.spoken = true;
            }
        }
    }
}

type SharedSession = Arc<Mutex<InterviewSession>>;

/// Orchestrates interview sessions: bridges the session state machine,
/// the AI collaborator, speech synthesis, and the submission store.
#[derive(Clone)]
pub struct InterviewService {
    ai: Arc<dyn InterviewAi>,
    speech: Arc<dyn SpeechSynthesizer>,
    store: SubmissionStore,
    sessions: Arc<Mutex<HashMap<String, SharedSession>>>,
}

impl InterviewService {
    pub fn new(
        ai: Arc<dyn InterviewAi>,
        speech: Arc<dyn SpeechSynthesizer>,
        store: SubmissionStore,
    ) -> Self {
        Self {
            ai,
            speech,
            store,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    async fn session(&self, submission_id: &str) -> Result<SharedSession> {
        self.sessions
            .lock()
            .await
            .get(submission_id)
            .cloned()
            .ok_or_else(|| Error::NotFound("Interview session not started".into()))
    }

    /// Opens an interview for a persisted submission. Missing
    /// submission context aborts with not-found (no retry). Returns the
    /// transcript after the opening turn.
    pub async fn start(&self, submission_id: &str) -> Result<Vec<Message>> {
        if let Ok(existing) = self.session(submission_id).await {
            // Restarting the screen re-enters the same session.
            return Ok(existing.lock().await.transcript().to_vec());
        }

        let submission = self
            .store
            .get_submission(submission_id)
            .await
            .ok_or_else(|| Error::NotFound("No submission found for this interview".into()))?;

        let context = ResumeContext {
            text: submission.resume_text,
            skills: submission.resume_skills,
        };
        if context.text.is_empty() && context.skills.is_empty() {
            tracing::warn!(submission_id, "No resume context, interview is generic");
        }

        let mut session = InterviewSession::new(submission_id, context.clone());
        let opening = self.ai.opening_turn(&context).await;
        session.push_opening(opening);
        session.speak_unspoken(self.speech.as_ref());
        let transcript = session.transcript().to_vec();

        self.sessions
            .lock()
            .await
            .insert(submission_id.to_string(), Arc::new(Mutex::new(session)));
        Ok(transcript)
    }

    /// One candidate turn. The lock is dropped around the collaborator
    /// call; a concurrent send observes the `Sending` state and is
    /// rejected, keeping turns strictly sequential. The staged turn is
    /// completed on a detached task so a dropped request (client
    /// disconnect) cannot leave the session stuck in `Sending`.
    pub async fn send(&self, submission_id: &str, text: &str) -> Result<Vec<Message>> {
        let session = self.session(submission_id).await?;

        let (context, history) = session.lock().await.begin_send(text)?;

        let ai = self.ai.clone();
        let speech = self.speech.clone();
        let text = text.to_string();
        let turn = tokio::spawn(async move {
            let reply = ai.reply(&context, &history, &text).await;
            let mut guard = session.lock().await;
            guard.complete_send(reply);
            guard.speak_unspoken(speech.as_ref());
            guard.transcript().to_vec()
        });
        turn.await
            .map_err(|e| Error::Internal(format!("Interview turn failed: {}", e)))
    }

    /// Scores the transcript and persists the finished submission. On
    /// collaborator failure the session returns to awaiting-input.
    /// Scoring and persistence run on a detached task: whether the
    /// request survives or not, the staged `Scoring` state always
    /// resolves to finished or back to awaiting-input.
    pub async fn finish(&self, submission_id: &str) -> Result<Submission> {
        let session = self.session(submission_id).await?;

        let transcript = {
            let mut guard = session.lock().await;
            let transcript = guard.begin_finish()?;
            self.speech.cancel();
            transcript
        };

        let service = self.clone();
        let submission_id = submission_id.to_string();
        let scoring = tokio::spawn(async move {
            service
                .score_and_persist(&submission_id, session, transcript)
                .await
        });
        scoring
            .await
            .map_err(|e| Error::Internal(format!("Interview scoring failed: {}", e)))?
    }

    async fn score_and_persist(
        &self,
        submission_id: &str,
        session: SharedSession,
        transcript: Vec<Message>,
    ) -> Result<Submission> {
        let score = match self.ai.score_transcript(&transcript).await {
            Ok(score) => score,
            Err(e) => {
                session.lock().await.fail_finish();
                tracing::error!(error = ?e, "Failed to score interview");
                return Err(Error::Internal(
                    "An error occurred while finishing the interview. Please try again.".into(),
                ));
            }
        };

        let Some(mut submission) = self.store.get_submission(submission_id).await else {
            session.lock().await.fail_finish();
            return Err(Error::Internal(
                "Could not save interview results. Submission data not found.".into(),
            ));
        };

        submission.interview_score = Some(score);
        submission.interview_transcript =
            transcript.into_iter().filter(|m| !m.is_typing).collect();
        submission.updated_at = Some(Utc::now());
        if let Err(e) = self.store.put_submission(&submission).await {
            session.lock().await.fail_finish();
            return Err(e);
        }
        self.store.clear_current().await?;

        session.lock().await.complete_finish();
        tracing::info!(submission_id, "Interview finished and scored");
        Ok(submission)
    }

    pub async fn start_recording(&self, submission_id: &str) -> Result<()> {
        let session = self.session(submission_id).await?;
        let mut guard = session.lock().await;
        guard.start_recording(self.speech.as_ref())
    }

    pub async fn stop_recording(&self, submission_id: &str) -> Result<()> {
        let session = self.session(submission_id).await?;
        session.lock().await.stop_recording();
        Ok(())
    }

    pub async fn apply_voice_transcript(
        &self,
        submission_id: &str,
        update: &VoiceTranscript,
    ) -> Result<String> {
        let session = self.session(submission_id).await?;
        let mut guard = session.lock().await;
        guard.apply_voice_transcript(update);
        Ok(guard.draft().to_string())
    }
}
