/// Optional platform speech capabilities, absent on some hosts. The
/// driver takes an injected implementation and must keep working with
/// the disabled variant.
pub trait SpeechSynthesizer: Send + Sync {
    /// Cancels any in-flight synthesis.
    fn cancel(&self);
    fn speak(&self, text: &str);
}

/// No-op synthesizer for hosts without a speech facility.
pub struct DisabledSpeech;

impl SpeechSynthesizer for DisabledSpeech {
    fn cancel(&self) {}
    fn speak(&self, _text: &str) {}
}

/// A voice-capture transcript update. Final transcripts take precedence
/// over interim ones when both are present.
#[derive(Debug, Clone, Default)]
pub struct VoiceTranscript {
    pub interim: String,
    pub r#final: String,
}

impl VoiceTranscript {
    pub fn best(&self) -> &str {
        if !self.r#final.is_empty() {
            &self.r#final
        } else {
            &self.interim
        }
    }
}
