//! The two-stage narration pipeline: photo and notes to text, text to speech.

use crate::backends::SpeechBackend;
use crate::error::{FailureKind, NarrationError};
use crate::record::NarrationRequest;
use crate::vision::VisionBackend;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    GeneratingText,
    GeneratingAudio,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::GeneratingText => "generating text",
            Self::GeneratingAudio => "generating audio",
        };
        f.write_str(name)
    }
}

/// A finished narration. Neither field is ever empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Narration {
    pub audio: Vec<u8>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrationFailure {
    /// Stage the pipeline was in when it failed.
    pub stage: PipelineStage,
    pub kind: FailureKind,
    pub message: String,
    /// Narration text generated before a speech failure, if any.
    pub narration_text: Option<String>,
}

impl NarrationFailure {
    fn from_error(stage: PipelineStage, err: NarrationError) -> Self {
        Self {
            stage,
            kind: err.kind(),
            message: err.to_string(),
            narration_text: None,
        }
    }

    /// Short message for the listener, prefixed in the narration language.
    pub fn user_message(&self, language: &str) -> String {
        if language.eq_ignore_ascii_case("es") {
            format!("Error generando la narración: {}", self.message)
        } else {
            format!("Error generating the narration: {}", self.message)
        }
    }
}

impl fmt::Display for NarrationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "narration failed while {}: {}", self.stage, self.message)
    }
}

impl std::error::Error for NarrationFailure {}

pub type NarrationResult = Result<Narration, NarrationFailure>;

/// Runs narration requests against one vision and one speech backend.
///
/// Holds no per-request state, so one pipeline can serve concurrent callers.
pub struct NarrationPipeline {
    vision: Arc<dyn VisionBackend>,
    speech: Arc<dyn SpeechBackend>,
}

impl NarrationPipeline {
    pub fn new(vision: Arc<dyn VisionBackend>, speech: Arc<dyn SpeechBackend>) -> Self {
        Self { vision, speech }
    }

    pub fn speech(&self) -> &dyn SpeechBackend {
        self.speech.as_ref()
    }

    pub fn run(&self, request: &NarrationRequest) -> NarrationResult {
        let NarrationRequest {
            record,
            language,
            voice,
        } = request;

        // Reject selections the speech backend cannot honour before paying for a VLM call
        if !self.speech.list_voices().contains(voice) {
            return Err(NarrationFailure::from_error(
                PipelineStage::Idle,
                NarrationError::UnsupportedVoice(voice.clone()),
            ));
        }
        if !self.speech.list_languages().contains(language) {
            return Err(NarrationFailure::from_error(
                PipelineStage::Idle,
                NarrationError::UnsupportedLanguage(language.clone()),
            ));
        }

        info!(
            stage = %PipelineStage::GeneratingText,
            backend = self.vision.id(),
            title = %record.title,
            language = %language,
            "Pipeline: generating narration text"
        );
        let text = self
            .vision
            .generate_narration(record, language)
            .and_then(|text| {
                if text.trim().is_empty() {
                    Err(NarrationError::EmptyResponse {
                        backend: self.vision.id(),
                    })
                } else {
                    Ok(text)
                }
            })
            .map_err(|e| {
                warn!(backend = self.vision.id(), error = %e, "Pipeline: text generation failed");
                NarrationFailure::from_error(PipelineStage::GeneratingText, e)
            })?;

        info!(
            stage = %PipelineStage::GeneratingAudio,
            backend = self.speech.id(),
            voice = %voice,
            chars = text.chars().count(),
            "Pipeline: synthesizing narration"
        );
        let audio = self
            .speech
            .synthesize(voice, &text, language)
            .and_then(|audio| {
                if audio.is_empty() {
                    Err(NarrationError::EmptyResponse {
                        backend: self.speech.id(),
                    })
                } else {
                    Ok(audio)
                }
            });

        match audio {
            Ok(audio) => {
                info!(audio_bytes = audio.len(), "Pipeline: narration ready");
                Ok(Narration { audio, text })
            }
            Err(e) => {
                warn!(backend = self.speech.id(), error = %e, "Pipeline: synthesis failed");
                let mut failure = NarrationFailure::from_error(PipelineStage::GeneratingAudio, e);
                failure.narration_text = Some(text);
                Err(failure)
            }
        }
    }

    /// Flat form of [`NarrationPipeline::run`] for form-style callers: audio
    /// when it worked, and either the narration or a prefixed error message.
    pub fn run_to_pair(&self, request: &NarrationRequest) -> (Option<Vec<u8>>, String) {
        match self.run(request) {
            Ok(narration) => (Some(narration.audio), narration.text),
            Err(failure) => (None, failure.user_message(&request.language)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_is_localized() {
        let failure = NarrationFailure {
            stage: PipelineStage::GeneratingText,
            kind: FailureKind::Timeout,
            message: "gemini did not answer in time".to_string(),
            narration_text: None,
        };
        assert_eq!(
            failure.user_message("es"),
            "Error generando la narración: gemini did not answer in time"
        );
        assert!(failure.user_message("en").starts_with("Error generating the narration: "));
        assert_eq!(
            failure.to_string(),
            "narration failed while generating text: gemini did not answer in time"
        );
    }
}
