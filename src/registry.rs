//! Builds the active backends from settings, once, at startup.

use crate::backends::espeak::EspeakBackend;
use crate::backends::xtts::XttsBackend;
use crate::backends::SpeechBackend;
use crate::config_loader::Settings;
use crate::pipeline::NarrationPipeline;
use crate::vision::gemini::GeminiBackend;
use crate::vision::VisionBackend;
use config::ConfigError;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisionBackendKind {
    Gemini,
}

impl FromStr for VisionBackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            other => Err(ConfigError::Message(format!(
                "VLM backend '{}' not supported (expected: gemini)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechBackendKind {
    Xtts,
    Espeak,
}

impl FromStr for SpeechBackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xtts" | "xttsv2" | "coqui" => Ok(Self::Xtts),
            "espeak" | "espeak-ng" => Ok(Self::Espeak),
            other => Err(ConfigError::Message(format!(
                "TTS backend '{}' not supported (expected: xtts, espeak)",
                other
            ))),
        }
    }
}

/// The one vision backend and one speech backend for this process.
#[derive(Clone)]
pub struct Backends {
    pub vision: Arc<dyn VisionBackend>,
    pub speech: Arc<dyn SpeechBackend>,
}

impl Backends {
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let vision_kind: VisionBackendKind = settings.vlm_backend.parse()?;
        let speech_kind: SpeechBackendKind = settings.tts_backend.parse()?;

        let vision: Arc<dyn VisionBackend> = match vision_kind {
            VisionBackendKind::Gemini => Arc::new(GeminiBackend::from_settings(settings)?),
        };
        let speech: Arc<dyn SpeechBackend> = match speech_kind {
            SpeechBackendKind::Xtts => Arc::new(XttsBackend::from_settings(settings)?),
            SpeechBackendKind::Espeak => Arc::new(EspeakBackend::from_settings(settings)),
        };

        info!(
            vision = vision.id(),
            speech = speech.id(),
            voices = speech.list_voices().len(),
            languages = speech.list_languages().len(),
            "Backends ready"
        );

        Ok(Self { vision, speech })
    }

    pub fn into_pipeline(self) -> NarrationPipeline {
        NarrationPipeline::new(self.vision, self.speech)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_names_parse() {
        assert_eq!("Gemini".parse::<VisionBackendKind>().unwrap(), VisionBackendKind::Gemini);
        assert_eq!("xttsv2".parse::<SpeechBackendKind>().unwrap(), SpeechBackendKind::Xtts);
        assert_eq!(" coqui ".parse::<SpeechBackendKind>().unwrap(), SpeechBackendKind::Xtts);
        assert_eq!("espeak-ng".parse::<SpeechBackendKind>().unwrap(), SpeechBackendKind::Espeak);
    }

    #[test]
    fn test_placeholder_backends_are_rejected() {
        assert!("qwen".parse::<VisionBackendKind>().is_err());
        assert!("kokoro".parse::<SpeechBackendKind>().is_err());
        assert!("zonos".parse::<SpeechBackendKind>().is_err());
    }

    #[test]
    fn test_builds_configured_backends() {
        let settings = Settings {
            vlm_api_key: "test-key".to_string(),
            tts_backend: "espeak".to_string(),
            ..Settings::default()
        };
        let backends = Backends::from_settings(&settings).unwrap();
        assert_eq!(backends.vision.id(), "gemini");
        assert_eq!(backends.speech.id(), "espeak-ng");
    }

    #[test]
    fn test_unknown_backend_fails_startup() {
        let settings = Settings {
            vlm_api_key: "test-key".to_string(),
            tts_backend: "zonos".to_string(),
            ..Settings::default()
        };
        let err = Backends::from_settings(&settings).err().unwrap();
        assert!(err.to_string().contains("zonos"));
    }
}
