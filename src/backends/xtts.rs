//! XTTS v2 through a Coqui TTS server (`tts-server --model_name
//! tts_models/multilingual/multi-dataset/xtts_v2`).

use super::{check_request, SpeechBackend};
use crate::audio;
use crate::catalog::Catalog;
use crate::config_loader::Settings;
use crate::error::{NarrationError, Result};
use config::ConfigError;
use reqwest::blocking::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

const BACKEND: &str = "xtts";

/// Studio speakers bundled with XTTS v2.
const SPEAKERS: &[&str] = &[
    "Aaron Dreschner",
    "Abrahan Mack",
    "Adde Michal",
    "Alison Dietlinde",
    "Alma María",
    "Ana Florence",
    "Andrew Chipper",
    "Annmarie Nele",
    "Asya Anara",
    "Badr Odhiambo",
    "Baldur Sanjin",
    "Barbora MacLean",
    "Brenda Stern",
    "Camilla Holmström",
    "Chandra MacFarland",
    "Claribel Dervla",
    "Craig Gutsy",
    "Daisy Studious",
    "Damien Black",
    "Damjan Chapman",
    "Dionisio Schuyler",
    "Eugenio Mataracı",
    "Ferran Simen",
    "Filip Traverse",
    "Gilberto Mathias",
    "Gitta Nikolina",
    "Gracie Wise",
    "Henriette Usha",
    "Ige Behringer",
    "Ilkin Urbano",
    "Kazuhiko Atallah",
    "Kumar Dahl",
    "Lidiya Szekeres",
    "Lilya Stainthorpe",
    "Ludvig Milivoj",
    "Luis Moray",
    "Maja Ruoho",
    "Marcos Rudaski",
    "Narelle Moon",
    "Nova Hogarth",
    "Rosemary Okafor",
    "Royston Min",
    "Sofia Hellen",
    "Suad Qasim",
    "Szofi Granger",
    "Tammie Ema",
    "Tammy Grit",
    "Tanja Adelina",
    "Torcull Diarmuid",
    "Uta Obando",
    "Viktor Eka",
    "Viktor Menelaos",
    "Vjollca Johnnie",
    "Wulf Carlevaro",
    "Xavier Hayasaka",
    "Zacharie Aimilios",
    "Zofija Kendrick",
];

const LANGUAGES: &[(&str, &str)] = &[
    ("ar", "Arabic"),
    ("cs", "Czech"),
    ("de", "German"),
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("hi", "Hindi"),
    ("hu", "Hungarian"),
    ("it", "Italian"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("nl", "Dutch"),
    ("pl", "Polish"),
    ("pt", "Portuguese"),
    ("ru", "Russian"),
    ("tr", "Turkish"),
    ("zh-cn", "Chinese"),
];

#[derive(Serialize)]
struct TtsRequest<'a> {
    text: &'a str,
    speaker_id: &'a str,
    language_id: &'a str,
}

pub struct XttsBackend {
    client: Client,
    endpoint: String,
    voices: Catalog,
    languages: Catalog,
}

impl XttsBackend {
    pub fn new(base_url: &str, timeout: Duration) -> std::result::Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/api/tts", base_url.trim_end_matches('/')),
            voices: Catalog::from_ids(SPEAKERS.iter().copied()),
            languages: Catalog::from_pairs(LANGUAGES.iter().copied()),
        })
    }

    pub fn from_settings(settings: &Settings) -> std::result::Result<Self, ConfigError> {
        Self::new(&settings.tts_url, settings.request_timeout())
            .map_err(|e| ConfigError::Message(format!("Failed to build XTTS client: {}", e)))
    }
}

impl SpeechBackend for XttsBackend {
    fn id(&self) -> &'static str {
        BACKEND
    }

    fn list_voices(&self) -> &Catalog {
        &self.voices
    }

    fn list_languages(&self) -> &Catalog {
        &self.languages
    }

    fn synthesize(&self, voice: &str, text: &str, language: &str) -> Result<Vec<u8>> {
        check_request(self, voice, text, language)?;

        let payload = TtsRequest {
            text: text.trim(),
            speaker_id: voice,
            language_id: language,
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .map_err(|e| NarrationError::from_http(BACKEND, e))?;

        let status = resp.status();
        let bytes = resp
            .bytes()
            .map_err(|e| NarrationError::from_http(BACKEND, e))?;

        if !status.is_success() {
            let message = String::from_utf8_lossy(&bytes).trim().chars().take(200).collect();
            return Err(NarrationError::from_status(BACKEND, status.as_u16(), message));
        }

        let duration = audio::wav_duration(&bytes).map_err(|e| NarrationError::InvalidAudio {
            backend: BACKEND,
            reason: e.to_string(),
        })?;
        if duration.is_zero() {
            return Err(NarrationError::InvalidAudio {
                backend: BACKEND,
                reason: "clip holds no samples".to_string(),
            });
        }

        debug!(voice, language, ?duration, "XTTS: synthesized clip");
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogs_cover_spanish_and_default_voice() {
        let backend = XttsBackend::new("http://localhost:5002", Duration::from_secs(1)).unwrap();
        assert!(backend.list_voices().contains("Aaron Dreschner"));
        assert_eq!(backend.list_languages().display_name("es"), Some("Spanish"));
        assert_eq!(backend.list_languages().len(), LANGUAGES.len());
    }

    #[test]
    fn test_unknown_voice_fails_before_any_request() {
        // Nothing listens on port 9; a request would surface as Transport
        let backend = XttsBackend::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let err = backend.synthesize("Nobody", "Hola", "es").unwrap_err();
        assert!(matches!(err, NarrationError::UnsupportedVoice(v) if v == "Nobody"));

        let err = backend
            .synthesize("Aaron Dreschner", "Hola", "xx")
            .unwrap_err();
        assert!(matches!(err, NarrationError::UnsupportedLanguage(_)));

        let err = backend.synthesize("Aaron Dreschner", "  ", "es").unwrap_err();
        assert!(matches!(err, NarrationError::EmptyText));
    }
}
