use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    // Vision-language backend
    pub vlm_backend: String, // "gemini"
    pub vlm_model: String,
    pub vlm_api_key: String,
    pub vlm_url: String,
    pub vlm_max_output_tokens: u32,
    pub vlm_temperature: f32,
    // Speech backend
    pub tts_backend: String, // "xtts" or "espeak"
    pub tts_url: String,     // Coqui TTS server serving XTTS v2
    pub espeak_binary: String,
    // Applies to every outbound backend call
    pub request_timeout_secs: u64,
    // Defaults offered by the CLI
    pub default_language: String,
    pub default_voice: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            vlm_backend: "gemini".to_string(),
            vlm_model: "gemini-2.0-flash".to_string(),
            vlm_api_key: String::new(),
            vlm_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            vlm_max_output_tokens: 500,
            vlm_temperature: 0.1,
            tts_backend: "xtts".to_string(),
            tts_url: "http://localhost:5002".to_string(),
            espeak_binary: "espeak-ng".to_string(),
            request_timeout_secs: 60,
            default_language: "es".to_string(),
            default_voice: "Aaron Dreschner".to_string(),
        }
    }
}

impl Settings {
    /// Loads settings from defaults, the optional config files and
    /// `NARRATOR_*` environment variables.
    pub fn new() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Same as [`Settings::new`], with an explicit file layered on top of the
    /// discovered ones. The explicit file must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("vlm_backend", defaults.vlm_backend)?
            .set_default("vlm_model", defaults.vlm_model)?
            .set_default("vlm_api_key", defaults.vlm_api_key)?
            .set_default("vlm_url", defaults.vlm_url)?
            .set_default("vlm_max_output_tokens", defaults.vlm_max_output_tokens as i64)?
            .set_default("vlm_temperature", defaults.vlm_temperature as f64)?
            .set_default("tts_backend", defaults.tts_backend)?
            .set_default("tts_url", defaults.tts_url)?
            .set_default("espeak_binary", defaults.espeak_binary)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs as i64)?
            .set_default("default_language", defaults.default_language)?
            .set_default("default_voice", defaults.default_voice)?
            // Local config file (if exists)
            .add_source(File::with_name("Narrator").required(false));

        if let Some(config_dir) = dirs::config_dir() {
            builder = builder.add_source(
                File::from(config_dir.join("plant-narrator").join("Narrator")).required(false),
            );
        }

        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).required(true));
        }

        // Environment wins, e.g. NARRATOR_VLM_API_KEY
        let settings: Settings = builder
            .add_source(Environment::with_prefix("NARRATOR"))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.vlm_temperature) {
            return Err(ConfigError::Message(format!(
                "Invalid vlm_temperature: {}. Must be between 0.0 and 2.0",
                self.vlm_temperature
            )));
        }
        if self.vlm_max_output_tokens == 0 {
            return Err(ConfigError::Message(
                "vlm_max_output_tokens must be greater than 0".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.vlm_url.trim().is_empty() || self.tts_url.trim().is_empty() {
            return Err(ConfigError::Message(
                "backend URLs must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_config_load() {
        let settings = Settings::new().expect("Failed to load settings");
        assert!(settings.request_timeout_secs > 0);
        assert!(!settings.vlm_backend.is_empty());
    }

    #[test]
    #[serial]
    fn test_explicit_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("narrator.toml");
        std::fs::write(
            &path,
            "tts_backend = \"espeak\"\nvlm_temperature = 0.4\nrequest_timeout_secs = 5\n",
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.tts_backend, "espeak");
        assert_eq!(settings.request_timeout(), Duration::from_secs(5));
        assert!((settings.vlm_temperature - 0.4).abs() < f32::EPSILON);
    }

    #[test]
    #[serial]
    fn test_environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("narrator.toml");
        std::fs::write(&path, "vlm_model = \"gemini-from-file\"\n").unwrap();

        std::env::set_var("NARRATOR_VLM_MODEL", "gemini-from-env");
        let settings = Settings::load(Some(&path));
        std::env::remove_var("NARRATOR_VLM_MODEL");

        assert_eq!(settings.unwrap().vlm_model, "gemini-from-env");
    }

    #[test]
    #[serial]
    fn test_missing_explicit_file_is_an_error() {
        assert!(Settings::load(Some(Path::new("/no/such/narrator.toml"))).is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_values() {
        let mut settings = Settings::default();
        settings.vlm_temperature = 3.5;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.request_timeout_secs = 0;
        assert!(settings.validate().is_err());

        assert!(Settings::default().validate().is_ok());
    }
}
