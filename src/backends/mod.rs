pub mod espeak;
pub mod xtts;

use crate::catalog::Catalog;
use crate::error::{NarrationError, Result};

/// Trait that all speech synthesis backends must implement.
/// This allows us to plug in different engines (XTTS, eSpeak, ...)
pub trait SpeechBackend: Send + Sync {
    /// Returns the unique ID of the backend (e.g., "xtts")
    fn id(&self) -> &'static str;

    /// Voices this backend can speak with, keyed by voice id.
    /// Fixed for the lifetime of the instance.
    fn list_voices(&self) -> &Catalog;

    /// Languages this backend can speak, keyed by language code.
    /// Fixed for the lifetime of the instance.
    fn list_languages(&self) -> &Catalog;

    /// Synthesizes `text` and returns one complete, non-empty audio buffer.
    fn synthesize(&self, voice: &str, text: &str, language: &str) -> Result<Vec<u8>>;
}

/// Shared precondition check for `synthesize` implementations.
pub(crate) fn check_request(
    backend: &dyn SpeechBackend,
    voice: &str,
    text: &str,
    language: &str,
) -> Result<()> {
    if !backend.list_voices().contains(voice) {
        return Err(NarrationError::UnsupportedVoice(voice.to_string()));
    }
    if !backend.list_languages().contains(language) {
        return Err(NarrationError::UnsupportedLanguage(language.to_string()));
    }
    if text.trim().is_empty() {
        return Err(NarrationError::EmptyText);
    }
    Ok(())
}
