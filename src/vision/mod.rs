pub mod gemini;
pub mod prompt;

use crate::error::Result;
use crate::record::PlantRecord;

/// Turns a plant record and its photo into narration text.
pub trait VisionBackend: Send + Sync {
    /// Returns the unique ID of the backend (e.g., "gemini")
    fn id(&self) -> &'static str;

    /// Generates the narration in `language` (an ISO-639-1 code).
    /// On success the text is trimmed and never empty.
    fn generate_narration(&self, record: &PlantRecord, language: &str) -> Result<String>;
}
