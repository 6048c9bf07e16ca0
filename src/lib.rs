//! Narrates urban-garden plant records as spoken audio for visually impaired
//! listeners: a vision-language model writes the narration from the photo and
//! notes, and a speech engine reads it aloud.

pub mod audio;
pub mod backends;
pub mod catalog;
pub mod config_loader;
pub mod error;
pub mod pipeline;
pub mod record;
pub mod registry;
pub mod service;
pub mod vision;

pub use catalog::Catalog;
pub use error::{FailureKind, NarrationError};
pub use pipeline::{Narration, NarrationFailure, NarrationPipeline, NarrationResult, PipelineStage};
pub use record::{ImageSource, NarrationRequest, PlantRecord};
pub use registry::Backends;
pub use service::NarrationService;
