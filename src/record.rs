//! Plant records and the requests built from them.

use crate::error::{NarrationError, Result};
use std::fmt;
use std::io::Read;
use std::path::PathBuf;

/// Where the plant photo comes from.
///
/// Streams are drained into memory when the source is built, so a record can
/// be shared by reference and read more than once. Decoding is deferred to
/// [`ImageSource::load`], which the vision backends call before any request.
#[derive(Clone)]
pub enum ImageSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl ImageSource {
    pub fn from_reader<R: Read>(mut reader: R) -> std::io::Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(Self::Bytes(bytes))
    }

    /// Reads and decodes the image, returning its bytes with a MIME type
    /// guessed from the content.
    pub fn load(&self) -> Result<LoadedImage> {
        let bytes = match self {
            Self::Path(path) => std::fs::read(path).map_err(NarrationError::ImageRead)?,
            Self::Bytes(bytes) => bytes.clone(),
        };

        let format = image::guess_format(&bytes)?;
        image::load_from_memory_with_format(&bytes, format)?;

        Ok(LoadedImage {
            mime_type: format.to_mime_type(),
            bytes,
        })
    }
}

impl fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
        }
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&str> for ImageSource {
    fn from(path: &str) -> Self {
        Self::Path(PathBuf::from(path))
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

/// A decoded-and-verified image ready to be inlined in a backend request.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
}

#[derive(Debug, Clone)]
pub struct PlantRecord {
    pub title: String,
    pub location: String,
    pub image: ImageSource,
    pub description: String,
    pub tasks: String,
    pub comments: String,
}

impl PlantRecord {
    pub fn new(
        title: impl Into<String>,
        location: impl Into<String>,
        image: impl Into<ImageSource>,
        description: impl Into<String>,
        tasks: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            location: location.into(),
            image: image.into(),
            description: description.into(),
            tasks: tasks.into(),
            comments: String::new(),
        }
    }

    pub fn with_comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = comments.into();
        self
    }
}

/// A plant record plus the voice and language it should be narrated in.
#[derive(Debug, Clone)]
pub struct NarrationRequest {
    pub record: PlantRecord,
    pub language: String,
    pub voice: String,
}

impl NarrationRequest {
    pub fn new(record: PlantRecord, language: impl Into<String>, voice: impl Into<String>) -> Self {
        Self {
            record,
            language: language.into(),
            voice: voice.into(),
        }
    }
}
