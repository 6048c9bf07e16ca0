use thiserror::Error;

/// Coarse classification of a failed narration, stable enough for callers to
/// branch on without matching every error variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    InputDecode,
    Transport,
    Timeout,
    Authentication,
    Backend,
    EmptyResponse,
    CapabilityMismatch,
    InvalidAudio,
    Internal,
}

#[derive(Debug, Error)]
pub enum NarrationError {
    #[error("could not read image: {0}")]
    ImageRead(#[source] std::io::Error),

    #[error("could not decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    #[error("{backend} did not answer in time")]
    Timeout { backend: &'static str },

    #[error("could not reach {backend}: {source}")]
    Transport {
        backend: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{backend} rejected the credentials (HTTP {status})")]
    Authentication { backend: &'static str, status: u16 },

    #[error("{backend} returned HTTP {status}: {message}")]
    Backend {
        backend: &'static str,
        status: u16,
        message: String,
    },

    #[error("{backend} returned an empty response")]
    EmptyResponse { backend: &'static str },

    #[error("voice '{0}' is not available")]
    UnsupportedVoice(String),

    #[error("language '{0}' is not available")]
    UnsupportedLanguage(String),

    #[error("there is no text to synthesize")]
    EmptyText,

    #[error("{backend} returned invalid audio: {reason}")]
    InvalidAudio { backend: &'static str, reason: String },

    #[error("{backend} synthesis failed: {reason}")]
    Synthesis { backend: &'static str, reason: String },
}

impl NarrationError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::ImageRead(_) | Self::ImageDecode(_) => FailureKind::InputDecode,
            Self::Timeout { .. } => FailureKind::Timeout,
            Self::Transport { .. } => FailureKind::Transport,
            Self::Authentication { .. } => FailureKind::Authentication,
            Self::Backend { .. } | Self::Synthesis { .. } => FailureKind::Backend,
            Self::EmptyResponse { .. } | Self::EmptyText => FailureKind::EmptyResponse,
            Self::UnsupportedVoice(_) | Self::UnsupportedLanguage(_) => {
                FailureKind::CapabilityMismatch
            }
            Self::InvalidAudio { .. } => FailureKind::InvalidAudio,
        }
    }

    /// Maps a reqwest failure, keeping timeouts apart from other transport errors.
    pub(crate) fn from_http(backend: &'static str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout { backend }
        } else {
            Self::Transport {
                backend,
                source: err,
            }
        }
    }

    /// Maps a non-success HTTP status. 401 and 403 are credential problems.
    pub(crate) fn from_status(backend: &'static str, status: u16, message: String) -> Self {
        match status {
            401 | 403 => Self::Authentication { backend, status },
            _ => Self::Backend {
                backend,
                status,
                message,
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, NarrationError>;
