//! Error taxonomy for speech synthesis.

use thiserror::Error;

/// Substring identifying a chunk rejected by the remote content filter.
pub const CONTENT_FILTER_ERROR: &str = "sensitive or harmful content";

/// Substring identifying a remote call that ran out of time.
pub const DEADLINE_EXCEEDED_ERROR: &str = "Deadline Exceeded";

/// Broad class of a remote failure as reported by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RemoteErrorKind {
    /// Quota or rate limit hit.
    ResourceExhausted,
    /// Anything else. Deadline and content-filter failures are recognised by
    /// their message text.
    Other,
}

/// Failure reported by a [`SpeechBackend`](crate::SpeechBackend).
///
/// The message is always valid UTF-8; backends build it from raw response
/// bytes with [`RemoteError::from_bytes`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("remote synthesis failed ({kind:?}): {message}")]
pub struct RemoteError {
    kind: RemoteErrorKind,
    message: String,
}

impl RemoteError {
    pub fn new(kind: RemoteErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Build an error from a message of unknown encoding.
    pub fn from_bytes(kind: RemoteErrorKind, message: &[u8]) -> Self {
        Self::new(kind, sanitize_message(message))
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::ResourceExhausted, message)
    }

    /// A timeout; the message is prefixed so [`is_deadline_exceeded`] holds.
    ///
    /// [`is_deadline_exceeded`]: RemoteError::is_deadline_exceeded
    pub fn deadline_exceeded(detail: impl AsRef<str>) -> Self {
        Self::other(format!("{DEADLINE_EXCEEDED_ERROR}: {}", detail.as_ref()))
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::Other, message)
    }

    pub fn kind(&self) -> RemoteErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_rate_limited(&self) -> bool {
        self.kind == RemoteErrorKind::ResourceExhausted
    }

    pub fn is_deadline_exceeded(&self) -> bool {
        self.message.contains(DEADLINE_EXCEEDED_ERROR)
    }

    pub fn is_content_filtered(&self) -> bool {
        self.message.contains(CONTENT_FILTER_ERROR)
    }
}

#[derive(Debug, Error)]
pub enum TtsError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("sentence of {bytes} bytes exceeds the {limit} byte sentence limit: {preview:?}")]
    SentenceTooLong {
        bytes: usize,
        limit: usize,
        preview: String,
    },
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error("synthesis worker failed: {0}")]
    Worker(String),
}

impl TtsError {
    /// The remote failure behind this error, if any.
    pub fn remote(&self) -> Option<&RemoteError> {
        match self {
            TtsError::Remote(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_content_filtered(&self) -> bool {
        self.remote().is_some_and(RemoteError::is_content_filtered)
    }
}

/// Convenience result type used throughout this crate.
pub type Result<T> = std::result::Result<T, TtsError>;

/// Decode `bytes` as UTF-8, replacing every invalid sequence with `?`.
///
/// ```
/// use tts::sanitize_message;
///
/// assert_eq!(sanitize_message(b"bad \xff byte"), "bad ? byte");
/// ```
pub fn sanitize_message(mut bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    loop {
        match std::str::from_utf8(bytes) {
            Ok(valid) => {
                out.push_str(valid);
                return out;
            }
            Err(e) => {
                let (valid, rest) = bytes.split_at(e.valid_up_to());
                out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                out.push('?');
                let invalid = e.error_len().unwrap_or(rest.len());
                bytes = &rest[invalid..];
            }
        }
    }
}
