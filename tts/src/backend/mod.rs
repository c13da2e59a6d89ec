//! Remote speech synthesis backends.

use async_trait::async_trait;
use serde::Serialize;

use crate::{AudioEncoding, RemoteError};

pub mod coqui;
pub mod google;

pub use coqui::CoquiTts;
pub use google::{Credentials, GoogleTts};

/// Voice selection for one request.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceParams {
    pub language_code: String,
    pub name: String,
}

/// Audio output settings for one request.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioParams {
    pub audio_encoding: AudioEncoding,
    pub speaking_rate: f64,
    pub pitch: f64,
}

/// A single synthesis call.
#[derive(Clone, Debug, PartialEq)]
pub struct SynthesisRequest {
    pub text: String,
    pub voice: VoiceParams,
    pub audio: AudioParams,
}

/// Map an HTTP failure, including a timeout while reading the body, to a
/// [`RemoteError`]. Timeouts read as deadline exceeded so they are retried.
pub(crate) fn transport_error(e: reqwest::Error) -> RemoteError {
    if e.is_timeout() {
        RemoteError::deadline_exceeded(e.to_string())
    } else {
        RemoteError::other(e.to_string())
    }
}

/// A remote capability turning one request into audio bytes.
///
/// Implementations make exactly one attempt; retrying is the caller's job.
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, RemoteError>;
}
