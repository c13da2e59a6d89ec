//! Coqui TTS server backend.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;

use super::{transport_error, SpeechBackend, SynthesisRequest};
use crate::{RemoteError, RemoteErrorKind, TtsError};

/// Client for a Coqui `tts-server`, which answers with raw audio bytes.
pub struct CoquiTts {
    client: Client,
    url: String,
    language: Option<String>,
}

#[derive(Serialize)]
struct TtsRequest<'a> {
    text: &'a str,
    speaker_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    language_id: Option<&'a str>,
}

impl CoquiTts {
    /// `url` is the server base, e.g. `http://localhost:5002`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> crate::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TtsError::Config(format!("failed to build http client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
            language: None,
        })
    }

    /// Send `language_id` with every request, for multilingual models.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

#[async_trait]
impl SpeechBackend for CoquiTts {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, RemoteError> {
        let payload = TtsRequest {
            text: request.text.trim(),
            speaker_id: &request.voice.name,
            language_id: self.language.as_deref(),
        };

        let res = self
            .client
            .post(format!("{}/api/tts", self.url.trim_end_matches('/')))
            .json(&payload)
            .send()
            .await
            .map_err(transport_error)?;
        let status = res.status();
        let bytes = res.bytes().await.map_err(transport_error)?;

        match status {
            s if s.is_success() => Ok(bytes.to_vec()),
            StatusCode::TOO_MANY_REQUESTS => {
                Err(RemoteError::from_bytes(RemoteErrorKind::ResourceExhausted, &bytes))
            }
            _ => {
                let mut message = format!("{status}: ").into_bytes();
                message.extend_from_slice(&bytes);
                Err(RemoteError::from_bytes(RemoteErrorKind::Other, &message))
            }
        }
    }
}
