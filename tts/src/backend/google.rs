//! Google Cloud Text-to-Speech over its REST API.

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{transport_error, AudioParams, SpeechBackend, SynthesisRequest, VoiceParams};
use crate::{sanitize_message, RemoteError, TtsError};

pub const DEFAULT_ENDPOINT: &str = "https://texttospeech.googleapis.com";

/// How requests are authenticated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Credentials {
    /// Sent as the `key` query parameter.
    ApiKey(String),
    /// Sent as an `Authorization: Bearer` header.
    BearerToken(String),
    /// No authentication, e.g. behind a local proxy.
    Anonymous,
}

pub struct GoogleTts {
    client: Client,
    endpoint: String,
    credentials: Credentials,
}

impl GoogleTts {
    /// Create a client whose requests time out after `timeout`.
    pub fn new(credentials: Credentials, timeout: Duration) -> crate::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TtsError::Config(format!("failed to build http client: {e}")))?;
        Ok(Self {
            client,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            credentials,
        })
    }

    /// Target another base URL (e.g. a regional endpoint or a test server).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeBody<'a> {
    input: Input<'a>,
    voice: &'a VoiceParams,
    audio_config: &'a AudioParams,
}

#[derive(Serialize)]
struct Input<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

#[async_trait]
impl SpeechBackend for GoogleTts {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, RemoteError> {
        let url = format!("{}/v1/text:synthesize", self.endpoint.trim_end_matches('/'));
        let body = SynthesizeBody {
            input: Input {
                text: &request.text,
            },
            voice: &request.voice,
            audio_config: &request.audio,
        };
        let mut builder = self.client.post(url).json(&body);
        builder = match &self.credentials {
            Credentials::ApiKey(key) => builder.query(&[("key", key)]),
            Credentials::BearerToken(token) => builder.bearer_auth(token),
            Credentials::Anonymous => builder,
        };

        let res = builder.send().await.map_err(transport_error)?;
        let status = res.status();
        let bytes = res.bytes().await.map_err(transport_error)?;
        if !status.is_success() {
            return Err(error_from_response(status, &bytes));
        }

        let parsed: SynthesizeResponse = serde_json::from_slice(&bytes)
            .map_err(|e| RemoteError::other(format!("invalid synthesize response: {e}")))?;
        general_purpose::STANDARD
            .decode(parsed.audio_content)
            .map_err(|e| RemoteError::other(format!("invalid audio content: {e}")))
    }
}

fn error_from_response(status: StatusCode, body: &[u8]) -> RemoteError {
    let (remote_status, message) = match serde_json::from_slice::<ErrorEnvelope>(body) {
        Ok(envelope) => (envelope.error.status, envelope.error.message),
        Err(_) => (String::new(), sanitize_message(body)),
    };
    if status == StatusCode::TOO_MANY_REQUESTS || remote_status == "RESOURCE_EXHAUSTED" {
        RemoteError::rate_limited(format!("{status}: {message}"))
    } else if status == StatusCode::GATEWAY_TIMEOUT || remote_status == "DEADLINE_EXCEEDED" {
        RemoteError::deadline_exceeded(format!("{status}: {message}"))
    } else {
        RemoteError::other(format!("{status}: {message}"))
    }
}
