//! Single remote call with retry and backoff.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::backend::{AudioParams, SpeechBackend, SynthesisRequest, VoiceParams};
use crate::{RemoteError, Result, TtsConfig, TtsError};

/// Wait before a retry. Swapped out in tests to record the schedule.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Delay before the `retry`-th rate-limit retry (1-based): 2, 4, 8... seconds.
pub fn rate_limit_backoff(retry: u32) -> Duration {
    Duration::from_secs(2u64.saturating_pow(retry))
}

const DEADLINE_BACKOFF: Duration = Duration::from_secs(1);

/// Calls a [`SpeechBackend`] under the retry policy of a [`TtsConfig`].
///
/// Cheap to clone; clones share the backend and sleeper.
#[derive(Clone)]
pub struct SpeechClient {
    backend: Arc<dyn SpeechBackend>,
    config: Arc<TtsConfig>,
    sleeper: Arc<dyn Sleeper>,
}

impl SpeechClient {
    pub fn new(backend: Arc<dyn SpeechBackend>, config: TtsConfig) -> Self {
        Self {
            backend,
            config: Arc::new(config),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Same backend and sleeper, different settings.
    pub fn with_config(&self, config: TtsConfig) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            config: Arc::new(config),
            sleeper: Arc::clone(&self.sleeper),
        }
    }

    pub fn config(&self) -> &TtsConfig {
        &self.config
    }

    /// Build the request sent for `text` in `voice`.
    pub fn request(&self, text: &str, voice: &str) -> SynthesisRequest {
        SynthesisRequest {
            text: text.to_string(),
            voice: VoiceParams {
                language_code: self.config.language_code().to_string(),
                name: voice.to_string(),
            },
            audio: AudioParams {
                audio_encoding: self.config.audio_encoding(),
                speaking_rate: self.config.speaking_rate(),
                pitch: self.config.pitch(),
            },
        }
    }

    /// Synthesize `text`, retrying rate limits and timeouts.
    ///
    /// Both retryable classes draw on one counter bounded by
    /// `max_retries`. Once it is spent the last error is returned as is.
    pub async fn call(&self, text: &str, voice: &str) -> Result<Vec<u8>> {
        if self.config.strict_sentence_validation() {
            let limit = self.config.max_sentence_bytes();
            if let Some(sentence) = lingproc::oversized_sentence(text, limit) {
                return Err(TtsError::SentenceTooLong {
                    bytes: sentence.len(),
                    limit,
                    preview: sentence.chars().take(50).collect(),
                });
            }
        }

        let request = self.request(text, voice);
        let max_retries = self.config.max_retries();
        let mut retries = 0;
        loop {
            info!(text_bytes = text.len(), voice, "tts api call started");
            let err = match self.backend.synthesize(&request).await {
                Ok(audio) => {
                    info!(audio_bytes = audio.len(), "tts api call completed");
                    return Ok(audio);
                }
                Err(e) => e,
            };

            let wait = if err.is_rate_limited() {
                Some(("rate limit hit", rate_limit_backoff(retries + 1)))
            } else if err.is_deadline_exceeded() {
                Some(("request timed out", DEADLINE_BACKOFF))
            } else {
                None
            };

            match wait {
                Some((reason, delay)) if retries < max_retries => {
                    retries += 1;
                    warn!(
                        wait_seconds = delay.as_secs(),
                        retry = retries,
                        max_retries,
                        error = %err.message(),
                        "{reason}, retrying"
                    );
                    self.sleeper.sleep(delay).await;
                }
                _ => return Err(failed(err)),
            }
        }
    }
}

fn failed(err: RemoteError) -> TtsError {
    error!(error = %err.message(), "tts api call failed");
    TtsError::Remote(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles() {
        let secs: Vec<u64> = (1..=4).map(|r| rate_limit_backoff(r).as_secs()).collect();
        assert_eq!(secs, vec![2, 4, 8, 16]);
    }

    #[test]
    fn backoff_saturates() {
        assert_eq!(rate_limit_backoff(200), Duration::from_secs(u64::MAX));
    }
}
