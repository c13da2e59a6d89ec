use std::sync::Arc;
use tokio::time::Instant;
use tracing::info;

use crate::{Result, SpeechBackend, SpeechClient, Synthesis, SynthesisCoordinator, TtsConfig};

/// Text in, audio out.
///
/// Segments the text with the configured byte limit. A single chunk goes
/// straight to the [`SpeechClient`]; anything longer is fanned out through a
/// [`SynthesisCoordinator`].
pub struct Synthesizer {
    coordinator: SynthesisCoordinator,
}

impl Synthesizer {
    pub fn new(backend: Arc<dyn SpeechBackend>, config: TtsConfig) -> Self {
        Self::from_client(SpeechClient::new(backend, config))
    }

    pub fn from_client(client: SpeechClient) -> Self {
        Self {
            coordinator: SynthesisCoordinator::new(client),
        }
    }

    /// A synthesizer sharing this one's backend with different settings.
    pub fn with_config(&self, config: TtsConfig) -> Self {
        Self::from_client(self.client().with_config(config))
    }

    pub fn config(&self) -> &TtsConfig {
        self.client().config()
    }

    fn client(&self) -> &SpeechClient {
        self.coordinator.client()
    }

    /// Synthesize `text`, in `voice` or the configured default voice.
    pub async fn synthesize(&self, text: &str, voice: Option<&str>) -> Result<Vec<u8>> {
        Ok(self.synthesize_report(text, voice).await?.audio)
    }

    pub async fn synthesize_report(&self, text: &str, voice: Option<&str>) -> Result<Synthesis> {
        let config = self.config();
        let voice = voice.unwrap_or(config.voice_name());
        let started = Instant::now();
        let chunks = lingproc::chunk_text(text, config.byte_limit());
        info!(
            text_bytes = text.len(),
            chunks = chunks.len(),
            byte_limit = config.byte_limit(),
            voice,
            "synthesizing text"
        );

        let report = if let [chunk] = chunks.as_slice() {
            let audio = self.client().call(&chunk.text, voice).await?;
            Synthesis {
                audio,
                skipped: Vec::new(),
                chunk_count: 1,
                elapsed: started.elapsed(),
            }
        } else {
            self.coordinator.synthesize_report(&chunks, voice).await?
        };

        info!(
            size = %format_size(report.audio.len()),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "generated audio"
        );
        Ok(report)
    }
}

/// Human-readable byte count: `512 bytes`, `1.5 KB`, `2.0 MB`.
///
/// ```
/// assert_eq!(tts::format_size(2048), "2.0 KB");
/// ```
pub fn format_size(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let n = bytes as f64;
    if n < KB {
        format!("{bytes} bytes")
    } else if n < MB {
        format!("{:.1} KB", n / KB)
    } else {
        format!("{:.1} MB", n / MB)
    }
}
