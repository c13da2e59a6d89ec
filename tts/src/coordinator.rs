//! Fan chunks out to a worker pool and reassemble the audio in order.

use lingproc::Chunk;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::{Result, SpeechClient, TtsError, WorkerPool};

/// What happened to one chunk.
#[derive(Debug)]
pub enum ChunkOutcome {
    Audio(Vec<u8>),
    /// Rejected by the content filter; contributes no audio.
    Skipped,
    Failed(TtsError),
}

/// Result of a multi-chunk synthesis.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Synthesis {
    pub audio: Vec<u8>,
    /// Indices of content-filtered chunks, ascending.
    pub skipped: Vec<usize>,
    pub chunk_count: usize,
    pub elapsed: Duration,
}

pub struct SynthesisCoordinator {
    client: SpeechClient,
}

impl SynthesisCoordinator {
    pub fn new(client: SpeechClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &SpeechClient {
        &self.client
    }

    /// Synthesize every chunk and concatenate the audio in chunk order.
    pub async fn synthesize(&self, chunks: &[Chunk], voice: &str) -> Result<Vec<u8>> {
        Ok(self.synthesize_report(chunks, voice).await?.audio)
    }

    /// Like [`synthesize`](Self::synthesize), also reporting skipped chunks
    /// and timing.
    ///
    /// Every task is awaited before returning, even when one has already
    /// failed. If several fail, the error of the lowest index wins.
    pub async fn synthesize_report(&self, chunks: &[Chunk], voice: &str) -> Result<Synthesis> {
        if chunks.is_empty() {
            return Ok(Synthesis::default());
        }

        let started = Instant::now();
        let pool_size = self.client.config().thread_pool_size();
        info!(
            chunks = chunks.len(),
            pool_size,
            "starting concurrent synthesis"
        );
        for chunk in chunks {
            debug!(chunk = chunk.index + 1, bytes = chunk.byte_len(), "chunk size");
        }

        let mut pool = WorkerPool::new(pool_size);
        for chunk in chunks {
            let client = self.client.clone();
            let chunk = chunk.clone();
            let voice = voice.to_string();
            pool.submit(async move {
                let outcome = process_chunk(&client, &chunk, &voice).await;
                (chunk.index, outcome)
            });
        }

        // join() yields results in submission order, i.e. chunk order.
        let mut outcomes: Vec<(usize, ChunkOutcome)> = chunks
            .iter()
            .zip(pool.join().await)
            .map(|(chunk, joined)| {
                joined.unwrap_or_else(|e| {
                    error!(chunk = chunk.index + 1, error = %e, "synthesis worker did not finish");
                    (chunk.index, ChunkOutcome::Failed(TtsError::Worker(e.to_string())))
                })
            })
            .collect();
        outcomes.sort_by_key(|(index, _)| *index);

        let mut report = Synthesis {
            chunk_count: chunks.len(),
            ..Synthesis::default()
        };
        let mut parts = 0;
        for (index, outcome) in outcomes {
            match outcome {
                ChunkOutcome::Audio(audio) => {
                    report.audio.extend_from_slice(&audio);
                    parts += 1;
                }
                ChunkOutcome::Skipped => report.skipped.push(index),
                ChunkOutcome::Failed(e) => {
                    error!(chunk = index + 1, error = %e, "chunk synthesis failed");
                    return Err(e);
                }
            }
        }

        if !report.skipped.is_empty() {
            let numbers: Vec<usize> = report.skipped.iter().map(|i| i + 1).collect();
            warn!(skipped = ?numbers, "skipped content-filtered chunks");
        }
        report.elapsed = started.elapsed();
        info!(
            parts,
            total_ms = report.elapsed.as_millis() as u64,
            average_ms = average_per_chunk(report.elapsed, chunks.len()).as_millis() as u64,
            "concatenated audio parts"
        );
        Ok(report)
    }
}

fn average_per_chunk(elapsed: Duration, chunks: usize) -> Duration {
    if chunks == 0 {
        return Duration::ZERO;
    }
    Duration::from_secs_f64(elapsed.as_secs_f64() / chunks as f64)
}

async fn process_chunk(client: &SpeechClient, chunk: &Chunk, voice: &str) -> ChunkOutcome {
    let number = chunk.index + 1;
    let started = Instant::now();
    debug!(chunk = number, "chunk started");
    let outcome = match client.call(&chunk.text, voice).await {
        Ok(audio) => ChunkOutcome::Audio(audio),
        Err(e) if e.is_content_filtered() => {
            warn!(chunk = number, error = %e, "chunk rejected by content filter, skipping");
            ChunkOutcome::Skipped
        }
        Err(e) => ChunkOutcome::Failed(e),
    };
    debug!(
        chunk = number,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "chunk done"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_handles_chunk_counts_beyond_u32() {
        let chunks = u32::MAX as usize + 2;
        let avg = average_per_chunk(Duration::from_secs(chunks as u64), chunks);
        assert_eq!(avg.as_secs(), 1);
    }

    #[test]
    fn average_of_no_chunks_is_zero() {
        assert_eq!(average_per_chunk(Duration::from_secs(3), 0), Duration::ZERO);
    }
}
