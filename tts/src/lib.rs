//! Turn long text into one audio file through a remote speech service.
//!
//! Text is segmented into byte-bounded chunks by [`lingproc`], each chunk is
//! synthesized with retry and backoff, and the audio is concatenated in
//! chunk order.

pub mod backend;
pub mod client;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod pool;
pub mod synthesizer;

pub use crate::backend::{CoquiTts, Credentials, GoogleTts, SpeechBackend, SynthesisRequest};
pub use crate::client::{Sleeper, SpeechClient, TokioSleeper};
pub use crate::config::{AudioEncoding, TtsConfig, TtsConfigBuilder};
pub use crate::coordinator::{ChunkOutcome, Synthesis, SynthesisCoordinator};
pub use crate::error::{sanitize_message, RemoteError, RemoteErrorKind, Result, TtsError};
pub use crate::pool::WorkerPool;
pub use crate::synthesizer::{format_size, Synthesizer};
