//! Synthesis configuration.
//!
//! A [`TtsConfig`] is validated whenever it is built, whether through
//! [`TtsConfigBuilder::build`], [`TtsConfig::from_env`] or deserialization,
//! so an invalid value is reported before any remote call is made.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::{Result, TtsError};

pub const DEFAULT_VOICE_NAME: &str = "en-GB-Chirp3-HD-Enceladus";
pub const DEFAULT_LANGUAGE_CODE: &str = "en-GB";
pub const DEFAULT_BYTE_LIMIT: usize = 850;
pub const DEFAULT_MAX_SENTENCE_BYTES: usize = 300;
pub const DEFAULT_THREAD_POOL_SIZE: usize = 10;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

const SPEAKING_RATE_RANGE: (f64, f64) = (0.25, 4.0);
const PITCH_RANGE: (f64, f64) = (-20.0, 20.0);

/// Output audio format requested from the backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AudioEncoding {
    #[default]
    Mp3,
    Linear16,
    OggOpus,
    Mulaw,
    Alaw,
}

impl AudioEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioEncoding::Mp3 => "MP3",
            AudioEncoding::Linear16 => "LINEAR16",
            AudioEncoding::OggOpus => "OGG_OPUS",
            AudioEncoding::Mulaw => "MULAW",
            AudioEncoding::Alaw => "ALAW",
        }
    }
}

impl fmt::Display for AudioEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AudioEncoding {
    type Err = TtsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "MP3" => Ok(AudioEncoding::Mp3),
            "LINEAR16" => Ok(AudioEncoding::Linear16),
            "OGG_OPUS" => Ok(AudioEncoding::OggOpus),
            "MULAW" => Ok(AudioEncoding::Mulaw),
            "ALAW" => Ok(AudioEncoding::Alaw),
            _ => Err(TtsError::Config(format!("unknown audio_encoding {s:?}"))),
        }
    }
}

/// Validated, immutable synthesis settings.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(try_from = "ConfigFile")]
pub struct TtsConfig {
    voice_name: String,
    language_code: String,
    speaking_rate: f64,
    pitch: f64,
    audio_encoding: AudioEncoding,
    timeout: Duration,
    max_retries: u32,
    thread_pool_size: usize,
    byte_limit: usize,
    strict_sentence_validation: bool,
    max_sentence_bytes: usize,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            voice_name: DEFAULT_VOICE_NAME.to_string(),
            language_code: DEFAULT_LANGUAGE_CODE.to_string(),
            speaking_rate: 1.0,
            pitch: 0.0,
            audio_encoding: AudioEncoding::Mp3,
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            thread_pool_size: DEFAULT_THREAD_POOL_SIZE,
            byte_limit: DEFAULT_BYTE_LIMIT,
            strict_sentence_validation: false,
            max_sentence_bytes: DEFAULT_MAX_SENTENCE_BYTES,
        }
    }
}

impl TtsConfig {
    pub fn builder() -> TtsConfigBuilder {
        TtsConfigBuilder::default()
    }

    /// Start a builder from this configuration, for per-call overrides.
    pub fn to_builder(&self) -> TtsConfigBuilder {
        TtsConfigBuilder {
            config: self.clone(),
        }
    }

    /// Load settings from `TTS_*` environment variables.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary key lookup (see [`from_env`]).
    ///
    /// [`from_env`]: TtsConfig::from_env
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::builder();
        if let Some(v) = lookup("TTS_VOICE_NAME") {
            builder = builder.voice_name(v);
        }
        if let Some(v) = lookup("TTS_LANGUAGE_CODE") {
            builder = builder.language_code(v);
        }
        if let Some(v) = lookup("TTS_SPEAKING_RATE") {
            builder = builder.speaking_rate(parse_var("speaking_rate", &v, "a number")?);
        }
        if let Some(v) = lookup("TTS_PITCH") {
            builder = builder.pitch(parse_var("pitch", &v, "a number")?);
        }
        if let Some(v) = lookup("TTS_AUDIO_ENCODING") {
            builder = builder.audio_encoding(v.parse()?);
        }
        if let Some(v) = lookup("TTS_TIMEOUT_SECS") {
            let secs: u64 = parse_var("timeout", &v, "a whole number of seconds")?;
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(v) = lookup("TTS_MAX_RETRIES") {
            builder = builder.max_retries(parse_var("max_retries", &v, "a non-negative integer")?);
        }
        if let Some(v) = lookup("TTS_THREAD_POOL_SIZE") {
            builder =
                builder.thread_pool_size(parse_var("thread_pool_size", &v, "a positive integer")?);
        }
        if let Some(v) = lookup("TTS_BYTE_LIMIT") {
            builder = builder.byte_limit(parse_var("byte_limit", &v, "a positive integer")?);
        }
        if let Some(v) = lookup("TTS_STRICT_SENTENCES") {
            builder = builder.strict_sentence_validation(parse_flag("strict_sentences", &v)?);
        }
        if let Some(v) = lookup("TTS_MAX_SENTENCE_BYTES") {
            builder = builder
                .max_sentence_bytes(parse_var("max_sentence_bytes", &v, "a positive integer")?);
        }
        builder.build()
    }

    pub fn voice_name(&self) -> &str {
        &self.voice_name
    }

    pub fn language_code(&self) -> &str {
        &self.language_code
    }

    pub fn speaking_rate(&self) -> f64 {
        self.speaking_rate
    }

    pub fn pitch(&self) -> f64 {
        self.pitch
    }

    pub fn audio_encoding(&self) -> AudioEncoding {
        self.audio_encoding
    }

    /// Timeout applied to each individual remote call.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Number of remote calls allowed in flight at once.
    pub fn thread_pool_size(&self) -> usize {
        self.thread_pool_size
    }

    /// Maximum chunk size in bytes.
    pub fn byte_limit(&self) -> usize {
        self.byte_limit
    }

    pub fn strict_sentence_validation(&self) -> bool {
        self.strict_sentence_validation
    }

    /// Largest sentence accepted when strict validation is enabled.
    pub fn max_sentence_bytes(&self) -> usize {
        self.max_sentence_bytes
    }

    fn validate(&self) -> Result<()> {
        let (lo, hi) = SPEAKING_RATE_RANGE;
        if !(lo..=hi).contains(&self.speaking_rate) {
            return Err(TtsError::Config(format!(
                "speaking_rate must be between {lo} and {hi}, got {}",
                self.speaking_rate
            )));
        }
        let (lo, hi) = PITCH_RANGE;
        if !(lo..=hi).contains(&self.pitch) {
            return Err(TtsError::Config(format!(
                "pitch must be between {lo:.1} and {hi:.1}, got {}",
                self.pitch
            )));
        }
        if self.thread_pool_size == 0 {
            return Err(TtsError::Config(
                "thread_pool_size must be a positive integer, got 0".into(),
            ));
        }
        if self.byte_limit == 0 {
            return Err(TtsError::Config(
                "byte_limit must be a positive integer, got 0".into(),
            ));
        }
        if self.max_sentence_bytes == 0 {
            return Err(TtsError::Config(
                "max_sentence_bytes must be a positive integer, got 0".into(),
            ));
        }
        Ok(())
    }
}

/// Fluent builder for [`TtsConfig`]. Nothing is checked until [`build`].
///
/// [`build`]: TtsConfigBuilder::build
#[derive(Clone, Debug, Default)]
pub struct TtsConfigBuilder {
    config: TtsConfig,
}

impl TtsConfigBuilder {
    pub fn voice_name(mut self, value: impl Into<String>) -> Self {
        self.config.voice_name = value.into();
        self
    }

    pub fn language_code(mut self, value: impl Into<String>) -> Self {
        self.config.language_code = value.into();
        self
    }

    pub fn speaking_rate(mut self, value: f64) -> Self {
        self.config.speaking_rate = value;
        self
    }

    pub fn pitch(mut self, value: f64) -> Self {
        self.config.pitch = value;
        self
    }

    pub fn audio_encoding(mut self, value: AudioEncoding) -> Self {
        self.config.audio_encoding = value;
        self
    }

    pub fn timeout(mut self, value: Duration) -> Self {
        self.config.timeout = value;
        self
    }

    pub fn max_retries(mut self, value: u32) -> Self {
        self.config.max_retries = value;
        self
    }

    pub fn thread_pool_size(mut self, value: usize) -> Self {
        self.config.thread_pool_size = value;
        self
    }

    pub fn byte_limit(mut self, value: usize) -> Self {
        self.config.byte_limit = value;
        self
    }

    pub fn strict_sentence_validation(mut self, value: bool) -> Self {
        self.config.strict_sentence_validation = value;
        self
    }

    pub fn max_sentence_bytes(mut self, value: usize) -> Self {
        self.config.max_sentence_bytes = value;
        self
    }

    pub fn build(self) -> Result<TtsConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// On-disk shape of [`TtsConfig`]; every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    voice_name: Option<String>,
    language_code: Option<String>,
    speaking_rate: Option<f64>,
    pitch: Option<f64>,
    audio_encoding: Option<AudioEncoding>,
    timeout_seconds: Option<u64>,
    max_retries: Option<u32>,
    thread_pool_size: Option<usize>,
    byte_limit: Option<usize>,
    strict_sentence_validation: Option<bool>,
    max_sentence_bytes: Option<usize>,
}

impl TryFrom<ConfigFile> for TtsConfig {
    type Error = TtsError;

    fn try_from(file: ConfigFile) -> Result<Self> {
        let mut b = TtsConfig::builder();
        if let Some(v) = file.voice_name {
            b = b.voice_name(v);
        }
        if let Some(v) = file.language_code {
            b = b.language_code(v);
        }
        if let Some(v) = file.speaking_rate {
            b = b.speaking_rate(v);
        }
        if let Some(v) = file.pitch {
            b = b.pitch(v);
        }
        if let Some(v) = file.audio_encoding {
            b = b.audio_encoding(v);
        }
        if let Some(v) = file.timeout_seconds {
            b = b.timeout(Duration::from_secs(v));
        }
        if let Some(v) = file.max_retries {
            b = b.max_retries(v);
        }
        if let Some(v) = file.thread_pool_size {
            b = b.thread_pool_size(v);
        }
        if let Some(v) = file.byte_limit {
            b = b.byte_limit(v);
        }
        if let Some(v) = file.strict_sentence_validation {
            b = b.strict_sentence_validation(v);
        }
        if let Some(v) = file.max_sentence_bytes {
            b = b.max_sentence_bytes(v);
        }
        b.build()
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str, expected: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| TtsError::Config(format!("{name} must be {expected}, got {value:?}")))
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(TtsError::Config(format!(
            "{name} must be true or false, got {value:?}"
        ))),
    }
}
