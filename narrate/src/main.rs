use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use dotenvy::dotenv;
use std::{
    io::{self, Read},
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::info;
use tts::{CoquiTts, Credentials, GoogleTts, SpeechBackend, Synthesizer, TtsConfig, format_size};

mod logging;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Backend {
    Google,
    Coqui,
}

/// Synthesize a long text into a single audio file.
///
/// Synthesis settings come from `TTS_*` environment variables (or a `.env`
/// file); the flags below override them.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Text file to read; stdin when omitted or `-`
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Audio file to write
    #[arg(short, long, required_unless_present = "plan")]
    output: Option<PathBuf>,

    /// Print the chunk plan as JSON instead of synthesizing
    #[arg(long)]
    plan: bool,

    /// Speech service to call
    #[arg(long, value_enum, env = "NARRATE_BACKEND", default_value_t = Backend::Google)]
    backend: Backend,

    /// Google Cloud API key
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// OAuth access token, used when no API key is given
    #[arg(long, env = "GOOGLE_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Base URL of the Google endpoint
    #[arg(long, env = "GOOGLE_TTS_ENDPOINT")]
    endpoint: Option<String>,

    /// Base URL of the Coqui server
    #[arg(long, env = "COQUI_URL", default_value = "http://localhost:5002")]
    coqui_url: String,

    /// Coqui `language_id` for multilingual models
    #[arg(long, env = "COQUI_LANGUAGE")]
    coqui_language: Option<String>,

    /// Voice name (Coqui speaker id); defaults to TTS_VOICE_NAME
    #[arg(long, env = "NARRATE_VOICE")]
    voice: Option<String>,

    /// Maximum chunk size in bytes
    #[arg(long)]
    byte_limit: Option<usize>,

    /// Remote calls in flight at once
    #[arg(long)]
    threads: Option<usize>,

    /// Reject sentences longer than TTS_MAX_SENTENCE_BYTES
    #[arg(long)]
    strict: bool,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    logging::init_logging();
    let cli = Cli::parse();

    let config = build_config(&cli)?;
    let text = read_input(cli.input.as_deref())?;

    if cli.plan {
        let chunks = lingproc::chunk_text(&text, config.byte_limit());
        println!("{}", serde_json::to_string_pretty(&chunks)?);
        return Ok(());
    }

    let Some(output) = cli.output.as_deref() else {
        bail!("--output is required unless --plan is given");
    };
    let backend = build_backend(&cli, &config)?;
    let synth = Synthesizer::new(backend, config);
    let report = synth.synthesize_report(&text, cli.voice.as_deref()).await?;

    std::fs::write(output, &report.audio)
        .with_context(|| format!("failed to write {}", output.display()))?;
    info!(
        path = %output.display(),
        size = %format_size(report.audio.len()),
        chunks = report.chunk_count,
        skipped = report.skipped.len(),
        "wrote audio"
    );
    Ok(())
}

fn build_config(cli: &Cli) -> anyhow::Result<TtsConfig> {
    let mut builder = TtsConfig::from_env()?.to_builder();
    if let Some(limit) = cli.byte_limit {
        builder = builder.byte_limit(limit);
    }
    if let Some(threads) = cli.threads {
        builder = builder.thread_pool_size(threads);
    }
    if cli.strict {
        builder = builder.strict_sentence_validation(true);
    }
    Ok(builder.build()?)
}

fn build_backend(cli: &Cli, config: &TtsConfig) -> anyhow::Result<Arc<dyn SpeechBackend>> {
    let backend: Arc<dyn SpeechBackend> = match cli.backend {
        Backend::Google => {
            let credentials = match (&cli.api_key, &cli.access_token) {
                (Some(key), _) => Credentials::ApiKey(key.clone()),
                (None, Some(token)) => Credentials::BearerToken(token.clone()),
                (None, None) if cli.endpoint.is_some() => Credentials::Anonymous,
                (None, None) => bail!("the google backend needs --api-key or --access-token"),
            };
            let mut google = GoogleTts::new(credentials, config.timeout())?;
            if let Some(endpoint) = &cli.endpoint {
                google = google.with_endpoint(endpoint);
            }
            Arc::new(google)
        }
        Backend::Coqui => {
            let mut coqui = CoquiTts::new(&cli.coqui_url, config.timeout())?;
            if let Some(language) = &cli.coqui_language {
                coqui = coqui.with_language(language);
            }
            Arc::new(coqui)
        }
    };
    Ok(backend)
}

fn read_input(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(p) if p != Path::new("-") => {
            std::fs::read_to_string(p).with_context(|| format!("failed to read {}", p.display()))
        }
        _ => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            Ok(text)
        }
    }
}
