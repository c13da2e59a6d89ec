use assert_cmd::Command;
use base64::{Engine as _, engine::general_purpose};
use httpmock::{Method::POST, MockServer};
use serde_json::{Value, json};

fn narrate() -> Command {
    let mut cmd = Command::cargo_bin("narrate").unwrap();
    for var in [
        "GOOGLE_API_KEY",
        "GOOGLE_ACCESS_TOKEN",
        "GOOGLE_TTS_ENDPOINT",
        "NARRATE_BACKEND",
        "NARRATE_VOICE",
        "TTS_BYTE_LIMIT",
        "TTS_THREAD_POOL_SIZE",
        "TTS_VOICE_NAME",
    ] {
        cmd.env_remove(var);
    }
    cmd.env("RUST_LOG", "warn");
    cmd
}

fn plan(stdout: &[u8]) -> Vec<String> {
    let chunks: Vec<Value> = serde_json::from_slice(stdout).unwrap();
    chunks
        .iter()
        .map(|c| c["text"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn plan_prints_chunks_from_stdin() {
    let out = narrate()
        .args(["--plan", "--byte-limit", "30"])
        .write_stdin("First sentence. Second sentence. Third sentence.")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(
        plan(&out),
        vec!["First sentence.", "Second sentence.", "Third sentence."]
    );
}

#[test]
fn plan_reads_byte_limit_from_env() {
    let out = narrate()
        .arg("--plan")
        .env("TTS_BYTE_LIMIT", "10")
        .write_stdin("One. Two. Three. Four.")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(plan(&out), vec!["One. Two.", "Three.", "Four."]);
}

#[test]
fn invalid_config_is_rejected() {
    let assert = narrate()
        .args(["--plan", "--byte-limit", "0"])
        .write_stdin("Hello.")
        .assert()
        .failure();
    assert!(stderr(&assert.get_output().stderr).contains("byte_limit"));
}

#[test]
fn google_backend_requires_credentials() {
    let path = std::env::temp_dir().join(format!("narrate-nocreds-{}.mp3", std::process::id()));
    let assert = narrate()
        .arg("--output")
        .arg(&path)
        .write_stdin("Hello.")
        .assert()
        .failure();
    assert!(stderr(&assert.get_output().stderr).contains("--api-key"));
    assert!(!path.exists());
}

#[test]
fn synthesizes_to_output_file() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/text:synthesize")
            .query_param("key", "test-key");
        then.status(200)
            .json_body(json!({ "audioContent": general_purpose::STANDARD.encode(b"mp3") }));
    });

    let path = std::env::temp_dir().join(format!("narrate-out-{}.mp3", std::process::id()));
    narrate()
        .args(["--api-key", "test-key", "--endpoint"])
        .arg(server.base_url())
        .arg("--output")
        .arg(&path)
        .write_stdin("Hello there.")
        .assert()
        .success();

    assert_eq!(std::fs::read(&path).unwrap(), b"mp3");
    mock.assert();
    std::fs::remove_file(&path).unwrap();
}

fn stderr(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
