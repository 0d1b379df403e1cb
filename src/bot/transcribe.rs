//! Speech-to-text backends.
//!
//! Two implementations behind one trait: the Hugging Face inference API
//! (default when a token is configured) and a local whisper-rs model.
//! Which one runs is decided once at startup.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

/// A speech recognizer: audio bytes in, best-effort text out.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: &[u8]) -> Result<String, String>;
}

const HF_ASR_URL: &str =
    "https://api-inference.huggingface.co/models/openai/whisper-large-v3-turbo";

/// Transcription via the Hugging Face inference API.
pub struct HfWhisper {
    token: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct AsrResponse {
    text: String,
}

impl HfWhisper {
    pub fn new(token: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .expect("Failed to build HTTP client");

        Self { token, client }
    }
}

#[async_trait]
impl Transcriber for HfWhisper {
    async fn transcribe(&self, audio: &[u8]) -> Result<String, String> {
        info!("🎙️ Transcribing {} bytes via Hugging Face", audio.len());

        let response = self
            .client
            .post(HF_ASR_URL)
            .bearer_auth(&self.token)
            .header("Content-Type", "audio/ogg")
            .body(audio.to_vec())
            .send()
            .await
            .map_err(|e| format!("Transcription request failed: {e}"))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| format!("Failed to read transcription response: {e}"))?;

        if !status.is_success() {
            return Err(format!("Transcription error {status}: {body}"));
        }

        let parsed: AsrResponse = serde_json::from_str(&body)
            .map_err(|e| format!("Failed to parse transcription response: {e}"))?;

        info!("Transcribed: \"{}\"", truncate(&parsed.text, 100));
        Ok(parsed.text)
    }
}

/// Transcription with a local Whisper model.
pub struct LocalWhisper {
    ctx: Arc<WhisperContext>,
}

impl LocalWhisper {
    /// Load a Whisper model from a .bin file.
    pub fn new(model_path: &Path) -> Result<Self, String> {
        info!("Loading Whisper model from {:?}", model_path);

        if !model_path.exists() {
            return Err(format!("Model file not found: {:?}", model_path));
        }

        let ctx = WhisperContext::new_with_params(
            model_path.to_str().ok_or("Invalid model path")?,
            WhisperContextParameters::default(),
        )
        .map_err(|e| format!("Failed to load Whisper model: {e}"))?;

        info!("Whisper model loaded successfully");
        Ok(Self { ctx: Arc::new(ctx) })
    }
}

#[async_trait]
impl Transcriber for LocalWhisper {
    async fn transcribe(&self, audio: &[u8]) -> Result<String, String> {
        let ctx = self.ctx.clone();
        let audio = audio.to_vec();

        // Whisper inference is CPU-bound; keep it off the async runtime.
        tokio::task::spawn_blocking(move || run_whisper(&ctx, &audio))
            .await
            .map_err(|e| format!("Transcription task failed: {e}"))?
    }
}

fn run_whisper(ctx: &WhisperContext, ogg_data: &[u8]) -> Result<String, String> {
    debug!("Transcribing {} bytes of audio locally", ogg_data.len());

    let pcm_data = convert_ogg_to_pcm(ogg_data)?;

    let mut state = ctx
        .create_state()
        .map_err(|e| format!("Failed to create Whisper state: {e}"))?;

    let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
    // The bot accepts any of the catalog languages as input
    params.set_language(Some("auto"));
    params.set_translate(false);
    params.set_no_timestamps(true);
    params.set_single_segment(false);

    state
        .full(params, &pcm_data)
        .map_err(|e| format!("Whisper transcription failed: {e}"))?;

    let mut text = String::new();
    for segment in state.as_iter() {
        if let Ok(s) = segment.to_str() {
            text.push_str(s);
            text.push(' ');
        }
    }

    let text = text.trim().to_string();
    info!("Transcribed: \"{}\"", truncate(&text, 100));
    Ok(text)
}

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Temp file path for one conversion. Concurrent transcriptions each get
/// their own file, so the counter suffix matters as much as the pid.
fn temp_input_path() -> PathBuf {
    let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("voxlate_voice_{}_{n}.ogg", std::process::id()))
}

/// Convert OGG Opus audio (Telegram voice format) to 16KHz mono f32 PCM
/// samples using ffmpeg.
fn convert_ogg_to_pcm(ogg_data: &[u8]) -> Result<Vec<f32>, String> {
    // ffmpeg needs seekable input for OGG, so go through a temp file
    let input_path = temp_input_path();

    std::fs::write(&input_path, ogg_data)
        .map_err(|e| format!("Failed to write temp input: {e}"))?;

    let output = Command::new("ffmpeg")
        .args([
            "-i",
            input_path.to_str().ok_or("Invalid temp path")?,
            "-ar",
            "16000", // 16KHz sample rate
            "-ac",
            "1", // Mono
            "-f",
            "s16le", // 16-bit signed little-endian PCM
            "-acodec",
            "pcm_s16le",
            "-y",
            "pipe:1",
        ])
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .output()
        .map_err(|e| format!("Failed to run ffmpeg: {e}"))?;

    let _ = std::fs::remove_file(&input_path);

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("ffmpeg failed: {}", stderr));
    }

    let samples: Vec<f32> = output
        .stdout
        .chunks_exact(2)
        .map(|chunk| {
            let sample = i16::from_le_bytes([chunk[0], chunk[1]]);
            sample as f32 / 32768.0
        })
        .collect();

    debug!("Converted to {} f32 samples", samples.len());
    Ok(samples)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        format!("{}...", s.chars().take(max).collect::<String>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 5), "hello...");
    }

    #[test]
    fn test_asr_response_parsing() {
        let parsed: AsrResponse =
            serde_json::from_str(r#"{"text": " Hello there."}"#).unwrap();
        assert_eq!(parsed.text, " Hello there.");
    }

    #[test]
    fn test_temp_input_paths_are_unique_per_call() {
        let first = temp_input_path();
        let second = temp_input_path();
        assert_ne!(first, second);

        let different: std::collections::HashSet<PathBuf> =
            (0..100).map(|_| temp_input_path()).collect();
        assert_eq!(different.len(), 100);
    }

    #[test]
    fn test_local_whisper_missing_model() {
        let err = LocalWhisper::new(Path::new("/nonexistent/model.bin")).err().unwrap();
        assert!(err.contains("not found"));
    }
}
