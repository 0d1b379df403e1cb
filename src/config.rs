use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the config file.
    ReadFile { path: PathBuf, source: std::io::Error },
    /// Failed to parse JSON.
    ParseJson { path: PathBuf, source: serde_json::Error },
    /// Validation error.
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFile { path, source } => {
                write!(f, "failed to read config file '{}': {}", path.display(), source)
            }
            Self::ParseJson { path, source } => {
                write!(f, "failed to parse config file '{}': {}", path.display(), source)
            }
            Self::Validation(msg) => write!(f, "config validation error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReadFile { source, .. } => Some(source),
            Self::ParseJson { source, .. } => Some(source),
            Self::Validation(_) => None,
        }
    }
}

#[derive(Deserialize)]
struct ConfigFile {
    telegram_bot_token: String,
    /// Hugging Face token for the hosted transcription API.
    hf_token: Option<String>,
    /// Fallback credential for transcription when hf_token is absent.
    google_api_key: Option<String>,
    /// Path to a local Whisper model file (.bin). When set, voice messages
    /// are transcribed locally instead of via the Hugging Face API.
    whisper_model_path: Option<String>,
    /// Port for the liveness endpoint.
    port: Option<u16>,
}

fn default_port() -> u16 {
    7860
}

pub struct Config {
    pub telegram_bot_token: String,
    pub hf_token: Option<String>,
    pub google_api_key: Option<String>,
    /// Path to a local Whisper model file (.bin).
    pub whisper_model_path: Option<PathBuf>,
    /// Port for the liveness endpoint.
    pub port: u16,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config_path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| ConfigError::ReadFile { path: config_path.clone(), source: e })?;
        let file: ConfigFile = serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseJson { path: config_path.clone(), source: e })?;

        if file.telegram_bot_token.is_empty() {
            return Err(ConfigError::Validation("telegram_bot_token is required".into()));
        }
        // Telegram tokens are formatted as {bot_id}:{secret} where bot_id is numeric
        let token_parts: Vec<&str> = file.telegram_bot_token.split(':').collect();
        if token_parts.len() != 2 || token_parts[0].parse::<u64>().is_err() || token_parts[1].is_empty() {
            return Err(ConfigError::Validation(
                "telegram_bot_token appears invalid (expected format: 123456789:ABCdefGHI...)".into()
            ));
        }

        Ok(Self {
            telegram_bot_token: file.telegram_bot_token,
            hf_token: non_empty(file.hf_token),
            google_api_key: non_empty(file.google_api_key),
            whisper_model_path: file.whisper_model_path.map(PathBuf::from),
            port: file.port.unwrap_or_else(default_port),
        })
    }

    /// Credential for the hosted transcription API: hf_token, falling back
    /// to google_api_key. None means no credential is configured.
    pub fn transcription_token(&self) -> Option<String> {
        self.hf_token.clone().or_else(|| self.google_api_key.clone())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn assert_err<T>(result: Result<T, ConfigError>) -> ConfigError {
        match result {
            Ok(_) => panic!("expected error, got Ok"),
            Err(e) => e,
        }
    }

    #[test]
    fn test_valid_config() {
        let file = write_config(r#"{
            "telegram_bot_token": "123456789:ABCdefGHIjklMNOpqrsTUVwxyz"
        }"#);
        let config = Config::load(file.path()).expect("should load valid config");
        assert_eq!(config.telegram_bot_token, "123456789:ABCdefGHIjklMNOpqrsTUVwxyz");
        assert_eq!(config.port, 7860);
        assert!(config.transcription_token().is_none());
    }

    #[test]
    fn test_empty_token() {
        let file = write_config(r#"{
            "telegram_bot_token": ""
        }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("telegram_bot_token"));
    }

    #[test]
    fn test_invalid_token_format_no_colon() {
        let file = write_config(r#"{
            "telegram_bot_token": "invalid_token_no_colon"
        }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("invalid"));
    }

    #[test]
    fn test_invalid_token_format_non_numeric_id() {
        let file = write_config(r#"{
            "telegram_bot_token": "notanumber:ABCdef"
        }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_invalid_token_format_empty_secret() {
        let file = write_config(r#"{
            "telegram_bot_token": "123456789:"
        }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_file_not_found() {
        let err = assert_err(Config::load("/nonexistent/path/config.json"));
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn test_invalid_json() {
        let file = write_config("{ invalid json }");
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::ParseJson { .. }));
    }

    #[test]
    fn test_transcription_token_prefers_hf() {
        let file = write_config(r#"{
            "telegram_bot_token": "123456789:ABCdef",
            "hf_token": "hf_abc",
            "google_api_key": "g_key"
        }"#);
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.transcription_token().as_deref(), Some("hf_abc"));
    }

    #[test]
    fn test_transcription_token_falls_back_to_google() {
        let file = write_config(r#"{
            "telegram_bot_token": "123456789:ABCdef",
            "google_api_key": "g_key"
        }"#);
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.transcription_token().as_deref(), Some("g_key"));
    }

    #[test]
    fn test_empty_credentials_treated_as_absent() {
        let file = write_config(r#"{
            "telegram_bot_token": "123456789:ABCdef",
            "hf_token": "",
            "google_api_key": ""
        }"#);
        let config = Config::load(file.path()).unwrap();
        assert!(config.hf_token.is_none());
        assert!(config.transcription_token().is_none());
    }

    #[test]
    fn test_custom_port() {
        let file = write_config(r#"{
            "telegram_bot_token": "123456789:ABCdef",
            "port": 8080
        }"#);
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.port, 8080);
    }
}
