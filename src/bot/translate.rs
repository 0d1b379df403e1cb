//! Text translation using the free Google Translate web endpoint.

use async_trait::async_trait;
use tracing::{debug, info};

/// A text translator: source text plus a target language code from the
/// catalog, translated text out.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target: &str) -> Result<String, String>;
}

const TRANSLATE_URL: &str = "https://translate.googleapis.com/translate_a/single";

/// Translator backed by the unauthenticated `translate_a/single` endpoint
/// (the same one the web widget uses). Source language is auto-detected.
pub struct GoogleTranslate {
    client: reqwest::Client,
}

impl GoogleTranslate {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .expect("Failed to build HTTP client");

        Self { client }
    }
}

impl Default for GoogleTranslate {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Translator for GoogleTranslate {
    async fn translate(&self, text: &str, target: &str) -> Result<String, String> {
        let preview: String = text.chars().take(50).collect();
        info!("🌐 Translating to {target}: \"{preview}\"");

        let url = format!(
            "{TRANSLATE_URL}?client=gtx&sl=auto&tl={target}&dt=t&q={}",
            urlencoding::encode(text)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| format!("Translation request failed: {e}"))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| format!("Failed to read translation response: {e}"))?;

        debug!("Translation response status: {status}");

        if !status.is_success() {
            return Err(format!("Translation error {status}: {body}"));
        }

        parse_translation(&body)
    }
}

/// The endpoint answers with a nested array: element 0 is a list of
/// segments, each segment's element 0 is a translated piece. Concatenate
/// the pieces.
fn parse_translation(body: &str) -> Result<String, String> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| format!("Failed to parse translation response: {e}"))?;

    let segments = value
        .get(0)
        .and_then(|v| v.as_array())
        .ok_or("Unexpected translation response shape")?;

    let mut translated = String::new();
    for segment in segments {
        if let Some(piece) = segment.get(0).and_then(|v| v.as_str()) {
            translated.push_str(piece);
        }
    }

    if translated.is_empty() {
        return Err("Empty translation response".to_string());
    }

    Ok(translated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_segment() {
        let body = r#"[[["Bonjour","Hello",null,null,10]],null,"en"]"#;
        assert_eq!(parse_translation(body).unwrap(), "Bonjour");
    }

    #[test]
    fn test_parse_concatenates_segments() {
        let body = r#"[[["Bonjour le monde. ","Hello world. ",null,null,10],["Comment ça va ?","How are you?",null,null,10]],null,"en"]"#;
        assert_eq!(
            parse_translation(body).unwrap(),
            "Bonjour le monde. Comment ça va ?"
        );
    }

    #[test]
    fn test_parse_rejects_unexpected_shape() {
        assert!(parse_translation(r#"{"error": "nope"}"#).is_err());
        assert!(parse_translation("[]").is_err());
        assert!(parse_translation("not json").is_err());
    }
}
