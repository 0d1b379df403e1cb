//! Text-to-speech using the Google Translate TTS endpoint.
//!
//! Returns MP3 audio, which Telegram accepts as a voice message payload.

use async_trait::async_trait;
use tracing::{debug, info};

/// A speech synthesizer: text plus a language code in, playable audio
/// bytes out.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, lang: &str) -> Result<Vec<u8>, String>;
}

const TTS_URL: &str = "https://translate.google.com/translate_tts";

/// The endpoint rejects queries longer than this, so longer text is split
/// and the resulting MP3 chunks concatenated.
const MAX_CHUNK_CHARS: usize = 200;

/// Synthesizer backed by the unauthenticated `translate_tts` endpoint.
pub struct GoogleTts {
    client: reqwest::Client,
}

impl GoogleTts {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .expect("Failed to build HTTP client");

        Self { client }
    }
}

impl Default for GoogleTts {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Synthesizer for GoogleTts {
    async fn synthesize(&self, text: &str, lang: &str) -> Result<Vec<u8>, String> {
        let preview: String = text.chars().take(50).collect();
        info!("🔊 TTS [{lang}]: \"{preview}\"");

        let chunks = split_for_tts(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err("Nothing to synthesize".to_string());
        }

        let mut audio = Vec::new();
        for chunk in &chunks {
            let url = format!(
                "{TTS_URL}?ie=UTF-8&client=tw-ob&tl={lang}&q={}",
                urlencoding::encode(chunk)
            );

            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| format!("TTS request failed: {e}"))?;

            if !response.status().is_success() {
                return Err(format!("TTS error {}", response.status()));
            }

            let bytes = response
                .bytes()
                .await
                .map_err(|e| format!("Failed to read TTS response: {e}"))?;

            audio.extend_from_slice(&bytes);
        }

        debug!("Synthesized {} chunk(s)", chunks.len());
        info!("Generated {} bytes of voice audio", audio.len());
        Ok(audio)
    }
}

/// Split text into chunks of at most `max_chars` characters, preferring
/// sentence boundaries, then whitespace. A single word longer than the
/// limit is cut at character boundaries.
fn split_for_tts(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for sentence in sentences(text) {
        // Collapse internal whitespace so packed sentences rejoin cleanly
        let sentence = sentence.split_whitespace().collect::<Vec<_>>().join(" ");
        if sentence.is_empty() {
            continue;
        }

        let sentence_len = sentence.chars().count();

        if sentence_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            chunks.extend(split_words(&sentence, max_chars));
            continue;
        }

        let sep = if current.is_empty() { 0 } else { 1 };
        if current_len + sep + sentence_len > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(&sentence);
        current_len += sentence_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Sentence-sized slices of `text`, each ending at sentence punctuation
/// (or at the end of input).
fn sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;

    for (i, c) in text.char_indices() {
        if matches!(c, '.' | '!' | '?' | '…') {
            let end = i + c.len_utf8();
            out.push(&text[start..end]);
            start = end;
        }
    }

    if start < text.len() {
        out.push(&text[start..]);
    }

    out
}

/// Whitespace-level fallback for a sentence longer than `max_chars`.
fn split_words(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        let sep = if current.is_empty() { 0 } else { 1 };
        if current_len + sep + word_len > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_one_chunk() {
        assert_eq!(split_for_tts("Bonjour le monde", 200), vec!["Bonjour le monde"]);
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        assert!(split_for_tts("", 200).is_empty());
        assert!(split_for_tts("   ", 200).is_empty());
    }

    #[test]
    fn test_prefers_sentence_boundaries() {
        let chunks = split_for_tts("One two three. Four five six.", 20);
        assert_eq!(chunks, vec!["One two three.", "Four five six."]);
    }

    #[test]
    fn test_short_sentences_pack_into_one_chunk() {
        let chunks = split_for_tts("Hi. How are you? Fine!", 200);
        assert_eq!(chunks, vec!["Hi. How are you? Fine!"]);
    }

    #[test]
    fn test_splits_on_word_boundaries() {
        let chunks = split_for_tts("one two three four", 9);
        assert_eq!(chunks, vec!["one two", "three", "four"]);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 9);
        }
    }

    #[test]
    fn test_long_word_is_cut() {
        let word = "x".repeat(450);
        let chunks = split_for_tts(&word, 200);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 200);
        assert_eq!(chunks[2].len(), 50);
    }

    #[test]
    fn test_chunk_limit_counts_chars_not_bytes() {
        // 100 two-byte chars; fits in one 150-char chunk
        let text = "é".repeat(100);
        let chunks = split_for_tts(&text, 150);
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn test_words_rejoin_with_single_spaces() {
        let chunks = split_for_tts("a  b\tc\nd", 200);
        assert_eq!(chunks, vec!["a b c d"]);
    }
}
