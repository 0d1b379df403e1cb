//! Bot module - orchestrates transcription, translation and speech synthesis
//! for inbound Telegram messages.

pub mod engine;
pub mod languages;
pub mod session;
pub mod telegram;
pub mod transcribe;
pub mod translate;
pub mod tts;


pub use engine::BotEngine;
pub use session::SessionStore;
pub use telegram::{Messenger, TelegramClient};
pub use transcribe::{HfWhisper, LocalWhisper, Transcriber};
pub use translate::{GoogleTranslate, Translator};
pub use tts::{GoogleTts, Synthesizer};
