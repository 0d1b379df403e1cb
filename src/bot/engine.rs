//! The bot's event handlers: one strictly sequential pipeline per inbound
//! event, with a transient status message edited in place as the pipeline
//! advances or fails.

use std::sync::Arc;

use tracing::{info, warn};

use crate::bot::languages;
use crate::bot::session::SessionStore;
use crate::bot::telegram::Messenger;
use crate::bot::transcribe::Transcriber;
use crate::bot::translate::Translator;
use crate::bot::tts::Synthesizer;

/// Typed text longer than this is rejected. Transcribed text is exempt; it
/// is bounded in practice by voice message length.
const MAX_TEXT_CHARS: usize = 1000;

const WELCOME: &str = "Welcome to the <b>Translation Voice Bot</b>!\n\n\
    Send me any text, then choose the language you want to translate it to. \
    I will send you the translation as text and voice!";

const TOO_LONG: &str = "Text is too long. Please keep it under 1000 characters.";
const NO_SESSION: &str = "Please send some text first!";

/// A transient status message for one in-flight interaction, identified by
/// its chat and message id so later steps can edit or remove it.
struct StatusMessage {
    chat_id: i64,
    message_id: i64,
}

/// The orchestrator: composes the transport, transcription, translation and
/// synthesis collaborators per inbound event. All collaborators are injected;
/// nothing here talks to the network directly.
pub struct BotEngine {
    messenger: Arc<dyn Messenger>,
    transcriber: Option<Arc<dyn Transcriber>>,
    translator: Arc<dyn Translator>,
    synthesizer: Arc<dyn Synthesizer>,
    sessions: Arc<SessionStore>,
}

impl BotEngine {
    pub fn new(
        messenger: Arc<dyn Messenger>,
        transcriber: Option<Arc<dyn Transcriber>>,
        translator: Arc<dyn Translator>,
        synthesizer: Arc<dyn Synthesizer>,
        sessions: Arc<SessionStore>,
    ) -> Self {
        Self {
            messenger,
            transcriber,
            translator,
            synthesizer,
            sessions,
        }
    }

    /// Reply to /start with the welcome message.
    pub async fn handle_start(&self, chat_id: i64) {
        if let Err(e) = self.messenger.send_html(chat_id, WELCOME).await {
            warn!("Failed to send welcome: {e}");
        }
    }

    /// Inbound typed text: validate length, store it as the chat's pending
    /// text, present the language menu.
    pub async fn handle_text(&self, chat_id: i64, text: &str) {
        if text.chars().count() > MAX_TEXT_CHARS {
            info!("Rejecting over-long text in chat {chat_id}");
            if let Err(e) = self.messenger.send_text(chat_id, TOO_LONG).await {
                warn!("Failed to send rejection: {e}");
            }
            return;
        }

        self.sessions.put(chat_id, text);

        if let Err(e) = self.messenger.send_language_menu(chat_id).await {
            warn!("Failed to send language menu: {e}");
        }
    }

    /// Inbound voice message: download, transcribe, store the transcript as
    /// the chat's pending text, present the language menu. Progress and any
    /// failure are shown by editing one status message in place.
    pub async fn handle_voice(&self, chat_id: i64, file_id: &str) {
        let status = match self
            .messenger
            .send_text(chat_id, "Processing voice message...")
            .await
        {
            Ok(message_id) => StatusMessage { chat_id, message_id },
            Err(e) => {
                warn!("Failed to send voice status message: {e}");
                return;
            }
        };

        if let Err(e) = self.run_voice_pipeline(chat_id, file_id, &status).await {
            self.report_failure(&status, &e).await;
        }
    }

    async fn run_voice_pipeline(
        &self,
        chat_id: i64,
        file_id: &str,
        status: &StatusMessage,
    ) -> Result<(), String> {
        let audio = self.messenger.download_voice(file_id).await?;

        self.edit_status(status, "Transcribing voice...").await?;

        let transcriber = self.transcriber.as_ref().ok_or_else(|| {
            "Transcription is not configured. Set hf_token, google_api_key or \
             whisper_model_path."
                .to_string()
        })?;

        let text = transcriber.transcribe(&audio).await?;
        if text.trim().is_empty() {
            return Err("Could not understand the audio.".to_string());
        }

        self.edit_status(status, &format!("Transcribed: \"{text}\"")).await?;

        self.sessions.put(chat_id, &text);
        self.messenger.send_language_menu(chat_id).await?;
        Ok(())
    }

    /// Button click on the language menu: acknowledge the click, then
    /// translate the chat's pending text and reply with formatted text and a
    /// voice message. No partial results: if synthesis fails after a
    /// successful translation, only the error is shown.
    pub async fn handle_language_choice(&self, chat_id: i64, callback_id: &str, token: &str) {
        let Some(name) = languages::selection_name(token) else {
            // Some other button namespace; not ours to answer
            return;
        };

        let Some(code) = languages::code_for(name) else {
            warn!("Unknown language in selection token: {name}");
            if let Err(e) = self.messenger.answer_callback(callback_id, None).await {
                warn!("Failed to answer callback: {e}");
            }
            return;
        };

        let Some(text) = self.sessions.get(chat_id) else {
            // Ack with a transient alert so the client spinner clears
            if let Err(e) = self
                .messenger
                .answer_callback(callback_id, Some(NO_SESSION))
                .await
            {
                warn!("Failed to answer callback: {e}");
            }
            return;
        };

        if let Err(e) = self.messenger.answer_callback(callback_id, None).await {
            warn!("Failed to answer callback: {e}");
        }

        let status = match self
            .messenger
            .send_text(chat_id, &format!("Translating to {name}..."))
            .await
        {
            Ok(message_id) => StatusMessage { chat_id, message_id },
            Err(e) => {
                warn!("Failed to send translation status message: {e}");
                return;
            }
        };

        if let Err(e) = self
            .run_translation(chat_id, &text, name, code, &status)
            .await
        {
            self.report_failure(&status, &e).await;
        }
    }

    /// Button click whose originating message is no longer accessible to
    /// the bot: nothing to act on, but the click is still acknowledged so
    /// the client spinner clears.
    pub async fn handle_stale_callback(&self, callback_id: &str) {
        if let Err(e) = self.messenger.answer_callback(callback_id, None).await {
            warn!("Failed to answer callback: {e}");
        }
    }

    async fn run_translation(
        &self,
        chat_id: i64,
        text: &str,
        name: &str,
        code: &str,
        status: &StatusMessage,
    ) -> Result<(), String> {
        let translated = self.translator.translate(text, code).await?;

        let preview: String = translated.chars().take(100).collect();
        info!("Translated [{name}]: {preview}");

        let audio = self
            .synthesizer
            .synthesize(&translated, languages::tts_code(code))
            .await?;

        self.messenger
            .send_html(chat_id, &format!("<b>Translation ({name}):</b>\n{translated}"))
            .await?;
        self.messenger
            .send_voice(chat_id, audio, "translation.mp3")
            .await?;

        self.messenger
            .delete_message(status.chat_id, status.message_id)
            .await?;
        Ok(())
    }

    async fn edit_status(&self, status: &StatusMessage, text: &str) -> Result<(), String> {
        self.messenger
            .edit_text(status.chat_id, status.message_id, text)
            .await
    }

    /// Show a failed interaction's error where its status message was.
    async fn report_failure(&self, status: &StatusMessage, error: &str) {
        warn!("Interaction failed in chat {}: {error}", status.chat_id);
        if let Err(e) = self.edit_status(status, &format!("Error: {error}")).await {
            warn!("Failed to report error to chat {}: {e}", status.chat_id);
        }
    }
}
