//! Telegram transport using teloxide.

use async_trait::async_trait;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{
    CallbackQueryId, FileId, InlineKeyboardButton, InlineKeyboardMarkup, InputFile, MessageId,
    ParseMode,
};
use tracing::warn;

use crate::bot::languages;

/// Outbound messaging actions the bot needs, as a seam so the orchestration
/// can be exercised without a live Telegram connection.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send a plain text message. Returns the new message id.
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<i64, String>;

    /// Send an HTML-formatted text message. Returns the new message id.
    async fn send_html(&self, chat_id: i64, text: &str) -> Result<i64, String>;

    /// Send a voice message from in-memory audio bytes.
    async fn send_voice(&self, chat_id: i64, audio: Vec<u8>, file_name: &str)
        -> Result<i64, String>;

    /// Edit an existing message's text in place.
    async fn edit_text(&self, chat_id: i64, message_id: i64, text: &str) -> Result<(), String>;

    /// Delete a message.
    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<(), String>;

    /// Acknowledge a button click, optionally with a transient alert shown
    /// to the user. Clears the pending spinner on the client either way.
    async fn answer_callback(&self, callback_id: &str, alert: Option<&str>)
        -> Result<(), String>;

    /// Send the language selection menu. Returns the new message id.
    async fn send_language_menu(&self, chat_id: i64) -> Result<i64, String>;

    /// Download a voice attachment by file id.
    async fn download_voice(&self, file_id: &str) -> Result<Vec<u8>, String>;
}

/// Telegram API client.
pub struct TelegramClient {
    bot: Bot,
}

impl TelegramClient {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    async fn send(&self, chat_id: i64, text: &str, html: bool) -> Result<i64, String> {
        let mut request = self.bot.send_message(ChatId(chat_id), text);
        if html {
            request = request.parse_mode(ParseMode::Html);
        }

        request.await.map(|msg| msg.id.0 as i64).map_err(|e| {
            let msg = format!("Failed to send: {e}");
            warn!("{}", msg);
            msg
        })
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<i64, String> {
        self.send(chat_id, text, false).await
    }

    async fn send_html(&self, chat_id: i64, text: &str) -> Result<i64, String> {
        self.send(chat_id, text, true).await
    }

    async fn send_voice(
        &self,
        chat_id: i64,
        audio: Vec<u8>,
        file_name: &str,
    ) -> Result<i64, String> {
        let input_file = InputFile::memory(audio).file_name(file_name.to_string());

        self.bot
            .send_voice(ChatId(chat_id), input_file)
            .await
            .map(|msg| msg.id.0 as i64)
            .map_err(|e| {
                let msg = format!("Failed to send voice: {e}");
                warn!("{}", msg);
                msg
            })
    }

    async fn edit_text(&self, chat_id: i64, message_id: i64, text: &str) -> Result<(), String> {
        self.bot
            .edit_message_text(ChatId(chat_id), MessageId(message_id as i32), text)
            .await
            .map(|_| ())
            .map_err(|e| {
                let msg = format!("Failed to edit message: {e}");
                warn!("{}", msg);
                msg
            })
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<(), String> {
        self.bot
            .delete_message(ChatId(chat_id), MessageId(message_id as i32))
            .await
            .map(|_| ())
            .map_err(|e| {
                let msg = format!("Failed to delete message: {e}");
                warn!("{}", msg);
                msg
            })
    }

    async fn answer_callback(
        &self,
        callback_id: &str,
        alert: Option<&str>,
    ) -> Result<(), String> {
        let mut request = self
            .bot
            .answer_callback_query(CallbackQueryId(callback_id.to_string()));

        if let Some(text) = alert {
            request = request.text(text).show_alert(true);
        }

        request.await.map(|_| ()).map_err(|e| {
            let msg = format!("Failed to answer callback: {e}");
            warn!("{}", msg);
            msg
        })
    }

    async fn send_language_menu(&self, chat_id: i64) -> Result<i64, String> {
        let rows: Vec<Vec<InlineKeyboardButton>> = languages::keyboard_rows()
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|(label, token)| InlineKeyboardButton::callback(label, token))
                    .collect()
            })
            .collect();

        self.bot
            .send_message(ChatId(chat_id), languages::MENU_PROMPT)
            .reply_markup(InlineKeyboardMarkup::new(rows))
            .await
            .map(|msg| msg.id.0 as i64)
            .map_err(|e| {
                let msg = format!("Failed to send language menu: {e}");
                warn!("{}", msg);
                msg
            })
    }

    async fn download_voice(&self, file_id: &str) -> Result<Vec<u8>, String> {
        let file = self
            .bot
            .get_file(FileId(file_id.to_string()))
            .await
            .map_err(|e| format!("Failed to get file info: {e}"))?;

        let mut data = Vec::new();
        self.bot
            .download_file(&file.path, &mut data)
            .await
            .map_err(|e| format!("Failed to download file: {e}"))?;

        Ok(data)
    }
}
