//! Telegram bot that translates typed or spoken input into a chosen language
//! and replies with both text and synthesized speech.

pub mod bot;
pub mod config;
pub mod http;
