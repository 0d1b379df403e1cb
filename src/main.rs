use std::sync::Arc;

use teloxide::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;

use voxlate::bot::{
    BotEngine, GoogleTranslate, GoogleTts, HfWhisper, LocalWhisper, SessionStore, TelegramClient,
    Transcriber,
};
use voxlate::config::Config;
use voxlate::http;

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "voxlate.json".to_string());
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .init();

    info!("🚀 Starting voxlate...");
    info!("Loaded config from {config_path}");

    let bot = Bot::new(&config.telegram_bot_token);

    let engine = Arc::new(BotEngine::new(
        Arc::new(TelegramClient::new(bot.clone())),
        build_transcriber(&config),
        Arc::new(GoogleTranslate::new()),
        Arc::new(GoogleTts::new()),
        Arc::new(SessionStore::new()),
    ));

    // Liveness endpoint for the hosting platform
    let port = config.port;
    tokio::spawn(async move {
        if let Err(e) = http::serve(port).await {
            warn!("Liveness endpoint failed: {e}");
        }
    });

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(handle_message))
        .branch(Update::filter_callback_query().endpoint(handle_callback));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![engine])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

/// Pick a transcription backend: a local Whisper model when configured,
/// else the Hugging Face API when a credential is present, else none
/// (the bot still runs; voice messages report the gap).
fn build_transcriber(config: &Config) -> Option<Arc<dyn Transcriber>> {
    if let Some(ref path) = config.whisper_model_path {
        match LocalWhisper::new(path) {
            Ok(whisper) => {
                info!("Transcription backend: local Whisper ({})", path.display());
                return Some(Arc::new(whisper));
            }
            Err(e) => {
                warn!("Failed to load Whisper model: {e}");
            }
        }
    }

    if let Some(token) = config.transcription_token() {
        info!("Transcription backend: Hugging Face inference API");
        return Some(Arc::new(HfWhisper::new(token)));
    }

    warn!("No transcription backend configured; voice messages will fail with a notice");
    None
}

async fn handle_message(msg: Message, engine: Arc<BotEngine>) -> ResponseResult<()> {
    let chat_id = msg.chat.id.0;

    if let Some(voice) = msg.voice() {
        engine.handle_voice(chat_id, &voice.file.id.0).await;
        return Ok(());
    }

    let Some(text) = msg.text() else {
        return Ok(());
    };

    if text == "/start" || text.starts_with("/start ") {
        engine.handle_start(chat_id).await;
        return Ok(());
    }

    engine.handle_text(chat_id, text).await;
    Ok(())
}

async fn handle_callback(q: CallbackQuery, engine: Arc<BotEngine>) -> ResponseResult<()> {
    let Some(data) = q.data.as_deref() else {
        return Ok(());
    };
    let Some(message) = q.message.as_ref() else {
        // Message too old or inaccessible; still clear the client spinner
        engine.handle_stale_callback(&q.id.0).await;
        return Ok(());
    };

    engine
        .handle_language_choice(message.chat().id.0, &q.id.0, data)
        .await;
    Ok(())
}
