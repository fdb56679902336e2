use std::sync::Arc;

use anyhow::{Context, Result};
use teloxide::prelude::*;
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::types::BotCommand;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use submissions_admin_bot::bot::{schema, BotContext, TelegramTransport};
use submissions_admin_bot::config::Config;
use submissions_admin_bot::db::SupabaseClient;
use submissions_admin_bot::dialogue::InMemSessionStore;
use submissions_admin_bot::download::{ensure_work_dir, HttpFetcher};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    init_tracing();

    info!("Starting Submissions Admin Bot");

    let config = Config::from_env().context("Invalid bot configuration")?;

    ensure_work_dir(&config.settings.temp_dir).await?;
    info!(temp_dir = %config.settings.temp_dir.display(), "Working directory ready");

    let submissions = SupabaseClient::new(&config.supabase_url, config.supabase_key.clone())?;

    let bot = Bot::new(config.bot_token.clone());

    if let Err(e) = bot
        .set_my_commands(vec![BotCommand::new("start", "Show the main menu")])
        .await
    {
        warn!(error = %e, "Failed to register bot commands");
    }

    let ctx = Arc::new(BotContext {
        transport: Arc::new(TelegramTransport::new(bot.clone())),
        submissions: Arc::new(submissions),
        fetcher: Arc::new(HttpFetcher::default()),
        sessions: Arc::new(InMemSessionStore::new()),
        settings: config.settings,
    });

    info!("Bot initialized, starting dispatcher");

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![ctx])
        .default_handler(|update| async move {
            debug!(update_id = ?update.id, "Unhandled update");
        })
        .error_handler(LoggingErrorHandler::with_custom_text(
            "An error has occurred in the dispatcher",
        ))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
