//! # Bot Configuration Module
//!
//! Startup configuration read from the environment (optionally seeded by a
//! `.env` file). Missing or malformed required values abort startup.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use teloxide::types::ChatId;

// Environment variable names
pub const SUPABASE_URL_VAR: &str = "SUPABASE_URL";
pub const SUPABASE_KEY_VAR: &str = "SUPABASE_ANON_KEY";
pub const BOT_TOKEN_VAR: &str = "TELEGRAM_BOT_TOKEN";
pub const ADMIN_CHAT_ID_VAR: &str = "ADMIN_CHAT_ID";
pub const TEMP_DIR_VAR: &str = "TEMP_DIR";
pub const SIGNATURE_VAR: &str = "BOT_SIGNATURE";

pub const DEFAULT_TEMP_DIR: &str = "temp";
pub const DEFAULT_SIGNATURE: &str = "Submissions Admin Bot";
/// Row cap for the "list recent submissions" query
pub const LIST_LIMIT: usize = 999;

/// Settings shared by the dispatcher and the handlers
#[derive(Debug, Clone)]
pub struct BotSettings {
    /// The only chat allowed to talk to the bot
    pub admin_chat_id: ChatId,
    /// Working directory for transient downloads
    pub temp_dir: PathBuf,
    /// Attribution line appended to every outgoing text
    pub signature: String,
    /// Row cap for the listing query
    pub list_limit: usize,
}

impl BotSettings {
    pub fn new(admin_chat_id: ChatId, temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            admin_chat_id,
            temp_dir: temp_dir.into(),
            signature: DEFAULT_SIGNATURE.to_string(),
            list_limit: LIST_LIMIT,
        }
    }
}

/// Full process configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub supabase_url: String,
    pub supabase_key: String,
    pub bot_token: String,
    pub settings: BotSettings,
}

impl Config {
    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or_else(|| anyhow!("{key} must be set"))
        };

        let supabase_url = required(SUPABASE_URL_VAR)?;
        reqwest::Url::parse(&supabase_url)
            .with_context(|| format!("{SUPABASE_URL_VAR} is not a valid URL"))?;

        let supabase_key = required(SUPABASE_KEY_VAR)?;
        let bot_token = required(BOT_TOKEN_VAR)?;

        let admin_raw = required(ADMIN_CHAT_ID_VAR)?;
        let admin_chat_id = admin_raw
            .parse::<i64>()
            .map(ChatId)
            .with_context(|| format!("{ADMIN_CHAT_ID_VAR} must be a numeric chat id"))?;

        let temp_dir = lookup(TEMP_DIR_VAR)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TEMP_DIR.to_string());

        let mut settings = BotSettings::new(admin_chat_id, temp_dir);
        if let Some(signature) = lookup(SIGNATURE_VAR).filter(|s| !s.trim().is_empty()) {
            settings.signature = signature;
        }

        Ok(Self {
            supabase_url,
            supabase_key,
            bot_token,
            settings,
        })
    }
}
