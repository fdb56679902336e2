//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules:
//! - `message_handler`: Handles commands, menu labels and search input
//! - `callback_handler`: Handles the document buttons
//! - `access_guard`: Restricts every update to the configured operator
//! - `transport`: Outbound Telegram operations behind a trait
//! - `ui_builder`: Creates keyboards and formats messages

pub mod access_guard;
pub mod callback_handler;
pub mod message_handler;
pub mod transport;
pub mod ui_builder;

use std::sync::Arc;

use anyhow::Result;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;

use crate::config::BotSettings;
use crate::db::SubmissionRepository;
use crate::dialogue::SessionStore;
use crate::download::FileFetcher;

pub use callback_handler::{callback_handler, CallbackAction};
pub use message_handler::message_handler;
pub use transport::{CallbackNotice, ChatTransport, TelegramTransport};

/// Collaborators shared by every handler invocation
pub struct BotContext {
    pub transport: Arc<dyn ChatTransport>,
    pub submissions: Arc<dyn SubmissionRepository>,
    pub fetcher: Arc<dyn FileFetcher>,
    pub sessions: Arc<dyn SessionStore>,
    pub settings: BotSettings,
}

/// Update tree for the teloxide dispatcher
pub fn schema() -> UpdateHandler<anyhow::Error> {
    dptree::entry()
        .branch(Update::filter_message().endpoint(on_message))
        .branch(Update::filter_callback_query().endpoint(on_callback_query))
}

async fn on_message(msg: Message, ctx: Arc<BotContext>) -> Result<()> {
    message_handler(&ctx, msg.chat.id, msg.text()).await
}

async fn on_callback_query(q: CallbackQuery, ctx: Arc<BotContext>) -> Result<()> {
    // Inline buttons always sit on a message; fall back to the user's private chat
    let chat_id = q
        .message
        .as_ref()
        .map(|m| m.chat().id)
        .unwrap_or(ChatId(q.from.id.0 as i64));

    callback_handler(&ctx, q.id.clone(), chat_id, q.data.as_deref()).await
}
