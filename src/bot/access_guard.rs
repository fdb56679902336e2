//! Single-operator access check

use anyhow::Result;
use teloxide::types::{CallbackQueryId, ChatId};
use tracing::warn;

use crate::config::BotSettings;

use super::transport::CallbackNotice;
use super::ui_builder::signed;
use super::BotContext;

pub const ACCESS_DENIED: &str = "⛔ Access denied. This bot is for administrators only.";
pub const CALLBACK_ACCESS_DENIED: &str = "Access denied.";

pub fn is_authorized(chat_id: ChatId, settings: &BotSettings) -> bool {
    chat_id == settings.admin_chat_id
}

/// Returns `true` when the message may be handled; otherwise sends the denial
pub async fn admit_message(ctx: &BotContext, chat_id: ChatId) -> Result<bool> {
    if is_authorized(chat_id, &ctx.settings) {
        return Ok(true);
    }

    warn!(user_id = %chat_id, "Rejected message from unauthorized chat");
    ctx.transport
        .send_text(chat_id, signed(ACCESS_DENIED, &ctx.settings.signature), None)
        .await?;
    Ok(false)
}

/// Returns `true` when the tap may be handled; otherwise answers it with a denial
pub async fn admit_callback(
    ctx: &BotContext,
    callback_id: &CallbackQueryId,
    chat_id: ChatId,
) -> Result<bool> {
    if is_authorized(chat_id, &ctx.settings) {
        return Ok(true);
    }

    warn!(user_id = %chat_id, "Rejected callback from unauthorized chat");
    ctx.transport
        .answer_callback(
            callback_id.clone(),
            Some(CallbackNotice::toast(CALLBACK_ACCESS_DENIED)),
        )
        .await?;
    Ok(false)
}
