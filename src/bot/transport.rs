//! Outbound chat operations used by the handlers

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{CallbackQueryId, InputFile, ReplyMarkup};

/// Telegram rejects callback answers longer than this
pub const CALLBACK_TEXT_LIMIT: usize = 200;

/// Text shown when acknowledging a button tap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackNotice {
    pub text: String,
    pub show_alert: bool,
}

impl CallbackNotice {
    /// Short-lived toast at the top of the chat
    pub fn toast(text: impl Into<String>) -> Self {
        Self::build(text.into(), false)
    }

    /// Modal alert the operator has to dismiss
    pub fn alert(text: impl Into<String>) -> Self {
        Self::build(text.into(), true)
    }

    fn build(text: String, show_alert: bool) -> Self {
        let text = if text.chars().count() > CALLBACK_TEXT_LIMIT {
            let mut truncated: String = text.chars().take(CALLBACK_TEXT_LIMIT - 3).collect();
            truncated.push_str("...");
            truncated
        } else {
            text
        };
        Self { text, show_alert }
    }
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: String,
        markup: Option<ReplyMarkup>,
    ) -> Result<()>;

    async fn send_document(&self, chat_id: ChatId, path: &Path, caption: String) -> Result<()>;

    async fn answer_callback(
        &self,
        callback_id: CallbackQueryId,
        notice: Option<CallbackNotice>,
    ) -> Result<()>;
}

/// Transport backed by the Telegram Bot API
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: String,
        markup: Option<ReplyMarkup>,
    ) -> Result<()> {
        let mut request = self.bot.send_message(chat_id, text);
        if let Some(markup) = markup {
            request = request.reply_markup(markup);
        }
        request.await?;
        Ok(())
    }

    async fn send_document(&self, chat_id: ChatId, path: &Path, caption: String) -> Result<()> {
        self.bot
            .send_document(chat_id, InputFile::file(path.to_path_buf()))
            .caption(caption)
            .await?;
        Ok(())
    }

    async fn answer_callback(
        &self,
        callback_id: CallbackQueryId,
        notice: Option<CallbackNotice>,
    ) -> Result<()> {
        let mut request = self.bot.answer_callback_query(callback_id);
        if let Some(notice) = notice {
            request = request.text(notice.text).show_alert(notice.show_alert);
        }
        request.await?;
        Ok(())
    }
}
