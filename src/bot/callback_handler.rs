//! Callback Handler module for processing inline keyboard callback queries

use anyhow::Result;
use teloxide::types::{CallbackQueryId, ChatId};
use tracing::{debug, error, info, warn};

use crate::db::{DocumentSide, Submission};
use crate::download::{discard, transient_path};
use crate::errors::DocumentError;

use super::access_guard::admit_callback;
use super::transport::CallbackNotice;
use super::ui_builder::{document_caption, document_menu_keyboard, document_menu_message, signed};
use super::BotContext;

pub const DOCS_PREFIX: &str = "docs_";
pub const DOWNLOAD_PREFIX: &str = "download_";
pub const DOCUMENT_SENT: &str = "Document sent successfully!";

/// Payload carried by the inline buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    /// `docs_<id>`
    ShowDocuments(i64),
    /// `download_<side>_<id>`
    Download {
        side: DocumentSide,
        submission_id: i64,
    },
}

impl CallbackAction {
    pub fn parse(data: &str) -> Option<Self> {
        if let Some(id) = data.strip_prefix(DOCS_PREFIX) {
            return id.parse().ok().map(CallbackAction::ShowDocuments);
        }

        let rest = data.strip_prefix(DOWNLOAD_PREFIX)?;
        let (side, id) = rest.split_once('_')?;
        Some(CallbackAction::Download {
            side: DocumentSide::parse(side)?,
            submission_id: id.parse().ok()?,
        })
    }

    pub fn to_data(&self) -> String {
        match self {
            CallbackAction::ShowDocuments(id) => format!("{DOCS_PREFIX}{id}"),
            CallbackAction::Download {
                side,
                submission_id,
            } => format!("{DOWNLOAD_PREFIX}{}_{}", side.as_str(), submission_id),
        }
    }
}

/// Handle a tap on one of the inline buttons.
///
/// Every tap is acknowledged exactly once; failures surface as an alert on
/// that acknowledgment instead of a chat message.
pub async fn callback_handler(
    ctx: &BotContext,
    callback_id: CallbackQueryId,
    chat_id: ChatId,
    data: Option<&str>,
) -> Result<()> {
    debug!(user_id = %chat_id, data = ?data, "Received callback query from user");

    if !admit_callback(ctx, &callback_id, chat_id).await? {
        return Ok(());
    }

    let notice = match data.and_then(CallbackAction::parse) {
        Some(CallbackAction::ShowDocuments(submission_id)) => {
            match show_documents(ctx, chat_id, submission_id).await {
                Ok(notice) => notice,
                Err(e) => {
                    warn!(user_id = %chat_id, submission_id, error = ?e, "Document menu failed");
                    Some(CallbackNotice::alert(e.to_string()))
                }
            }
        }
        Some(CallbackAction::Download {
            side,
            submission_id,
        }) => match download_document(ctx, chat_id, side, submission_id).await {
            Ok(notice) => Some(notice),
            Err(e) => {
                warn!(user_id = %chat_id, submission_id, side = %side, error = ?e, "Document download failed");
                Some(CallbackNotice::alert(e.to_string()))
            }
        },
        None => {
            debug!(user_id = %chat_id, data = ?data, "Ignoring unknown callback data");
            None
        }
    };

    ctx.transport.answer_callback(callback_id, notice).await
}

async fn load_submission(ctx: &BotContext, submission_id: i64) -> Result<Submission, DocumentError> {
    ctx.submissions
        .find_by_id(submission_id)
        .await
        .map_err(DocumentError::from)?
        .ok_or(DocumentError::SubmissionNotFound(submission_id))
}

/// Step one: offer the two download buttons
async fn show_documents(
    ctx: &BotContext,
    chat_id: ChatId,
    submission_id: i64,
) -> Result<Option<CallbackNotice>, DocumentError> {
    let submission = match load_submission(ctx, submission_id).await {
        Ok(submission) => submission,
        Err(e @ DocumentError::SubmissionNotFound(_)) => {
            return Ok(Some(CallbackNotice::toast(e.to_string())));
        }
        Err(e) => return Err(e),
    };

    ctx.transport
        .send_text(
            chat_id,
            document_menu_message(&submission, &ctx.settings.signature),
            Some(document_menu_keyboard(submission.id)),
        )
        .await
        .map_err(|e| DocumentError::Delivery(format!("{e:#}")))?;

    Ok(None)
}

/// Step two: fetch one side, relay it, delete the local copy
async fn download_document(
    ctx: &BotContext,
    chat_id: ChatId,
    side: DocumentSide,
    submission_id: i64,
) -> Result<CallbackNotice, DocumentError> {
    // A failed lookup here is reported as a download failure
    let submission = match load_submission(ctx, submission_id).await {
        Err(DocumentError::Query(msg)) => return Err(DocumentError::Download(msg)),
        other => other?,
    };
    let url = submission
        .document_url(side)
        .ok_or(DocumentError::MissingDocumentUrl(side))?;

    ctx.transport
        .send_text(
            chat_id,
            signed(
                &format!("⏳ Downloading {} document...", side.as_str()),
                &ctx.settings.signature,
            ),
            None,
        )
        .await
        .map_err(|e| DocumentError::Delivery(format!("{e:#}")))?;

    let temp_path = transient_path(&ctx.settings.temp_dir, &submission.winner_id, side, url);

    let result: Result<(), DocumentError> = async {
        ctx.fetcher
            .fetch(url, &temp_path)
            .await
            .map_err(|e| DocumentError::Download(format!("{e:#}")))?;

        ctx.transport
            .send_document(
                chat_id,
                &temp_path,
                document_caption(side, &submission, &ctx.settings.signature),
            )
            .await
            .map_err(|e| DocumentError::Delivery(format!("{e:#}")))
    }
    .await;

    // Always clean up the temporary file
    discard(&temp_path).await;

    match result {
        Ok(()) => {
            info!(user_id = %chat_id, submission_id, side = %side, "Document relayed to operator");
            Ok(CallbackNotice::toast(DOCUMENT_SENT))
        }
        Err(e) => {
            error!(user_id = %chat_id, submission_id, side = %side, error = ?e, "Failed to relay document");
            Err(e)
        }
    }
}
