//! Message Handler module for processing incoming Telegram messages

use anyhow::Result;
use teloxide::types::ChatId;
use tracing::{debug, error, info};

use crate::db::Submission;
use crate::dialogue::{transition, MenuAction, MenuInput};

use super::access_guard::admit_message;
use super::ui_builder::{
    back_keyboard, format_submission_card, main_keyboard, signed, view_documents_keyboard,
    welcome_message,
};
use super::BotContext;

pub const NO_SUBMISSIONS: &str = "No submissions found.";
pub const SEARCH_PROMPT: &str = "Please enter the Winner ID to search:";

/// Entry point for every inbound message
pub async fn message_handler(ctx: &BotContext, chat_id: ChatId, text: Option<&str>) -> Result<()> {
    if !admit_message(ctx, chat_id).await? {
        return Ok(());
    }

    let Some(text) = text else {
        debug!(user_id = %chat_id, "Ignoring non-text message");
        return Ok(());
    };
    debug!(user_id = %chat_id, message_length = text.len(), "Received text message from user");

    let state = ctx.sessions.get(chat_id).await?;
    let (next_state, action) = transition(state, MenuInput::classify(text));
    if next_state != state {
        ctx.sessions.set(chat_id, next_state).await?;
    }

    let signature = ctx.settings.signature.as_str();
    match action {
        MenuAction::Welcome => {
            ctx.transport
                .send_text(chat_id, welcome_message(signature), Some(main_keyboard()))
                .await
        }
        MenuAction::ShowMainMenu => {
            ctx.transport
                .send_text(chat_id, signed("Main Menu:", signature), Some(main_keyboard()))
                .await
        }
        MenuAction::PromptSearch => {
            ctx.transport
                .send_text(chat_id, signed(SEARCH_PROMPT, signature), Some(back_keyboard()))
                .await
        }
        MenuAction::ListSubmissions => list_submissions(ctx, chat_id).await,
        MenuAction::Search(winner_id) => search_submissions(ctx, chat_id, winner_id).await,
        MenuAction::Ignore => {
            debug!(user_id = %chat_id, "Ignoring text outside of a pending prompt");
            Ok(())
        }
    }
}

async fn send_cards(ctx: &BotContext, chat_id: ChatId, submissions: &[Submission]) -> Result<()> {
    for submission in submissions {
        ctx.transport
            .send_text(
                chat_id,
                format_submission_card(submission, &ctx.settings.signature),
                Some(view_documents_keyboard(submission.id)),
            )
            .await?;
    }
    Ok(())
}

async fn list_submissions(ctx: &BotContext, chat_id: ChatId) -> Result<()> {
    let signature = ctx.settings.signature.as_str();
    match ctx.submissions.list_recent(ctx.settings.list_limit).await {
        Ok(submissions) if submissions.is_empty() => {
            ctx.transport
                .send_text(chat_id, signed(NO_SUBMISSIONS, signature), None)
                .await
        }
        Ok(submissions) => {
            info!(user_id = %chat_id, count = submissions.len(), "Sending submission list");
            send_cards(ctx, chat_id, &submissions).await
        }
        Err(e) => {
            error!(user_id = %chat_id, error = %e, "Failed to list submissions");
            ctx.transport
                .send_text(
                    chat_id,
                    signed(&format!("Error fetching submissions: {e:#}"), signature),
                    None,
                )
                .await
        }
    }
}

async fn search_submissions(ctx: &BotContext, chat_id: ChatId, winner_id: &str) -> Result<()> {
    let signature = ctx.settings.signature.as_str();
    match ctx.submissions.find_by_winner_id(winner_id).await {
        Ok(submissions) if submissions.is_empty() => {
            ctx.transport
                .send_text(
                    chat_id,
                    signed(
                        &format!("No submissions found for winner ID: {winner_id}"),
                        signature,
                    ),
                    Some(main_keyboard()),
                )
                .await
        }
        Ok(submissions) => {
            info!(user_id = %chat_id, winner_id = %winner_id, count = submissions.len(), "Sending search results");
            send_cards(ctx, chat_id, &submissions).await?;
            // Cards carry inline buttons, so the reply keyboard needs its own message
            ctx.transport
                .send_text(
                    chat_id,
                    signed(
                        &format!(
                            "Search complete: {} submission(s) found for winner ID: {winner_id}",
                            submissions.len()
                        ),
                        signature,
                    ),
                    Some(main_keyboard()),
                )
                .await
        }
        Err(e) => {
            error!(user_id = %chat_id, winner_id = %winner_id, error = %e, "Failed to search submissions");
            ctx.transport
                .send_text(
                    chat_id,
                    signed(&format!("Error searching submissions: {e:#}"), signature),
                    Some(main_keyboard()),
                )
                .await
        }
    }
}
