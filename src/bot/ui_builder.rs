//! UI Builder module for creating keyboards and formatting messages

use chrono::{DateTime, NaiveDateTime, Utc};
use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup, ReplyMarkup,
};

use crate::db::{DocumentSide, Submission};
use crate::dialogue::{BACK_LABEL, LIST_LABEL, SEARCH_LABEL};

use super::callback_handler::CallbackAction;

pub const VIEW_DOCUMENTS_LABEL: &str = "📄 View Documents";
pub const DOWNLOAD_FRONT_LABEL: &str = "🆔 Download Front";
pub const DOWNLOAD_BACK_LABEL: &str = "🆔 Download Back";
const MISSING: &str = "N/A";

/// Append the attribution line
pub fn signed(text: &str, signature: &str) -> String {
    format!("{}\n\n{}", text.trim_end(), signature)
}

pub fn welcome_message(signature: &str) -> String {
    signed(
        "Welcome to the Submissions Admin Bot! 🤖\n\n\
         Use the keyboard buttons below to:\n\
         • List recent submissions\n\
         • Search submissions by winner ID",
        signature,
    )
}

pub fn main_keyboard() -> ReplyMarkup {
    ReplyMarkup::Keyboard(
        KeyboardMarkup::new(vec![
            vec![KeyboardButton::new(LIST_LABEL)],
            vec![KeyboardButton::new(SEARCH_LABEL)],
        ])
        .resize_keyboard(),
    )
}

pub fn back_keyboard() -> ReplyMarkup {
    ReplyMarkup::Keyboard(
        KeyboardMarkup::new(vec![vec![KeyboardButton::new(BACK_LABEL)]]).resize_keyboard(),
    )
}

/// Render a stored timestamp as `YYYY-MM-DD HH:MM:SS UTC`.
///
/// Values that are not timestamps are shown verbatim.
pub fn format_timestamp(raw: Option<&str>) -> String {
    let raw = match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => raw,
        None => return MISSING.to_string(),
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed
            .with_timezone(&Utc)
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string();
    }

    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, pattern) {
            return naive.and_utc().format("%Y-%m-%d %H:%M:%S UTC").to_string();
        }
    }

    raw.to_string()
}

fn field(value: &Option<String>) -> &str {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(MISSING)
}

/// One message per submission
pub fn format_submission_card(submission: &Submission, signature: &str) -> String {
    let body = format!(
        "🆔 ID: {}\n\
         👤 Winner ID: {}\n\
         📝 Name: {}\n\
         📧 Email: {}\n\
         📱 Phone: {}\n\
         📍 Address: {}\n\
         💳 Payment: {}\n\
         🚚 Delivery: {}\n\
         📢 Heard From: {}\n\
         ⏰ Submitted: {}",
        submission.id,
        submission.winner_id,
        submission.display_name(),
        field(&submission.email),
        field(&submission.phone),
        field(&submission.address),
        field(&submission.payment_preference),
        field(&submission.delivery_company),
        field(&submission.heard_from),
        format_timestamp(submission.submitted_at.as_deref()),
    );
    signed(&body, signature)
}

pub fn view_documents_keyboard(submission_id: i64) -> ReplyMarkup {
    ReplyMarkup::InlineKeyboard(InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback(
            VIEW_DOCUMENTS_LABEL,
            CallbackAction::ShowDocuments(submission_id).to_data(),
        ),
    ]]))
}

pub fn document_menu_keyboard(submission_id: i64) -> ReplyMarkup {
    let button = |label: &str, side| {
        InlineKeyboardButton::callback(
            label.to_string(),
            CallbackAction::Download {
                side,
                submission_id,
            }
            .to_data(),
        )
    };
    ReplyMarkup::InlineKeyboard(InlineKeyboardMarkup::new(vec![
        vec![button(DOWNLOAD_FRONT_LABEL, DocumentSide::Front)],
        vec![button(DOWNLOAD_BACK_LABEL, DocumentSide::Back)],
    ]))
}

pub fn document_menu_message(submission: &Submission, signature: &str) -> String {
    signed(
        &format!(
            "📄 Documents for {}\nPlease click the buttons below to download the documents:",
            submission.display_name()
        ),
        signature,
    )
}

pub fn document_caption(side: DocumentSide, submission: &Submission, signature: &str) -> String {
    signed(
        &format!(
            "{} document for {}",
            side.as_str().to_uppercase(),
            submission.display_name()
        ),
        signature,
    )
}
