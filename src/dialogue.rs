//! Per-chat session state for the search flow.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use teloxide::dispatching::dialogue::{InMemStorage, Storage};
use teloxide::types::ChatId;
use tracing::debug;

pub const LIST_LABEL: &str = "📋 List Recent Submissions";
pub const SEARCH_LABEL: &str = "🔍 Search by Winner ID";
pub const BACK_LABEL: &str = "🔙 Back to Main Menu";

/// What the bot expects next from a chat
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Idle,
    AwaitingSearchInput,
}

/// Classified inbound text
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuInput<'a> {
    Start,
    ListSubmissions,
    SearchPrompt,
    BackToMenu,
    Text(&'a str),
}

impl<'a> MenuInput<'a> {
    pub fn classify(text: &'a str) -> Self {
        match text {
            LIST_LABEL => return MenuInput::ListSubmissions,
            SEARCH_LABEL => return MenuInput::SearchPrompt,
            BACK_LABEL => return MenuInput::BackToMenu,
            _ => {}
        }

        let command = text.split_whitespace().next().unwrap_or_default();
        let command = command.split('@').next().unwrap_or_default();
        if command == "/start" {
            return MenuInput::Start;
        }

        MenuInput::Text(text)
    }
}

/// Side effect requested by a transition
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction<'a> {
    Welcome,
    ShowMainMenu,
    ListSubmissions,
    PromptSearch,
    Search(&'a str),
    Ignore,
}

/// Session transition function.
///
/// Menu labels win over pending input, so "back" always escapes the
/// search prompt. Every label ends a pending search.
pub fn transition<'a>(state: SessionState, input: MenuInput<'a>) -> (SessionState, MenuAction<'a>) {
    match (state, input) {
        (_, MenuInput::Start) => (SessionState::Idle, MenuAction::Welcome),
        (_, MenuInput::BackToMenu) => (SessionState::Idle, MenuAction::ShowMainMenu),
        (_, MenuInput::SearchPrompt) => (SessionState::AwaitingSearchInput, MenuAction::PromptSearch),
        (_, MenuInput::ListSubmissions) => (SessionState::Idle, MenuAction::ListSubmissions),
        (SessionState::AwaitingSearchInput, MenuInput::Text(text)) => {
            (SessionState::Idle, MenuAction::Search(text.trim()))
        }
        (SessionState::Idle, MenuInput::Text(_)) => (SessionState::Idle, MenuAction::Ignore),
    }
}

/// Session storage keyed by chat
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, chat_id: ChatId) -> Result<SessionState>;
    async fn set(&self, chat_id: ChatId, state: SessionState) -> Result<()>;
    async fn clear(&self, chat_id: ChatId) -> Result<()>;
}

/// Process-local store; restarting the bot resets every chat to idle
#[derive(Clone)]
pub struct InMemSessionStore {
    storage: Arc<InMemStorage<SessionState>>,
}

impl InMemSessionStore {
    pub fn new() -> Self {
        Self {
            storage: InMemStorage::new(),
        }
    }
}

impl Default for InMemSessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemSessionStore {
    async fn get(&self, chat_id: ChatId) -> Result<SessionState> {
        let state = Arc::clone(&self.storage).get_dialogue(chat_id).await?;
        Ok(state.unwrap_or_default())
    }

    async fn set(&self, chat_id: ChatId, state: SessionState) -> Result<()> {
        if state == SessionState::Idle {
            return self.clear(chat_id).await;
        }
        Arc::clone(&self.storage)
            .update_dialogue(chat_id, state)
            .await?;
        debug!(user_id = %chat_id, ?state, "Session state updated");
        Ok(())
    }

    async fn clear(&self, chat_id: ChatId) -> Result<()> {
        // Removing an absent dialogue is the only failure mode here
        if let Err(e) = Arc::clone(&self.storage).remove_dialogue(chat_id).await {
            debug!(user_id = %chat_id, error = ?e, "No session to clear");
        }
        Ok(())
    }
}
