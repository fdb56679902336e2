use anyhow::Result;
use teloxide::types::ChatId;

use submissions_admin_bot::dialogue::{
    transition, InMemSessionStore, MenuAction, MenuInput, SessionState, SessionStore, BACK_LABEL,
    LIST_LABEL, SEARCH_LABEL,
};

/// Absent chats read as idle
#[tokio::test]
async fn test_unknown_chat_defaults_to_idle() -> Result<()> {
    let store = InMemSessionStore::new();
    assert_eq!(store.get(ChatId(1)).await?, SessionState::Idle);
    Ok(())
}

/// Set, read back and clear a pending search
#[tokio::test]
async fn test_set_get_clear_round() -> Result<()> {
    let store = InMemSessionStore::new();
    let chat = ChatId(42);

    store.set(chat, SessionState::AwaitingSearchInput).await?;
    assert_eq!(store.get(chat).await?, SessionState::AwaitingSearchInput);

    store.clear(chat).await?;
    assert_eq!(store.get(chat).await?, SessionState::Idle);

    // Clearing twice is harmless
    store.clear(chat).await?;
    Ok(())
}

/// Storing idle is the same as clearing
#[tokio::test]
async fn test_setting_idle_removes_entry() -> Result<()> {
    let store = InMemSessionStore::new();
    let chat = ChatId(5);

    store.set(chat, SessionState::AwaitingSearchInput).await?;
    store.set(chat, SessionState::Idle).await?;
    assert_eq!(store.get(chat).await?, SessionState::Idle);
    Ok(())
}

/// Sessions never leak between chats
#[tokio::test]
async fn test_sessions_are_per_chat() -> Result<()> {
    let store = InMemSessionStore::new();

    store.set(ChatId(1), SessionState::AwaitingSearchInput).await?;
    assert_eq!(store.get(ChatId(2)).await?, SessionState::Idle);

    store.clear(ChatId(2)).await?;
    assert_eq!(store.get(ChatId(1)).await?, SessionState::AwaitingSearchInput);
    Ok(())
}

/// Clones share the same underlying storage
#[tokio::test]
async fn test_cloned_store_shares_state() -> Result<()> {
    let store = InMemSessionStore::new();
    let clone = store.clone();

    clone.set(ChatId(9), SessionState::AwaitingSearchInput).await?;
    assert_eq!(store.get(ChatId(9)).await?, SessionState::AwaitingSearchInput);
    Ok(())
}

/// Walk the whole menu through the transition function
#[test]
fn test_full_menu_walk() {
    let steps = [
        ("/start", SessionState::Idle),
        (SEARCH_LABEL, SessionState::AwaitingSearchInput),
        (LIST_LABEL, SessionState::Idle),
        ("W42", SessionState::Idle),
        (SEARCH_LABEL, SessionState::AwaitingSearchInput),
        ("W42", SessionState::Idle),
        ("W42", SessionState::Idle),
        (SEARCH_LABEL, SessionState::AwaitingSearchInput),
        (BACK_LABEL, SessionState::Idle),
    ];

    let mut state = SessionState::default();
    for (input, expected) in steps {
        let (next, _) = transition(state, MenuInput::classify(input));
        assert_eq!(next, expected, "after {input:?}");
        state = next;
    }
}

/// Any text consumes a pending search, whatever it looks like
#[test]
fn test_any_text_leaves_awaiting_state() {
    for text in ["W42", "", "   ", "/help", "12345", "🔍"] {
        let (next, action) = transition(SessionState::AwaitingSearchInput, MenuInput::classify(text));
        assert_eq!(next, SessionState::Idle);
        assert!(matches!(action, MenuAction::Search(_)), "{text:?}");
    }
}
