//! TUI reducer.
//!
//! Key events mutate view-local state directly and return an action for the
//! runtime to execute; everything that touches the backend goes through an
//! action so all awaits happen in one place.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::state::AppState;

/// Follow-up work the runtime performs after a key is handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    None,
    /// Submit the current input buffer.
    Submit,
    /// Switch to the given conversation.
    Select(String),
    NewConversation,
    DeleteActive,
    HistoryBack,
    HistoryForward,
}

pub fn handle_key(state: &mut AppState, key: KeyEvent) -> UiAction {
    if key.kind == KeyEventKind::Release {
        return UiAction::None;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    match key.code {
        KeyCode::Char('c' | 'q') if ctrl => {
            state.should_quit = true;
            UiAction::None
        }
        KeyCode::Char('n') if ctrl => UiAction::NewConversation,
        KeyCode::Char('d') if ctrl => UiAction::DeleteActive,
        KeyCode::Char('p') if ctrl => {
            state.controller.cycle_model();
            UiAction::None
        }
        KeyCode::Esc => {
            state.controller.dismiss_error();
            UiAction::None
        }
        KeyCode::Enter => UiAction::Submit,
        KeyCode::Backspace => {
            state.input.pop();
            UiAction::None
        }
        KeyCode::Left if alt => UiAction::HistoryBack,
        KeyCode::Right if alt => UiAction::HistoryForward,
        KeyCode::Up => neighbor_conversation(state, -1),
        KeyCode::Down => neighbor_conversation(state, 1),
        KeyCode::PageUp => {
            state.scroll_from_bottom = state.scroll_from_bottom.saturating_add(5);
            UiAction::None
        }
        KeyCode::PageDown => {
            state.scroll_from_bottom = state.scroll_from_bottom.saturating_sub(5);
            UiAction::None
        }
        KeyCode::Char(c) if !ctrl && !alt => {
            state.input.push(c);
            UiAction::None
        }
        _ => UiAction::None,
    }
}

/// Picks the conversation above or below the active one in the sidebar.
fn neighbor_conversation(state: &AppState, step: isize) -> UiAction {
    let list = &state.controller.conversations;
    if list.is_empty() {
        return UiAction::None;
    }

    let current = state
        .controller
        .active_conversation
        .as_deref()
        .and_then(|active| list.iter().position(|entry| entry.id == active));

    let target = match current {
        Some(idx) => {
            let next = idx as isize + step;
            if next < 0 || next as usize >= list.len() {
                return UiAction::None;
            }
            next as usize
        }
        None => 0,
    };

    UiAction::Select(list[target].id.clone())
}
