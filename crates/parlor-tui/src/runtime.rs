//! TUI runtime: owns the terminal, runs the event loop, executes actions.
//!
//! Everything runs on one execution context: turn updates are drained and
//! applied between renders, and controller calls are awaited inline. The
//! reducer stays synchronous and returns actions; this module executes them.

use std::io::Stdout;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event};
use parlor_core::session::{Applied, SessionController};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::state::AppState;
use crate::update::{self, UiAction};
use crate::{render, terminal};

/// How long one event poll waits before the next render tick.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runs the interactive chat TUI until the user quits.
///
/// # Errors
/// Returns an error if the terminal cannot be set up or drawing fails.
pub async fn run(controller: SessionController) -> Result<()> {
    terminal::install_panic_hook();
    let mut terminal = terminal::setup_terminal().context("Failed to setup terminal")?;

    let mut state = AppState::new(controller);
    let result = event_loop(&mut terminal, &mut state).await;

    terminal::restore_terminal()?;
    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    state: &mut AppState,
) -> Result<()> {
    while !state.should_quit {
        // Reconcile pending turn updates before rendering.
        let mut completed = false;
        while let Some(turn_update) = state.controller.try_recv_update() {
            if state.controller.apply(turn_update) == Applied::Completed {
                completed = true;
            }
        }
        if completed {
            state.controller.refresh_conversations().await;
        }

        terminal
            .draw(|frame| render::render(frame, state))
            .context("Failed to draw frame")?;

        if event::poll(POLL_INTERVAL).context("Failed to poll terminal events")? {
            if let Event::Key(key) = event::read().context("Failed to read terminal event")? {
                let action = update::handle_key(state, key);
                execute_action(state, action).await;
            }
        } else {
            state.spinner_frame = state.spinner_frame.wrapping_add(1);
        }
    }

    Ok(())
}

async fn execute_action(state: &mut AppState, action: UiAction) {
    match action {
        UiAction::None => {}
        UiAction::Submit => {
            let text = state.input.clone();
            if state.controller.submit(&text) {
                state.input.clear();
                state.scroll_from_bottom = 0;
            }
        }
        UiAction::Select(id) => {
            state.controller.select_conversation(&id).await;
            state.scroll_from_bottom = 0;
        }
        UiAction::NewConversation => {
            state.controller.create_conversation().await;
            state.scroll_from_bottom = 0;
        }
        UiAction::DeleteActive => {
            let active = state.controller.active_conversation.clone();
            if let Some(id) = active {
                state.controller.delete_conversation(&id).await;
            }
        }
        UiAction::HistoryBack => {
            state.controller.navigate_back().await;
            state.scroll_from_bottom = 0;
        }
        UiAction::HistoryForward => {
            state.controller.navigate_forward().await;
            state.scroll_from_bottom = 0;
        }
    }
}
