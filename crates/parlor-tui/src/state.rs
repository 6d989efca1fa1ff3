//! TUI application state.
//!
//! Conversation and message state lives in the `SessionController`; this
//! struct only adds view-local concerns (input buffer, scroll, spinner).

use parlor_core::session::SessionController;

pub struct AppState {
    /// Sole owner of conversation, message, and error state.
    pub controller: SessionController,
    /// Input buffer; cleared when a submit actually starts a turn.
    pub input: String,
    /// Transcript scroll offset, measured in rows up from the bottom.
    pub scroll_from_bottom: u16,
    /// Spinner animation frame counter.
    pub spinner_frame: usize,
    /// Flag indicating the app should quit.
    pub should_quit: bool,
}

impl AppState {
    pub fn new(controller: SessionController) -> Self {
        Self {
            controller,
            input: String::new(),
            scroll_from_bottom: 0,
            spinner_frame: 0,
            should_quit: false,
        }
    }
}
