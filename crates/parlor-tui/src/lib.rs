//! Terminal frontend for parlor.
//!
//! Renders state owned by `parlor_core::session::SessionController`; this
//! crate contains no protocol or session logic of its own.

mod render;
mod runtime;
mod state;
mod terminal;
mod update;

pub use runtime::run;
