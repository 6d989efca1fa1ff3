//! Conversation session state and the controller that drives it.

pub mod controller;
pub mod list;
pub mod message;
pub mod router;
pub mod turn;

pub use controller::{Applied, SessionController};
pub use list::{DEFAULT_TITLE, promote, title_candidate};
pub use message::Message;
pub use router::{History, Route};
pub use turn::TurnUpdate;
