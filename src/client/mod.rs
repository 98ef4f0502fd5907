//! Chat client core: websocket session, reconnect supervision, decoding,
//! and output.

pub mod decoder;
pub mod formatter;
pub mod runner;
pub mod session;
pub mod sink;

pub use decoder::ChatEvent;
pub use runner::{RECONNECT_DELAY, run_supervisor, run_supervisor_with_resolver};
pub use session::SessionEnd;

/// One item on the update channel between the client core and its consumer:
/// either a normalized chat event or a free-text status notification.
#[derive(Debug)]
pub enum ViewerUpdate {
    Chat(ChatEvent),
    Status(String),
}
