//! Live chat viewer for the Chzzk streaming platform.
//!
//! The core is a websocket chat client: it resolves a channel's live chat
//! session id over the public polling endpoint, keeps one websocket session
//! alive (handshake, keep-alive pongs, bounded receives), decodes nested
//! JSON chat envelopes into normalized [`client::ChatEvent`]s, and
//! reconnects transparently whenever the connection drops.

pub mod client;
pub mod common;
pub mod error;
pub mod protocol;
pub mod resolver;
