//! The bidirectional message channel seam.
//!
//! The session manager never owns a socket; it writes frames through
//! this trait and receives inbound frames as
//! [`crate::session::CollabSession::handle_message`] calls. Wire
//! encoding beyond the JSON message shape is the transport's concern.

use thiserror::Error;

use crate::message::CollabMessage;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport is closed")]
    Closed,
    #[error("send failed: {0}")]
    Send(String),
}

/// Outbound half of a collaboration connection.
pub trait Transport {
    fn send(&mut self, message: &CollabMessage) -> Result<(), TransportError>;
}
