//! sketchsync-collab — real-time collaboration session management.
//!
//! A [`session::CollabSession`] owns a transport connection, applies
//! inbound patches to local scene state, batches outbound patches around
//! stroke boundaries, and reconciles page lifecycle events between peers.
//!
//! Everything is event-driven and synchronous: the host environment
//! forwards pointer and transport events as discrete method calls, so
//! batching behavior is deterministic and testable without real timers.

pub mod message;
pub mod session;
pub mod surface;
pub mod transport;

pub use message::CollabMessage;
pub use session::{CollabError, CollabSession, SessionState, SketchPage};
pub use surface::{DrawingSurface, SceneUpdate};
pub use transport::{Transport, TransportError};

use rand::Rng;

/// Generates a random six-digit collaboration session identifier,
/// shareable as a join code.
pub fn generate_collab_id() -> u32 {
    let mut rng = rand::thread_rng();
    rng.gen_range(100_000..1_000_000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collab_ids_are_six_digits() {
        for _ in 0..64 {
            let id = generate_collab_id();
            assert!((100_000..1_000_000).contains(&id));
        }
    }
}
