//! The dispatch boundary: raw frames in, state versions out.

use napoleon_protocol::{decode, ServerEvent};
use napoleon_session::{reduce, ClientState};
use tokio::sync::watch;

/// Owns the authoritative [`ClientState`] and tells subscribers when it
/// changes.
///
/// One store exists per connection, owned by whatever pumps the frames
/// (normally the reader task inside [`crate::NapoleonClient`]). Frames
/// are decoded and folded synchronously, one at a time, so there is
/// never more than one reducer application in flight and events cannot
/// interleave or reorder.
pub struct SessionStore {
    state: ClientState,
    updates: watch::Sender<ClientState>,
    decode_failures: u64,
}

impl SessionStore {
    /// A store holding the default, not-yet-connected state.
    pub fn new() -> SessionStore {
        let state = ClientState::default();
        let (updates, _) = watch::channel(state.clone());
        SessionStore {
            state,
            updates,
            decode_failures: 0,
        }
    }

    /// Decodes one raw frame and folds it into the state.
    ///
    /// A frame that does not decode is logged, counted, and dropped;
    /// the state is provably untouched and the next frame proceeds as
    /// usual.
    pub fn handle_frame(&mut self, frame: &str) {
        match decode(frame) {
            Ok(event) => self.apply(&event),
            Err(error) => {
                self.decode_failures += 1;
                tracing::warn!(%error, frame, "dropping undecodable frame");
            }
        }
    }

    /// Folds an already-decoded event into the state and notifies
    /// subscribers.
    pub fn apply(&mut self, event: &ServerEvent) {
        tracing::debug!(event = event.name(), "applying event");
        self.state = reduce(&self.state, event);
        // All receivers may be gone; nobody listening is fine.
        let _ = self.updates.send(self.state.clone());
    }

    /// The current state.
    pub fn state(&self) -> &ClientState {
        &self.state
    }

    /// A receiver seeing a fresh state after every applied event.
    ///
    /// Backed by a `watch` channel: only the latest version is kept, so
    /// a slow consumer skips intermediate versions instead of queueing
    /// them up.
    pub fn subscribe(&self) -> watch::Receiver<ClientState> {
        self.updates.subscribe()
    }

    /// Inbound frames dropped as undecodable since the store was made.
    pub fn decode_failures(&self) -> u64 {
        self.decode_failures
    }
}

impl Default for SessionStore {
    fn default() -> SessionStore {
        SessionStore::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
