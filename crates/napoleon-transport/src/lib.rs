//! Transport layer for the Napoleon client.
//!
//! Provides the [`FrameConnection`] trait the client pumps frames
//! through, and the default WebSocket implementation of it.
//!
//! # Feature Flags
//!
//! - `websocket` (default) — WebSocket connection via `tokio-tungstenite`

use std::future::Future;

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::WebSocketConnection;

/// A bidirectional stream of text frames.
///
/// The game protocol carries one frame per message and nothing else, so
/// this is the whole surface the client needs. Both directions take
/// `&self`: one reader task and one writer task share a single
/// connection. The returned futures are `Send` because the client
/// drives both directions from spawned tasks; implementations written
/// as `async fn` satisfy the bound as long as they hold only `Send`
/// state across awaits.
pub trait FrameConnection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends one frame to the server.
    fn send(&self, frame: &str) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Receives the next frame from the server.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    fn recv(&self) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send;

    /// Closes the connection.
    fn close(&self) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
