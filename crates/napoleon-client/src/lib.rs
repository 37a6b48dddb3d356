//! # Napoleon client
//!
//! Client-side engine for the Napoleon trick-taking card game: a typed
//! wire protocol, a pure state machine, and an async shell that keeps
//! them fed from a WebSocket.
//!
//! The server is authoritative about everything. This crate never
//! validates game rules; it decodes what the server says, folds it
//! into one state value, and queues what the player wants to say back.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use napoleon_client::prelude::*;
//!
//! # async fn run() -> Result<(), ClientError> {
//! let client = NapoleonClient::connect("ws://localhost:8080").await?;
//! client.create_room("nora")?;
//!
//! let mut states = client.subscribe();
//! while states.changed().await.is_ok() {
//!     let _state = states.borrow().clone();
//!     // react to the new state
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod store;

pub use client::NapoleonClient;
pub use error::ClientError;
pub use store::SessionStore;

/// The working surface in one import.
pub mod prelude {
    pub use crate::{ClientError, NapoleonClient, SessionStore};
    pub use napoleon_protocol::{
        decode, Bid, Card, ClientCommand, DecodeError, GameSettings,
        GameSummary, Rank, RoomKey, ServerEvent, Suit, User, UserId,
    };
    pub use napoleon_session::{
        reduce, ClientState, Game, GamePhase, GameSession, Room, SeatSlot,
    };
    pub use napoleon_transport::{
        FrameConnection, TransportError, WebSocketConnection,
    };
}
