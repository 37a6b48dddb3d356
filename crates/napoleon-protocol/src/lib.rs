//! Wire protocol for the Napoleon card game.
//!
//! This crate defines the "language" the game server speaks:
//!
//! - **Vocabulary** ([`Card`], [`Rank`], [`Suit`], [`Bid`], ids) — the
//!   values that appear inside frames.
//! - **Events** ([`ServerEvent`]) — every inbound frame, decoded.
//! - **Commands** ([`ClientCommand`]) — every outbound frame, pre-encoding.
//! - **Decoder** ([`decode`]) — raw text frame to typed event.
//! - **Errors** ([`DecodeError`]) — what can go wrong on the way in.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (text frames) and session
//! (game state). It knows nothing about sockets or whose turn it is —
//! it only maps frames to values and back.
//!
//! ```text
//! Transport (text) → Protocol (ServerEvent) → Session (ClientState)
//! ```
//!
//! Everything here is pure and synchronous: same frame in, same event
//! out, no clocks, no sockets, no randomness.

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod card;
mod command;
mod decode;
mod error;
mod event;
mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use card::{Card, Rank, Suit};
pub use command::ClientCommand;
pub use decode::decode;
pub use error::DecodeError;
pub use event::{GameSummary, ServerEvent};
pub use types::{Bid, GameSettings, RoomKey, User, UserId};
