//! Client-side session state for the Napoleon card game.
//!
//! The server is authoritative; this crate only mirrors it. State is a
//! plain value and the reducer is a pure function, so replaying the
//! same frames always rebuilds the same state.
//!
//! # Key types
//!
//! - [`ClientState`] — everything the client knows, as one value
//! - [`reduce`] — folds one [`napoleon_protocol::ServerEvent`] into it
//! - [`GameSession`] / [`GamePhase`] — the running match and where it
//!   stands
//! - [`Game`] — a running session or the terminal summary it leaves
//!   behind
//! - [`seat_slots`] — trick seating, rotated to the leader
//!
//! Advisory UI helpers (`bid_bounds`, `playable_positions`, ...) live
//! on [`GameSession`]; they filter choices for presentation and claim
//! nothing about legality, which is the server's call alone.

mod hints;
mod reducer;
mod state;

pub use reducer::reduce;
pub use state::{
    seat_slots, ClientState, Game, GamePhase, GameSession, Room, SeatSlot,
};
