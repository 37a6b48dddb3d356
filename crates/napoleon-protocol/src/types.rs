//! Identity newtypes and small shared values that appear inside frames.
//!
//! The server hands out ids and room keys as opaque strings; wrapping them
//! in newtypes keeps "which string is this?" mistakes out of the rest of
//! the client.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Server-assigned identifier for a connected user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> UserId {
        UserId(id.into())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key players share out-of-band to join the same room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomKey(pub String);

impl RoomKey {
    pub fn new(key: impl Into<String>) -> RoomKey {
        RoomKey(key.into())
    }
}

impl fmt::Display for RoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user as the room roster knows them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
}

impl User {
    pub fn new(id: UserId, username: impl Into<String>) -> User {
        User {
            id,
            username: username.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Bids
// ---------------------------------------------------------------------------

/// A player's answer when asked to bid.
///
/// Zero is a legal number of tricks to commit to, so "declined to bid"
/// gets its own variant instead of a sentinel amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bid {
    /// Committed to winning exactly this many tricks.
    Numeric(usize),
    /// Passed on this round of bidding.
    Skipped,
}

impl Bid {
    /// The committed amount, or `None` for a skip.
    pub fn amount(self) -> Option<usize> {
        match self {
            Bid::Numeric(amount) => Some(amount),
            Bid::Skipped => None,
        }
    }
}

impl fmt::Display for Bid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bid::Numeric(amount) => write!(f, "{amount}"),
            Bid::Skipped => write!(f, "skip"),
        }
    }
}

// ---------------------------------------------------------------------------
// Game settings
// ---------------------------------------------------------------------------

/// Host-chosen settings, carried as a JSON document inside the
/// game-start frame.
///
/// Unknown fields are ignored and missing fields fall back to
/// [`GameSettings::default`], so older and newer servers can both talk
/// to this client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// How many ally cards the napoleon names after winning the bidding.
    pub ally_cards: usize,
    /// Cards dealt to each player.
    pub hand_size: usize,
}

impl Default for GameSettings {
    fn default() -> GameSettings {
        GameSettings {
            ally_cards: 1,
            hand_size: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
