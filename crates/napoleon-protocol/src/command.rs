//! Client-to-server commands and their wire encoding.
//!
//! Commands are built from already-typed values, so encoding cannot
//! fail: [`ClientCommand::encode`] returns a `String`, not a `Result`.
//! Legality (is it my turn, is the bid high enough) is the server's
//! call; the client sends what the player chose.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::card::{Card, Suit};
use crate::types::{Bid, RoomKey};

/// One outbound frame, pre-encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClientCommand {
    /// `c<username>`: open a fresh room with us as host.
    CreateRoom { username: String },
    /// `j<username>,<key>`: join an existing room by key.
    JoinRoom { username: String, key: RoomKey },
    /// `s`: start the game. Only honoured for the host.
    StartGame,
    /// `b<amount>` or bare `b` for a skip.
    Bid(Bid),
    /// `a<suit>,<cards>`: announce trump and name the ally cards.
    PickAllies { trump_suit: Suit, allies: Vec<Card> },
    /// `p<card>`: play a card from our hand.
    PlayCard(Card),
}

impl ClientCommand {
    /// Renders the single-frame wire form of this command.
    pub fn encode(&self) -> String {
        match self {
            ClientCommand::CreateRoom { username } => format!("c{username}"),
            ClientCommand::JoinRoom { username, key } => format!("j{username},{key}"),
            ClientCommand::StartGame => "s".to_string(),
            ClientCommand::Bid(Bid::Numeric(amount)) => format!("b{amount}"),
            ClientCommand::Bid(Bid::Skipped) => "b".to_string(),
            ClientCommand::PickAllies { trump_suit, allies } => {
                let mut frame = format!("a{trump_suit}");
                for card in allies {
                    // Infallible for String targets.
                    let _ = write!(frame, ",{card}");
                }
                frame
            }
            ClientCommand::PlayCard(card) => format!("p{card}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
