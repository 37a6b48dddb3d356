//! Typed server-to-client events.
//!
//! Every inbound frame decodes into exactly one [`ServerEvent`] variant.
//! The variants carry owned data and no references back into the raw
//! frame, so an event can be folded into state or queued without
//! lifetime gymnastics.

use serde::{Deserialize, Serialize};

use crate::card::{Card, Suit};
use crate::types::{Bid, GameSettings, RoomKey, User, UserId};

/// One decoded server frame.
///
/// Variant docs show the frame each one comes from; the full grammar
/// lives with the decoder in [`crate::decode`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ServerEvent {
    /// `c<id>`: the connection is up and the server assigned us an id.
    Connected { user_id: UserId },
    /// `e<key>,<host>,...`: full room snapshot sent when we enter a room,
    /// whether we created it or joined it.
    RoomEntered {
        key: RoomKey,
        host: UserId,
        users: Vec<User>,
    },
    /// `j<username>,<id>`: another player joined our room.
    PlayerJoined { username: String, user_id: UserId },
    /// `s<order>,<settings>`: the host started a game; seating order is
    /// fixed for the whole match.
    GameStarted {
        player_order: Vec<UserId>,
        settings: GameSettings,
    },
    /// `h<cards>`: our private hand. Sent only to us.
    HandDealt { hand: Vec<Card> },
    /// `bn<id>`: this player is expected to bid next.
    NextBidder { user_id: UserId },
    /// `bp<id>[,<amount>]`: a player bid, or skipped when no amount
    /// follows the id.
    PlayerBid { user_id: UserId, bid: Bid },
    /// `nb`: every player skipped; the hand is abandoned.
    NoBids,
    /// `bo<amount>,<id>`: bidding resolved; the napoleon and their
    /// winning bid are public.
    BiddingOver { bid: usize, napoleon_id: UserId },
    /// `ac<suit>,<cards>`: the napoleon announced trump and the ally
    /// cards.
    AlliesChosen { trump_suit: Suit, allies: Vec<Card> },
    /// `ab`: we hold an ally card. Sent only to us; other players learn
    /// nothing.
    BecameAlly,
    /// `n<id>[,<suit>]`: this player acts next. A suit means the trick
    /// is underway and that suit must be followed; no suit means a fresh
    /// trick.
    NextPlayer {
        user_id: UserId,
        required_suit: Option<Suit>,
    },
    /// `p<id>,<card>`: a card hit the table.
    CardPlayed { user_id: UserId, card: Card },
    /// `r<id>`: the completed trick went to this player.
    TrickWon { winner: UserId },
    /// `g...`: the match ended; final scoring summary.
    GameOver(GameSummary),
}

impl ServerEvent {
    /// A short stable label for logging.
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::Connected { .. } => "connected",
            ServerEvent::RoomEntered { .. } => "room_entered",
            ServerEvent::PlayerJoined { .. } => "player_joined",
            ServerEvent::GameStarted { .. } => "game_started",
            ServerEvent::HandDealt { .. } => "hand_dealt",
            ServerEvent::NextBidder { .. } => "next_bidder",
            ServerEvent::PlayerBid { .. } => "player_bid",
            ServerEvent::NoBids => "no_bids",
            ServerEvent::BiddingOver { .. } => "bidding_over",
            ServerEvent::AlliesChosen { .. } => "allies_chosen",
            ServerEvent::BecameAlly => "became_ally",
            ServerEvent::NextPlayer { .. } => "next_player",
            ServerEvent::CardPlayed { .. } => "card_played",
            ServerEvent::TrickWon { .. } => "trick_won",
            ServerEvent::GameOver(_) => "game_over",
        }
    }
}

/// Final scoring block from the game-over frame.
///
/// Deltas are signed: the napoleon side loses points when the bid was
/// missed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    /// Score change for the napoleon.
    pub napoleon_score_delta: i64,
    /// Score change for each non-napoleon, non-ally player.
    pub player_score_delta: i64,
    /// The bid the napoleon had to make.
    pub napoleon_bid: usize,
    /// Tricks the napoleon side actually took.
    pub combined_score: usize,
    /// Players revealed as allies, now public.
    pub allies: Vec<UserId>,
}
