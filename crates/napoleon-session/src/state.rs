//! Client-side state values.
//!
//! Everything in this module is plain data. The reducer in
//! [`crate::reducer`] builds new values out of old ones; nothing here
//! talks to a socket, keeps a clock, or hides interior mutability.

use std::collections::HashMap;
use std::fmt;

use napoleon_protocol::{
    Bid, Card, GameSettings, GameSummary, RoomKey, Suit, User, UserId,
};

// ---------------------------------------------------------------------------
// ClientState
// ---------------------------------------------------------------------------

/// Everything the client knows, as one value.
///
/// State is replaced, never edited in place: the reducer takes the
/// current value and an event and hands back the next value, so a clone
/// held by a view can never change underneath it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientState {
    /// Whether the server has acknowledged the connection.
    pub connected: bool,

    /// Our own id, once the server assigns one.
    pub local_user: Option<UserId>,

    /// The room we are in, if any.
    pub room: Option<Room>,
}

impl ClientState {
    /// The game inside our room, if one was ever started.
    pub fn game(&self) -> Option<&Game> {
        self.room.as_ref()?.game.as_ref()
    }

    /// The in-progress session, if a game is running and not yet over.
    pub fn session(&self) -> Option<&GameSession> {
        self.game()?.session()
    }
}

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

/// A lobby room and its roster.
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    /// Human-shareable code other players use to join.
    pub key: RoomKey,

    /// The user who created the room and may start games.
    pub host: UserId,

    /// Roster in join order. Players never leave mid-session, so this
    /// only grows.
    pub users: Vec<User>,

    /// The current game, if the host has started one.
    pub game: Option<Game>,
}

impl Room {
    /// Looks a user up by id.
    pub fn user(&self, id: &UserId) -> Option<&User> {
        self.users.iter().find(|user| &user.id == id)
    }

    /// Whether `id` is the room's host.
    pub fn is_host(&self, id: &UserId) -> bool {
        &self.host == id
    }
}

// ---------------------------------------------------------------------------
// Game
// ---------------------------------------------------------------------------

/// A game as the room sees it: either a running session or the terminal
/// snapshot the game-over event leaves behind.
///
/// The game-over event replaces the whole session, so a finished game
/// carries only its summary. A later start event replaces this value
/// with a fresh [`GameSession`].
#[derive(Debug, Clone, PartialEq)]
pub enum Game {
    /// A match in progress, anywhere from dealing to the last trick.
    Playing(GameSession),
    /// The scoring summary left behind when a match ends.
    Finished(GameSummary),
}

impl Game {
    /// The phase, with finished games reporting [`GamePhase::GameOver`].
    pub fn phase(&self) -> GamePhase {
        match self {
            Game::Playing(session) => session.phase,
            Game::Finished(_) => GamePhase::GameOver,
        }
    }

    /// The running session, if the game is not over.
    pub fn session(&self) -> Option<&GameSession> {
        match self {
            Game::Playing(session) => Some(session),
            Game::Finished(_) => None,
        }
    }

    /// The final summary, if the game is over.
    pub fn summary(&self) -> Option<&GameSummary> {
        match self {
            Game::Playing(_) => None,
            Game::Finished(summary) => Some(summary),
        }
    }
}

// ---------------------------------------------------------------------------
// GamePhase
// ---------------------------------------------------------------------------

/// Where a game stands.
///
/// The server drives every transition:
///
/// ```text
/// Start → Bidding → PostBidding → Round → GameOver
///             ↓
///          NoBids
/// ```
///
/// - **Start**: seating order and settings are known, bidding has not
///   opened yet.
/// - **Bidding**: players bid or skip in turn.
/// - **NoBids**: everyone skipped. Dead end for this hand; only a new
///   start event moves things along.
/// - **PostBidding**: the napoleon is known and is picking trump and
///   ally cards.
/// - **Round**: tricks are being played.
/// - **GameOver**: the match is scored. Reported by [`Game::phase`] for
///   finished games; a running [`GameSession`] never holds this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Start,
    Bidding,
    NoBids,
    PostBidding,
    Round,
    GameOver,
}

impl GamePhase {
    /// Returns `true` if no further play can happen without a new game
    /// being started.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::NoBids | Self::GameOver)
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "Start"),
            Self::Bidding => write!(f, "Bidding"),
            Self::NoBids => write!(f, "NoBids"),
            Self::PostBidding => write!(f, "PostBidding"),
            Self::Round => write!(f, "Round"),
            Self::GameOver => write!(f, "GameOver"),
        }
    }
}

// ---------------------------------------------------------------------------
// GameSession
// ---------------------------------------------------------------------------

/// The running state of one match.
///
/// Only our own hand is ever populated; other players' cards are never
/// transmitted. Everything else mirrors what the server has announced
/// publicly to the table.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSession {
    /// Current phase. Never [`GamePhase::GameOver`]; a finished game is
    /// a [`Game::Finished`] instead.
    pub phase: GamePhase,

    /// Seating order, fixed at start for the whole match.
    pub player_order: Vec<UserId>,

    /// Host-chosen settings for this match.
    pub settings: GameSettings,

    /// Our private hand, in dealt order.
    pub hand: Vec<Card>,

    /// Every bid seen this hand, skips included.
    pub bids: HashMap<UserId, Bid>,

    /// The most recent numeric bid, or `None` before the first one.
    /// Skips never touch this.
    pub last_bid: Option<usize>,

    /// Whose bid the table is waiting on.
    pub bidder: Option<UserId>,

    /// Winner of the bidding, once resolved.
    pub napoleon_id: Option<UserId>,

    /// The bid the napoleon must now make.
    pub napoleon_bid: Option<usize>,

    /// Trump suit, once the napoleon announces it.
    pub trump_suit: Option<Suit>,

    /// Ally cards the napoleon named. Whoever holds one is a secret
    /// ally.
    pub allies: Vec<Card>,

    /// True once the server privately tells us we hold an ally card.
    /// Sticky for the rest of the session.
    pub ally: bool,

    /// Whose turn it is in the current trick.
    pub current_player: Option<UserId>,

    /// Suit that must be followed this trick, or `None` when the leader
    /// is free to open with anything.
    pub required_suit: Option<Suit>,

    /// One slot per player for the trick on the table, seated from the
    /// trick's leader.
    pub cards_played: Vec<SeatSlot>,

    /// Winner of the trick just scored. Cleared when the next trick's
    /// seats are laid out.
    pub winner: Option<UserId>,

    /// Tricks won so far, by player.
    pub trick_count: HashMap<UserId, usize>,
}

impl GameSession {
    /// A fresh session in [`GamePhase::Start`].
    ///
    /// Seat slots are seeded from the seating order so the table can be
    /// shown before the first trick begins.
    pub fn new(player_order: Vec<UserId>, settings: GameSettings) -> GameSession {
        let cards_played = match player_order.first() {
            Some(leader) => seat_slots(&player_order, leader),
            None => Vec::new(),
        };
        GameSession {
            phase: GamePhase::Start,
            player_order,
            settings,
            hand: Vec::new(),
            bids: HashMap::new(),
            last_bid: None,
            bidder: None,
            napoleon_id: None,
            napoleon_bid: None,
            trump_suit: None,
            allies: Vec::new(),
            ally: false,
            current_player: None,
            required_suit: None,
            cards_played,
            winner: None,
            trick_count: HashMap::new(),
        }
    }

    /// The seat slot belonging to `id` in the current trick.
    pub fn seat(&self, id: &UserId) -> Option<&SeatSlot> {
        self.cards_played.iter().find(|slot| &slot.owner == id)
    }

    /// Tricks won by `id` so far.
    pub fn tricks_won(&self, id: &UserId) -> usize {
        self.trick_count.get(id).copied().unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Seat slots
// ---------------------------------------------------------------------------

/// One seat in the trick on the table: who sits there and what they
/// have played into it, if anything.
#[derive(Debug, Clone, PartialEq)]
pub struct SeatSlot {
    /// The player this seat belongs to.
    pub owner: UserId,

    /// The card they played this trick, or `None` so far.
    pub card: Option<Card>,
}

impl SeatSlot {
    pub fn empty(owner: UserId) -> SeatSlot {
        SeatSlot { owner, card: None }
    }
}

/// Builds one empty seat slot per player, rotated so `leader` sits at
/// index 0 and the rest follow seating order cyclically.
///
/// Recomputed at the start of every trick, not just the first, so the
/// on-table layout always reflects who leads. A leader missing from the
/// seating order falls back to the unrotated order; the reducer treats
/// that as desync evidence and logs it before calling.
pub fn seat_slots(player_order: &[UserId], leader: &UserId) -> Vec<SeatSlot> {
    let start = player_order
        .iter()
        .position(|id| id == leader)
        .unwrap_or(0);
    (0..player_order.len())
        .map(|offset| {
            let seat = (start + offset) % player_order.len();
            SeatSlot::empty(player_order[seat].clone())
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
