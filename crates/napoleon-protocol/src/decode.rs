//! Frame decoder: one raw text frame in, one typed [`ServerEvent`] out.
//!
//! The grammar is small on purpose. A frame is a one- or two-character
//! tag followed immediately by its comma-separated payload, with no
//! framing beyond the websocket message boundary. The whole inbound
//! grammar lives in one table here so every frame shape can be read at
//! a glance.
//!
//! Ordering in that table is load-bearing: two-character tags are
//! listed before one-character tags, so `nb` (nobody bid) is never read
//! as `n` (next player) with a payload of `b`. A test below pins the
//! property down.
//!
//! Decoding never panics. A frame this module cannot understand comes
//! back as a [`DecodeError`]; callers are expected to drop the frame,
//! log it, and keep reading.

use crate::card::{Card, Suit};
use crate::error::DecodeError;
use crate::event::{GameSummary, ServerEvent};
use crate::types::{Bid, GameSettings, RoomKey, User, UserId};

type Parser = fn(&str) -> Result<ServerEvent, DecodeError>;

/// Inbound tag table, longest tags first.
const TAG_TABLE: &[(&str, Parser)] = &[
    ("ab", parse_became_ally),
    ("ac", parse_allies_chosen),
    ("bn", parse_next_bidder),
    ("bo", parse_bidding_over),
    ("bp", parse_player_bid),
    ("nb", parse_no_bids),
    ("c", parse_connected),
    ("e", parse_room_entered),
    ("g", parse_game_over),
    ("h", parse_hand_dealt),
    ("j", parse_player_joined),
    ("n", parse_next_player),
    ("p", parse_card_played),
    ("r", parse_trick_won),
    ("s", parse_game_started),
];

/// Decodes a single raw frame.
pub fn decode(frame: &str) -> Result<ServerEvent, DecodeError> {
    for (tag, parse) in TAG_TABLE {
        if let Some(payload) = frame.strip_prefix(tag) {
            return parse(payload);
        }
    }
    Err(DecodeError::UnknownTag {
        frame: frame.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Per-tag parsers
// ---------------------------------------------------------------------------

fn parse_connected(payload: &str) -> Result<ServerEvent, DecodeError> {
    Ok(ServerEvent::Connected {
        user_id: UserId::new(non_empty(payload, "user id")?),
    })
}

fn parse_room_entered(payload: &str) -> Result<ServerEvent, DecodeError> {
    let mut parts = payload.split(',');
    let key = non_empty(parts.next().unwrap_or(""), "room key")?;
    let host = match parts.next() {
        Some(host) => non_empty(host, "host id")?,
        None => return Err(DecodeError::MissingField { field: "host id" }),
    };

    // The roster arrives flattened as name,id,name,id,... and is
    // re-paired by position.
    let mut users = Vec::new();
    while let Some(username) = parts.next() {
        let id = match parts.next() {
            Some(id) => non_empty(id, "roster user id")?,
            None => return Err(DecodeError::MissingField { field: "roster user id" }),
        };
        users.push(User::new(UserId::new(id), username));
    }

    Ok(ServerEvent::RoomEntered {
        key: RoomKey::new(key),
        host: UserId::new(host),
        users,
    })
}

fn parse_player_joined(payload: &str) -> Result<ServerEvent, DecodeError> {
    let (username, id) = payload
        .split_once(',')
        .ok_or(DecodeError::MissingField { field: "user id" })?;
    Ok(ServerEvent::PlayerJoined {
        username: username.to_string(),
        user_id: UserId::new(non_empty(id, "user id")?),
    })
}

fn parse_game_started(payload: &str) -> Result<ServerEvent, DecodeError> {
    // Payload is a comma-separated seating order, a separator (comma or
    // newline), then a JSON settings document. The document is found by
    // its opening brace so commas inside it are never split on.
    let brace = payload
        .find('{')
        .ok_or(DecodeError::MissingField { field: "settings" })?;
    let (order_part, settings_part) = payload.split_at(brace);
    let order_part = order_part.trim_end_matches([',', '\n']);
    if order_part.is_empty() {
        return Err(DecodeError::MissingField {
            field: "player order",
        });
    }

    let mut player_order = Vec::new();
    for id in order_part.split(',') {
        player_order.push(UserId::new(non_empty(id, "player order id")?));
    }
    let settings: GameSettings =
        serde_json::from_str(settings_part).map_err(DecodeError::BadSettings)?;

    Ok(ServerEvent::GameStarted {
        player_order,
        settings,
    })
}

fn parse_hand_dealt(payload: &str) -> Result<ServerEvent, DecodeError> {
    let mut hand = Vec::new();
    if !payload.is_empty() {
        for token in payload.split(',') {
            hand.push(card(token)?);
        }
    }
    Ok(ServerEvent::HandDealt { hand })
}

fn parse_next_bidder(payload: &str) -> Result<ServerEvent, DecodeError> {
    Ok(ServerEvent::NextBidder {
        user_id: UserId::new(non_empty(payload, "bidder id")?),
    })
}

fn parse_player_bid(payload: &str) -> Result<ServerEvent, DecodeError> {
    // A bare id means the player skipped; an id plus amount is a bid.
    let (id, bid) = match payload.split_once(',') {
        Some((id, amount)) => (id, Bid::Numeric(number(amount)?)),
        None => (payload, Bid::Skipped),
    };
    Ok(ServerEvent::PlayerBid {
        user_id: UserId::new(non_empty(id, "bidder id")?),
        bid,
    })
}

fn parse_no_bids(_payload: &str) -> Result<ServerEvent, DecodeError> {
    Ok(ServerEvent::NoBids)
}

fn parse_bidding_over(payload: &str) -> Result<ServerEvent, DecodeError> {
    let (amount, id) = payload
        .split_once(',')
        .ok_or(DecodeError::MissingField { field: "napoleon id" })?;
    Ok(ServerEvent::BiddingOver {
        bid: number(amount)?,
        napoleon_id: UserId::new(non_empty(id, "napoleon id")?),
    })
}

fn parse_allies_chosen(payload: &str) -> Result<ServerEvent, DecodeError> {
    let mut parts = payload.split(',');
    let trump_suit = suit(parts.next().unwrap_or(""))?;
    let mut allies = Vec::new();
    for token in parts {
        allies.push(card(token)?);
    }
    Ok(ServerEvent::AlliesChosen { trump_suit, allies })
}

fn parse_became_ally(_payload: &str) -> Result<ServerEvent, DecodeError> {
    Ok(ServerEvent::BecameAlly)
}

fn parse_next_player(payload: &str) -> Result<ServerEvent, DecodeError> {
    let (id, required_suit) = match payload.split_once(',') {
        Some((id, token)) => (id, Some(suit(token)?)),
        None => (payload, None),
    };
    Ok(ServerEvent::NextPlayer {
        user_id: UserId::new(non_empty(id, "player id")?),
        required_suit,
    })
}

fn parse_card_played(payload: &str) -> Result<ServerEvent, DecodeError> {
    let (id, token) = payload
        .split_once(',')
        .ok_or(DecodeError::MissingField { field: "card" })?;
    Ok(ServerEvent::CardPlayed {
        user_id: UserId::new(non_empty(id, "player id")?),
        card: card(token)?,
    })
}

fn parse_trick_won(payload: &str) -> Result<ServerEvent, DecodeError> {
    Ok(ServerEvent::TrickWon {
        winner: UserId::new(non_empty(payload, "winner id")?),
    })
}

fn parse_game_over(payload: &str) -> Result<ServerEvent, DecodeError> {
    let mut parts = payload.split(',');
    let mut field = |name| {
        parts
            .next()
            .ok_or(DecodeError::MissingField { field: name })
    };
    let napoleon_score_delta = number(field("napoleon score delta")?)?;
    let player_score_delta = number(field("player score delta")?)?;
    let napoleon_bid = number(field("napoleon bid")?)?;
    let combined_score = number(field("combined score")?)?;

    let mut allies = Vec::new();
    for id in parts {
        allies.push(UserId::new(non_empty(id, "ally id")?));
    }

    Ok(ServerEvent::GameOver(GameSummary {
        napoleon_score_delta,
        player_score_delta,
        napoleon_bid,
        combined_score,
        allies,
    }))
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

fn non_empty<'a>(value: &'a str, field: &'static str) -> Result<&'a str, DecodeError> {
    if value.is_empty() {
        return Err(DecodeError::MissingField { field });
    }
    Ok(value)
}

fn number<T: std::str::FromStr>(value: &str) -> Result<T, DecodeError> {
    value.parse().map_err(|_| DecodeError::BadNumber {
        value: value.to_string(),
    })
}

fn card(token: &str) -> Result<Card, DecodeError> {
    Card::parse(token).ok_or_else(|| DecodeError::BadCard {
        token: token.to_string(),
    })
}

fn suit(token: &str) -> Result<Suit, DecodeError> {
    let mut chars = token.chars();
    match (chars.next().and_then(Suit::from_char), chars.next()) {
        (Some(suit), None) => Ok(suit),
        _ => Err(DecodeError::BadSuit {
            token: token.to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
