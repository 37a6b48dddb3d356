//! The pure reducer: `(prior state, event) -> next state`.
//!
//! Composition mirrors the shape of the state. The outer layer handles
//! connection and room membership; game events are delegated to an
//! inner layer that implements the phase machine. The inner layer gets
//! the local user's id as read-only context, which it needs to decide
//! whether a played card is ours and should leave our hand.
//!
//! The reducer is total. Every event is defined in every phase; an
//! event arriving at the wrong moment is ignored rather than guessed
//! at. The decoder has already rejected malformed traffic, so
//! "ignored" here always means wrong timing, not bad data. Evidence of
//! desynchronisation (a played card we do not hold, a player with no
//! seat) is logged and the state left at its last known good value;
//! the server is authoritative and its next events keep us honest.

use napoleon_protocol::{Bid, Card, ServerEvent, User, UserId};

use crate::state::{seat_slots, ClientState, Game, GamePhase, GameSession, Room};

/// Folds one event into the state, returning the next state.
///
/// The prior state is never modified, so clones of it held elsewhere
/// stay valid.
pub fn reduce(state: &ClientState, event: &ServerEvent) -> ClientState {
    match event {
        ServerEvent::Connected { user_id } => {
            let mut next = state.clone();
            next.connected = true;
            next.local_user = Some(user_id.clone());
            next
        }
        ServerEvent::RoomEntered { key, host, users } => {
            let mut next = state.clone();
            next.room = Some(Room {
                key: key.clone(),
                host: host.clone(),
                users: users.clone(),
                game: None,
            });
            next
        }
        ServerEvent::PlayerJoined { username, user_id } => {
            let mut next = state.clone();
            match next.room.as_mut() {
                Some(room) if room.user(user_id).is_none() => {
                    room.users.push(User::new(user_id.clone(), username.clone()));
                }
                Some(_) => {
                    tracing::debug!(%user_id, "join for a user already on the roster");
                }
                None => {
                    tracing::warn!(%user_id, "join event while not in any room");
                }
            }
            next
        }
        _ => {
            let mut next = state.clone();
            match next.room.as_mut() {
                Some(room) => {
                    room.game = game_reduce(room.game.take(), state.local_user.as_ref(), event);
                }
                None => {
                    tracing::warn!(event = event.name(), "game event while not in any room");
                }
            }
            next
        }
    }
}

// ---------------------------------------------------------------------------
// Inner (game) reducer
// ---------------------------------------------------------------------------

fn game_reduce(
    game: Option<Game>,
    local_user: Option<&UserId>,
    event: &ServerEvent,
) -> Option<Game> {
    // Start and game-over replace whatever was there, whatever the
    // phase: start begins a fresh session, game-over leaves only the
    // terminal summary behind.
    if let ServerEvent::GameStarted {
        player_order,
        settings,
    } = event
    {
        return Some(Game::Playing(GameSession::new(
            player_order.clone(),
            *settings,
        )));
    }
    if let ServerEvent::GameOver(summary) = event {
        return Some(Game::Finished(summary.clone()));
    }

    let session = match game {
        Some(Game::Playing(session)) => session,
        Some(finished @ Game::Finished(_)) => {
            tracing::debug!(event = event.name(), "game event after the game ended");
            return Some(finished);
        }
        None => {
            tracing::warn!(event = event.name(), "game event before any game started");
            return None;
        }
    };
    Some(Game::Playing(session_reduce(session, local_user, event)))
}

fn session_reduce(
    mut session: GameSession,
    local_user: Option<&UserId>,
    event: &ServerEvent,
) -> GameSession {
    use GamePhase::{Bidding, NoBids, PostBidding, Round, Start};

    match event {
        ServerEvent::HandDealt { hand } => {
            session.hand = hand.clone();
        }
        ServerEvent::NextBidder { user_id }
            if matches!(session.phase, Start | Bidding) =>
        {
            session.phase = Bidding;
            session.bidder = Some(user_id.clone());
        }
        ServerEvent::PlayerBid { user_id, bid } if session.phase == Bidding => {
            session.bids.insert(user_id.clone(), *bid);
            if let Bid::Numeric(amount) = bid {
                session.last_bid = Some(*amount);
            }
        }
        ServerEvent::NoBids if session.phase == Bidding => {
            // Dead end for this hand; only a fresh start event moves
            // things along.
            session.phase = NoBids;
        }
        ServerEvent::BiddingOver { bid, napoleon_id } if session.phase == Bidding => {
            session.phase = PostBidding;
            session.napoleon_id = Some(napoleon_id.clone());
            session.napoleon_bid = Some(*bid);
        }
        ServerEvent::AlliesChosen { trump_suit, allies }
            if session.phase == PostBidding =>
        {
            session.phase = Round;
            session.trump_suit = Some(*trump_suit);
            session.allies = allies.clone();
            // Seats are laid out again once the server assigns the
            // opening trick's first player.
            session.cards_played.clear();
        }
        ServerEvent::BecameAlly => {
            // Sticky until the session itself is replaced.
            session.ally = true;
        }
        ServerEvent::NextPlayer {
            user_id,
            required_suit,
        } if session.phase == Round => {
            if session.cards_played.is_empty() || session.winner.is_some() {
                if !session.player_order.contains(user_id) {
                    tracing::warn!(%user_id, "trick leader is not in the seating order");
                }
                session.cards_played = seat_slots(&session.player_order, user_id);
                session.winner = None;
            }
            session.current_player = Some(user_id.clone());
            session.required_suit = *required_suit;
        }
        ServerEvent::CardPlayed { user_id, card } if session.phase == Round => {
            if local_user == Some(user_id) {
                prune_hand(&mut session.hand, *card, user_id);
            }
            match session
                .cards_played
                .iter_mut()
                .find(|slot| &slot.owner == user_id)
            {
                Some(slot) => slot.card = Some(*card),
                None => {
                    tracing::warn!(%user_id, %card, "play from a player with no seat this trick");
                }
            }
        }
        ServerEvent::TrickWon { winner } if session.phase == Round => {
            session.winner = Some(winner.clone());
            *session.trick_count.entry(winner.clone()).or_insert(0) += 1;
        }
        // Everything else either belongs to the outer layer or arrived
        // at the wrong moment; the server keeps talking either way.
        other => {
            tracing::debug!(
                phase = %session.phase,
                event = other.name(),
                "ignoring event in this phase"
            );
        }
    }
    session
}

fn prune_hand(hand: &mut Vec<Card>, card: Card, user_id: &UserId) {
    if let Some(index) = hand.iter().position(|held| *held == card) {
        hand.remove(index);
    } else {
        tracing::warn!(%user_id, %card, "server says we played a card our hand does not hold");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use napoleon_protocol::{GameSettings, GameSummary, RoomKey, Suit};

    fn uid(id: &str) -> UserId {
        UserId::new(id)
    }

    fn card(token: &str) -> Card {
        Card::parse(token).unwrap()
    }

    fn fold(state: ClientState, events: &[ServerEvent]) -> ClientState {
        events.iter().fold(state, |state, event| reduce(&state, event))
    }

    /// Connected as "a", in a three-player room.
    fn in_room() -> ClientState {
        fold(
            ClientState::default(),
            &[
                ServerEvent::Connected { user_id: uid("a") },
                ServerEvent::RoomEntered {
                    key: RoomKey::new("k1"),
                    host: uid("a"),
                    users: vec![User::new(uid("a"), "nora")],
                },
                ServerEvent::PlayerJoined {
                    username: "finn".to_string(),
                    user_id: uid("b"),
                },
                ServerEvent::PlayerJoined {
                    username: "mara".to_string(),
                    user_id: uid("c"),
                },
            ],
        )
    }

    /// Game started (order a, b, c), hand dealt, "a" asked to bid.
    fn bidding() -> ClientState {
        fold(
            in_room(),
            &[
                ServerEvent::GameStarted {
                    player_order: vec![uid("a"), uid("b"), uid("c")],
                    settings: GameSettings::default(),
                },
                ServerEvent::HandDealt {
                    hand: vec![card("5H"), card("9S"), card("AD")],
                },
                ServerEvent::NextBidder { user_id: uid("a") },
            ],
        )
    }

    /// Bidding resolved for "a" at 3, trump hearts, "b" leads trick one.
    fn in_round() -> ClientState {
        fold(
            bidding(),
            &[
                ServerEvent::PlayerBid {
                    user_id: uid("a"),
                    bid: Bid::Numeric(3),
                },
                ServerEvent::BiddingOver {
                    bid: 3,
                    napoleon_id: uid("a"),
                },
                ServerEvent::AlliesChosen {
                    trump_suit: Suit::Hearts,
                    allies: vec![card("QH")],
                },
                ServerEvent::NextPlayer {
                    user_id: uid("b"),
                    required_suit: None,
                },
            ],
        )
    }

    fn summary() -> GameSummary {
        GameSummary {
            napoleon_score_delta: 6,
            player_score_delta: -2,
            napoleon_bid: 3,
            combined_score: 4,
            allies: vec![uid("c")],
        }
    }

    fn owners(state: &ClientState) -> Vec<String> {
        state
            .session()
            .unwrap()
            .cards_played
            .iter()
            .map(|slot| slot.owner.0.clone())
            .collect()
    }

    // ----- outer layer ----------------------------------------------------

    #[test]
    fn test_connected_sets_identity() {
        let state = reduce(
            &ClientState::default(),
            &ServerEvent::Connected { user_id: uid("a") },
        );
        assert!(state.connected);
        assert_eq!(state.local_user, Some(uid("a")));
        assert!(state.room.is_none());
    }

    #[test]
    fn test_room_entered_replaces_room_and_drops_game() {
        let state = reduce(
            &in_round(),
            &ServerEvent::RoomEntered {
                key: RoomKey::new("k2"),
                host: uid("z"),
                users: vec![User::new(uid("z"), "zoe")],
            },
        );
        let room = state.room.unwrap();
        assert_eq!(room.key, RoomKey::new("k2"));
        assert!(room.game.is_none());
    }

    #[test]
    fn test_player_joined_appends_in_join_order() {
        let state = in_room();
        let room = state.room.as_ref().unwrap();
        let names: Vec<&str> = room.users.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, ["nora", "finn", "mara"]);
    }

    #[test]
    fn test_player_joined_ignores_duplicates() {
        let state = reduce(
            &in_room(),
            &ServerEvent::PlayerJoined {
                username: "finn again".to_string(),
                user_id: uid("b"),
            },
        );
        let room = state.room.unwrap();
        assert_eq!(room.users.len(), 3);
        assert_eq!(room.user(&uid("b")).unwrap().username, "finn");
    }

    #[test]
    fn test_events_without_a_room_are_ignored() {
        let connected = reduce(
            &ClientState::default(),
            &ServerEvent::Connected { user_id: uid("a") },
        );
        let state = fold(
            connected.clone(),
            &[
                ServerEvent::PlayerJoined {
                    username: "finn".to_string(),
                    user_id: uid("b"),
                },
                ServerEvent::NextBidder { user_id: uid("a") },
                ServerEvent::TrickWon { winner: uid("a") },
            ],
        );
        assert_eq!(state, connected);
    }

    // ----- game start -----------------------------------------------------

    #[test]
    fn test_game_started_creates_fresh_session() {
        let state = bidding();
        let session = state.session().unwrap();
        assert_eq!(session.player_order, vec![uid("a"), uid("b"), uid("c")]);
        assert_eq!(session.cards_played.len(), 3);
        assert_eq!(session.hand.len(), 3);
    }

    #[test]
    fn test_game_started_replaces_a_finished_game() {
        let finished = reduce(&in_round(), &ServerEvent::GameOver(summary()));
        let state = reduce(
            &finished,
            &ServerEvent::GameStarted {
                player_order: vec![uid("a"), uid("b"), uid("c")],
                settings: GameSettings::default(),
            },
        );
        let session = state.session().unwrap();
        assert_eq!(session.phase, GamePhase::Start);
        assert!(session.bids.is_empty());
        assert!(!session.ally);
    }

    #[test]
    fn test_hand_dealt_replaces_hand() {
        let state = reduce(
            &bidding(),
            &ServerEvent::HandDealt {
                hand: vec![card("2C")],
            },
        );
        assert_eq!(state.session().unwrap().hand, vec![card("2C")]);
    }

    // ----- bidding --------------------------------------------------------

    #[test]
    fn test_next_bidder_opens_bidding_and_moves_on() {
        let state = bidding();
        let session = state.session().unwrap();
        assert_eq!(session.phase, GamePhase::Bidding);
        assert_eq!(session.bidder, Some(uid("a")));

        let state = reduce(&state, &ServerEvent::NextBidder { user_id: uid("b") });
        assert_eq!(state.session().unwrap().bidder, Some(uid("b")));
    }

    #[test]
    fn test_numeric_bid_advances_last_bid() {
        let state = reduce(
            &bidding(),
            &ServerEvent::PlayerBid {
                user_id: uid("a"),
                bid: Bid::Numeric(3),
            },
        );
        let session = state.session().unwrap();
        assert_eq!(session.bids.get(&uid("a")), Some(&Bid::Numeric(3)));
        assert_eq!(session.last_bid, Some(3));
    }

    #[test]
    fn test_skip_is_recorded_without_touching_last_bid() {
        let state = fold(
            bidding(),
            &[
                ServerEvent::PlayerBid {
                    user_id: uid("a"),
                    bid: Bid::Numeric(2),
                },
                ServerEvent::PlayerBid {
                    user_id: uid("b"),
                    bid: Bid::Skipped,
                },
            ],
        );
        let session = state.session().unwrap();
        assert_eq!(session.bids.get(&uid("b")), Some(&Bid::Skipped));
        assert_eq!(session.last_bid, Some(2));
    }

    #[test]
    fn test_zero_bid_is_distinct_from_no_bid_yet() {
        let before = bidding();
        assert_eq!(before.session().unwrap().last_bid, None);

        let state = reduce(
            &before,
            &ServerEvent::PlayerBid {
                user_id: uid("a"),
                bid: Bid::Numeric(0),
            },
        );
        let session = state.session().unwrap();
        assert_eq!(session.last_bid, Some(0));
        assert_eq!(session.bids.get(&uid("a")), Some(&Bid::Numeric(0)));
    }

    #[test]
    fn test_no_bids_dead_ends_the_hand() {
        let state = reduce(&bidding(), &ServerEvent::NoBids);
        assert_eq!(state.session().unwrap().phase, GamePhase::NoBids);

        // Nothing but a new start moves the session along.
        let stuck = fold(
            state.clone(),
            &[
                ServerEvent::NextBidder { user_id: uid("b") },
                ServerEvent::PlayerBid {
                    user_id: uid("b"),
                    bid: Bid::Numeric(1),
                },
            ],
        );
        assert_eq!(stuck, state);

        let restarted = reduce(
            &stuck,
            &ServerEvent::GameStarted {
                player_order: vec![uid("a"), uid("b"), uid("c")],
                settings: GameSettings::default(),
            },
        );
        assert_eq!(restarted.session().unwrap().phase, GamePhase::Start);
    }

    #[test]
    fn test_bidding_over_announces_napoleon() {
        let state = fold(
            bidding(),
            &[
                ServerEvent::PlayerBid {
                    user_id: uid("a"),
                    bid: Bid::Numeric(3),
                },
                ServerEvent::BiddingOver {
                    bid: 3,
                    napoleon_id: uid("a"),
                },
            ],
        );
        let session = state.session().unwrap();
        assert_eq!(session.phase, GamePhase::PostBidding);
        assert_eq!(session.napoleon_id, Some(uid("a")));
        assert_eq!(session.napoleon_bid, Some(3));
    }

    // ----- trump, allies, tricks ------------------------------------------

    #[test]
    fn test_allies_chosen_enters_round_and_clears_seats() {
        let state = fold(
            bidding(),
            &[
                ServerEvent::PlayerBid {
                    user_id: uid("a"),
                    bid: Bid::Numeric(3),
                },
                ServerEvent::BiddingOver {
                    bid: 3,
                    napoleon_id: uid("a"),
                },
                ServerEvent::AlliesChosen {
                    trump_suit: Suit::Hearts,
                    allies: vec![card("QH")],
                },
            ],
        );
        let session = state.session().unwrap();
        assert_eq!(session.phase, GamePhase::Round);
        assert_eq!(session.trump_suit, Some(Suit::Hearts));
        assert_eq!(session.allies, vec![card("QH")]);
        assert!(session.cards_played.is_empty());
    }

    #[test]
    fn test_first_next_player_seats_the_trick_from_its_leader() {
        let state = in_round();
        let session = state.session().unwrap();
        assert_eq!(owners(&state), ["b", "c", "a"]);
        assert_eq!(session.current_player, Some(uid("b")));
        assert_eq!(session.required_suit, None);
    }

    #[test]
    fn test_mid_trick_next_player_keeps_the_seating() {
        let state = fold(
            in_round(),
            &[
                ServerEvent::CardPlayed {
                    user_id: uid("b"),
                    card: card("4S"),
                },
                ServerEvent::NextPlayer {
                    user_id: uid("c"),
                    required_suit: Some(Suit::Spades),
                },
            ],
        );
        let session = state.session().unwrap();
        assert_eq!(owners(&state), ["b", "c", "a"]);
        assert_eq!(session.current_player, Some(uid("c")));
        assert_eq!(session.required_suit, Some(Suit::Spades));
        assert_eq!(session.seat(&uid("b")).unwrap().card, Some(card("4S")));
    }

    #[test]
    fn test_next_player_after_a_scored_trick_reseats_and_clears_winner() {
        let state = fold(
            in_round(),
            &[
                ServerEvent::CardPlayed {
                    user_id: uid("b"),
                    card: card("4S"),
                },
                ServerEvent::CardPlayed {
                    user_id: uid("c"),
                    card: card("7S"),
                },
                ServerEvent::CardPlayed {
                    user_id: uid("a"),
                    card: card("9S"),
                },
                ServerEvent::TrickWon { winner: uid("c") },
                ServerEvent::NextPlayer {
                    user_id: uid("c"),
                    required_suit: None,
                },
            ],
        );
        let session = state.session().unwrap();
        assert_eq!(owners(&state), ["c", "a", "b"]);
        assert!(session.winner.is_none());
        assert!(session.cards_played.iter().all(|slot| slot.card.is_none()));
        assert_eq!(session.required_suit, None);
    }

    #[test]
    fn test_local_play_prunes_exactly_one_copy() {
        // Two packs can put duplicate cards in one hand.
        let state = fold(
            in_round(),
            &[ServerEvent::HandDealt {
                hand: vec![card("5H"), card("5H"), card("9S")],
            }],
        );
        let state = reduce(
            &state,
            &ServerEvent::CardPlayed {
                user_id: uid("a"),
                card: card("5H"),
            },
        );
        let session = state.session().unwrap();
        assert_eq!(session.hand, vec![card("5H"), card("9S")]);
        assert_eq!(session.seat(&uid("a")).unwrap().card, Some(card("5H")));
    }

    #[test]
    fn test_remote_play_leaves_our_hand_alone() {
        let state = reduce(
            &in_round(),
            &ServerEvent::CardPlayed {
                user_id: uid("b"),
                card: card("5H"),
            },
        );
        let session = state.session().unwrap();
        assert_eq!(session.hand, vec![card("5H"), card("9S"), card("AD")]);
        assert_eq!(session.seat(&uid("b")).unwrap().card, Some(card("5H")));
    }

    #[test]
    fn test_desynced_local_play_leaves_hand_unchanged() {
        let state = reduce(
            &in_round(),
            &ServerEvent::CardPlayed {
                user_id: uid("a"),
                card: card("2C"),
            },
        );
        let session = state.session().unwrap();
        // The card still lands on the table; only the hand is suspect.
        assert_eq!(session.hand, vec![card("5H"), card("9S"), card("AD")]);
        assert_eq!(session.seat(&uid("a")).unwrap().card, Some(card("2C")));
    }

    #[test]
    fn test_play_from_an_unseated_player_changes_nothing() {
        let before = in_round();
        let state = reduce(
            &before,
            &ServerEvent::CardPlayed {
                user_id: uid("ghost"),
                card: card("2C"),
            },
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_trick_won_counts_from_zero() {
        let state = fold(
            in_round(),
            &[
                ServerEvent::TrickWon { winner: uid("c") },
            ],
        );
        let session = state.session().unwrap();
        assert_eq!(session.winner, Some(uid("c")));
        assert_eq!(session.tricks_won(&uid("c")), 1);
        assert_eq!(session.tricks_won(&uid("a")), 0);
    }

    #[test]
    fn test_became_ally_is_sticky() {
        let state = reduce(&in_round(), &ServerEvent::BecameAlly);
        assert!(state.session().unwrap().ally);

        let state = fold(
            state,
            &[
                ServerEvent::CardPlayed {
                    user_id: uid("b"),
                    card: card("4S"),
                },
                ServerEvent::TrickWon { winner: uid("b") },
                ServerEvent::NextPlayer {
                    user_id: uid("b"),
                    required_suit: None,
                },
            ],
        );
        assert!(state.session().unwrap().ally);
    }

    // ----- game over ------------------------------------------------------

    #[test]
    fn test_game_over_replaces_session_with_the_summary() {
        let state = reduce(&in_round(), &ServerEvent::GameOver(summary()));
        let game = state.game().unwrap();
        assert_eq!(game.phase(), GamePhase::GameOver);
        assert!(game.session().is_none());
        assert_eq!(game.summary(), Some(&summary()));
    }

    #[test]
    fn test_game_over_applies_from_any_phase() {
        let state = reduce(&bidding(), &ServerEvent::GameOver(summary()));
        assert_eq!(state.game().unwrap().phase(), GamePhase::GameOver);
    }

    #[test]
    fn test_events_after_game_over_are_ignored() {
        let finished = reduce(&in_round(), &ServerEvent::GameOver(summary()));
        let state = fold(
            finished.clone(),
            &[
                ServerEvent::NextBidder { user_id: uid("a") },
                ServerEvent::CardPlayed {
                    user_id: uid("b"),
                    card: card("4S"),
                },
            ],
        );
        assert_eq!(state, finished);
    }

    // ----- totality and purity --------------------------------------------

    #[test]
    fn test_out_of_phase_events_are_no_ops() {
        let state = bidding();
        let unchanged = fold(
            state.clone(),
            &[
                ServerEvent::AlliesChosen {
                    trump_suit: Suit::Clubs,
                    allies: vec![],
                },
                ServerEvent::NextPlayer {
                    user_id: uid("b"),
                    required_suit: None,
                },
                ServerEvent::TrickWon { winner: uid("b") },
                ServerEvent::CardPlayed {
                    user_id: uid("b"),
                    card: card("4S"),
                },
            ],
        );
        assert_eq!(unchanged, state);
    }

    #[test]
    fn test_reduce_leaves_the_prior_state_untouched() {
        let state = in_round();
        let snapshot = state.clone();
        let _ = reduce(
            &state,
            &ServerEvent::CardPlayed {
                user_id: uid("a"),
                card: card("5H"),
            },
        );
        assert_eq!(state, snapshot);
    }
}
