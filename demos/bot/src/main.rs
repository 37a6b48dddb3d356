//! A bot that plays Napoleon unattended.
//!
//! Run one bot without `--join` to create a room (it logs the key),
//! then point the others at that key:
//!
//! ```text
//! napoleon-bot --url ws://127.0.0.1:9001 --name nora --players 3
//! napoleon-bot --url ws://127.0.0.1:9001 --name finn --join <key>
//! napoleon-bot --url ws://127.0.0.1:9001 --name alma --join <key>
//! ```
//!
//! Strategy is deliberately blunt: random but legal everywhere. The bot
//! exists to exercise a server and the client stack, not to win.

use napoleon_client::prelude::*;
use rand::seq::IndexedRandom;
use rand::Rng;

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

const USAGE: &str =
    "usage: napoleon-bot [--url ws://HOST:PORT] [--name NAME] [--join KEY] [--players N]";

struct Args {
    url: String,
    name: String,
    join: Option<RoomKey>,
    players: usize,
}

impl Args {
    fn parse(mut argv: impl Iterator<Item = String>) -> Result<Args, String> {
        let mut args = Args {
            url: "ws://127.0.0.1:9001".to_string(),
            name: format!("bot-{:04}", rand::rng().random_range(0..10_000u32)),
            join: None,
            players: 2,
        };
        while let Some(flag) = argv.next() {
            match flag.as_str() {
                "--url" => args.url = take(&mut argv, "--url")?,
                "--name" => args.name = take(&mut argv, "--name")?,
                "--join" => args.join = Some(RoomKey::new(take(&mut argv, "--join")?)),
                "--players" => {
                    let raw = take(&mut argv, "--players")?;
                    args.players = raw
                        .parse()
                        .map_err(|_| format!("--players takes a number, got {raw:?}"))?;
                }
                other => return Err(format!("unknown flag {other:?}")),
            }
        }
        if args.players < 2 {
            return Err("--players must be at least 2".to_string());
        }
        Ok(args)
    }
}

fn take(argv: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, String> {
    argv.next().ok_or_else(|| format!("{flag} takes a value"))
}

// ---------------------------------------------------------------------------
// Edge triggers
// ---------------------------------------------------------------------------

/// Fires once when its condition first becomes true, then re-arms when
/// the condition goes false again.
///
/// Every state change wakes the main loop, so a plain `if` would resend
/// a command on every unrelated event while its condition still held.
/// The latch turns "the condition holds" into "the condition just
/// started holding".
#[derive(Default)]
struct Latch {
    fired: bool,
}

impl Latch {
    fn fire(&mut self, want: bool) -> bool {
        match (want, self.fired) {
            (true, false) => {
                self.fired = true;
                true
            }
            (true, true) => false,
            (false, _) => {
                self.fired = false;
                false
            }
        }
    }
}

#[derive(Default)]
struct Latches {
    announce: Latch,
    start: Latch,
    redeal: Latch,
    bid: Latch,
    allies: Latch,
    play: Latch,
}

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

/// Skips when outbidding is impossible, otherwise skips or bids a
/// random legal amount with even odds.
fn choose_bid((min, max): (usize, usize), rng: &mut impl Rng) -> Option<usize> {
    if min > max || rng.random_bool(0.5) {
        return None;
    }
    Some(rng.random_range(min..=max))
}

/// Names a random suit we actually hold. Hearts only if the hand is
/// somehow empty.
fn choose_trump(session: &GameSession, rng: &mut impl Rng) -> Suit {
    let candidates = session.trump_candidates();
    candidates.choose(rng).copied().unwrap_or(Suit::Hearts)
}

/// Draws ally cards from anywhere in the deck except our own hand;
/// naming a card we hold would waste the pick.
fn choose_allies(session: &GameSession, rng: &mut impl Rng) -> Vec<Card> {
    let pool: Vec<Card> = full_deck()
        .into_iter()
        .filter(|card| !session.hand.contains(card))
        .collect();
    pool.choose_multiple(rng, session.settings.ally_cards)
        .copied()
        .collect()
}

/// A random card from the positions the current trick lets us play.
fn choose_play(session: &GameSession, rng: &mut impl Rng) -> Option<Card> {
    let positions = session.playable_positions();
    let position = positions.choose(rng)?;
    session.hand.get(*position).copied()
}

fn full_deck() -> Vec<Card> {
    Suit::ALL
        .into_iter()
        .flat_map(|suit| Rank::ALL.into_iter().map(move |rank| Card::new(rank, suit)))
        .collect()
}

// ---------------------------------------------------------------------------
// Reactions
// ---------------------------------------------------------------------------

/// Inspects one state snapshot and sends whatever commands it calls
/// for. Returns `Ok(true)` once the match is over.
fn act(
    client: &NapoleonClient<WebSocketConnection>,
    state: &ClientState,
    args: &Args,
    latches: &mut Latches,
) -> Result<bool, ClientError> {
    let (Some(me), Some(room)) = (state.local_user.as_ref(), state.room.as_ref()) else {
        return Ok(false);
    };
    let mut rng = rand::rng();

    if latches.announce.fire(true) {
        if room.is_host(me) {
            tracing::info!(key = %room.key, players = args.players, "created room, share the key");
        } else {
            tracing::info!(key = %room.key, "joined room");
        }
    }

    let lobby_ready =
        room.is_host(me) && room.game.is_none() && room.users.len() >= args.players;
    if latches.start.fire(lobby_ready) {
        tracing::info!(roster = room.users.len(), "starting the game");
        client.start_game()?;
    }

    let Some(game) = &room.game else {
        return Ok(false);
    };
    let session = match game {
        Game::Finished(summary) => {
            tracing::info!(
                napoleon = summary.napoleon_score_delta,
                others = summary.player_score_delta,
                bid = summary.napoleon_bid,
                taken = summary.combined_score,
                "match over"
            );
            return Ok(true);
        }
        Game::Playing(session) => session,
    };

    if latches
        .redeal
        .fire(session.phase == GamePhase::NoBids && room.is_host(me))
    {
        tracing::info!("nobody bid, dealing again");
        client.start_game()?;
    }

    let my_turn_to_bid = session.phase == GamePhase::Bidding
        && session.bidder.as_ref() == Some(me)
        && !session.bids.contains_key(me);
    if latches.bid.fire(my_turn_to_bid) {
        let amount = choose_bid(session.bid_bounds(), &mut rng);
        match amount {
            Some(amount) => tracing::info!(amount, "bidding"),
            None => tracing::info!("skipping the bid"),
        }
        client.bid(amount)?;
    }

    let naming_trump =
        session.phase == GamePhase::PostBidding && session.napoleon_id.as_ref() == Some(me);
    if latches.allies.fire(naming_trump) {
        let trump = choose_trump(session, &mut rng);
        let allies = choose_allies(session, &mut rng);
        tracing::info!(%trump, allies = allies.len(), "won the bidding, naming trump");
        client.pick_allies(trump, allies)?;
    }

    let my_turn_to_play = session.phase == GamePhase::Round
        && session.current_player.as_ref() == Some(me)
        && session.seat(me).is_some_and(|slot| slot.card.is_none());
    if latches.play.fire(my_turn_to_play) {
        if let Some(card) = choose_play(session, &mut rng) {
            tracing::info!(%card, "playing");
            client.play_card(card)?;
        }
    }

    Ok(false)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = match Args::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    };

    tracing::info!(url = %args.url, name = %args.name, "connecting");
    let client = NapoleonClient::connect(&args.url).await?;
    let mut states = client.subscribe();

    match &args.join {
        Some(key) => client.join_room(&args.name, key.clone())?,
        None => client.create_room(&args.name)?,
    }

    let mut latches = Latches::default();
    loop {
        let state = states.borrow_and_update().clone();
        if act(&client, &state, &args, &mut latches)? {
            break;
        }
        if states.changed().await.is_err() {
            tracing::warn!("connection lost before the match finished");
            break;
        }
    }

    client.shutdown().await;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with_hand(tokens: &[&str]) -> GameSession {
        let order = vec![UserId::new("1"), UserId::new("2")];
        let mut session = GameSession::new(order, GameSettings::default());
        session.hand = tokens
            .iter()
            .map(|token| Card::parse(token).unwrap())
            .collect();
        session
    }

    #[test]
    fn test_latch_fires_on_rising_edges_only() {
        let mut latch = Latch::default();
        assert!(!latch.fire(false));
        assert!(latch.fire(true));
        assert!(!latch.fire(true));
        assert!(!latch.fire(false));
        assert!(latch.fire(true));
    }

    #[test]
    fn test_choose_bid_stays_in_bounds() {
        let mut rng = rand::rng();
        for _ in 0..200 {
            if let Some(amount) = choose_bid((2, 5), &mut rng) {
                assert!((2..=5).contains(&amount));
            }
        }
    }

    #[test]
    fn test_choose_bid_skips_when_outbidding_is_impossible() {
        let mut rng = rand::rng();
        for _ in 0..50 {
            assert_eq!(choose_bid((6, 5), &mut rng), None);
        }
    }

    #[test]
    fn test_full_deck_is_fifty_two_unique_cards() {
        let deck = full_deck();
        assert_eq!(deck.len(), 52);
        for (position, card) in deck.iter().enumerate() {
            assert!(!deck[..position].contains(card));
        }
    }

    #[test]
    fn test_allies_avoid_our_own_hand() {
        let mut session = session_with_hand(&["5H", "9S"]);
        session.settings.ally_cards = 3;
        let mut rng = rand::rng();
        for _ in 0..50 {
            let allies = choose_allies(&session, &mut rng);
            assert_eq!(allies.len(), 3);
            for card in &allies {
                assert!(!session.hand.contains(card));
            }
        }
    }

    #[test]
    fn test_play_follows_suit_when_we_hold_it() {
        let mut session = session_with_hand(&["5H", "9S", "AH"]);
        session.required_suit = Some(Suit::Hearts);
        let mut rng = rand::rng();
        for _ in 0..50 {
            let card = choose_play(&session, &mut rng).unwrap();
            assert_eq!(card.suit, Suit::Hearts);
        }
    }

    #[test]
    fn test_trump_comes_from_the_hand() {
        let session = session_with_hand(&["9S"]);
        let mut rng = rand::rng();
        assert_eq!(choose_trump(&session, &mut rng), Suit::Spades);
    }

    #[test]
    fn test_args_defaults_and_flags() {
        let args = Args::parse(std::iter::empty()).unwrap();
        assert_eq!(args.url, "ws://127.0.0.1:9001");
        assert_eq!(args.players, 2);
        assert!(args.join.is_none());

        let argv = [
            "--url",
            "ws://game.example:80",
            "--name",
            "nora",
            "--join",
            "k7",
            "--players",
            "4",
        ]
        .into_iter()
        .map(String::from);
        let args = Args::parse(argv).unwrap();
        assert_eq!(args.url, "ws://game.example:80");
        assert_eq!(args.name, "nora");
        assert_eq!(args.join, Some(RoomKey::new("k7")));
        assert_eq!(args.players, 4);
    }

    #[test]
    fn test_args_reject_bad_input() {
        let parse = |argv: &[&str]| Args::parse(argv.iter().map(|s| s.to_string()));
        assert!(parse(&["--players", "one"]).is_err());
        assert!(parse(&["--players", "1"]).is_err());
        assert!(parse(&["--join"]).is_err());
        assert!(parse(&["--wat"]).is_err());
    }
}
