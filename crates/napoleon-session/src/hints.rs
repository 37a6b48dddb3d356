//! Advisory helpers the view layer builds its affordances from.
//!
//! Nothing here is enforced. The server is the sole judge of legality
//! and will refuse anything we get wrong; these helpers only exist so
//! an interface can grey out choices the server would reject anyway.

use napoleon_protocol::Suit;

use crate::state::GameSession;

impl GameSession {
    /// Advisory `(minimum, maximum)` for the next numeric bid.
    ///
    /// The minimum outbids the last numeric bid by one, or is zero when
    /// nobody has bid yet; a bid of zero is a real bid, not a skip. The
    /// maximum is the current hand size. A minimum above the maximum
    /// means no numeric bid is worth offering and skipping is the only
    /// advice left.
    pub fn bid_bounds(&self) -> (usize, usize) {
        let min = match self.last_bid {
            Some(last) => last + 1,
            None => 0,
        };
        (min, self.hand.len())
    }

    /// Positions in `hand` that the trick underway lets us play.
    ///
    /// When the trick has a required suit and we hold it, only those
    /// positions come back; otherwise every position does. Positions
    /// rather than cards, so duplicate holdings stay distinguishable.
    pub fn playable_positions(&self) -> Vec<usize> {
        let everything = || (0..self.hand.len()).collect();
        let Some(required) = self.required_suit else {
            return everything();
        };
        let following: Vec<usize> = self
            .hand
            .iter()
            .enumerate()
            .filter(|(_, card)| card.suit == required)
            .map(|(position, _)| position)
            .collect();
        if following.is_empty() {
            return everything();
        }
        following
    }

    /// Suits we could name as trump, deduplicated in the order they
    /// first appear in the hand.
    pub fn trump_candidates(&self) -> Vec<Suit> {
        let mut suits = Vec::new();
        for card in &self.hand {
            if !suits.contains(&card.suit) {
                suits.push(card.suit);
            }
        }
        suits
    }

    /// Whether every seat of the trick on the table holds a card.
    ///
    /// An empty table is not a complete trick.
    pub fn trick_complete(&self) -> bool {
        !self.cards_played.is_empty()
            && self.cards_played.iter().all(|slot| slot.card.is_some())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
