use std::collections::BTreeMap;

use hanabi::{Card, Color};

use crate::{CardLocation, DecodeError};

/// Heights of the five firework piles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Piles {
    heights: [u8; 5],
}

impl Piles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn height(&self, color: Color) -> u8 {
        self.heights[color.index()]
    }

    /// Sets a pile height, clamped to 5.
    pub fn set(&mut self, color: Color, height: u8) {
        self.heights[color.index()] = height.min(5);
    }

    /// Whether the pile of the card's color has already reached its rank.
    pub fn has_played(&self, card: Card) -> bool {
        card.rank.value() <= self.height(card.color)
    }

    /// Whether this card could be played right now.
    pub fn is_playable(&self, card: Card) -> bool {
        card.rank.value() == self.height(card.color) + 1
    }

    pub fn score(&self) -> u32 {
        self.heights.iter().map(|&h| h as u32).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Color, u8)> + '_ {
        Color::ALL.iter().map(|&color| (color, self.height(color)))
    }
}

/// How many copies of each card the server says are still unseen.
///
/// This is the authoritative count; the client does not assume any
/// particular deck distribution.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeckComposition {
    remaining: BTreeMap<Card, u32>,
}

impl DeckComposition {
    /// Decodes the server's map from card code to count. Entries with a
    /// malformed code are skipped and reported.
    pub fn decode(raw: &BTreeMap<String, u32>) -> (Self, Vec<DecodeError>) {
        let mut remaining = BTreeMap::new();
        let mut errors = Vec::new();
        for (code, &count) in raw {
            match code.parse::<Card>() {
                Ok(card) => {
                    remaining.insert(card, count);
                }
                Err(err) => errors.push(DecodeError::Card {
                    location: CardLocation::DeckComposition,
                    code: code.clone(),
                    err,
                }),
            }
        }
        (Self { remaining }, errors)
    }

    pub fn remaining(&self, card: Card) -> Option<u32> {
        self.remaining.get(&card).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }
}

/// What the player needs to know about one card face when deciding a move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CardCount {
    /// Copies still unseen. `None` if the server did not report this card.
    pub left: Option<u32>,
    /// The pile of this color already contains this rank.
    pub played: bool,
}

impl CardCount {
    /// A card is critical when it has not been played and the last copy is
    /// the only one left.
    pub fn is_critical(&self) -> bool {
        !self.played && self.left == Some(1)
    }
}

pub fn count(card: Card, composition: &DeckComposition, piles: &Piles) -> CardCount {
    CardCount {
        left: composition.remaining(card),
        played: piles.has_played(card),
    }
}

/// Copies of `card` not yet discarded or placed, given that `minted`
/// copies exist in total. Never negative.
pub fn unaccounted(card: Card, minted: u32, discards: &[Card], piles: &Piles) -> u32 {
    let discarded = discards.iter().filter(|&&c| c == card).count() as u32;
    let placed = u32::from(piles.has_played(card));
    minted.saturating_sub(discarded + placed)
}

#[cfg(test)]
mod tests {
    use hanabi::{card, CardFromStrErr};

    use super::*;

    #[test]
    fn unaccounted_green_five() {
        let piles = Piles::new();
        let discards = [card!("5g")];
        assert_eq!(unaccounted(card!("5g"), 1, &discards, &piles), 0);
        assert_eq!(unaccounted(card!("5g"), 2, &discards, &piles), 1);
        assert_eq!(unaccounted(card!("5g"), 0, &discards, &piles), 0);
        assert_eq!(unaccounted(card!("4g"), 2, &discards, &piles), 2);
    }

    #[test]
    fn unaccounted_counts_placed_card() {
        let mut piles = Piles::new();
        piles.set(Color::Green, 3);
        let discards = [card!("3g"), card!("1g")];
        assert_eq!(unaccounted(card!("3g"), 2, &discards, &piles), 0);
        assert_eq!(unaccounted(card!("1g"), 3, &discards, &piles), 1);
        assert_eq!(unaccounted(card!("4g"), 2, &discards, &piles), 2);
    }

    #[test]
    fn piles() {
        let mut piles = Piles::new();
        piles.set(Color::Red, 2);
        piles.set(Color::Blue, 9);
        assert_eq!(piles.height(Color::Blue), 5);
        assert!(piles.has_played(card!("2r")));
        assert!(!piles.has_played(card!("3r")));
        assert!(piles.is_playable(card!("3r")));
        assert!(piles.is_playable(card!("1w")));
        assert_eq!(piles.score(), 7);
    }

    #[test]
    fn composition_is_authoritative() {
        let raw = BTreeMap::from([
            (String::from("5g"), 0),
            (String::from("1r"), 1),
            (String::from("9x"), 4),
        ]);
        let (composition, errors) = DeckComposition::decode(&raw);
        assert_eq!(composition.remaining(card!("1r")), Some(1));
        assert_eq!(composition.remaining(card!("5g")), Some(0));
        assert_eq!(composition.remaining(card!("2b")), None);
        assert_eq!(
            errors,
            vec![DecodeError::Card {
                location: CardLocation::DeckComposition,
                code: String::from("9x"),
                err: CardFromStrErr::InvalidRank,
            }]
        );

        let counted = count(card!("1r"), &composition, &Piles::new());
        assert_eq!(counted, CardCount { left: Some(1), played: false });
        assert!(counted.is_critical());
    }
}
