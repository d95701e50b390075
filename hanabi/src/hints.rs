use serde::{Deserialize, Serialize};

use crate::{Card, Color};

/// What the holder of a card knows about one color/rank combination.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Possibility {
    Possible,
    Eliminated,
    Unknown,
}

impl Possibility {
    /// Interprets one cell of a server hint vector.
    ///
    /// `0` or `false` eliminates the combination, `null` leaves it unknown,
    /// anything else keeps it possible.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Possibility::Unknown,
            serde_json::Value::Bool(false) => Possibility::Eliminated,
            serde_json::Value::Number(n) if n.as_f64() == Some(0.0) => Possibility::Eliminated,
            _ => Possibility::Possible,
        }
    }
}

/// Per-card elimination mask over the 25 color × rank combinations.
///
/// Cells are stored in canonical color order (see [`Color::ALL`]),
/// independent of the order the server uses on the wire.
///
/// ```
/// use hanabi::{card, HintVector, Possibility};
/// let hints = HintVector::all_possible().eliminate(card!("1w"));
/// assert_eq!(hints.possibility(card!("1w")), Possibility::Eliminated);
/// assert_eq!(hints.candidates().count(), 24);
/// ```
///
/// Like `CardsSet`, this is a small `Copy` value and its "mutating"
/// methods return a new vector.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct HintVector {
    // Only the low 25 bits are used.
    eliminated: u32,
    unknown: u32,
}

const VALID_BITS: u32 = (1 << 25) - 1;

impl HintVector {
    /// Nothing known yet: every combination is still possible.
    pub fn all_possible() -> Self {
        Self {
            eliminated: 0,
            unknown: 0,
        }
    }

    /// No information at all, e.g. before the server sent a vector.
    pub fn all_unknown() -> Self {
        Self {
            eliminated: 0,
            unknown: VALID_BITS,
        }
    }

    /// Builds a vector from cells laid out in the server's palette order,
    /// i.e. cell `palette_idx * 5 + rank - 1`.
    ///
    /// Palette slots that are not a known color (`None`) are skipped, as are
    /// missing cells; they stay unknown.
    pub fn from_palette_order(cells: &[Possibility], palette: &[Option<Color>]) -> Self {
        let mut vector = Self::all_unknown();
        for (palette_idx, slot) in palette.iter().enumerate().take(5) {
            let Some(color) = *slot else {
                continue;
            };
            for rank_offset in 0..5 {
                let Some(&cell) = cells.get(palette_idx * 5 + rank_offset) else {
                    continue;
                };
                let bit = 1u32 << (color.index() * 5 + rank_offset);
                vector.unknown &= !bit;
                match cell {
                    Possibility::Possible => vector.eliminated &= !bit,
                    Possibility::Eliminated => vector.eliminated |= bit,
                    Possibility::Unknown => vector.unknown |= bit,
                }
            }
        }
        vector
    }

    pub fn possibility(self, card: Card) -> Possibility {
        let bit = 1u32 << card.to_index();
        if self.unknown & bit != 0 {
            Possibility::Unknown
        } else if self.eliminated & bit != 0 {
            Possibility::Eliminated
        } else {
            Possibility::Possible
        }
    }

    pub fn is_eliminated(self, card: Card) -> bool {
        self.possibility(card) == Possibility::Eliminated
    }

    #[must_use]
    pub fn eliminate(self, card: Card) -> Self {
        let bit = 1u32 << card.to_index();
        Self {
            eliminated: self.eliminated | bit,
            unknown: self.unknown & !bit,
        }
    }

    /// Cards that have not been ruled out, unknown cells included.
    pub fn candidates(self) -> impl Iterator<Item = Card> {
        Card::all().filter(move |&card| !self.is_eliminated(card))
    }

    /// The card, if exactly one combination remains and nothing is unknown.
    pub fn identified(self) -> Option<Card> {
        if self.unknown != 0 {
            return None;
        }
        let possible = !self.eliminated & VALID_BITS;
        if possible.count_ones() == 1 {
            Card::from_index(possible.trailing_zeros() as usize)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use quickcheck::quickcheck;

    use super::*;
    use crate::{card, Rank};

    quickcheck! {
        fn canonical_palette_keeps_cells_in_place(card: Card) -> bool {
            let mut cells = vec![Possibility::Possible; 25];
            cells[card.to_index()] = Possibility::Eliminated;
            let vector = HintVector::from_palette_order(&cells, &Color::ALL.map(Some));
            vector.candidates().count() == 24 && vector.is_eliminated(card)
        }
    }

    #[test]
    fn reorders_through_palette() {
        // The server lists green first.
        let palette = [Color::Green, Color::White, Color::Red, Color::Blue, Color::Yellow].map(Some);
        let mut cells = vec![Possibility::Possible; 25];
        cells[2] = Possibility::Eliminated; // green 3
        cells[5] = Possibility::Unknown; // white 1
        let vector = HintVector::from_palette_order(&cells, &palette);
        assert!(vector.is_eliminated(card!("3g")));
        assert_eq!(vector.possibility(card!("1w")), Possibility::Unknown);
        assert_eq!(vector.possibility(card!("3w")), Possibility::Possible);
    }

    #[test]
    fn short_vectors_stay_unknown() {
        let vector =
            HintVector::from_palette_order(&[Possibility::Eliminated], &Color::ALL.map(Some));
        assert!(vector.is_eliminated(card!("1w")));
        assert_eq!(vector.possibility(card!("2w")), Possibility::Unknown);
    }

    #[test]
    fn unknown_palette_slot_keeps_its_place() {
        // RED, ORANGE, YELLOW, GREEN, BLUE with ORANGE not a known color.
        let palette = [
            Some(Color::Red),
            None,
            Some(Color::Yellow),
            Some(Color::Green),
            Some(Color::Blue),
        ];
        let mut cells = vec![Possibility::Possible; 25];
        cells[5] = Possibility::Eliminated; // orange 1
        cells[10] = Possibility::Eliminated; // yellow 1
        let vector = HintVector::from_palette_order(&cells, &palette);
        assert!(vector.is_eliminated(card!("1y")));
        assert!(!vector.is_eliminated(card!("1g")));
        assert_eq!(vector.possibility(card!("1r")), Possibility::Possible);
        // White is not on this server's table at all.
        assert_eq!(vector.possibility(card!("1w")), Possibility::Unknown);
    }

    #[test]
    fn identifies_single_candidate() {
        let only = Card::new(Color::Blue, Rank::Four);
        let vector = Card::all()
            .filter(|&c| c != only)
            .fold(HintVector::all_possible(), HintVector::eliminate);
        assert_eq!(vector.identified(), Some(only));
        assert_eq!(HintVector::all_possible().identified(), None);
        assert_eq!(HintVector::all_unknown().identified(), None);
    }

    #[test]
    fn json_cells() {
        use serde_json::json;
        assert_eq!(Possibility::from_json(&json!(0)), Possibility::Eliminated);
        assert_eq!(Possibility::from_json(&json!(0.0)), Possibility::Eliminated);
        assert_eq!(Possibility::from_json(&json!(false)), Possibility::Eliminated);
        assert_eq!(Possibility::from_json(&json!(null)), Possibility::Unknown);
        assert_eq!(Possibility::from_json(&json!(1)), Possibility::Possible);
        assert_eq!(Possibility::from_json(&json!(0.25)), Possibility::Possible);
    }
}
