use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A Hanabi card, identified by its face only.
///
/// Two cards with the same face are indistinguishable; the server gives
/// every physical card a [`CardId`] for that.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Card {
    pub color: Color,
    pub rank: Rank,
}

/// The color of a [card](Card).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Color {
    #[serde(rename = "W")]
    White,
    #[serde(rename = "R")]
    Red,
    #[serde(rename = "B")]
    Blue,
    #[serde(rename = "Y")]
    Yellow,
    #[serde(rename = "G")]
    Green,
}

/// The rank of a [card](Card).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Rank {
    #[serde(rename = "1")]
    One = 1,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
}

/// Server-assigned identity of a physical card.
///
/// Stays the same while the card moves around in a hand.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub u32);

/// A player position at the table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seat(pub u8);

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl std::fmt::Display for Seat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Color {
    /// All colors in canonical order.
    pub const ALL: [Color; 5] = [
        Color::White,
        Color::Red,
        Color::Blue,
        Color::Yellow,
        Color::Green,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn letter(self) -> char {
        match self {
            Color::White => 'W',
            Color::Red => 'R',
            Color::Blue => 'B',
            Color::Yellow => 'Y',
            Color::Green => 'G',
        }
    }

    pub fn from_letter(letter: char) -> Option<Color> {
        match letter.to_ascii_uppercase() {
            'W' => Some(Color::White),
            'R' => Some(Color::Red),
            'B' => Some(Color::Blue),
            'Y' => Some(Color::Yellow),
            'G' => Some(Color::Green),
            _ => None,
        }
    }

    /// Looks up a color by its full name as the server announces it
    /// (`"RED"`, `"green"`, ...). Only the first letter is significant.
    pub fn from_name(name: &str) -> Option<Color> {
        name.chars().next().and_then(Color::from_letter)
    }

    pub fn name(self) -> &'static str {
        match self {
            Color::White => "white",
            Color::Red => "red",
            Color::Blue => "blue",
            Color::Yellow => "yellow",
            Color::Green => "green",
        }
    }
}

impl Rank {
    pub const ALL: [Rank; 5] = [Rank::One, Rank::Two, Rank::Three, Rank::Four, Rank::Five];

    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn from_value(value: u8) -> Option<Rank> {
        match value {
            1 => Some(Rank::One),
            2 => Some(Rank::Two),
            3 => Some(Rank::Three),
            4 => Some(Rank::Four),
            5 => Some(Rank::Five),
            _ => None,
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Renders the card as its color letter followed by its rank, e.g. `G5`.
impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.color.letter(), self.rank.value())
    }
}

impl Card {
    pub fn new(color: Color, rank: Rank) -> Self {
        Self { color, rank }
    }

    /// The two-character code used on the wire: rank digit, then lower-case
    /// color letter (`"5g"`).
    pub fn code(&self) -> String {
        let mut code = String::with_capacity(2);
        code.push(char::from(b'0' + self.rank.value()));
        code.push(self.color.letter().to_ascii_lowercase());
        code
    }

    /// Position of this card in a 25-cell color-major table.
    pub fn to_index(&self) -> usize {
        self.color.index() * 5 + (self.rank.value() as usize - 1)
    }

    pub fn from_index(idx: usize) -> Option<Card> {
        if idx >= 25 {
            return None;
        }
        Some(Card {
            color: Color::ALL[idx / 5],
            rank: Rank::ALL[idx % 5],
        })
    }

    /// Every distinct card face, color-major.
    pub fn all() -> impl Iterator<Item = Card> {
        (0..25).filter_map(Card::from_index)
    }
}

/// The error type for the [`FromStr`] instance of [`Card`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardFromStrErr {
    LessThanTwoChars,
    MoreThanTwoChars,
    InvalidRank,
    InvalidColor,
}

impl std::error::Error for CardFromStrErr {}

impl std::fmt::Display for CardFromStrErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CardFromStrErr::LessThanTwoChars => write!(f, "Card code is shorter than two characters"),
            CardFromStrErr::MoreThanTwoChars => write!(f, "Card code is longer than two characters"),
            CardFromStrErr::InvalidRank => write!(f, "Card code does not start with a rank from 1 to 5"),
            CardFromStrErr::InvalidColor => write!(f, "Card code does not end with a known color letter"),
        }
    }
}

impl FromStr for Card {
    type Err = CardFromStrErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let rank_char = chars.next().ok_or(CardFromStrErr::LessThanTwoChars)?;
        let color_char = chars.next().ok_or(CardFromStrErr::LessThanTwoChars)?;
        if chars.next().is_some() {
            return Err(CardFromStrErr::MoreThanTwoChars);
        }
        let rank = rank_char
            .to_digit(10)
            .and_then(|digit| Rank::from_value(digit as u8))
            .ok_or(CardFromStrErr::InvalidRank)?;
        let color = Color::from_letter(color_char).ok_or(CardFromStrErr::InvalidColor)?;
        Ok(Card { color, rank })
    }
}

/// Shorthand for creating cards from a two-character wire code.
///
/// The first character is the [rank](Rank), the second the [color](Color)
/// letter. This macro is just calling the [`FromStr`] instance of [`Card`].
/// ```
/// # use hanabi::{card, Card, Color, Rank};
/// assert_eq!(
///     card!("5g"),
///     Card { color: Color::Green, rank: Rank::Five }
/// );
/// ```
#[macro_export]
macro_rules! card {
    ($rs:literal) => {
        <$crate::Card as std::str::FromStr>::from_str($rs)
            .expect("Invalid card code given to card! macro")
    };
}
// The import is for using the macro in other modules, see https://stackoverflow.com/a/31749071/1726797
#[allow(unused_imports)]
pub(crate) use card;
