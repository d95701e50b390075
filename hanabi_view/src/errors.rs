use hanabi::CardFromStrErr;

/// Where in the snapshot a card code was found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardLocation {
    OwnHand(usize),
    PartnerHand(usize),
    Discards(usize),
    DeckComposition,
}

/// A piece of server data that could not be decoded.
///
/// Reported next to the projection; the affected card renders as
/// unreadable and everything else is projected normally.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodeError {
    Card {
        location: CardLocation,
        code: String,
        err: CardFromStrErr,
    },
    PaletteColor {
        name: String,
    },
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::Card { err, .. } => Some(err),
            DecodeError::PaletteColor { .. } => None,
        }
    }
}

impl std::fmt::Display for CardLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CardLocation::OwnHand(idx) => write!(f, "position {} of the own hand", idx),
            CardLocation::PartnerHand(idx) => write!(f, "position {} of the partner's hand", idx),
            CardLocation::Discards(idx) => write!(f, "position {} of the discard pile", idx),
            CardLocation::DeckComposition => write!(f, "the deck composition"),
        }
    }
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::Card { location, code, .. } => {
                write!(f, "Could not decode card '{}' at {}", code, location)
            }
            DecodeError::PaletteColor { name } => {
                write!(f, "Server announced unknown color '{}'", name)
            }
        }
    }
}
