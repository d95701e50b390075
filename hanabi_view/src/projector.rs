use hanabi::{Card, CardId, Color, HintVector, MoveEvent, MoveKind, Seat, Snapshot};
use tracing::warn;

use crate::card_counting::{self, CardCount, DeckComposition, Piles};
use crate::{CardLocation, ConnectionStatus, DecodeError, LogEntry, RawSessionState};

pub const MAX_HINTS: u8 = 8;
pub const MAX_MISTAKES: u8 = 3;

/// A card face as far as the client could decode it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CardFace {
    Known(Card),
    /// The server sent a code that is not a card. Holds the raw code.
    Unreadable(String),
}

impl CardFace {
    pub fn card(&self) -> Option<Card> {
        match self {
            CardFace::Known(card) => Some(*card),
            CardFace::Unreadable(_) => None,
        }
    }
}

impl std::fmt::Display for CardFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CardFace::Known(card) => write!(f, "{}", card),
            CardFace::Unreadable(_) => write!(f, "??"),
        }
    }
}

/// A card in the local player's hand. Its face stays hidden until the game
/// is over.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnCard {
    pub id: Option<CardId>,
    pub hints: HintVector,
    pub note: Option<String>,
    /// Only set once the game is over.
    pub revealed: Option<CardFace>,
    /// Touched by the hint we just received.
    pub hinted: bool,
}

/// A card in the partner's hand, face visible.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartnerCard {
    pub id: Option<CardId>,
    pub face: CardFace,
    pub hints: HintVector,
}

/// What the UI shows. Fully determined by the [`RawSessionState`] it was
/// projected from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewState {
    pub connection: ConnectionStatus,
    pub game_id: u64,
    pub is_player_turn: bool,
    pub game_over: bool,
    pub self_seat: Option<Seat>,
    pub partner_seat: Option<Seat>,
    /// Server palette order; `None` for slots holding an unknown color.
    pub palette: Vec<Option<Color>>,
    pub own_hand: Vec<OwnCard>,
    pub partner_hand: Vec<PartnerCard>,
    pub discards: Vec<CardFace>,
    pub piles: Piles,
    pub hints_remaining: u8,
    pub mistakes_remaining: u8,
    pub deck_remaining: u32,
    pub score: u32,
    pub deck_composition: DeckComposition,
    /// One line per message received this game.
    pub log: Vec<String>,
    /// The server's own description of every move so far.
    pub move_history: Vec<String>,
    pub last_move: Option<MoveEvent>,
    pub bot_name: Option<String>,
    pub seed: Option<u64>,
    pub flash_message: Option<String>,
}

impl ViewState {
    pub fn card_count(&self, card: Card) -> CardCount {
        card_counting::count(card, &self.deck_composition, &self.piles)
    }

    /// The hint the partner just gave us, phrased for the player, e.g.
    /// `These 2 cards are red`. Only while it is our turn.
    pub fn hint_message(&self) -> Option<String> {
        if !self.is_player_turn {
            return None;
        }
        let event = self.last_move.as_ref()?;
        if !event.kind.is_hint() || event.seat != self.self_seat || event.indices.is_empty() {
            return None;
        }
        let count = event.indices.len();
        let subject = if count == 1 {
            String::from("This card is")
        } else {
            format!("These {} cards are", count)
        };
        let value = event.value?;
        match event.kind {
            MoveKind::HintColor => {
                let color = palette_color(&self.palette, value)?;
                Some(format!("{} {}", subject, color))
            }
            MoveKind::HintValue if count == 1 => Some(format!("{} a {}", subject, value)),
            MoveKind::HintValue => Some(format!("{} {}s", subject, value)),
            _ => None,
        }
    }
}

/// The result of a projection: the view, plus everything that could not be
/// decoded on the way.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Projection {
    pub view: ViewState,
    pub errors: Vec<DecodeError>,
}

/// Derives the view from the raw session state.
///
/// Before the session is live, this is the default view carrying only the
/// connection status and game id.
pub fn project(raw: &RawSessionState) -> Projection {
    let mut projection = Projection {
        view: ViewState {
            connection: raw.connection.clone(),
            game_id: raw.game_id,
            ..ViewState::default()
        },
        errors: Vec::new(),
    };
    if !raw.is_live() {
        return projection;
    }
    let Some(snapshot) = raw.snapshot.as_ref() else {
        return projection;
    };

    let mut errors = raw
        .unknown_colors
        .iter()
        .map(|name| DecodeError::PaletteColor { name: name.clone() })
        .collect::<Vec<_>>();
    let palette = if raw.palette.is_empty() {
        Color::ALL.map(Some).to_vec()
    } else {
        raw.palette.clone()
    };

    let view = &mut projection.view;
    view.is_player_turn = snapshot.is_player_turn && !raw.turn_handed_over;
    view.game_over = snapshot.game_over;
    view.self_seat = snapshot.player_id;
    view.partner_seat = snapshot.partner_id;

    let last_move = raw.history.iter().rev().find_map(|entry| match entry {
        LogEntry::Move { event, .. } => Some(event.clone()),
        _ => None,
    });
    view.own_hand = own_hand(snapshot, raw, &palette, last_move.as_ref(), &mut errors);
    view.partner_hand = partner_hand(snapshot, &palette, &mut errors);
    view.discards = snapshot
        .discards
        .iter()
        .enumerate()
        .map(|(idx, code)| decode_face(code, CardLocation::Discards(idx), &mut errors))
        .collect();

    for (idx, &height) in snapshot.piles.iter().enumerate() {
        if let Some(&Some(color)) = palette.get(idx) {
            view.piles.set(color, height);
        }
    }
    view.hints_remaining = snapshot.hint_stones_remaining.min(MAX_HINTS);
    view.mistakes_remaining = snapshot.mulligans_remaining.min(MAX_MISTAKES);
    view.deck_remaining = snapshot.cards_remaining_in_deck;
    view.score = snapshot.current_score;
    let (composition, composition_errors) = DeckComposition::decode(&snapshot.deck_composition);
    view.deck_composition = composition;
    errors.extend(composition_errors);

    view.log = raw
        .history
        .iter()
        .map(|entry| describe(entry, snapshot.player_id, &palette))
        .collect();
    view.move_history = snapshot.move_history.clone();
    view.last_move = last_move;
    view.bot_name = snapshot.bot_name.clone();
    view.seed = snapshot.seed;
    view.flash_message = Some(snapshot.flash_message.clone()).filter(|m| !m.is_empty());
    view.palette = palette;

    for err in &errors {
        warn!("{}", err);
    }
    projection.errors = errors;
    projection
}

fn own_hand(
    snapshot: &Snapshot,
    raw: &RawSessionState,
    palette: &[Option<Color>],
    last_move: Option<&MoveEvent>,
    errors: &mut Vec<DecodeError>,
) -> Vec<OwnCard> {
    let len = snapshot.cards_ids.len().max(snapshot.cheat_my_cards.len());
    let hinted_indices: &[usize] = match last_move {
        Some(event) if event.kind.is_hint() && event.seat == snapshot.player_id => &event.indices,
        _ => &[],
    };
    (0..len)
        .map(|idx| {
            let id = snapshot.cards_ids.get(idx).copied();
            let revealed = if snapshot.game_over {
                snapshot
                    .cheat_my_cards
                    .get(idx)
                    .map(|code| decode_face(code, CardLocation::OwnHand(idx), errors))
            } else {
                None
            };
            OwnCard {
                id,
                hints: hint_vector(snapshot, snapshot.player_id, idx, palette),
                note: id.and_then(|id| raw.notes.get(id)).map(String::from),
                revealed,
                hinted: hinted_indices.contains(&idx),
            }
        })
        .collect()
}

fn partner_hand(
    snapshot: &Snapshot,
    palette: &[Option<Color>],
    errors: &mut Vec<DecodeError>,
) -> Vec<PartnerCard> {
    snapshot
        .cards
        .iter()
        .enumerate()
        .map(|(idx, code)| PartnerCard {
            id: snapshot.partner_cards_ids.get(idx).copied(),
            face: decode_face(code, CardLocation::PartnerHand(idx), errors),
            hints: hint_vector(snapshot, snapshot.partner_id, idx, palette),
        })
        .collect()
}

fn hint_vector(
    snapshot: &Snapshot,
    seat: Option<Seat>,
    idx: usize,
    palette: &[Option<Color>],
) -> HintVector {
    seat.and_then(|seat| snapshot.prediction(seat, idx))
        .map(|cells| HintVector::from_palette_order(&cells, palette))
        .unwrap_or_else(HintVector::all_unknown)
}

fn decode_face(code: &str, location: CardLocation, errors: &mut Vec<DecodeError>) -> CardFace {
    match code.parse::<Card>() {
        Ok(card) => CardFace::Known(card),
        Err(err) => {
            errors.push(DecodeError::Card {
                location,
                code: String::from(code),
                err,
            });
            CardFace::Unreadable(String::from(code))
        }
    }
}

fn palette_color(palette: &[Option<Color>], value: i64) -> Option<Color> {
    usize::try_from(value).ok().and_then(|idx| palette.get(idx).copied().flatten())
}

fn position_name(idx: i64) -> String {
    match idx {
        0 => String::from("earliest"),
        1 => String::from("2nd earliest"),
        2 => String::from("middle"),
        3 => String::from("2nd most recent"),
        4 => String::from("most recent"),
        _ => format!("#{}", idx),
    }
}

/// One plain-text log line for a log entry.
pub fn describe(entry: &LogEntry, self_seat: Option<Seat>, palette: &[Option<Color>]) -> String {
    let (event, server_line) = match entry {
        LogEntry::NewGame { game_id } => return format!("Game {} started", game_id),
        LogEntry::Update { server_line } => {
            return server_line
                .clone()
                .unwrap_or_else(|| String::from("The board was updated"))
        }
        LogEntry::Move { event, server_line } => (event, server_line),
    };
    let is_self = |seat: Option<Seat>| seat.is_some() && seat == self_seat;
    match event.kind {
        MoveKind::HintColor | MoveKind::HintValue => {
            let what = match event.kind {
                MoveKind::HintColor => event
                    .value
                    .and_then(|v| palette_color(palette, v))
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| String::from("a color")),
                _ => event
                    .value
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| String::from("a value")),
            };
            match event.seat {
                Some(_) if is_self(event.seat) => format!("Partner hinted {} to you", what),
                Some(_) => format!("You hinted {} to partner", what),
                None => format!("A hint of {} was given", what),
            }
        }
        MoveKind::PlayCard | MoveKind::DiscardCard => {
            let verb = if event.kind == MoveKind::PlayCard {
                "played"
            } else {
                "discarded"
            };
            let position = event
                .value
                .map(position_name)
                .unwrap_or_else(|| String::from("a"));
            match event.seat {
                Some(_) if is_self(event.seat) => format!("You {} your {} card", verb, position),
                Some(_) => format!("Partner {} their {} card", verb, position),
                None => match server_line {
                    Some(line) => line.clone(),
                    None => format!("A player {} their {} card", verb, position),
                },
            }
        }
        MoveKind::InvalidMove => server_line
            .clone()
            .unwrap_or_else(|| String::from("The board was updated")),
    }
}
