use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{CardId, Color, CommandFromStrErr, Possibility, ProtocolError, Seat};

/// A message pushed by the game server.
///
/// The server tags only the INIT message; everything else is an update.
#[derive(Clone, Debug, PartialEq)]
pub enum ServerMessage {
    /// A new game started. Resets the session.
    Init(InitMessage),
    /// The complete current state, plus the move that led to it.
    Update(Box<UpdateMessage>),
}

impl ServerMessage {
    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        let value: serde_json::Value = serde_json::from_str(raw).map_err(ProtocolError::Json)?;
        if !value.is_object() {
            return Err(ProtocolError::NotAnObject);
        }
        match value.get("type").and_then(serde_json::Value::as_str) {
            Some("INIT") => Ok(ServerMessage::Init(
                serde_json::from_value(value).map_err(ProtocolError::Json)?,
            )),
            _ => Ok(ServerMessage::Update(Box::new(
                serde_json::from_value(value).map_err(ProtocolError::Json)?,
            ))),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InitMessage {
    /// Color names in the order the server uses for piles and hint vectors.
    pub colors: Vec<String>,
    /// The seat the bot plays in.
    pub player_number: Option<Seat>,
}

impl InitMessage {
    /// The announced palette in server order, one slot per announced name.
    ///
    /// Names that are not a known color keep their slot as `None`, so the
    /// positions still line up with piles and hint vectors. They are also
    /// returned separately for reporting.
    pub fn palette(&self) -> (Vec<Option<Color>>, Vec<String>) {
        let palette = self.colors.iter().map(|name| Color::from_name(name)).collect();
        let unknown = self
            .colors
            .iter()
            .filter(|name| Color::from_name(name).is_none())
            .cloned()
            .collect();
        (palette, unknown)
    }
}

/// Everything the server reports about the table at one point in time.
///
/// Card codes are kept as strings here; decoding them is the projector's job,
/// so a single bad code cannot reject a whole message.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    pub cards_remaining_in_deck: u32,
    pub current_score: u32,
    pub hint_stones_remaining: u8,
    pub mulligans_remaining: u8,
    pub player_id: Option<Seat>,
    pub partner_id: Option<Seat>,
    /// The partner's hand.
    pub cards: Vec<String>,
    /// Our own hand. Only shown to the player once the game is over.
    pub cheat_my_cards: Vec<String>,
    pub cards_ids: Vec<CardId>,
    pub partner_cards_ids: Vec<CardId>,
    /// Pile heights, in palette order.
    pub piles: Vec<u8>,
    pub discards: Vec<String>,
    /// Hint vectors, indexed by seat and then by hand position.
    pub predictions: Vec<Vec<Vec<serde_json::Value>>>,
    pub deck_composition: BTreeMap<String, u32>,
    pub is_player_turn: bool,
    pub game_over: bool,
    pub bot_name: Option<String>,
    pub move_history: Vec<String>,
    pub seed: Option<u64>,
    #[serde(rename = "flash_message")]
    pub flash_message: String,
}

impl Snapshot {
    /// The hint vector cells for the card at `idx` in `seat`'s hand.
    pub fn prediction(&self, seat: Seat, idx: usize) -> Option<Vec<Possibility>> {
        let cells = self.predictions.get(seat.0 as usize)?.get(idx)?;
        Some(cells.iter().map(Possibility::from_json).collect())
    }
}

/// An update message as sent by the server.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateMessage {
    #[serde(flatten)]
    pub snapshot: Snapshot,
    pub hint_player: Option<i64>,
    pub hint_value: Option<i64>,
    pub hint_type: Option<String>,
    pub hint_idx: Vec<usize>,
}

impl UpdateMessage {
    /// Splits the message into the state it carries and the move that led to
    /// it. A message without move metadata yields no event.
    pub fn into_parts(self) -> (Snapshot, Option<MoveEvent>) {
        let event = self.hint_type.as_deref().map(|kind| MoveEvent {
            kind: MoveKind::from_wire(kind),
            seat: self
                .hint_player
                .and_then(|seat| u8::try_from(seat).ok())
                .map(Seat),
            value: self.hint_value,
            indices: self.hint_idx,
        });
        (self.snapshot, event)
    }
}

/// The kind of the most recent move.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MoveKind {
    HintColor,
    HintValue,
    PlayCard,
    DiscardCard,
    InvalidMove,
}

impl MoveKind {
    pub fn from_wire(name: &str) -> Self {
        match name {
            "HINT_COLOR" => MoveKind::HintColor,
            "HINT_VALUE" => MoveKind::HintValue,
            "PLAY_CARD" => MoveKind::PlayCard,
            "DISCARD_CARD" => MoveKind::DiscardCard,
            _ => MoveKind::InvalidMove,
        }
    }

    pub fn is_hint(self) -> bool {
        matches!(self, MoveKind::HintColor | MoveKind::HintValue)
    }
}

/// The move metadata attached to an update.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveEvent {
    pub kind: MoveKind,
    /// For hints the seat that received the hint, otherwise the seat that
    /// moved.
    pub seat: Option<Seat>,
    /// Palette index for color hints, rank for value hints, hand position
    /// for plays and discards.
    pub value: Option<i64>,
    /// Hand positions touched by a hint.
    pub indices: Vec<usize>,
}

/// A player intent, sent to the server as one line of text.
///
/// ```
/// use hanabi::{Command, Seat};
/// let cmd = Command::Replay { seed: None, bot_name: String::from("Bot A") };
/// assert_eq!(cmd.to_string(), "REPLAY - Bot-A");
/// assert_eq!(Command::HintValue { value: 3, seat: Seat(1) }.to_string(), "HINT_VALUE 3 1");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Place { index: usize },
    Discard { index: usize },
    /// `value` is the color's position in the server palette.
    HintColor { value: u8, seat: Seat },
    /// `value` is the rank being hinted.
    HintValue { value: u8, seat: Seat },
    Replay { seed: Option<u64>, bot_name: String },
}

impl Command {
    /// A color hint, translated to the palette index the server expects.
    pub fn hint_color(color: Color, palette: &[Option<Color>], seat: Seat) -> Option<Self> {
        let value = palette.iter().position(|&slot| slot == Some(color))?;
        Some(Command::HintColor {
            value: value as u8,
            seat,
        })
    }

    /// Whether sending this command ends our turn.
    pub fn hands_over_turn(&self) -> bool {
        !matches!(self, Command::Replay { .. })
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Place { index } => write!(f, "PLACE {}", index),
            Command::Discard { index } => write!(f, "DISCARD {}", index),
            Command::HintColor { value, seat } => write!(f, "HINT_COLOR {} {}", value, seat),
            Command::HintValue { value, seat } => write!(f, "HINT_VALUE {} {}", value, seat),
            Command::Replay { seed, bot_name } => {
                let bot_name = bot_name.trim().replace(' ', "-");
                match seed {
                    Some(seed) => write!(f, "REPLAY {} {}", seed, bot_name),
                    None => write!(f, "REPLAY - {}", bot_name),
                }
            }
        }
    }
}

impl FromStr for Command {
    type Err = CommandFromStrErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = s.split_whitespace();
        let verb = tokens.next().ok_or(CommandFromStrErr::Empty)?;
        let mut number = |name: &'static str| -> Result<u64, CommandFromStrErr> {
            tokens
                .next()
                .ok_or(CommandFromStrErr::MissingArgument(name))?
                .parse::<u64>()
                .map_err(|_| CommandFromStrErr::InvalidArgument(name))
        };
        let command = match verb.to_ascii_uppercase().as_str() {
            "PLACE" => Command::Place {
                index: number("index")? as usize,
            },
            "DISCARD" => Command::Discard {
                index: number("index")? as usize,
            },
            "HINT_COLOR" => Command::HintColor {
                value: small(number("value")?, "value")?,
                seat: Seat(small(number("seat")?, "seat")?),
            },
            "HINT_VALUE" => Command::HintValue {
                value: small(number("value")?, "value")?,
                seat: Seat(small(number("seat")?, "seat")?),
            },
            "REPLAY" => {
                let seed = match tokens.next() {
                    None | Some("-") => None,
                    Some(seed) => Some(
                        seed.parse()
                            .map_err(|_| CommandFromStrErr::InvalidArgument("seed"))?,
                    ),
                };
                let bot_name = tokens.collect::<Vec<_>>().join(" ");
                return Ok(Command::Replay { seed, bot_name });
            }
            _ => return Err(CommandFromStrErr::UnknownVerb(verb.to_string())),
        };
        if tokens.next().is_some() {
            return Err(CommandFromStrErr::TrailingTokens);
        }
        Ok(command)
    }
}

fn small(value: u64, name: &'static str) -> Result<u8, CommandFromStrErr> {
    u8::try_from(value).map_err(|_| CommandFromStrErr::InvalidArgument(name))
}
