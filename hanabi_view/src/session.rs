use hanabi::{CardId, Color, InitMessage, MoveEvent, Seat, Snapshot};
use tracing::{debug, warn};

use crate::NoteStore;

/// Why the connection to the server is gone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DisconnectReason {
    /// The connection could not be opened.
    OpenFailed,
    /// The connection broke while the game was running.
    SessionError(String),
    /// The server closed the connection.
    Closed,
}

impl DisconnectReason {
    /// The message shown to the player.
    pub fn banner(&self) -> String {
        match self {
            DisconnectReason::OpenFailed => String::from(
                "Could not connect to the server. Perhaps there are no games running...",
            ),
            DisconnectReason::SessionError(detail) => {
                format!("The connection to the server was lost ({}).", detail)
            }
            DisconnectReason::Closed => String::from("The game has ended."),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Never connected.
    #[default]
    Idle,
    Connecting,
    Connected,
    Lost(DisconnectReason),
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected)
    }

    /// The persistent error banner, if any.
    pub fn banner(&self) -> Option<String> {
        match self {
            ConnectionStatus::Lost(reason) => Some(reason.banner()),
            _ => None,
        }
    }
}

/// One line of the client-side log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogEntry {
    NewGame {
        game_id: u64,
    },
    /// A move reported with an update. `server_line` is the newest entry of
    /// the server's own move history at that time.
    Move {
        event: MoveEvent,
        server_line: Option<String>,
    },
    /// An update without move metadata.
    Update {
        server_line: Option<String>,
    },
}

impl LogEntry {
    /// The log fragment carried by an update message.
    pub fn for_update(snapshot: &Snapshot, event: Option<MoveEvent>) -> Self {
        let server_line = snapshot.move_history.last().cloned();
        match event {
            Some(event) => LogEntry::Move { event, server_line },
            None => LogEntry::Update { server_line },
        }
    }
}

/// Something that changes the session state.
#[derive(Clone, Debug)]
pub enum Action {
    Connecting,
    Connected,
    Init(InitMessage),
    Snapshot(Box<Snapshot>),
    AppendLog(LogEntry),
    Disconnected(DisconnectReason),
    /// We sent a move and wait for the server to answer.
    ActionSent,
    UpdateNote { card_id: CardId, text: String },
    PlayAgain,
}

/// Everything the server has pushed so far, in wire shape.
///
/// Only changed through [`RawSessionState::reduce`]. Views read the
/// [projection](crate::project) instead.
#[derive(Clone, Debug, Default)]
pub struct RawSessionState {
    pub connection: ConnectionStatus,
    /// Incremented by exactly one for every INIT.
    pub game_id: u64,
    /// Colors in the order the server uses, `None` where the server named a
    /// color we do not know. Empty before the first INIT.
    pub palette: Vec<Option<Color>>,
    /// Palette entries that are not known colors.
    pub unknown_colors: Vec<String>,
    pub bot_seat: Option<Seat>,
    /// The latest snapshot. Replaced wholesale by every update.
    pub snapshot: Option<Snapshot>,
    /// Set between sending a move and the next snapshot.
    pub turn_handed_over: bool,
    pub history: Vec<LogEntry>,
    pub notes: NoteStore,
}

impl RawSessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reduce(&mut self, action: Action) {
        match action {
            Action::Connecting => {
                self.connection = ConnectionStatus::Connecting;
            }
            Action::Connected => {
                self.connection = ConnectionStatus::Connected;
            }
            Action::Init(init) => {
                let (palette, unknown_colors) = init.palette();
                for name in &unknown_colors {
                    warn!(color = %name, "Server announced an unknown color");
                }
                self.game_id += 1;
                self.palette = palette;
                self.unknown_colors = unknown_colors;
                self.bot_seat = init.player_number;
                self.snapshot = None;
                self.turn_handed_over = false;
                self.history.clear();
                self.notes.clear();
                self.history.push(LogEntry::NewGame {
                    game_id: self.game_id,
                });
                debug!(game_id = self.game_id, "New game");
            }
            Action::Snapshot(snapshot) => {
                self.snapshot = Some(*snapshot);
                self.turn_handed_over = false;
                if !self.connection.is_connected() {
                    self.connection = ConnectionStatus::Connected;
                }
            }
            Action::AppendLog(entry) => {
                self.history.push(entry);
            }
            Action::Disconnected(reason) => {
                debug!(?reason, "Disconnected");
                self.connection = ConnectionStatus::Lost(reason);
                self.turn_handed_over = false;
            }
            Action::ActionSent => {
                self.turn_handed_over = true;
            }
            Action::UpdateNote { card_id, text } => {
                self.notes.set(card_id, text);
            }
            Action::PlayAgain => {
                // The server answers with an INIT, which resets the rest.
                self.snapshot = None;
                self.turn_handed_over = false;
            }
        }
    }

    /// Connected and at least one snapshot received.
    pub fn is_live(&self) -> bool {
        self.connection.is_connected() && self.snapshot.is_some()
    }
}
