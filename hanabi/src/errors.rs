/// The error type for [`ServerMessage::parse()`](crate::ServerMessage::parse).
#[derive(Debug)]
pub enum ProtocolError {
    Json(serde_json::Error),
    NotAnObject,
}

impl std::error::Error for ProtocolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProtocolError::Json(err) => Some(err),
            ProtocolError::NotAnObject => None,
        }
    }
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProtocolError::Json(_) => write!(f, "Server message is not valid JSON for its type"),
            ProtocolError::NotAnObject => write!(f, "Server message is not a JSON object"),
        }
    }
}

/// The error type for the [`FromStr`](std::str::FromStr) instance of
/// [`Command`](crate::Command).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandFromStrErr {
    Empty,
    UnknownVerb(String),
    MissingArgument(&'static str),
    InvalidArgument(&'static str),
    TrailingTokens,
}

impl std::error::Error for CommandFromStrErr {}

impl std::fmt::Display for CommandFromStrErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandFromStrErr::Empty => write!(f, "Empty command"),
            CommandFromStrErr::UnknownVerb(verb) => write!(f, "Unknown command '{}'", verb),
            CommandFromStrErr::MissingArgument(name) => write!(f, "Missing argument <{}>", name),
            CommandFromStrErr::InvalidArgument(name) => write!(f, "Invalid argument <{}>", name),
            CommandFromStrErr::TrailingTokens => write!(f, "Too many arguments"),
        }
    }
}
