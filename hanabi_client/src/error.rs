use hanabi_view::DisconnectReason;

/// A failure of the underlying socket.
#[derive(Debug)]
pub enum TransportError {
    Io(std::io::Error),
    WebSocket(tungstenite::Error),
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::Io(err) => Some(err),
            TransportError::WebSocket(err) => Some(err),
        }
    }
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Io(err) => write!(f, "{}", err),
            TransportError::WebSocket(err) => write!(f, "{}", err),
        }
    }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        TransportError::Io(err)
    }
}

impl From<tungstenite::Error> for TransportError {
    fn from(err: tungstenite::Error) -> Self {
        TransportError::WebSocket(err)
    }
}

/// Why the session with the server ended. None of these is retried
/// automatically.
#[derive(Debug)]
pub enum ConnectionError {
    /// The connection could not be opened.
    OpenFailed(TransportError),
    /// The connection broke during the session.
    Session(TransportError),
    /// The server closed the connection.
    Closed,
}

impl ConnectionError {
    pub fn reason(&self) -> DisconnectReason {
        match self {
            ConnectionError::OpenFailed(_) => DisconnectReason::OpenFailed,
            ConnectionError::Session(err) => DisconnectReason::SessionError(err.to_string()),
            ConnectionError::Closed => DisconnectReason::Closed,
        }
    }
}

impl std::error::Error for ConnectionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConnectionError::OpenFailed(err) | ConnectionError::Session(err) => Some(err),
            ConnectionError::Closed => None,
        }
    }
}

impl std::fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason().banner())
    }
}

/// The error type for [`ConnectionManager::send_intent()`](crate::ConnectionManager::send_intent).
#[derive(Debug)]
pub enum SendError {
    /// There is no open connection; nothing was sent.
    NotConnected,
    /// Sending failed and the session ended.
    Connection(ConnectionError),
}

impl std::error::Error for SendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SendError::NotConnected => None,
            SendError::Connection(err) => Some(err),
        }
    }
}

impl std::fmt::Display for SendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SendError::NotConnected => write!(f, "Not connected to a server"),
            SendError::Connection(err) => write!(f, "Could not send the command: {}", err),
        }
    }
}
