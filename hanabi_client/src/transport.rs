use std::io::ErrorKind;
use std::net::TcpStream;
use std::time::Duration;

use tracing::{debug, trace};
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

use crate::TransportError;

/// What a single receive produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Incoming {
    Text(String),
    /// Nothing arrived before the timeout.
    Idle,
    /// The peer closed the connection cleanly.
    Closed,
}

/// A bidirectional text connection.
pub trait Transport {
    fn send_text(&mut self, text: &str) -> Result<(), TransportError>;
    /// Waits at most `timeout` for the next text frame.
    fn recv_text(&mut self, timeout: Duration) -> Result<Incoming, TransportError>;
    fn close(&mut self);
}

/// Opens [transports](Transport).
pub trait Connector {
    type Transport: Transport;

    fn open(&mut self, url: &str) -> Result<Self::Transport, TransportError>;
}

/// Connects over WebSocket.
#[derive(Clone, Copy, Debug, Default)]
pub struct WsConnector;

pub struct WsTransport {
    socket: WebSocket<MaybeTlsStream<TcpStream>>,
}

impl Connector for WsConnector {
    type Transport = WsTransport;

    fn open(&mut self, url: &str) -> Result<WsTransport, TransportError> {
        let (socket, response) = tungstenite::connect(url)?;
        debug!(status = %response.status(), "WebSocket handshake done");
        Ok(WsTransport { socket })
    }
}

impl WsTransport {
    fn set_read_timeout(&mut self, timeout: Duration) -> Result<(), TransportError> {
        // A zero timeout means "block forever" to the OS, so wait at least 1ms.
        let timeout = timeout.max(Duration::from_millis(1));
        if let MaybeTlsStream::Plain(stream) = self.socket.get_ref() {
            stream.set_read_timeout(Some(timeout))?;
        }
        Ok(())
    }
}

impl Transport for WsTransport {
    fn send_text(&mut self, text: &str) -> Result<(), TransportError> {
        trace!(text, "Sending");
        self.socket.send(Message::Text(String::from(text)))?;
        Ok(())
    }

    fn recv_text(&mut self, timeout: Duration) -> Result<Incoming, TransportError> {
        self.set_read_timeout(timeout)?;
        match self.socket.read() {
            Ok(Message::Text(text)) => Ok(Incoming::Text(text)),
            Ok(Message::Close(frame)) => {
                debug!(?frame, "Server sent close frame");
                Ok(Incoming::Closed)
            }
            // Pings are answered by tungstenite itself.
            Ok(_) => Ok(Incoming::Idle),
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                Ok(Incoming::Closed)
            }
            Err(tungstenite::Error::Io(err))
                if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
            {
                Ok(Incoming::Idle)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn close(&mut self) {
        if let Err(err) = self.socket.close(None) {
            debug!(%err, "Error while closing the socket");
        }
        // Flush the close frame; errors here only mean the peer is gone.
        let _ = self.socket.flush();
    }
}
