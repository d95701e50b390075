mod config;
mod connection;
mod error;
mod recording;
pub mod throttle;
pub mod transport;
pub use config::*;
pub use connection::*;
pub use error::*;
pub use recording::*;
pub use transport::{Connector, Incoming, Transport, WsConnector, WsTransport};
