//! Realtime chat: socket transport, session state machine and message log.

pub mod domain;
pub mod log;
pub mod session;
pub mod transport;

pub use domain::ConnectionState;
pub use log::MessageLog;
pub use session::{ChatEvent, ChatSession};
pub use transport::{Connection, Connector, TransportEvent, WebSocketConnector};
