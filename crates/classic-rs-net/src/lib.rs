//! Classic protocol transport: connection state machine, opcode dispatch
//! and ping tracking.

pub mod connection;
pub mod constants;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod link;
pub mod multiplayer;
pub mod ping;
pub mod singleplayer;
pub mod socket;

pub use connection::ServerConnection;
pub use dispatch::{DispatchTable, Handler};
pub use error::NetError;
pub use events::{event_channel, ClientEvent, EventReceiver, EventSender};
pub use link::{ConnectionState, Link};
pub use multiplayer::{ConnectionConfig, Multiplayer};
pub use ping::PingList;
pub use singleplayer::Singleplayer;
pub use socket::{ConnectStatus, Connector, Socket, TcpConnector, TcpSocket};
