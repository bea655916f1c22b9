#[macro_use]
extern crate lazy_static;

use std::fmt;
use std::io;
use std::time::Duration;

pub const PROTOCOL_VERSION: u16 = 1;
pub const APP_VERSION: u16 = 1;
pub const DEFAULT_PORT: u16 = 42745;

pub mod client;
pub mod lobby;
pub mod net;
pub mod server;
pub mod utils;

pub use crate::client::LobbyClient;
pub use crate::server::{InvalidOperation, Server};

/// Events pushed by the server, drained once per frame by the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum LobbyEvent {
    Connected,
    Disconnected { message: String },
    PlayerSat { name: String, table_id: i32, seat: u8 },
    PlayerStood { table_id: i32, seat: u8, name: String },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EventType {
    Connected,
    Disconnected,
    Sit,
    Stand,
}

impl LobbyEvent {
    pub fn event_type(&self) -> EventType {
        match self {
            LobbyEvent::Connected => EventType::Connected,
            LobbyEvent::Disconnected { .. } => EventType::Disconnected,
            LobbyEvent::PlayerSat { .. } => EventType::Sit,
            LobbyEvent::PlayerStood { .. } => EventType::Stand,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub port: u16,
    pub rpc_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            rpc_timeout: Duration::from_secs(5),
        }
    }
}

pub type Result<T> = ::std::result::Result<T, Error>;

pub type Error = Box<ErrorKind>;

#[derive(Debug)]
pub enum ErrorKind {
    InvalidArg(String),
    InvalidOperation(String),
    NotConnected,
    AlreadyConnected,
    Timeout(&'static str),
    ConnectionClosed,
    Io(io::Error),
    Net(net::Error),
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::InvalidArg(message) => write!(f, "{}", message),
            ErrorKind::InvalidOperation(message) => write!(f, "{}", message),
            ErrorKind::NotConnected => write!(f, "Not connected"),
            ErrorKind::AlreadyConnected => write!(f, "Already connected"),
            ErrorKind::Timeout(what) => write!(f, "Timed out waiting for {}", what),
            ErrorKind::ConnectionClosed => write!(f, "Connection closed"),
            ErrorKind::Io(err) => write!(f, "{}", err),
            ErrorKind::Net(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ErrorKind {}

impl From<io::Error> for Box<ErrorKind> {
    fn from(err: io::Error) -> Self {
        Box::new(ErrorKind::Io(err))
    }
}

impl From<net::Error> for Box<ErrorKind> {
    fn from(err: net::Error) -> Self {
        Box::new(ErrorKind::Net(err))
    }
}
