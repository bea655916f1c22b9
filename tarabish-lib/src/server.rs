use std::fmt;

use crate::net::structs::{TableInfo, TableView};
use crate::Result;

/// Error raised by the lobby for a rejected request, e.g. sitting in a taken seat.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidOperation {
    pub message: String,
}

impl InvalidOperation {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for InvalidOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for InvalidOperation {}

/// The calls the lobby view makes against the game server.
///
/// Calls are synchronous. The `connected` / `disconnected` notifications are
/// not returned from `connect_to_server` / `disconnect_from_server`; they arrive
/// later as [`LobbyEvent`](crate::LobbyEvent)s.
pub trait Server {
    fn connect_to_server(&mut self, host: &str, name: &str) -> Result<()>;

    fn disconnect_from_server(&mut self) -> Result<()>;

    fn get_tables(&mut self) -> std::result::Result<Vec<TableInfo>, InvalidOperation>;

    fn sit(&mut self, table_id: i32, seat: u8) -> std::result::Result<TableView, InvalidOperation>;
}
