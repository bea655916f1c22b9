use crate::net::structs::{Seat, TableInfo, TableView};
use crate::server::{InvalidOperation, Server};
use crate::{ErrorKind, Result};

/// Scripted server recording every call the view makes.
pub struct MockServer {
    pub tables: std::result::Result<Vec<TableInfo>, InvalidOperation>,
    pub sit_result: std::result::Result<TableView, InvalidOperation>,
    pub connect_error: Option<String>,
    pub connect_calls: Vec<(String, String)>,
    pub disconnect_calls: usize,
    pub get_tables_calls: usize,
    pub sit_calls: Vec<(i32, u8)>,
}

impl MockServer {
    pub fn new() -> Self {
        Self {
            tables: Ok(Vec::new()),
            sit_result: Err(InvalidOperation::new("no script")),
            connect_error: None,
            connect_calls: Vec::new(),
            disconnect_calls: 0,
            get_tables_calls: 0,
            sit_calls: Vec::new(),
        }
    }

    pub fn with_tables(tables: Vec<TableInfo>) -> Self {
        Self {
            tables: Ok(tables),
            ..Self::new()
        }
    }
}

impl Server for MockServer {
    fn connect_to_server(&mut self, host: &str, name: &str) -> Result<()> {
        self.connect_calls.push((host.to_owned(), name.to_owned()));
        match &self.connect_error {
            Some(message) => Err(Box::new(ErrorKind::InvalidOperation(message.clone()))),
            None => Ok(()),
        }
    }

    fn disconnect_from_server(&mut self) -> Result<()> {
        self.disconnect_calls += 1;
        Ok(())
    }

    fn get_tables(&mut self) -> std::result::Result<Vec<TableInfo>, InvalidOperation> {
        self.get_tables_calls += 1;
        self.tables.clone()
    }

    fn sit(&mut self, table_id: i32, seat: u8) -> std::result::Result<TableView, InvalidOperation> {
        self.sit_calls.push((table_id, seat));
        self.sit_result.clone()
    }
}

/// Table 7 with seats `[open, "Alice", open, open]`.
pub fn table_seven() -> TableInfo {
    TableInfo {
        table_id: 7,
        seats: [Seat::open(), Seat::taken("Alice"), Seat::open(), Seat::open()],
    }
}
