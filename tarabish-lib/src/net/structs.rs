use serde::{Deserialize, Serialize};

pub const SEATS_PER_TABLE: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seat {
    pub is_open: bool,
    pub name: String,
}

impl Seat {
    pub fn open() -> Self {
        Self {
            is_open: true,
            name: String::new(),
        }
    }

    pub fn taken(name: &str) -> Self {
        Self {
            is_open: false,
            name: name.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableInfo {
    pub table_id: i32,
    pub seats: [Seat; SEATS_PER_TABLE],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableView {
    pub table_id: i32,
    pub seats: [Seat; SEATS_PER_TABLE],
}
