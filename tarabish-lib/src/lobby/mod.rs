//! View state of the lobby window.
//!
//! Nothing here draws. Each component owns the state its widgets show and
//! exposes the handlers widgets and server events trigger; the binary renders
//! that state and routes input back into these handlers.

pub mod log_panel;
pub mod login;
pub mod main_form;
pub mod tables;

#[cfg(test)]
pub(crate) mod mock;

pub use self::log_panel::{LogLine, LogPanel};
pub use self::login::LoginFrame;
pub use self::main_form::{MainForm, TableWindow, WINDOW_TITLE};
pub use self::tables::{GridCell, GridSettings, TableSeatCell, TablesGrid, TablesTable};
