use std::time::{Duration, Instant};

use crate::lobby::log_panel::LogPanel;
use crate::lobby::login::LoginFrame;
use crate::lobby::tables::{GridCell, TablesTable};
use crate::net::structs::TableView;
use crate::server::Server;
use crate::LobbyEvent;

pub const WINDOW_TITLE: &str = "Tarabish";

/// A table joined from the lobby.
pub struct TableWindow {
    pub table_id: i32,
    pub seat: u8,
    pub view: TableView,
    visible: bool,
}

impl TableWindow {
    pub fn new(table_id: i32, seat: u8, view: TableView) -> Self {
        Self {
            table_id,
            seat,
            view,
            visible: false,
        }
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn title(&self) -> String {
        format!("Table {} (seat {})", self.table_id, self.seat)
    }
}

/// The lobby window: login frame, table list and log.
pub struct MainForm {
    pub login: LoginFrame,
    pub tables_table: TablesTable,
    pub log: LogPanel,
    tables: Vec<TableWindow>,
}

impl MainForm {
    pub fn new(default_host: &str, refresh_interval: Duration) -> Self {
        Self {
            login: LoginFrame::new(default_host),
            tables_table: TablesTable::new(refresh_interval),
            log: LogPanel::new(),
            tables: Vec::new(),
        }
    }

    pub fn title(&self) -> &'static str {
        WINDOW_TITLE
    }

    /// Table windows opened so far, closed ones included.
    pub fn tables(&self) -> &[TableWindow] {
        &self.tables
    }

    pub fn hide_table(&mut self, index: usize) {
        if let Some(table) = self.tables.get_mut(index) {
            table.hide();
        }
    }

    pub fn press_connect_button(&mut self, server: &mut dyn Server) {
        self.login.press_connect_button(server, &mut self.log);
    }

    pub fn refresh(&mut self, server: &mut dyn Server) {
        self.tables_table.updating(server, &mut self.log);
    }

    pub fn stop_updating(&mut self) {
        self.tables_table.stop_updating(&mut self.log);
    }

    pub fn tick(&mut self, now: Instant, server: &mut dyn Server) {
        self.tables_table.tick(now, server, &mut self.log);
    }

    /// The table list only polls while a session is up; `start_updating`
    /// refreshes once right away.
    pub fn handle_event(&mut self, event: &LobbyEvent, now: Instant, server: &mut dyn Server) {
        match event {
            LobbyEvent::Connected => {
                self.login.handle_connected(&mut self.log);
                self.tables_table.start_updating(now, server, &mut self.log);
            }
            LobbyEvent::Disconnected { .. } => {
                self.login.handle_disconnected(&mut self.log);
                if self.tables_table.is_updating() {
                    self.tables_table.stop_updating(&mut self.log);
                }
            }
            LobbyEvent::PlayerSat {
                name,
                table_id,
                seat,
            } => {
                self.tables_table
                    .handle_player_sat_down(name, *table_id, *seat, server, &mut self.log);
            }
            LobbyEvent::PlayerStood {
                table_id,
                seat,
                name,
            } => {
                self.tables_table
                    .handle_player_stands(*table_id, *seat, name, server, &mut self.log);
            }
        }
    }

    /// Double click on a grid cell. The cell carries its own table and seat,
    /// so a grid rebuilt since the click does not change the target.
    pub fn handle_sit(&mut self, cell: &GridCell, server: &mut dyn Server) {
        // Table id column and taken seats
        let (table_id, seat) = match cell.seat_cell() {
            Some(cell) => (cell.table_id, cell.seat),
            None => return,
        };

        self.log
            .append(format!("Joining table {}, seat {}", table_id, seat));

        match server.sit(table_id, seat) {
            Ok(view) => {
                let mut table = TableWindow::new(table_id, seat, view);
                table.show();
                self.tables.push(table);
                self.tables_table.updating(server, &mut self.log);
            }
            Err(err) => self.log.append_failure(err),
        }
    }
}
