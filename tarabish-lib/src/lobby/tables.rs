use std::time::{Duration, Instant};

use crate::lobby::log_panel::LogPanel;
use crate::net::structs::{TableInfo, SEATS_PER_TABLE};
use crate::server::Server;
use crate::utils::timers::{TimerHandle, TimerManager};

pub const COLUMN_COUNT: usize = SEATS_PER_TABLE + 1;
pub const HEADER_LABELS: [&str; COLUMN_COUNT] = ["Table", "Seat 1", "Seat 2", "Seat 3", "Seat 4"];
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(5000);

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SelectionMode {
    Single,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SelectionBehavior {
    Items,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GridSettings {
    pub selection_mode: SelectionMode,
    pub selection_behavior: SelectionBehavior,
    pub editable: bool,
    pub alternating_row_colors: bool,
    pub row_headers_visible: bool,
}

impl GridSettings {
    pub const LOBBY: GridSettings = GridSettings {
        selection_mode: SelectionMode::Single,
        selection_behavior: SelectionBehavior::Items,
        editable: false,
        alternating_row_colors: true,
        row_headers_visible: false,
    };
}

/// An open seat, the target of a join.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSeatCell {
    pub text: String,
    pub table_id: i32,
    pub seat: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GridCell {
    /// Column 0, centered and read only
    TableId(String),
    /// Taken seat showing its occupant, disabled
    Occupied(String),
    Open(TableSeatCell),
}

impl GridCell {
    pub fn text(&self) -> &str {
        match self {
            GridCell::TableId(text) | GridCell::Occupied(text) => text,
            GridCell::Open(cell) => &cell.text,
        }
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self, GridCell::Open(_))
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, GridCell::Occupied(_))
    }

    pub fn is_centered(&self) -> bool {
        matches!(self, GridCell::TableId(_))
    }

    pub fn seat_cell(&self) -> Option<&TableSeatCell> {
        match self {
            GridCell::Open(cell) => Some(cell),
            _ => None,
        }
    }
}

pub type GridRow = [GridCell; COLUMN_COUNT];

pub struct TablesGrid {
    rows: Vec<GridRow>,
    settings: GridSettings,
    selected: Option<(usize, usize)>,
}

impl TablesGrid {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            settings: GridSettings::LOBBY,
            selected: None,
        }
    }

    /// Clear and rebuild every row from a fresh table list.
    pub fn rebuild(&mut self, tables: &[TableInfo]) {
        self.rows.clear();
        self.selected = None;
        self.settings = GridSettings::LOBBY;
        self.rows.extend(tables.iter().map(build_row));
    }

    pub fn rows(&self) -> &[GridRow] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        COLUMN_COUNT
    }

    pub fn header_labels(&self) -> &'static [&'static str] {
        &HEADER_LABELS
    }

    pub fn settings(&self) -> GridSettings {
        self.settings
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&GridCell> {
        self.rows.get(row)?.get(column)
    }

    pub fn selected(&self) -> Option<(usize, usize)> {
        self.selected
    }

    /// Single item selection; disabled cells can't be selected.
    pub fn select(&mut self, row: usize, column: usize) -> bool {
        match self.cell(row, column) {
            Some(cell) if cell.is_enabled() => {
                self.selected = Some((row, column));
                true
            }
            _ => false,
        }
    }
}

fn build_row(table: &TableInfo) -> GridRow {
    let seat_cell = |seat: usize| {
        let info = &table.seats[seat];
        if info.is_open {
            GridCell::Open(TableSeatCell {
                text: String::new(),
                table_id: table.table_id,
                seat: seat as u8,
            })
        } else {
            GridCell::Occupied(info.name.clone())
        }
    };
    [
        GridCell::TableId(table.table_id.to_string()),
        seat_cell(0),
        seat_cell(1),
        seat_cell(2),
        seat_cell(3),
    ]
}

/// The table list, refreshed by timer, refresh button, connect and seat events.
///
/// Every trigger runs the same full [`updating`](Self::updating) call. Bursts
/// are not coalesced.
pub struct TablesTable {
    grid: TablesGrid,
    timers: TimerManager,
    refresh_timer: Option<TimerHandle>,
    refresh_interval: Duration,
}

impl TablesTable {
    pub fn new(refresh_interval: Duration) -> Self {
        Self {
            grid: TablesGrid::new(),
            timers: TimerManager::new(),
            refresh_timer: None,
            refresh_interval,
        }
    }

    pub fn grid(&self) -> &TablesGrid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut TablesGrid {
        &mut self.grid
    }

    pub fn is_updating(&self) -> bool {
        self.refresh_timer.is_some()
    }

    pub fn start_updating(&mut self, now: Instant, server: &mut dyn Server, log: &mut LogPanel) {
        log.append("Start Updating");
        if let Some(handle) = self.refresh_timer.take() {
            self.timers.remove(handle);
        }
        self.refresh_timer = Some(self.timers.schedule(now, self.refresh_interval));
        self.updating(server, log);
    }

    pub fn stop_updating(&mut self, log: &mut LogPanel) {
        log.append("Stop Updating");
        if let Some(handle) = self.refresh_timer.take() {
            self.timers.remove(handle);
        }
    }

    /// Drive the refresh timer. Runs at most one refresh per call.
    pub fn tick(&mut self, now: Instant, server: &mut dyn Server, log: &mut LogPanel) {
        let fired = self.timers.tick(now);
        if let Some(handle) = self.refresh_timer {
            if fired.contains(&handle) {
                self.updating(server, log);
            }
        }
    }

    pub fn updating(&mut self, server: &mut dyn Server, log: &mut LogPanel) {
        log.append("Updating Tables");
        match server.get_tables() {
            Ok(tables) => self.grid.rebuild(&tables),
            Err(err) => log.append_failure(err),
        }
    }

    pub fn handle_player_sat_down(
        &mut self,
        name: &str,
        table: i32,
        seat: u8,
        server: &mut dyn Server,
        log: &mut LogPanel,
    ) {
        log.append(format!(
            "LOBBY: User {} takes seat #{} at table #{}",
            name, seat, table
        ));
        self.updating(server, log);
    }

    pub fn handle_player_stands(
        &mut self,
        table: i32,
        seat: u8,
        name: &str,
        server: &mut dyn Server,
        log: &mut LogPanel,
    ) {
        log.append(format!(
            "LOBBY: User {} stands from seat #{} at table #{}",
            name, seat, table
        ));
        self.updating(server, log);
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use crate::lobby::log_panel::LogPanel;
    use crate::lobby::mock::{table_seven, MockServer};
    use crate::lobby::tables::{GridCell, GridSettings, TableSeatCell, TablesTable, COLUMN_COUNT};
    use crate::net::structs::{Seat, TableInfo};
    use crate::server::InvalidOperation;

    fn table_with(table_id: i32, taken: &[usize]) -> TableInfo {
        let seat = |i: usize| {
            if taken.contains(&i) {
                Seat::taken(&format!("player{}", i))
            } else {
                Seat::open()
            }
        };
        TableInfo {
            table_id,
            seats: [seat(0), seat(1), seat(2), seat(3)],
        }
    }

    #[test]
    fn grid_matches_table_list() {
        let tables = vec![table_with(1, &[]), table_with(2, &[0, 3]), table_with(15, &[0, 1, 2, 3])];
        let mut server = MockServer::with_tables(tables.clone());
        let mut log = LogPanel::new();
        let mut table = TablesTable::new(Duration::from_millis(5000));

        table.updating(&mut server, &mut log);

        let grid = table.grid();
        assert_eq!(grid.row_count(), tables.len());
        assert_eq!(grid.column_count(), COLUMN_COUNT);
        assert_eq!(grid.settings(), GridSettings::LOBBY);
        for (row, info) in grid.rows().iter().zip(&tables) {
            assert_eq!(row[0], GridCell::TableId(info.table_id.to_string()));
            for (seat, cell) in row[1..].iter().enumerate() {
                if info.seats[seat].is_open {
                    assert!(cell.is_interactive());
                    assert_eq!(cell.text(), "");
                    let target = cell.seat_cell().unwrap();
                    assert_eq!((target.table_id, target.seat as usize), (info.table_id, seat));
                } else {
                    assert!(!cell.is_interactive());
                    assert!(!cell.is_enabled());
                    assert_eq!(cell.text(), info.seats[seat].name);
                }
            }
        }
        assert_eq!(log.texts(), vec!["Updating Tables"]);
    }

    #[test]
    fn table_seven_row() {
        let mut server = MockServer::with_tables(vec![table_seven()]);
        let mut log = LogPanel::new();
        let mut table = TablesTable::new(Duration::from_millis(5000));

        table.updating(&mut server, &mut log);

        let open = |seat| {
            GridCell::Open(TableSeatCell {
                text: String::new(),
                table_id: 7,
                seat,
            })
        };
        assert_eq!(
            table.grid().rows(),
            &[[
                GridCell::TableId("7".to_owned()),
                open(0),
                GridCell::Occupied("Alice".to_owned()),
                open(2),
                open(3),
            ]]
        );
        assert!(table.grid().cell(0, 0).unwrap().is_centered());
    }

    #[test]
    fn failed_refresh_keeps_grid() {
        let mut server = MockServer::with_tables(vec![table_seven()]);
        let mut log = LogPanel::new();
        let mut table = TablesTable::new(Duration::from_millis(5000));
        table.updating(&mut server, &mut log);

        server.tables = Err(InvalidOperation::new("server busy"));
        let lines_before = log.len();
        table.updating(&mut server, &mut log);

        assert_eq!(table.grid().row_count(), 1);
        assert_eq!(table.grid().cell(0, 2).unwrap().text(), "Alice");
        assert_eq!(&log.texts()[lines_before..], &["Updating Tables", "Failed: server busy"]);
        assert_eq!(log.texts().iter().filter(|l| l.starts_with("Failed")).count(), 1);
    }

    #[test]
    fn timer_refreshes_after_interval() {
        let mut server = MockServer::with_tables(vec![table_seven()]);
        let mut log = LogPanel::new();
        let mut table = TablesTable::new(Duration::from_millis(5000));
        let start = Instant::now();

        table.start_updating(start, &mut server, &mut log);
        assert_eq!(server.get_tables_calls, 1);
        assert!(table.is_updating());

        table.tick(start + Duration::from_millis(4999), &mut server, &mut log);
        assert_eq!(server.get_tables_calls, 1);

        table.tick(start + Duration::from_millis(5000), &mut server, &mut log);
        assert_eq!(server.get_tables_calls, 2);

        table.tick(start + Duration::from_millis(10_001), &mut server, &mut log);
        assert_eq!(server.get_tables_calls, 3);

        table.stop_updating(&mut log);
        assert!(!table.is_updating());
        table.tick(start + Duration::from_millis(60_000), &mut server, &mut log);
        assert_eq!(server.get_tables_calls, 3);
        assert_eq!(log.texts()[0], "Start Updating");
        assert_eq!(log.last().unwrap().text, "Stop Updating");
    }

    #[test]
    fn restarting_rearms_timer() {
        let mut server = MockServer::new();
        let mut log = LogPanel::new();
        let mut table = TablesTable::new(Duration::from_millis(5000));
        let start = Instant::now();

        table.start_updating(start, &mut server, &mut log);
        table.start_updating(start + Duration::from_millis(3000), &mut server, &mut log);
        assert_eq!(server.get_tables_calls, 2);

        table.tick(start + Duration::from_millis(5000), &mut server, &mut log);
        assert_eq!(server.get_tables_calls, 2);
        table.tick(start + Duration::from_millis(8000), &mut server, &mut log);
        assert_eq!(server.get_tables_calls, 3);
    }

    #[test]
    fn seat_events_log_and_refresh() {
        let mut server = MockServer::with_tables(vec![table_seven()]);
        let mut log = LogPanel::new();
        let mut table = TablesTable::new(Duration::from_millis(5000));

        table.handle_player_sat_down("Bob", 7, 2, &mut server, &mut log);
        table.handle_player_stands(7, 2, "Bob", &mut server, &mut log);

        assert_eq!(server.get_tables_calls, 2);
        assert_eq!(
            log.texts(),
            vec![
                "LOBBY: User Bob takes seat #2 at table #7",
                "Updating Tables",
                "LOBBY: User Bob stands from seat #2 at table #7",
                "Updating Tables",
            ]
        );
    }

    #[test]
    fn selection_skips_taken_seats() {
        let mut server = MockServer::with_tables(vec![table_seven()]);
        let mut log = LogPanel::new();
        let mut table = TablesTable::new(Duration::from_millis(5000));
        table.updating(&mut server, &mut log);

        assert!(!table.grid_mut().select(0, 2));
        assert!(table.grid_mut().select(0, 1));
        assert_eq!(table.grid().selected(), Some((0, 1)));
        assert!(!table.grid_mut().select(3, 1));

        table.updating(&mut server, &mut log);
        assert_eq!(table.grid().selected(), None);
    }
}
