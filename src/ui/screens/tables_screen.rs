use crossbeam_channel::Sender;
use imgui::{im_str, Condition, ImString, MouseButton, Selectable, SelectableFlags, Ui};
use tarabish_lib::lobby::{GridCell, MainForm};
use winit::dpi::PhysicalSize;

use crate::application::Action;
use crate::ui::screens::Screen;

const OCCUPIED_COLOR: [f32; 4] = [0.7, 0.7, 0.7, 1.0];

pub struct TablesScreen;

impl TablesScreen {
    pub fn new() -> Self {
        Self
    }
}

impl Screen for TablesScreen {
    fn draw(
        &mut self,
        ui: &Ui,
        size: PhysicalSize<u32>,
        form: &MainForm,
        action_sender: &Sender<Action>,
    ) {
        let grid = form.tables_table.grid();
        imgui::Window::new(im_str!("Tables"))
            .size(
                [size.width as f32 - 10.0, size.height as f32 / 2.0],
                Condition::FirstUseEver,
            )
            .position([5.0, 120.0], Condition::FirstUseEver)
            .build(ui, || {
                if ui.button(im_str!("Refresh"), [0.0, 0.0]) {
                    let _ = action_sender.send(Action::Refresh);
                }
                ui.separator();

                ui.columns(grid.column_count() as i32, im_str!("tables"), true);
                for label in grid.header_labels() {
                    ui.text(label);
                    ui.next_column();
                }
                ui.separator();

                for (row, cells) in grid.rows().iter().enumerate() {
                    for (column, cell) in cells.iter().enumerate() {
                        match cell {
                            GridCell::TableId(text) => draw_centered(ui, text),
                            GridCell::Occupied(name) => ui.text_colored(OCCUPIED_COLOR, name),
                            GridCell::Open(seat) => {
                                let label =
                                    ImString::new(format!("{}##{}_{}", seat.text, row, column));
                                let clicked = Selectable::new(&label)
                                    .selected(grid.selected() == Some((row, column)))
                                    .flags(SelectableFlags::ALLOW_DOUBLE_CLICK)
                                    .build(ui);
                                if clicked {
                                    if ui.is_mouse_double_clicked(MouseButton::Left) {
                                        let _ = action_sender.send(Action::Sit(cell.clone()));
                                    } else {
                                        let _ = action_sender.send(Action::Select { row, column });
                                    }
                                }
                            }
                        }
                        ui.next_column();
                    }
                }
                ui.columns(1, im_str!("tables_end"), false);
            });
    }
}

fn draw_centered(ui: &Ui, text: &str) {
    let label = ImString::new(text);
    let text_width = ui.calc_text_size(&label, false, -1.0)[0];
    let [x, y] = ui.cursor_pos();
    let offset = (ui.current_column_width() - text_width) / 2.0;
    if offset > 0.0 {
        ui.set_cursor_pos([x + offset, y]);
    }
    ui.text(&label);
}
