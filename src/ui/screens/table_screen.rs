use crossbeam_channel::Sender;
use imgui::{im_str, Condition, ImString, Ui};
use tarabish_lib::lobby::MainForm;
use winit::dpi::PhysicalSize;

use crate::application::Action;
use crate::ui::screens::Screen;

/// One window per joined table.
pub struct TableScreen;

impl TableScreen {
    pub fn new() -> Self {
        Self
    }
}

impl Screen for TableScreen {
    fn draw(
        &mut self,
        ui: &Ui,
        size: PhysicalSize<u32>,
        form: &MainForm,
        action_sender: &Sender<Action>,
    ) {
        for (index, table) in form.tables().iter().enumerate() {
            if !table.is_visible() {
                continue;
            }
            let title = ImString::new(format!("{}##table{}", table.title(), index));
            let mut opened = true;
            let offset = 20.0 * index as f32;
            imgui::Window::new(&title)
                .size([260.0, 150.0], Condition::FirstUseEver)
                .position(
                    [size.width as f32 / 2.0 - 130.0 + offset, 150.0 + offset],
                    Condition::FirstUseEver,
                )
                .opened(&mut opened)
                .build(ui, || {
                    for (seat, info) in table.view.seats.iter().enumerate() {
                        let occupant = if info.is_open { "(open)" } else { info.name.as_str() };
                        let marker = if seat == table.seat as usize { " <- you" } else { "" };
                        ui.text(format!("Seat {}: {}{}", seat + 1, occupant, marker));
                    }
                });
            if !opened {
                let _ = action_sender.send(Action::CloseTable(index));
            }
        }
    }
}
