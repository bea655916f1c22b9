use crossbeam_channel::Sender;
use imgui::{im_str, ChildWindow, Condition, Ui};
use tarabish_lib::lobby::MainForm;
use winit::dpi::PhysicalSize;

use crate::application::Action;
use crate::ui::screens::Screen;

const BOLD_COLOR: [f32; 4] = [1.0, 0.85, 0.3, 1.0];

pub struct LogScreen {
    line_count: usize,
}

impl LogScreen {
    pub fn new() -> Self {
        Self { line_count: 0 }
    }
}

impl Screen for LogScreen {
    fn draw(
        &mut self,
        ui: &Ui,
        size: PhysicalSize<u32>,
        form: &MainForm,
        _action_sender: &Sender<Action>,
    ) {
        let height = size.height as f32;
        imgui::Window::new(im_str!("Log"))
            .size(
                [size.width as f32 - 10.0, height / 2.0 - 130.0],
                Condition::FirstUseEver,
            )
            .position([5.0, height / 2.0 + 125.0], Condition::FirstUseEver)
            .build(ui, || {
                ChildWindow::new(im_str!("log_lines")).build(ui, || {
                    for line in form.log.lines() {
                        if line.bold {
                            ui.text_colored(BOLD_COLOR, &line.text);
                        } else {
                            ui.text(&line.text);
                        }
                    }
                    // Follow new lines
                    if form.log.len() != self.line_count {
                        self.line_count = form.log.len();
                        ui.set_scroll_here_y();
                    }
                });
            });
    }
}
