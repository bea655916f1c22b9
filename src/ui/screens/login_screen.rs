use crossbeam_channel::Sender;
use imgui::{im_str, Condition, ImString, Ui};
use tarabish_lib::lobby::MainForm;
use winit::dpi::PhysicalSize;

use crate::application::Action;
use crate::ui::screens::Screen;

pub struct LoginScreen {
    host: ImString,
    name: ImString,
}

impl LoginScreen {
    pub fn new() -> Self {
        Self {
            host: ImString::with_capacity(128),
            name: ImString::with_capacity(64),
        }
    }

    fn sync(&mut self, form: &MainForm) {
        if self.host.to_str() != form.login.host() {
            self.host.clear();
            self.host.push_str(form.login.host());
        }
        if self.name.to_str() != form.login.name() {
            self.name.clear();
            self.name.push_str(form.login.name());
        }
    }
}

impl Screen for LoginScreen {
    fn draw(
        &mut self,
        ui: &Ui,
        _size: PhysicalSize<u32>,
        form: &MainForm,
        action_sender: &Sender<Action>,
    ) {
        self.sync(form);
        let read_only = !form.login.inputs_enabled();
        let title = ImString::new(form.title());

        imgui::Window::new(&title)
            .size([300.0, 110.0], Condition::FirstUseEver)
            .position([5.0, 5.0], Condition::FirstUseEver)
            .collapsible(false)
            .build(ui, || {
                if ui
                    .input_text(im_str!("Host"), &mut self.host)
                    .read_only(read_only)
                    .build()
                {
                    let _ = action_sender.send(Action::SetHost(self.host.to_string()));
                }
                if ui
                    .input_text(im_str!("Name"), &mut self.name)
                    .read_only(read_only)
                    .build()
                {
                    let _ = action_sender.send(Action::SetName(self.name.to_string()));
                }
                ui.spacing();
                let label = ImString::new(form.login.button_label());
                if ui.button(&label, [90.0, 0.0]) {
                    let _ = action_sender.send(Action::PressConnect);
                }
            });
    }
}
