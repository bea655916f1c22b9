use crossbeam_channel::Sender;
use tarabish_lib::lobby::MainForm;

use crate::application::Action;

pub mod log_screen;
pub mod login_screen;
pub mod table_screen;
pub mod tables_screen;

/// A window drawn every frame from the form state. Input goes back as [`Action`]s.
pub trait Screen {
    fn draw(
        &mut self,
        ui: &imgui::Ui,
        size: winit::dpi::PhysicalSize<u32>,
        form: &MainForm,
        action_sender: &Sender<Action>,
    );
}
