use crate::lobby::log_panel::LogPanel;
use crate::server::Server;

pub const CONNECT_LABEL: &str = "Connect";
pub const DISCONNECT_LABEL: &str = "Disconnect";

/// Host/name inputs and the connect toggle.
///
/// `connected` only ever flips in [`handle_connected`](Self::handle_connected)
/// and [`handle_disconnected`](Self::handle_disconnected), which run when the
/// server confirms the change, never from the button itself.
pub struct LoginFrame {
    host: String,
    name: String,
    connected: bool,
    button_label: &'static str,
    inputs_enabled: bool,
}

impl LoginFrame {
    pub fn new(default_host: &str) -> Self {
        Self {
            host: default_host.to_owned(),
            name: String::new(),
            connected: false,
            button_label: CONNECT_LABEL,
            inputs_enabled: true,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn button_label(&self) -> &'static str {
        self.button_label
    }

    pub fn inputs_enabled(&self) -> bool {
        self.inputs_enabled
    }

    pub fn set_host(&mut self, host: &str) {
        if self.inputs_enabled {
            self.host = host.to_owned();
        }
    }

    pub fn set_name(&mut self, name: &str) {
        if self.inputs_enabled {
            self.name = name.to_owned();
        }
    }

    pub fn press_connect_button(&mut self, server: &mut dyn Server, log: &mut LogPanel) {
        // Any error, not only rejected operations, ends up in the log
        let result = if self.connected {
            server.disconnect_from_server()
        } else {
            server.connect_to_server(&self.host, &self.name)
        };
        if let Err(err) = result {
            log.append_failure(err);
        }
    }

    pub fn handle_connected(&mut self, log: &mut LogPanel) {
        log.append_bold("Connected");
        self.connected = true;
        self.button_label = DISCONNECT_LABEL;
        self.inputs_enabled = false;
    }

    pub fn handle_disconnected(&mut self, log: &mut LogPanel) {
        log.append_bold("Disconnected");
        self.connected = false;
        self.button_label = CONNECT_LABEL;
        self.inputs_enabled = true;
        self.name.clear();
    }
}
