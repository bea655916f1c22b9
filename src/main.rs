use std::process;
use std::time::Duration;

use clap::Parser;
use futures::executor::block_on;
use log::error;
use tarabish_lib::net::packets;
use tarabish_lib::{ClientConfig, DEFAULT_PORT};

use crate::application::Application;

mod application;
mod renderer;
mod time;
mod ui;

#[derive(Parser, Debug)]
#[command(name = "tarabish", about = "Tarabish lobby client")]
pub struct Args {
    /// Host prefilled in the login frame
    #[arg(long, default_value = "localhost")]
    pub host: String,

    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Period of the table list refresh
    #[arg(long, value_name = "MS", default_value_t = 5000)]
    pub refresh_interval_ms: u64,

    /// How long a server call may block before failing
    #[arg(long, value_name = "MS", default_value_t = 5000)]
    pub rpc_timeout_ms: u64,

    /// 0 disables the frame limit
    #[arg(long, default_value_t = 60)]
    pub max_fps: u32,
}

impl Args {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            port: self.port,
            rpc_timeout: Duration::from_millis(self.rpc_timeout_ms),
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    packets::init();

    let app = match Application::new(&args) {
        Ok(app) => app,
        Err(err) => {
            error!("Could not start client: {}", err);
            process::exit(1);
        }
    };
    block_on(app.run());
}
