use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver};
use log::{debug, error, info};
use tarabish_lib::lobby::{GridCell, MainForm, WINDOW_TITLE};
use tarabish_lib::{LobbyClient, LobbyEvent};
use winit::dpi::PhysicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

use crate::renderer::Renderer;
use crate::time::{FrameLimit, FrameLimitStrategy, Time};
use crate::ui::screens::log_screen::LogScreen;
use crate::ui::screens::login_screen::LoginScreen;
use crate::ui::screens::table_screen::TableScreen;
use crate::ui::screens::tables_screen::TablesScreen;
use crate::ui::Ui;
use crate::Args;

pub enum State {
    Boot,
    Initialize,
    Run,
    Shutdown,
    Exited,
}

/// Input gathered by the screens, applied to the form after the frame is drawn.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetHost(String),
    SetName(String),
    PressConnect,
    Refresh,
    Select { row: usize, column: usize },
    /// The clicked cell itself, not its grid position
    Sit(GridCell),
    CloseTable(usize),
    Exit,
}

pub struct Application {
    pub state: State,
    pub time: Time,
    pub frame_limit: FrameLimit,
    pub ui: Ui,
    pub client: LobbyClient,
    pub form: MainForm,
    lobby_events: Vec<LobbyEvent>,
    action_receiver: Receiver<Action>,
}

impl Application {
    pub fn new(args: &Args) -> tarabish_lib::Result<Self> {
        let (action_sender, action_receiver) = unbounded();
        Ok(Self {
            state: State::Boot,
            time: Time::new(),
            frame_limit: FrameLimit::new(
                FrameLimitStrategy::SleepAndYield(Duration::from_millis(2)),
                args.max_fps,
            ),
            ui: Ui::new(action_sender),
            client: LobbyClient::new(args.client_config())?,
            form: MainForm::new(&args.host, args.refresh_interval()),
            lobby_events: Vec::with_capacity(64),
            action_receiver,
        })
    }

    fn initialize(&mut self, window: &Window, renderer: &mut Renderer) {
        self.ui.init(window, renderer);
        self.ui.add_screen(Box::new(LoginScreen::new()));
        self.ui.add_screen(Box::new(TablesScreen::new()));
        self.ui.add_screen(Box::new(LogScreen::new()));
        self.ui.add_screen(Box::new(TableScreen::new()));
    }

    fn tick(&mut self, renderer: &mut Renderer, window: &Window) {
        self.handle_actions();
        self.render(renderer, window);

        let now = Instant::now();
        let timeout = if now > self.time.next_wanted_tick {
            crate::time::ZERO
        } else {
            self.time.next_wanted_tick - now
        };
        self.client.tick(timeout);
        self.handle_lobby_events();
        self.form.tick(Instant::now(), &mut self.client);

        self.frame_limit.run();

        self.time.tick(&self.frame_limit);
    }

    fn handle_actions(&mut self) {
        while let Ok(action) = self.action_receiver.try_recv() {
            debug!("Action: {:?}", action);
            match action {
                Action::SetHost(host) => self.form.login.set_host(&host),
                Action::SetName(name) => self.form.login.set_name(&name),
                Action::PressConnect => self.form.press_connect_button(&mut self.client),
                Action::Refresh => self.form.refresh(&mut self.client),
                Action::Select { row, column } => {
                    self.form.tables_table.grid_mut().select(row, column);
                }
                Action::Sit(cell) => self.form.handle_sit(&cell, &mut self.client),
                Action::CloseTable(index) => self.form.hide_table(index),
                Action::Exit => self.state = State::Shutdown,
            }
        }
    }

    fn handle_lobby_events(&mut self) {
        self.client.poll_events(&mut self.lobby_events);
        let now = Instant::now();
        for event in self.lobby_events.drain(..) {
            debug!("Lobby event {:?}", event.event_type());
            self.form.handle_event(&event, now, &mut self.client);
        }
    }

    fn handle_window_event(&mut self, event: &WindowEvent, renderer: &mut Renderer) {
        match event {
            WindowEvent::CloseRequested => self.state = State::Shutdown,
            WindowEvent::Resized(physical_size) => {
                renderer.resize(*physical_size);
            }
            WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                renderer.resize(**new_inner_size);
            }
            _ => {}
        }
    }

    fn render(&mut self, renderer: &mut Renderer, window: &Window) {
        renderer.render(&mut self.ui, &self.form, window, &self.time);
    }

    fn shutdown(&mut self) {
        if self.form.tables_table.is_updating() {
            self.form.stop_updating();
        }
        if self.client.is_connected() {
            self.form.press_connect_button(&mut self.client);
        }
        info!("Shutting down after {} frames", self.time.tick_count);
    }

    pub async fn run(mut self) {
        let event_loop = EventLoop::new();
        let window = match WindowBuilder::new()
            .with_inner_size(PhysicalSize::new(1024, 768))
            .with_min_inner_size(PhysicalSize::new(640, 480))
            .with_title(WINDOW_TITLE)
            .build(&event_loop)
        {
            Ok(window) => window,
            Err(err) => {
                error!("Could not create window: {}", err);
                return;
            }
        };

        let mut renderer = match Renderer::new(&window).await {
            Some(renderer) => renderer,
            None => {
                error!("No graphics adapter available");
                return;
            }
        };

        event_loop.run(move |event, _, control_flow| {
            *control_flow = ControlFlow::Poll;

            match self.state {
                State::Boot => {
                    self.state = State::Initialize;
                }
                State::Initialize => {
                    self.initialize(&window, &mut renderer);
                    self.state = State::Run;
                }
                State::Run => {
                    match event {
                        Event::MainEventsCleared => window.request_redraw(),
                        Event::WindowEvent {
                            ref event,
                            window_id,
                        } if window_id == window.id() => {
                            self.handle_window_event(event, &mut renderer);
                        }
                        Event::RedrawRequested(_) => {
                            self.tick(&mut renderer, &window);
                        }
                        _ => {}
                    }
                    self.ui.handle_event(&window, &event);
                }
                State::Shutdown => {
                    self.shutdown();
                    self.state = State::Exited;
                    *control_flow = ControlFlow::Exit;
                }
                State::Exited => {
                    *control_flow = ControlFlow::Exit;
                }
            }
        });
    }
}
