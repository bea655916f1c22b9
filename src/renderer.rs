use log::warn;
use tarabish_lib::lobby::MainForm;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::time::Time;
use crate::ui::Ui;

pub struct Renderer {
    surface: wgpu::Surface,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub sc_desc: wgpu::SwapChainDescriptor,
    swap_chain: wgpu::SwapChain,
}

impl Renderer {
    pub async fn new(window: &Window) -> Option<Self> {
        let size = window.inner_size();
        let surface = wgpu::Surface::create(window);

        let adapter = wgpu::Adapter::request(
            &wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::Default,
                compatible_surface: Some(&surface),
            },
            wgpu::BackendBit::PRIMARY,
        )
        .await?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                extensions: wgpu::Extensions {
                    anisotropic_filtering: false,
                },
                limits: wgpu::Limits::default(),
            })
            .await;

        let sc_desc = wgpu::SwapChainDescriptor {
            usage: wgpu::TextureUsage::OUTPUT_ATTACHMENT,
            format: wgpu::TextureFormat::Bgra8UnormSrgb,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::Fifo,
        };
        let swap_chain = device.create_swap_chain(&surface, &sc_desc);

        Some(Self {
            surface,
            device,
            queue,
            sc_desc,
            swap_chain,
        })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        // Minimized
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.sc_desc.width = new_size.width;
        self.sc_desc.height = new_size.height;
        self.swap_chain = self.device.create_swap_chain(&self.surface, &self.sc_desc);
    }

    pub fn render(&mut self, ui: &mut Ui, form: &MainForm, window: &Window, time: &Time) {
        let frame = match self.swap_chain.get_next_texture() {
            Ok(frame) => frame,
            Err(_) => {
                warn!("Timed out acquiring the next frame");
                return;
            }
        };
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("ui"),
            });

        ui.draw(form, &self.device, &mut encoder, &frame, window, time);

        self.queue.submit(&[encoder.finish()]);
    }
}
