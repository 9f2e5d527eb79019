use std::sync::Arc;

use anyhow::Result;
use pixels::{Pixels, SurfaceTexture};
use rand::rngs::ThreadRng;
use tracing::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Fullscreen, Window, WindowId},
};
use wtp_core::Rgba;
use wtp_experiment::{Session, TaskConfig};
use wtp_render::SkiaSurface;
use wtp_timing::MonotonicClock;

use crate::pointer::WinitPointer;

const BACKGROUND: Rgba = [64, 64, 64, 255];

pub struct App {
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    surface: Option<SkiaSurface>,
    pointer: Option<WinitPointer>,
    session: Session<MonotonicClock, ThreadRng>,
    font_bytes: Vec<u8>,
    output_path: String,
    screen_extent: f64,
    log_written: bool,
    should_exit: bool,
}

impl App {
    pub fn new(config: TaskConfig, font_bytes: Vec<u8>, output_path: String) -> Result<Self> {
        let screen_extent = config.interface.screen_extent;
        let session = Session::new(config, MonotonicClock::new(), rand::rng())?;

        Ok(Self {
            window: None,
            pixels: None,
            surface: None,
            pointer: None,
            session,
            font_bytes,
            output_path,
            screen_extent,
            log_written: false,
            should_exit: false,
        })
    }

    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        info!("starting task, press ESC to abort");
        event_loop.run_app(&mut self)?;
        Ok(())
    }

    /// Pixels per slider unit for the current window height. The
    /// vertical screen extent always spans the same number of units,
    /// so layout is resolution independent.
    fn px_per_unit(&self, height: u32) -> f64 {
        height as f64 / (2.0 * self.screen_extent)
    }

    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let primary_monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next())
            .ok_or_else(|| anyhow::anyhow!("no monitor available"))?;

        let window_attributes = Window::default_attributes()
            .with_title("Willingness to pay")
            .with_fullscreen(Some(Fullscreen::Borderless(Some(primary_monitor))))
            .with_resizable(false);

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        let physical_size = window.inner_size();
        info!(
            width = physical_size.width,
            height = physical_size.height,
            "window created"
        );

        let surface_texture =
            SurfaceTexture::new(physical_size.width, physical_size.height, window.clone());
        self.pixels = Some(Pixels::new(
            physical_size.width,
            physical_size.height,
            surface_texture,
        )?);

        let ppu = self.px_per_unit(physical_size.height);
        self.surface = Some(SkiaSurface::new(
            physical_size.width,
            physical_size.height,
            ppu as f32,
            self.font_bytes.clone(),
        )?);
        self.pointer = Some(WinitPointer::new(
            window.clone(),
            ppu,
            physical_size.width,
            physical_size.height,
        ));

        window.set_cursor_visible(false);
        window.request_redraw();
        self.window = Some(window);

        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let (Some(pixels), Some(surface), Some(pointer)) = (
            self.pixels.as_mut(),
            self.surface.as_mut(),
            self.pointer.as_mut(),
        ) else {
            return Ok(());
        };

        surface.clear(BACKGROUND);
        let running = self.session.tick(pointer, surface)?;
        surface.copy_to_frame(pixels.frame_mut());
        pixels.render()?;

        if running {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        } else {
            self.should_exit = true;
        }
        Ok(())
    }

    fn write_log(&mut self) {
        if self.log_written {
            return;
        }
        match self.session.log().to_json() {
            Ok(json) => {
                if let Err(e) = std::fs::write(&self.output_path, json) {
                    error!("writing {}: {e}", self.output_path);
                } else {
                    info!(path = %self.output_path, "log written");
                    self.log_written = true;
                }
            }
            Err(e) => error!("serializing log: {e}"),
        }
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        if let Some(pixels) = &mut self.pixels {
            if let Err(e) = pixels.resize_surface(new_size.width, new_size.height) {
                warn!("resize surface: {e}");
            }
            if let Err(e) = pixels.resize_buffer(new_size.width, new_size.height) {
                warn!("resize buffer: {e}");
            }
        }
        let ppu = self.px_per_unit(new_size.height);
        if let Some(pointer) = &mut self.pointer {
            pointer.resize(new_size.width, new_size.height, ppu);
        }
        match SkiaSurface::new(
            new_size.width,
            new_size.height,
            ppu as f32,
            self.font_bytes.clone(),
        ) {
            Ok(surface) => self.surface = Some(surface),
            Err(e) => warn!("rebuilding raster target: {e}"),
        }
    }

    fn cleanup_and_exit(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.set_cursor_visible(true);
        }
        self.write_log();
        self.should_exit = true;
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window_and_surface(event_loop) {
                error!("failed to create window and surface: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.cleanup_and_exit(event_loop),
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.render() {
                    error!("render failed: {e}");
                    self.cleanup_and_exit(event_loop);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(pointer) = &mut self.pointer {
                    pointer.on_cursor_moved(position);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(pointer) = &mut self.pointer {
                    pointer.on_button(button, state.is_pressed());
                }
            }
            WindowEvent::KeyboardInput { event, .. } if event.state.is_pressed() => {
                use winit::keyboard::{KeyCode, PhysicalKey};
                if event.physical_key == PhysicalKey::Code(KeyCode::Escape) {
                    self.cleanup_and_exit(event_loop);
                }
            }
            WindowEvent::Resized(sz) => self.handle_resize(sz),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.should_exit {
            self.write_log();
            event_loop.exit();
        }
    }
}
