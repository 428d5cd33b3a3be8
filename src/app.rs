use crate::config::{Config, DisplayConfig};
use anyhow::{anyhow, Context, Result};
use pixels::{Pixels, SurfaceTexture};
use ssvep_core::{Display, InputEvent, PresentError};
use ssvep_render::SkiaCanvas;
use ssvep_stimulus::{LoopDriver, Session, SessionPlan};
use ssvep_timing::HighPrecisionTimer;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{Key, NamedKey},
    platform::pump_events::{EventLoopExtPumpEvents, PumpStatus},
    window::{Fullscreen, Window, WindowId},
};

const WINDOW_TIMEOUT: Duration = Duration::from_secs(5);

struct Surface {
    window: Arc<Window>,
    pixels: Pixels<'static>,
}

/// Window-side state driven by `pump_app_events`; collects input between polls.
struct Handler {
    config: DisplayConfig,
    surface: Option<Surface>,
    events: Vec<InputEvent>,
    init_error: Option<anyhow::Error>,
}

impl Handler {
    fn create_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next())
            .ok_or_else(|| anyhow!("no monitor available"))?;
        let refresh_hz = monitor
            .refresh_rate_millihertz()
            .map(|rate| rate as f64 / 1000.0);

        let attributes = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_fullscreen(Some(Fullscreen::Borderless(Some(monitor))))
            .with_resizable(false);
        let window = Arc::new(event_loop.create_window(attributes)?);
        let size = window.inner_size();
        info!(
            width = size.width,
            height = size.height,
            scale_factor = window.scale_factor(),
            refresh_hz = ?refresh_hz,
            "display opened"
        );
        if self.config.hide_cursor {
            window.set_cursor_visible(false);
        }

        let texture = SurfaceTexture::new(size.width, size.height, window.clone());
        let pixels = Pixels::new(size.width, size.height, texture)?;
        self.surface = Some(Surface { window, pixels });
        Ok(())
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        if let Some(surface) = &mut self.surface {
            if let Err(err) = surface.pixels.resize_surface(size.width, size.height) {
                warn!(%err, "failed to resize surface");
            }
        }
    }
}

impl ApplicationHandler for Handler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.surface.is_none() && self.init_error.is_none() {
            if let Err(err) = self.create_surface(event_loop) {
                self.init_error = Some(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.events.push(InputEvent::Close);
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } if event.state.is_pressed() && !event.repeat => {
                match event.logical_key {
                    Key::Named(NamedKey::Escape) => self.events.push(InputEvent::Escape),
                    Key::Character(text) => {
                        self.events.extend(text.chars().next().map(InputEvent::Key));
                    }
                    _ => {}
                }
            }
            WindowEvent::Resized(size) => self.resize(size),
            WindowEvent::ScaleFactorChanged { .. } => {
                let size = self.surface.as_ref().map(|s| s.window.inner_size());
                if let Some(size) = size {
                    self.resize(size);
                }
            }
            _ => {}
        }
    }
}

/// Full-screen `Display` on the primary monitor.
///
/// Frames are drawn into a `SkiaCanvas` and copied into the `pixels` buffer on
/// flip. `poll_input` pumps the event loop without blocking.
pub struct WinitDisplay {
    event_loop: EventLoop<()>,
    handler: Handler,
    canvas: SkiaCanvas,
    closed: bool,
}

impl WinitDisplay {
    pub fn open(config: &DisplayConfig) -> Result<Self> {
        let mut event_loop = EventLoop::new()?;
        let mut handler = Handler {
            config: config.clone(),
            surface: None,
            events: Vec::new(),
            init_error: None,
        };

        let deadline = Instant::now() + WINDOW_TIMEOUT;
        while handler.surface.is_none() {
            if let Some(err) = handler.init_error.take() {
                return Err(err.context("creating window"));
            }
            if Instant::now() > deadline {
                return Err(anyhow!("window was not created within {WINDOW_TIMEOUT:?}"));
            }
            if let PumpStatus::Exit(code) =
                event_loop.pump_app_events(Some(Duration::from_millis(10)), &mut handler)
            {
                if let Some(err) = handler.init_error.take() {
                    return Err(err.context("creating window"));
                }
                return Err(anyhow!("event loop exited with code {code} before the window opened"));
            }
        }

        let size = handler
            .surface
            .as_ref()
            .map(|s| s.window.inner_size())
            .context("window surface missing")?;
        let canvas = SkiaCanvas::for_resolution(size.width, size.height, config.constrain_aspect)?;
        Ok(Self {
            event_loop,
            handler,
            canvas,
            closed: false,
        })
    }
}

impl Display for WinitDisplay {
    type Canvas = SkiaCanvas;

    fn canvas(&mut self) -> &mut SkiaCanvas {
        &mut self.canvas
    }

    fn flip(&mut self) -> Result<(), PresentError> {
        let surface = self
            .handler
            .surface
            .as_mut()
            .ok_or_else(|| PresentError::display("window is gone"))?;
        self.canvas.copy_to_frame(surface.pixels.frame_mut())?;
        surface
            .pixels
            .render()
            .map_err(|err| PresentError::display(format!("pixels render failed: {err}")))
    }

    fn poll_input(&mut self, events: &mut Vec<InputEvent>) {
        if !self.closed {
            let status = self
                .event_loop
                .pump_app_events(Some(Duration::ZERO), &mut self.handler);
            if let PumpStatus::Exit(_) = status {
                self.closed = true;
                self.handler.events.push(InputEvent::Close);
            }
        } else {
            self.handler.events.push(InputEvent::Close);
        }
        events.append(&mut self.handler.events);
    }
}

impl Drop for WinitDisplay {
    fn drop(&mut self) {
        if let Some(surface) = &self.handler.surface {
            surface.window.set_cursor_visible(true);
        }
    }
}

/// Runs the configured session full screen and writes the trigger log.
pub fn run_session(config: &Config) -> Result<()> {
    let session = Session::new(config.session.clone(), config.sync.clone())?;
    let plan = SessionPlan::generate(&config.session, &mut rand::rng())?;
    info!(
        trials = plan.len(),
        rates = ?config.session.flash_rates,
        protocol = %config.sync.protocol,
        "session planned"
    );

    let mut display = WinitDisplay::open(&config.display)?;
    let mut driver = LoopDriver::new(HighPrecisionTimer::new());
    let report = match session.run(&mut driver, &mut display, &plan) {
        Ok(report) => report,
        Err(err) => {
            error!(%err, "session aborted");
            return Err(err.into());
        }
    };

    let path = &config.output.trigger_log;
    report
        .triggers
        .write_json(path)
        .with_context(|| format!("writing trigger log {}", path.display()))?;
    info!(
        completed = report.completed_trials,
        planned = report.planned_trials,
        cancelled = report.cancelled,
        path = %path.display(),
        "trigger log written"
    );
    Ok(())
}
