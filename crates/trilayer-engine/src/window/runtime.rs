use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App as CoreApp, AppControl, FrameCtx, InitError};
use crate::device::{Gpu, GpuInit};
use crate::input::platform::winit::translate_window_event;
use crate::input::InputState;
use crate::time::FrameClock;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "trilayer".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window, initializes the GPU and the app, and runs the frame
    /// loop until the app or the window system asks to close.
    ///
    /// Returns `Err` only for startup failures ([`InitError`] or the app's own
    /// `on_init` error); a normal close returns `Ok(())`.
    pub fn run<A>(initial: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: 'static + CoreApp,
    {
        // Animation time counts from here, before any window or GPU setup.
        let clock = FrameClock::new();

        let event_loop = EventLoop::new()
            .map_err(|e| InitError::context_creation("failed to create event loop", e))?;
        let mut state = AppState::new(initial, gpu_init, app, clock);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.fatal.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    input_state: InputState,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

/// Loop state: `Running` until a close is requested, then `Closing`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Phase {
    Starting,
    Running,
    Closing,
}

struct AppState<A>
where
    A: CoreApp + 'static,
{
    initial: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,
    clock: FrameClock,

    window: Option<WindowEntry>,
    phase: Phase,
    fatal: Option<anyhow::Error>,
}

impl<A> AppState<A>
where
    A: CoreApp + 'static,
{
    fn new(initial: RuntimeConfig, gpu_init: GpuInit, app: A, clock: FrameClock) -> Self {
        Self {
            initial,
            gpu_init,
            app,
            clock,
            window: None,
            phase: Phase::Starting,
            fatal: None,
        }
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.initial.title.clone())
            .with_inner_size(self.initial.initial_size);

        let window = event_loop
            .create_window(attrs)
            .map_err(|e| InitError::context_creation("failed to create window", e))?;

        let gpu_init = self.gpu_init.clone();

        let entry = WindowEntryTryBuilder {
            input_state: InputState::default(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()?;

        entry
            .with_gpu(|gpu| self.app.on_init(gpu))
            .context("application initialization failed")?;

        self.window = Some(entry);
        Ok(())
    }

    /// Enters `Closing` and stops the event loop; teardown happens in `exiting`.
    fn begin_close(&mut self, event_loop: &ActiveEventLoop) {
        if self.phase != Phase::Closing {
            log::debug!("close requested");
            self.phase = Phase::Closing;
        }
        event_loop.exit();
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.fatal = Some(err);
        self.begin_close(event_loop);
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(entry) = self.window.as_mut() else { return };

        let time = self.clock.tick();
        let app = &mut self.app;

        let app_control = entry.with_mut(|fields| {
            let mut ctx = FrameCtx {
                window: fields.window,
                gpu: fields.gpu,
                input: fields.input_state,
                time,
            };
            app.on_frame(&mut ctx)
        });

        if app_control == AppControl::Exit {
            self.begin_close(event_loop);
        }
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.phase != Phase::Starting {
            return;
        }

        if let Err(e) = self.create_window_entry(event_loop) {
            self.fail(event_loop, e);
            return;
        }

        self.phase = Phase::Running;
        if let Some(entry) = &self.window {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.phase == Phase::Closing {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw; presentation (FIFO) paces the loop.
        if let Some(entry) = &self.window {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.phase != Phase::Running {
            return;
        }

        let (app, window) = (&mut self.app, &mut self.window);
        let Some(entry) = window.as_mut() else { return };

        if let Some(ev) = translate_window_event(&event) {
            entry.with_input_state_mut(|input| input.apply_event(ev));
        }

        if app.on_window_event(window_id, &event) == AppControl::Exit {
            self.begin_close(event_loop);
            return;
        }

        match &event {
            WindowEvent::CloseRequested => self.begin_close(event_loop),

            WindowEvent::Resized(new_size) => {
                entry.with_gpu_mut(|gpu| gpu.resize(*new_size));
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = entry.with_window(|w| w.inner_size());
                entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // App resources first, then the GPU context, then the window.
        if self.window.is_some() {
            self.app.on_exit();
        }
        if let Some(entry) = self.window.take() {
            drop(entry);
            log::debug!("gpu context and window released");
        }
    }
}
