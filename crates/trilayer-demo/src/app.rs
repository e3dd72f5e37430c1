use anyhow::{Context, Result};
use winit::event::WindowEvent;
use winit::window::WindowId;

use trilayer_engine::core::{App, AppControl, FrameCtx};
use trilayer_engine::device::Gpu;
use trilayer_engine::input::{InputState, Key, KeyEdgeTracker};

use crate::config::DemoConfig;
use crate::params::RenderParameters;
use crate::renderer::LayeredRenderer;
use crate::toggles::{Toggle, ToggleEvent, ToggleState};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopState {
    Running,
    Closing,
}

/// The layered-triangles demo: owns the toggles, key debouncing and renderer.
pub struct LayerDemo {
    config: DemoConfig,
    toggles: ToggleState,
    /// One tracker per `Toggle::ALL` entry.
    toggle_keys: [KeyEdgeTracker; 4],
    escape_key: KeyEdgeTracker,
    state: LoopState,
    renderer: Option<LayeredRenderer>,
}

impl LayerDemo {
    pub fn new(config: DemoConfig) -> Self {
        Self {
            config,
            toggles: ToggleState::default(),
            toggle_keys: [KeyEdgeTracker::new(); 4],
            escape_key: KeyEdgeTracker::new(),
            state: LoopState::Running,
            renderer: None,
        }
    }

    /// Samples the monitored keys once and applies every new press.
    ///
    /// Each tracker observes exactly once per call, so a held key fires on the
    /// frame it goes down and never again until released.
    pub fn sample_input(&mut self, input: &InputState) -> Vec<ToggleEvent> {
        if self.escape_key.observe(input.key_down(Key::Escape)) {
            log::debug!("escape pressed");
            self.state = LoopState::Closing;
        }

        let mut events = Vec::new();
        for (toggle, tracker) in Toggle::ALL.into_iter().zip(self.toggle_keys.iter_mut()) {
            if tracker.observe(input.key_down(toggle.key())) {
                events.push(self.toggles.fire(toggle));
            }
        }
        events
    }
}

fn print_legend() {
    println!();
    println!("  ╔════════════════════════════════════════╗");
    println!("  ║           LAYERED TRIANGLES            ║");
    println!("  ╠════════════════════════════════════════╣");
    println!("  ║  Q    toggle animation                 ║");
    println!("  ║  W    cycle colour scheme              ║");
    println!("  ║  E    cycle transparency               ║");
    println!("  ║  R    toggle wireframe                 ║");
    println!("  ║  ESC  quit                             ║");
    println!("  ╚════════════════════════════════════════╝");
    println!();
}

impl App for LayerDemo {
    fn on_init(&mut self, gpu: &Gpu<'_>) -> Result<()> {
        let renderer = LayeredRenderer::new(gpu).context("failed to build layer renderer")?;
        self.renderer = Some(renderer);
        print_legend();
        Ok(())
    }

    fn on_window_event(&mut self, _window_id: WindowId, event: &WindowEvent) -> AppControl {
        if matches!(event, WindowEvent::CloseRequested) {
            self.state = LoopState::Closing;
            return AppControl::Exit;
        }
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        for event in self.sample_input(ctx.input) {
            println!("{event}");
        }

        let params = RenderParameters::compute(&self.toggles, ctx.time.elapsed);

        let control = match self.renderer.as_mut() {
            Some(renderer) => ctx.render(self.config.clear_color, |rctx, target| {
                renderer.render(rctx, target, &params);
            }),
            None => AppControl::Continue,
        };

        // The frame that saw the close request is still presented.
        if self.state == LoopState::Closing {
            return AppControl::Exit;
        }
        control
    }

    fn on_exit(&mut self) {
        if let Some(renderer) = self.renderer.take() {
            renderer.release();
        }
        log::info!("demo shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trilayer_engine::input::{InputEvent, KeyState};

    fn press(input: &mut InputState, key: Key) {
        input.apply_event(InputEvent::Key { key, state: KeyState::Pressed });
    }

    fn release(input: &mut InputState, key: Key) {
        input.apply_event(InputEvent::Key { key, state: KeyState::Released });
    }

    fn demo() -> LayerDemo {
        LayerDemo::new(DemoConfig::default())
    }

    // ── debounce ──────────────────────────────────────────────────────────

    #[test]
    fn held_key_fires_once() {
        let mut app = demo();
        let mut input = InputState::default();
        press(&mut input, Key::Q);

        let fired: usize = (0..30).map(|_| app.sample_input(&input).len()).sum();
        assert_eq!(fired, 1);
        assert!(app.toggles.animation_on);
    }

    #[test]
    fn release_rearms_the_key() {
        let mut app = demo();
        let mut input = InputState::default();
        for _ in 0..3 {
            press(&mut input, Key::R);
            app.sample_input(&input);
            release(&mut input, Key::R);
            app.sample_input(&input);
        }
        assert!(app.toggles.wireframe_on);
    }

    #[test]
    fn simultaneous_presses_fire_in_key_order() {
        let mut app = demo();
        let mut input = InputState::default();
        for key in [Key::R, Key::E, Key::W, Key::Q] {
            press(&mut input, key);
        }
        let lines: Vec<String> = app.sample_input(&input).iter().map(|e| e.to_string()).collect();
        assert_eq!(
            lines,
            vec![
                "[Q] Animation: ON",
                "[W] Color: Green Tint",
                "[E] Transparency: 75%",
                "[R] Wireframe: ON",
            ]
        );
    }

    #[test]
    fn unmonitored_keys_are_ignored() {
        let mut app = demo();
        let mut input = InputState::default();
        press(&mut input, Key::Unknown(30));
        assert!(app.sample_input(&input).is_empty());
        assert_eq!(app.toggles, ToggleState::default());
    }

    // ── loop state ────────────────────────────────────────────────────────

    #[test]
    fn escape_press_enters_closing() {
        let mut app = demo();
        let mut input = InputState::default();
        app.sample_input(&input);
        assert_eq!(app.state, LoopState::Running);

        press(&mut input, Key::Escape);
        app.sample_input(&input);
        assert_eq!(app.state, LoopState::Closing);
    }

    #[test]
    fn close_request_exits() {
        let mut app = demo();
        let control = app.on_window_event(
            WindowId::from(0u64),
            &WindowEvent::CloseRequested,
        );
        assert_eq!(control, AppControl::Exit);
        assert_eq!(app.state, LoopState::Closing);
    }
}
