//! Keyboard-driven visual toggles.
//!
//! Four independent modes, each advanced by one key. Named presets live in
//! fixed lookup tables indexed by the mode enums; cycling is modulo the table
//! length so every index stays in range.

use std::fmt;

use trilayer_engine::input::Key;

// ── colour scheme ─────────────────────────────────────────────────────────

const COLOR_SCHEME_NAMES: [&str; 4] = ["Original", "Green Tint", "Purple Tint", "Yellow Tint"];

/// Signed RGB delta added to every vertex colour.
const COLOR_SCHEME_DELTAS: [[f32; 3]; 4] = [
    [0.0, 0.0, 0.0],
    [-0.3, 0.4, -0.2],
    [0.3, -0.2, 0.4],
    [0.3, 0.3, -0.3],
];

/// Tint preset.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum ColorScheme {
    #[default]
    Original,
    GreenTint,
    PurpleTint,
    YellowTint,
}

impl ColorScheme {
    pub const ALL: [ColorScheme; 4] = [
        ColorScheme::Original,
        ColorScheme::GreenTint,
        ColorScheme::PurpleTint,
        ColorScheme::YellowTint,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn name(self) -> &'static str {
        COLOR_SCHEME_NAMES[self.index()]
    }

    pub fn delta(self) -> [f32; 3] {
        COLOR_SCHEME_DELTAS[self.index()]
    }

    /// Displayed colour for `base`: delta added, each channel clamped to `[0, 1]`.
    ///
    /// CPU mirror of the fragment shader; stored vertex colours are never modified.
    #[cfg(test)]
    pub fn apply(self, base: [f32; 3]) -> [f32; 3] {
        let d = self.delta();
        [
            (base[0] + d[0]).clamp(0.0, 1.0),
            (base[1] + d[1]).clamp(0.0, 1.0),
            (base[2] + d[2]).clamp(0.0, 1.0),
        ]
    }
}

// ── transparency ──────────────────────────────────────────────────────────

const TRANSPARENCY_NAMES: [&str; 4] = ["100%", "75%", "50%", "25%"];

const ALPHA_LEVELS: [f32; 4] = [1.0, 0.75, 0.5, 0.25];

/// Alpha multiplier preset for the far triangle.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum TransparencyLevel {
    #[default]
    Full,
    ThreeQuarters,
    Half,
    Quarter,
}

impl TransparencyLevel {
    pub const ALL: [TransparencyLevel; 4] = [
        TransparencyLevel::Full,
        TransparencyLevel::ThreeQuarters,
        TransparencyLevel::Half,
        TransparencyLevel::Quarter,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn name(self) -> &'static str {
        TRANSPARENCY_NAMES[self.index()]
    }

    pub fn alpha(self) -> f32 {
        ALPHA_LEVELS[self.index()]
    }
}

// ── toggles ───────────────────────────────────────────────────────────────

/// One of the four user-controllable properties.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Toggle {
    Animation,
    Color,
    Transparency,
    Wireframe,
}

impl Toggle {
    pub const ALL: [Toggle; 4] = [
        Toggle::Animation,
        Toggle::Color,
        Toggle::Transparency,
        Toggle::Wireframe,
    ];

    /// Key bound to this toggle.
    pub const fn key(self) -> Key {
        match self {
            Toggle::Animation => Key::Q,
            Toggle::Color => Key::W,
            Toggle::Transparency => Key::E,
            Toggle::Wireframe => Key::R,
        }
    }
}

/// All user-selected modes. Starts as off / no tint / opaque / filled.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct ToggleState {
    pub animation_on: bool,
    pub color_scheme: ColorScheme,
    pub transparency: TransparencyLevel,
    pub wireframe_on: bool,
}

impl ToggleState {
    /// Advances `toggle` and reports the new value.
    pub fn fire(&mut self, toggle: Toggle) -> ToggleEvent {
        match toggle {
            Toggle::Animation => {
                self.animation_on = !self.animation_on;
                ToggleEvent::Animation(self.animation_on)
            }
            Toggle::Color => {
                self.color_scheme = self.color_scheme.next();
                ToggleEvent::Color(self.color_scheme)
            }
            Toggle::Transparency => {
                self.transparency = self.transparency.next();
                ToggleEvent::Transparency(self.transparency)
            }
            Toggle::Wireframe => {
                self.wireframe_on = !self.wireframe_on;
                ToggleEvent::Wireframe(self.wireframe_on)
            }
        }
    }
}

/// A fired toggle with its new value; `Display` is the status line.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ToggleEvent {
    Animation(bool),
    Color(ColorScheme),
    Transparency(TransparencyLevel),
    Wireframe(bool),
}

impl ToggleEvent {
    pub fn toggle(&self) -> Toggle {
        match self {
            ToggleEvent::Animation(_) => Toggle::Animation,
            ToggleEvent::Color(_) => Toggle::Color,
            ToggleEvent::Transparency(_) => Toggle::Transparency,
            ToggleEvent::Wireframe(_) => Toggle::Wireframe,
        }
    }
}

fn on_off(v: bool) -> &'static str {
    if v { "ON" } else { "OFF" }
}

impl fmt::Display for ToggleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = self.toggle().key();
        match self {
            ToggleEvent::Animation(on) => write!(f, "[{key}] Animation: {}", on_off(*on)),
            ToggleEvent::Color(scheme) => write!(f, "[{key}] Color: {}", scheme.name()),
            ToggleEvent::Transparency(level) => {
                write!(f, "[{key}] Transparency: {}", level.name())
            }
            ToggleEvent::Wireframe(on) => write!(f, "[{key}] Wireframe: {}", on_off(*on)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── defaults ──────────────────────────────────────────────────────────

    #[test]
    fn starts_with_everything_off() {
        let s = ToggleState::default();
        assert!(!s.animation_on);
        assert_eq!(s.color_scheme, ColorScheme::Original);
        assert_eq!(s.transparency, TransparencyLevel::Full);
        assert!(!s.wireframe_on);
    }

    // ── cycling ───────────────────────────────────────────────────────────

    #[test]
    fn color_scheme_cycles_through_all_presets() {
        let mut s = ToggleState::default();
        let seen: Vec<ColorScheme> = (0..4)
            .map(|_| match s.fire(Toggle::Color) {
                ToggleEvent::Color(c) => c,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(
            seen,
            vec![
                ColorScheme::GreenTint,
                ColorScheme::PurpleTint,
                ColorScheme::YellowTint,
                ColorScheme::Original,
            ]
        );
    }

    #[test]
    fn four_n_firings_return_to_start() {
        for n in 0..5 {
            let start = ToggleState {
                color_scheme: ColorScheme::PurpleTint,
                transparency: TransparencyLevel::ThreeQuarters,
                ..ToggleState::default()
            };
            let mut s = start;
            for _ in 0..4 * n {
                s.fire(Toggle::Color);
                s.fire(Toggle::Transparency);
            }
            assert_eq!(s, start, "n = {n}");
        }
    }

    #[test]
    fn boolean_toggles_flip() {
        let mut s = ToggleState::default();
        assert_eq!(s.fire(Toggle::Animation), ToggleEvent::Animation(true));
        assert_eq!(s.fire(Toggle::Animation), ToggleEvent::Animation(false));
        assert_eq!(s.fire(Toggle::Wireframe), ToggleEvent::Wireframe(true));
        assert_eq!(s.fire(Toggle::Wireframe), ToggleEvent::Wireframe(false));
    }

    #[test]
    fn toggles_are_independent() {
        let mut s = ToggleState::default();
        s.fire(Toggle::Wireframe);
        assert!(!s.animation_on);
        assert_eq!(s.color_scheme, ColorScheme::Original);
        assert_eq!(s.transparency, TransparencyLevel::Full);
    }

    // ── tables ────────────────────────────────────────────────────────────

    #[test]
    fn alpha_levels_match_index() {
        let alphas: Vec<f32> = TransparencyLevel::ALL.iter().map(|l| l.alpha()).collect();
        assert_eq!(alphas, vec![1.0, 0.75, 0.5, 0.25]);
    }

    #[test]
    fn green_tint_clamps_low_red_to_zero() {
        let out = ColorScheme::GreenTint.apply([0.1, 0.5, 0.5]);
        assert_eq!(out[0], 0.0);
    }

    #[test]
    fn tint_clamps_high_channel_to_one() {
        let out = ColorScheme::PurpleTint.apply([1.0, 0.2, 1.0]);
        assert_eq!(out[0], 1.0);
        assert_eq!(out[2], 1.0);
    }

    #[test]
    fn original_scheme_is_identity() {
        let base = [0.2, 0.3, 1.0];
        assert_eq!(ColorScheme::Original.apply(base), base);
    }

    // ── status lines ──────────────────────────────────────────────────────

    #[test]
    fn status_lines() {
        assert_eq!(ToggleEvent::Animation(true).to_string(), "[Q] Animation: ON");
        assert_eq!(ToggleEvent::Color(ColorScheme::YellowTint).to_string(), "[W] Color: Yellow Tint");
        assert_eq!(
            ToggleEvent::Transparency(TransparencyLevel::Half).to_string(),
            "[E] Transparency: 50%"
        );
        assert_eq!(ToggleEvent::Wireframe(false).to_string(), "[R] Wireframe: OFF");
    }

    #[test]
    fn keys_are_q_w_e_r() {
        let keys: Vec<Key> = Toggle::ALL.iter().map(|t| t.key()).collect();
        assert_eq!(keys, vec![Key::Q, Key::W, Key::E, Key::R]);
    }
}
