//! Per-frame render parameters, derived from toggles and time.

use std::f32::consts::{FRAC_PI_2, PI};

use crate::geometry::Layer;
use crate::toggles::ToggleState;

/// The near triangle is always this much more transparent than the far one.
pub const NEAR_ALPHA_FACTOR: f32 = 0.7;

/// Uniform values for one triangle's draw call.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LayerParams {
    pub offset: [f32; 3],
    pub alpha: f32,
    pub color_mod: [f32; 3],
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RasterMode {
    Fill,
    Wireframe,
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RenderParameters {
    pub near: LayerParams,
    pub far: LayerParams,
    pub raster: RasterMode,
}

impl RenderParameters {
    /// Computes this frame's parameters from the toggles and `t` seconds since start.
    pub fn compute(state: &ToggleState, t: f32) -> Self {
        let (near_offset, far_offset) = if state.animation_on {
            (near_offset(t), far_offset(t))
        } else {
            ([0.0; 3], [0.0; 3])
        };

        let color_mod = state.color_scheme.delta();
        let far_alpha = state.transparency.alpha();

        Self {
            near: LayerParams {
                offset: near_offset,
                alpha: far_alpha * NEAR_ALPHA_FACTOR,
                color_mod,
            },
            far: LayerParams {
                offset: far_offset,
                alpha: far_alpha,
                color_mod,
            },
            raster: if state.wireframe_on {
                RasterMode::Wireframe
            } else {
                RasterMode::Fill
            },
        }
    }

    pub fn layer(&self, layer: Layer) -> &LayerParams {
        match layer {
            Layer::Near => &self.near,
            Layer::Far => &self.far,
        }
    }

    /// Draw calls in submission order: far triangle, then near triangle.
    pub fn draw_sequence(&self) -> [(Layer, &LayerParams); 2] {
        Layer::BACK_TO_FRONT.map(|layer| (layer, self.layer(layer)))
    }
}

fn near_offset(t: f32) -> [f32; 3] {
    [0.25 * (1.5 * t).sin(), 0.15 * (1.2 * t).cos(), 0.0]
}

fn far_offset(t: f32) -> [f32; 3] {
    [0.20 * (t + PI).sin(), 0.18 * (0.8 * t + FRAC_PI_2).cos(), 0.0]
}
