use winit::dpi::LogicalSize;

use trilayer_engine::device::GpuInit;
use trilayer_engine::window::RuntimeConfig;

/// Demo window and presentation settings.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub clear_color: wgpu::Color,
    pub present_mode: wgpu::PresentMode,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            title: "Layered Triangles | Q=Move  W=Color  E=Alpha  R=Wire".to_string(),
            width: 900,
            height: 700,
            clear_color: wgpu::Color { r: 0.08, g: 0.08, b: 0.12, a: 1.0 },
            present_mode: wgpu::PresentMode::Fifo,
        }
    }
}

impl DemoConfig {
    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            title: self.title.clone(),
            initial_size: LogicalSize::new(self.width as f64, self.height as f64),
        }
    }

    /// Vertex colours are display values, so the surface stays linear. The
    /// window is opaque: blending happens against the clear colour only.
    /// Line polygon mode is requested but not required.
    pub fn gpu_init(&self) -> GpuInit {
        GpuInit {
            prefer_srgb: false,
            present_mode: self.present_mode,
            alpha_mode: Some(wgpu::CompositeAlphaMode::Opaque),
            optional_features: wgpu::Features::POLYGON_MODE_LINE,
            ..GpuInit::default()
        }
    }
}
