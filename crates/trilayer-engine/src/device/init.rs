/// Initialization parameters for the GPU layer.
///
/// Add configuration flags only when a concrete platform or backend
/// requirement exists.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Prefer an sRGB surface format when available.
    ///
    /// Shaders that write display-referred colours directly (as the demo does)
    /// want this off so values reach the screen unconverted.
    pub prefer_srgb: bool,

    /// Present mode (swap behavior).
    ///
    /// FIFO is vsync and supported everywhere.
    pub present_mode: wgpu::PresentMode,

    /// Optional alpha mode preference for the surface.
    ///
    /// If provided but unsupported on the current surface, a supported mode is selected.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Features the device must have. Device creation fails without them.
    pub required_features: wgpu::Features,

    /// Features enabled only when the adapter supports them.
    ///
    /// Callers check [`Gpu::features`](super::Gpu::features) to see which ones
    /// were granted.
    pub optional_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,

    /// Desired maximum frame latency for the surface.
    ///
    /// This value is a hint; support depends on platform/backend.
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            optional_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}

impl GpuInit {
    /// Computes the feature set to request from an adapter supporting `supported`.
    ///
    /// Returns the missing required features as the error.
    pub(crate) fn negotiate_features(
        &self,
        supported: wgpu::Features,
    ) -> Result<wgpu::Features, wgpu::Features> {
        let missing = self.required_features - supported;
        if !missing.is_empty() {
            return Err(missing);
        }
        Ok(self.required_features | (self.optional_features & supported))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init(required: wgpu::Features, optional: wgpu::Features) -> GpuInit {
        GpuInit {
            required_features: required,
            optional_features: optional,
            ..GpuInit::default()
        }
    }

    #[test]
    fn empty_request_grants_nothing() {
        let granted = GpuInit::default()
            .negotiate_features(wgpu::Features::POLYGON_MODE_LINE)
            .unwrap();
        assert!(granted.is_empty());
    }

    #[test]
    fn optional_feature_granted_when_supported() {
        let i = init(wgpu::Features::empty(), wgpu::Features::POLYGON_MODE_LINE);
        let granted = i.negotiate_features(wgpu::Features::POLYGON_MODE_LINE).unwrap();
        assert!(granted.contains(wgpu::Features::POLYGON_MODE_LINE));
    }

    #[test]
    fn optional_feature_dropped_when_unsupported() {
        let i = init(wgpu::Features::empty(), wgpu::Features::POLYGON_MODE_LINE);
        let granted = i.negotiate_features(wgpu::Features::empty()).unwrap();
        assert!(!granted.contains(wgpu::Features::POLYGON_MODE_LINE));
    }

    #[test]
    fn missing_required_feature_is_reported() {
        let i = init(wgpu::Features::POLYGON_MODE_LINE, wgpu::Features::empty());
        let missing = i.negotiate_features(wgpu::Features::empty()).unwrap_err();
        assert_eq!(missing, wgpu::Features::POLYGON_MODE_LINE);
    }
}
