/// Initialization parameters for [`super::WgpuBackend`].
///
/// Swap chain format, present mode and latency are fixed by the surface
/// lifecycle and are not set here.
#[derive(Debug, Clone)]
pub struct WgpuInit {
    /// Backends the instance may pick adapters from.
    pub backends: wgpu::Backends,

    /// Adapter preference for hardware devices.
    pub power_preference: wgpu::PowerPreference,

    /// Features to enable when the adapter offers them.
    ///
    /// Missing features are dropped rather than failing device creation.
    pub required_features: wgpu::Features,

    /// Label attached to every device this backend creates.
    pub label: &'static str,
}

impl Default for WgpuInit {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            power_preference: wgpu::PowerPreference::HighPerformance,
            required_features: wgpu::Features::empty(),
            label: "prism-engine device",
        }
    }
}
