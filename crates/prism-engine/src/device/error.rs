use std::fmt;

/// Step of backbuffer binding that failed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BackbufferStage {
    RenderTargetView,
    DepthStencil,
    Bitmap2d,
}

/// Returned by [`super::GraphicsDeviceManager::set_backbuffer`].
///
/// Nothing is left bound when this is returned; the manager stays cleared
/// until the next successful call.
#[derive(Debug)]
pub struct ResourceCreationError {
    pub stage: BackbufferStage,
    pub source: anyhow::Error,
}

impl fmt::Display for ResourceCreationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to create {:?} for backbuffer: {:#}", self.stage, self.source)
    }
}

impl std::error::Error for ResourceCreationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.source)
    }
}

/// DPI that is not a positive, finite number.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct InvalidDpi(pub f32);

impl fmt::Display for InvalidDpi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid DPI: {}", self.0)
    }
}

impl std::error::Error for InvalidDpi {}

/// Validates a DPI value coming from the windowing layer.
pub(crate) fn check_dpi(dpi: f32) -> Result<f32, InvalidDpi> {
    if dpi.is_finite() && dpi > 0.0 { Ok(dpi) } else { Err(InvalidDpi(dpi)) }
}
