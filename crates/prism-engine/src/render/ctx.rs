use crate::coords::{PixelSize, Viewport};
use crate::device::{Context2d, GpuBackend};
use crate::display::OrientationTransform;
use crate::text::TextFactory;

/// Everything drawing code needs for one frame, borrowed from
/// [`crate::surface::SurfaceResources`].
///
/// The borrow keeps handles from being retained across a device recovery.
pub struct RenderCtx<'a, B: GpuBackend> {
    pub device: &'a B::Device,
    pub swap_chain: &'a B::SwapChain,
    pub render_target_view: &'a B::View,
    pub depth_stencil_view: &'a B::View,
    pub viewport: Viewport,
    pub context_2d: &'a Context2d<B::View>,
    pub text_factory: &'a TextFactory,
    pub orientation: &'a OrientationTransform,
    pub dpi: f32,
    pub effective_dpi: f32,
    /// Pixel size before the rotation swap.
    pub output_size: PixelSize,
}

impl<B: GpuBackend> RenderCtx<'_, B> {
    /// Scale from device-independent units to target pixels.
    #[inline]
    pub fn pixels_per_dip(&self) -> f32 {
        self.effective_dpi / 96.0
    }
}
