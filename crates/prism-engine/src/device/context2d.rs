use crate::coords::{Matrix3x2, PixelSize, Point2};

/// How glyph edges are smoothed when the 2D context renders text.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum TextAntialiasMode {
    #[default]
    Default,
    ClearType,
    Grayscale,
    Aliased,
}

/// View over the backbuffer that 2D drawing targets.
#[derive(Debug)]
pub struct TargetBitmap<V> {
    view: V,
    size: PixelSize,
    dpi: f32,
}

impl<V> TargetBitmap<V> {
    pub fn new(view: V, size: PixelSize, dpi: f32) -> Self {
        Self { view, size, dpi }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Size in pixels; equals the backbuffer size.
    pub fn size(&self) -> PixelSize {
        self.size
    }

    pub fn dpi(&self) -> f32 {
        self.dpi
    }

    /// Size in device-independent units at the bitmap's DPI.
    pub fn logical_size(&self) -> (f32, f32) {
        let scale = 96.0 / self.dpi;
        (self.size.width as f32 * scale, self.size.height as f32 * scale)
    }
}

/// 2D drawing state bound to the same device as the 3D pipeline.
///
/// Coordinates handed to 2D drawing code are in device-independent units;
/// [`Context2d::to_pixels`] maps them through the current transform and DPI.
#[derive(Debug)]
pub struct Context2d<V> {
    dpi: f32,
    text_antialias: TextAntialiasMode,
    transform: Matrix3x2,
    target: Option<TargetBitmap<V>>,
}

impl<V> Context2d<V> {
    pub fn new(dpi: f32) -> Self {
        Self {
            dpi,
            text_antialias: TextAntialiasMode::Default,
            transform: Matrix3x2::IDENTITY,
            target: None,
        }
    }

    pub fn dpi(&self) -> f32 {
        self.dpi
    }

    /// Updates the DPI, including that of the bound target.
    pub fn set_dpi(&mut self, dpi: f32) {
        self.dpi = dpi;
        if let Some(target) = &mut self.target {
            target.dpi = dpi;
        }
    }

    pub fn target(&self) -> Option<&TargetBitmap<V>> {
        self.target.as_ref()
    }

    pub fn set_target(&mut self, target: TargetBitmap<V>) {
        self.target = Some(target);
    }

    /// Unbinds the target, returning it.
    pub fn take_target(&mut self) -> Option<TargetBitmap<V>> {
        self.target.take()
    }

    pub fn text_antialias_mode(&self) -> TextAntialiasMode {
        self.text_antialias
    }

    pub fn set_text_antialias_mode(&mut self, mode: TextAntialiasMode) {
        self.text_antialias = mode;
    }

    pub fn transform(&self) -> Matrix3x2 {
        self.transform
    }

    pub fn set_transform(&mut self, transform: Matrix3x2) {
        self.transform = transform;
    }

    /// Maps a point in device-independent units to target pixels.
    pub fn to_pixels(&self, p: Point2) -> Point2 {
        let p = self.transform.transform_point(p);
        let scale = self.dpi / 96.0;
        Point2::new(p.x * scale, p.y * scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_dpi_reaches_bound_target() {
        let mut ctx = Context2d::new(96.0);
        ctx.set_target(TargetBitmap::new((), PixelSize::new(200, 100), 96.0));
        ctx.set_dpi(192.0);
        assert_eq!(ctx.dpi(), 192.0);
        assert_eq!(ctx.target().map(|t| t.dpi()), Some(192.0));
        assert_eq!(ctx.target().map(|t| t.logical_size()), Some((100.0, 50.0)));
    }

    #[test]
    fn to_pixels_applies_transform_then_dpi() {
        let mut ctx: Context2d<()> = Context2d::new(192.0);
        ctx.set_transform(Matrix3x2::translation(10.0, 0.0));
        assert_eq!(ctx.to_pixels(Point2::new(5.0, 5.0)), Point2::new(30.0, 10.0));
    }

    #[test]
    fn take_target_unbinds() {
        let mut ctx = Context2d::new(96.0);
        ctx.set_target(TargetBitmap::new(7u32, PixelSize::new(1, 1), 96.0));
        assert_eq!(ctx.take_target().map(|t| *t.view()), Some(7));
        assert!(ctx.target().is_none());
    }
}
