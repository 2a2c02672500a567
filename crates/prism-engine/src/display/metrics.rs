use crate::coords::{LogicalSize, PixelSize};

/// DPI above which a display counts as high resolution (200% of a standard desktop).
pub const DPI_THRESHOLD: f32 = 192.0;
/// Width, in pixels, a high-resolution target must exceed before it is scaled down.
pub const WIDTH_THRESHOLD: f32 = 1920.0;
/// Height, in pixels, a high-resolution target must exceed before it is scaled down.
pub const HEIGHT_THRESHOLD: f32 = 1080.0;

/// Policy knobs for [`crate::surface::SurfaceResources`].
#[derive(Debug, Clone, Default)]
pub struct ResourcesConfig {
    /// Render at full native resolution on high-DPI displays.
    ///
    /// When `false`, targets that are both high-DPI and larger than 1080p are
    /// rendered at half the DPI and stretched by the presentation engine,
    /// trading sharpness for GPU time and battery.
    pub support_high_resolutions: bool,
}

/// Pixel geometry derived from a logical size and a DPI.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OutputGeometry {
    /// DPI actually used for the pixel conversion; never above the input DPI.
    pub effective_dpi: f32,
    /// Render target size before any rotation swap; at least 1x1.
    pub output_size: PixelSize,
}

/// Converts a length in device-independent units to pixels, rounded to nearest.
#[inline]
pub fn convert_dips_to_pixels(dips: f32, dpi: f32) -> f32 {
    (dips * dpi / 96.0 + 0.5).floor()
}

/// Computes the effective DPI and the output size for `logical` at `dpi`.
pub fn compute_output_size(logical: LogicalSize, dpi: f32, config: &ResourcesConfig) -> OutputGeometry {
    let mut effective_dpi = dpi;

    if !config.support_high_resolutions && dpi > DPI_THRESHOLD {
        let width = convert_dips_to_pixels(logical.width, dpi);
        let height = convert_dips_to_pixels(logical.height, dpi);

        // Compare the long side against the width threshold so portrait
        // targets are judged the same as landscape ones.
        if width.max(height) > WIDTH_THRESHOLD && width.min(height) > HEIGHT_THRESHOLD {
            effective_dpi /= 2.0;
        }
    }

    // `as` saturates: negative and NaN collapse to 0 before the clamp.
    let width = convert_dips_to_pixels(logical.width, effective_dpi) as u32;
    let height = convert_dips_to_pixels(logical.height, effective_dpi) as u32;

    OutputGeometry {
        effective_dpi,
        output_size: PixelSize::new(width.max(1), height.max(1)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(w: f32, h: f32, dpi: f32) -> OutputGeometry {
        compute_output_size(LogicalSize::new(w, h), dpi, &ResourcesConfig::default())
    }

    #[test]
    fn standard_dpi_is_one_to_one() {
        let g = geometry(400.0, 300.0, 96.0);
        assert_eq!(g.effective_dpi, 96.0);
        assert_eq!(g.output_size, PixelSize::new(400, 300));
    }

    #[test]
    fn low_dpi_rounds_to_nearest_pixel() {
        for &(w, h, dpi) in &[(100.0, 50.0, 120.0), (333.0, 77.0, 144.0), (1.0, 1.0, 192.0), (640.0, 480.0, 72.0)] {
            let g = geometry(w, h, dpi);
            assert_eq!(g.effective_dpi, dpi);
            let expected_w = (w * dpi / 96.0f32).round() as u32;
            let expected_h = (h * dpi / 96.0f32).round() as u32;
            assert_eq!(g.output_size, PixelSize::new(expected_w.max(1), expected_h.max(1)));
        }
    }

    #[test]
    fn large_high_dpi_target_is_halved() {
        let g = geometry(1200.0, 800.0, 200.0);
        assert_eq!(g.effective_dpi, 100.0);
        assert_eq!(g.output_size, PixelSize::new(1250, 833));
    }

    #[test]
    fn portrait_high_dpi_target_is_halved() {
        let g = geometry(800.0, 1200.0, 200.0);
        assert_eq!(g.effective_dpi, 100.0);
        assert_eq!(g.output_size, PixelSize::new(833, 1250));
    }

    #[test]
    fn small_high_dpi_target_keeps_full_dpi() {
        let g = geometry(400.0, 300.0, 240.0);
        assert_eq!(g.effective_dpi, 240.0);
        assert_eq!(g.output_size, PixelSize::new(1000, 750));
    }

    #[test]
    fn high_resolution_support_disables_halving() {
        let config = ResourcesConfig { support_high_resolutions: true };
        let g = compute_output_size(LogicalSize::new(1200.0, 800.0), 200.0, &config);
        assert_eq!(g.effective_dpi, 200.0);
        assert_eq!(g.output_size, PixelSize::new(2500, 1667));
    }

    #[test]
    fn empty_logical_size_clamps_to_one_pixel() {
        let g = geometry(0.0, 0.0, 96.0);
        assert_eq!(g.output_size, PixelSize::new(1, 1));

        let g = geometry(-20.0, 10.0, 96.0);
        assert_eq!(g.output_size, PixelSize::new(1, 10));
    }

    #[test]
    fn effective_dpi_never_exceeds_dpi() {
        for dpi in [48.0, 96.0, 191.0, 193.0, 384.0] {
            for (w, h) in [(10.0, 10.0), (4000.0, 3000.0)] {
                assert!(geometry(w, h, dpi).effective_dpi <= dpi);
            }
        }
    }
}
