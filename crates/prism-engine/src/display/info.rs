use winit::window::Window;

use super::orientation::DisplayOrientation;
use crate::coords::{LogicalSize, PixelSize};

/// What the windowing layer knows about the display a window sits on.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DisplayInfo {
    pub logical_size: LogicalSize,
    pub dpi: f32,
    pub native_orientation: DisplayOrientation,
    pub current_orientation: DisplayOrientation,
}

impl DisplayInfo {
    /// Reads size, DPI and orientation from a winit window.
    ///
    /// Without a monitor the window itself stands in for the screen.
    pub fn from_window(window: &Window) -> Self {
        let scale = window.scale_factor();
        let inner = window.inner_size();
        let logical: winit::dpi::LogicalSize<f64> = inner.to_logical(scale);

        let screen = window
            .current_monitor()
            .map(|m| m.size())
            .unwrap_or(inner);

        Self::desktop(
            LogicalSize::new(logical.width as f32, logical.height as f32),
            (scale * 96.0) as f32,
            PixelSize::new(screen.width, screen.height),
        )
    }

    /// Display info for a desktop screen of `screen` pixels.
    ///
    /// Desktop compositors present surfaces unrotated, so the native and
    /// current orientation are the same and the surface rotation is always
    /// identity. A rotated monitor only changes the window size.
    pub fn desktop(logical_size: LogicalSize, dpi: f32, screen: PixelSize) -> Self {
        let orientation = orientation_of(screen);
        Self {
            logical_size,
            dpi,
            native_orientation: orientation,
            current_orientation: orientation,
        }
    }
}

/// Landscape when at least as wide as tall.
pub fn orientation_of(size: PixelSize) -> DisplayOrientation {
    if size.width >= size.height {
        DisplayOrientation::Landscape
    } else {
        DisplayOrientation::Portrait
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_counts_as_landscape() {
        assert_eq!(orientation_of(PixelSize::new(10, 10)), DisplayOrientation::Landscape);
        assert_eq!(orientation_of(PixelSize::new(1080, 1920)), DisplayOrientation::Portrait);
    }

    #[test]
    fn desktop_orientations_always_agree() {
        for screen in [PixelSize::new(1920, 1080), PixelSize::new(1080, 1920)] {
            let info = DisplayInfo::desktop(LogicalSize::new(800.0, 600.0), 96.0, screen);
            assert_eq!(info.native_orientation, info.current_orientation);
            assert_eq!(info.current_orientation, orientation_of(screen));
        }
    }
}
