use std::fmt;

use crate::coords::{LogicalSize, Matrix3x2, Matrix4x4};

/// Orientation of a display, as reported by the windowing layer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DisplayOrientation {
    /// Not reported. Never valid for rotation lookup.
    None,
    Landscape,
    Portrait,
    LandscapeFlipped,
    PortraitFlipped,
}

/// Rotation the presentation engine applies between the backbuffer and the display.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DisplayRotation {
    Identity,
    Rotate90,
    Rotate180,
    Rotate270,
}

impl DisplayRotation {
    /// Whether this rotation exchanges width and height.
    #[inline]
    pub fn swaps_dimensions(self) -> bool {
        matches!(self, DisplayRotation::Rotate90 | DisplayRotation::Rotate270)
    }
}

/// Returned when a (native, current) orientation pair has no rotation.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct OrientationError {
    pub native: DisplayOrientation,
    pub current: DisplayOrientation,
}

impl fmt::Display for OrientationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no display rotation for native orientation {:?} and current orientation {:?}",
            self.native, self.current
        )
    }
}

impl std::error::Error for OrientationError {}

/// Rotation for every valid (native, current) pair.
///
/// Only `Landscape` and `Portrait` can be native orientations.
pub const ROTATION_TABLE: [(DisplayOrientation, DisplayOrientation, DisplayRotation); 8] = {
    use DisplayOrientation::*;
    use DisplayRotation::*;
    [
        (Landscape, Landscape, Identity),
        (Landscape, Portrait, Rotate270),
        (Landscape, LandscapeFlipped, Rotate180),
        (Landscape, PortraitFlipped, Rotate90),
        (Portrait, Landscape, Rotate90),
        (Portrait, Portrait, Identity),
        (Portrait, LandscapeFlipped, Rotate270),
        (Portrait, PortraitFlipped, Rotate180),
    ]
};

/// Looks up the rotation between the display's native and current orientation.
pub fn compute_display_rotation(
    native: DisplayOrientation,
    current: DisplayOrientation,
) -> Result<DisplayRotation, OrientationError> {
    ROTATION_TABLE
        .iter()
        .find(|(n, c, _)| *n == native && *c == current)
        .map(|&(_, _, rotation)| rotation)
        .ok_or(OrientationError { native, current })
}

/// 2D and 3D transforms that map unrotated content onto a rotated backbuffer.
///
/// The two always change together; drawing code applies `transform_2d` to its
/// 2D context and prepends `transform_3d` to its projection.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct OrientationTransform {
    pub transform_2d: Matrix3x2,
    pub transform_3d: Matrix4x4,
}

/// Builds the transform pair for `rotation` over content of size `logical`.
///
/// The 3D matrices are given explicitly instead of computed to avoid rounding.
pub fn orientation_transform(rotation: DisplayRotation, logical: LogicalSize) -> OrientationTransform {
    let (transform_2d, transform_3d) = match rotation {
        DisplayRotation::Identity => (Matrix3x2::IDENTITY, Matrix4x4::ROTATION_0),
        DisplayRotation::Rotate270 => (
            Matrix3x2::quarter_turns(1) * Matrix3x2::translation(logical.height, 0.0),
            Matrix4x4::ROTATION_270,
        ),
        DisplayRotation::Rotate180 => (
            Matrix3x2::quarter_turns(2) * Matrix3x2::translation(logical.width, logical.height),
            Matrix4x4::ROTATION_180,
        ),
        DisplayRotation::Rotate90 => (
            Matrix3x2::quarter_turns(3) * Matrix3x2::translation(0.0, logical.width),
            Matrix4x4::ROTATION_90,
        ),
    };

    OrientationTransform { transform_2d, transform_3d }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Point2;
    use DisplayOrientation::*;

    const ALL: [DisplayOrientation; 5] = [None, Landscape, Portrait, LandscapeFlipped, PortraitFlipped];

    #[test]
    fn table_is_total_over_valid_pairs_and_nothing_else() {
        let mut mapped = 0;
        for native in ALL {
            for current in ALL {
                let valid = matches!(native, Landscape | Portrait) && current != None;
                let result = compute_display_rotation(native, current);
                assert_eq!(result.is_ok(), valid, "{native:?}/{current:?}");
                if valid {
                    mapped += 1;
                } else {
                    assert_eq!(result, Err(OrientationError { native, current }));
                }
            }
        }
        assert_eq!(mapped, ROTATION_TABLE.len());
    }

    #[test]
    fn table_has_no_duplicate_keys() {
        for (i, a) in ROTATION_TABLE.iter().enumerate() {
            for b in &ROTATION_TABLE[i + 1..] {
                assert!((a.0, a.1) != (b.0, b.1));
            }
        }
    }

    #[test]
    fn matching_orientation_is_identity() {
        assert_eq!(compute_display_rotation(Landscape, Landscape), Ok(DisplayRotation::Identity));
        assert_eq!(compute_display_rotation(Portrait, Portrait), Ok(DisplayRotation::Identity));

        let t = orientation_transform(DisplayRotation::Identity, LogicalSize::new(800.0, 600.0));
        assert_eq!(t.transform_2d, Matrix3x2::IDENTITY);
        assert_eq!(t.transform_3d, Matrix4x4::ROTATION_0);
    }

    #[test]
    fn landscape_device_held_portrait() {
        let rotation = compute_display_rotation(Landscape, Portrait).unwrap();
        assert_eq!(rotation, DisplayRotation::Rotate270);
        assert!(rotation.swaps_dimensions());

        let t = orientation_transform(rotation, LogicalSize::new(800.0, 600.0));
        assert_eq!(
            t.transform_2d,
            Matrix3x2 { m11: 0.0, m12: 1.0, m21: -1.0, m22: 0.0, dx: 600.0, dy: 0.0 }
        );
        assert_eq!(t.transform_3d, Matrix4x4::ROTATION_270);
    }

    #[test]
    fn flipped_orientations() {
        assert_eq!(compute_display_rotation(Landscape, LandscapeFlipped), Ok(DisplayRotation::Rotate180));
        assert_eq!(compute_display_rotation(Landscape, PortraitFlipped), Ok(DisplayRotation::Rotate90));
        assert_eq!(compute_display_rotation(Portrait, LandscapeFlipped), Ok(DisplayRotation::Rotate270));
        assert_eq!(compute_display_rotation(Portrait, PortraitFlipped), Ok(DisplayRotation::Rotate180));
        assert_eq!(compute_display_rotation(Portrait, Landscape), Ok(DisplayRotation::Rotate90));
    }

    #[test]
    fn transforms_keep_logical_corners_on_screen() {
        let logical = LogicalSize::new(800.0, 600.0);
        let corners = [
            Point2::new(0.0, 0.0),
            Point2::new(logical.width, 0.0),
            Point2::new(0.0, logical.height),
            Point2::new(logical.width, logical.height),
        ];

        for rotation in [DisplayRotation::Rotate90, DisplayRotation::Rotate180, DisplayRotation::Rotate270] {
            let t = orientation_transform(rotation, logical).transform_2d;
            let (max_x, max_y) = if rotation.swaps_dimensions() {
                (logical.height, logical.width)
            } else {
                (logical.width, logical.height)
            };
            for c in corners {
                let p = t.transform_point(c);
                assert!(p.x >= 0.0 && p.x <= max_x, "{rotation:?}: {p:?}");
                assert!(p.y >= 0.0 && p.y <= max_y, "{rotation:?}: {p:?}");
            }
        }
    }

    #[test]
    fn only_quarter_turns_swap_dimensions() {
        assert!(!DisplayRotation::Identity.swaps_dimensions());
        assert!(DisplayRotation::Rotate90.swaps_dimensions());
        assert!(!DisplayRotation::Rotate180.swaps_dimensions());
        assert!(DisplayRotation::Rotate270.swaps_dimensions());
    }
}
