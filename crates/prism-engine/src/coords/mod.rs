//! Size, viewport and transform types shared by the device and surface layers.
//!
//! Two unit systems are in play:
//! - device-independent units (DIPs), 96 per inch, used for logical layout
//! - physical pixels, used for every GPU resource
//!
//! Conversion between them goes through a DPI value; see [`crate::display`].

mod size;
mod transform;
mod viewport;

pub use size::{LogicalSize, PixelSize};
pub use transform::{Matrix3x2, Matrix4x4, Point2};
pub use viewport::Viewport;
