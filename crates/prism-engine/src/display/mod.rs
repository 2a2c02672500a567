//! Display metrics and orientation.
//!
//! Pure functions over (logical size, DPI, orientation) that decide the pixel
//! geometry of the render target and the transforms drawing code must apply.
//! Nothing in here touches the GPU.

mod info;
mod metrics;
mod orientation;

pub use info::{orientation_of, DisplayInfo};
pub use metrics::{
    convert_dips_to_pixels, compute_output_size, OutputGeometry, ResourcesConfig, DPI_THRESHOLD,
    HEIGHT_THRESHOLD, WIDTH_THRESHOLD,
};
pub use orientation::{
    compute_display_rotation, orientation_transform, DisplayOrientation, DisplayRotation,
    OrientationError, OrientationTransform, ROTATION_TABLE,
};
