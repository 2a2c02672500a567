/// Receives device-loss notifications from [`crate::surface::SurfaceResources`].
///
/// Implementors own GPU resources of their own (pipelines, buffers, textures)
/// and must release them in `on_device_lost` and recreate them in
/// `on_device_restored`. Both are called exactly once per recovery, in that
/// order, on the rendering thread.
///
/// The surface holds only a weak reference, so callbacks take `&self`; use
/// interior mutability for any state they change.
pub trait DeviceNotify {
    fn on_device_lost(&self);
    fn on_device_restored(&self);
}
