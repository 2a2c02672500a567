/// Lifecycle state of [`super::SurfaceResources`].
///
/// ```text
/// Uninitialized -> DeviceReady -> SurfaceReady
///                      ^              |
///                      |              v
///                      +-------- Recovering
/// ```
///
/// There is no terminal state; fatal errors are reported to the caller and
/// leave the state where it was.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SurfaceState {
    /// No device yet.
    Uninitialized,
    /// A device exists but no swap chain is bound to a window.
    DeviceReady,
    /// Device, swap chain and every size-dependent view are valid.
    SurfaceReady,
    /// A device loss was observed; the old device and swap chain are being
    /// replaced.
    Recovering,
}

impl SurfaceState {
    /// Whether `next` is a legal successor of `self`.
    pub fn can_transition_to(self, next: SurfaceState) -> bool {
        use SurfaceState::*;
        matches!(
            (self, next),
            (Uninitialized, DeviceReady)
                | (DeviceReady, SurfaceReady)
                | (DeviceReady, Recovering)
                | (SurfaceReady, SurfaceReady)
                | (SurfaceReady, Recovering)
                | (Recovering, DeviceReady)
        )
    }

    /// Whether drawing code may use the device and its views.
    #[inline]
    pub fn is_drawable(self) -> bool {
        self == SurfaceState::SurfaceReady
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SurfaceState::*;

    #[test]
    fn recovery_always_passes_through_device_ready() {
        assert!(SurfaceReady.can_transition_to(Recovering));
        assert!(Recovering.can_transition_to(DeviceReady));
        assert!(!Recovering.can_transition_to(SurfaceReady));
        assert!(!Recovering.can_transition_to(Recovering));
    }

    #[test]
    fn nothing_returns_to_uninitialized() {
        for s in [Uninitialized, DeviceReady, SurfaceReady, Recovering] {
            assert!(!s.can_transition_to(Uninitialized));
        }
    }
}
