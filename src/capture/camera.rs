use std::ops::{Deref, DerefMut};

use crate::capture::cube::FaceImage;
use crate::foundation::core::ColorFormat;
use crate::foundation::error::PanoResult;
use crate::foundation::math::Quat;

/// Output target a camera renders into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetDesc {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Whether the target stores linear radiance or display-referred values.
    pub format: ColorFormat,
}

/// The mutable parts of a camera that a capture temporarily takes over.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraState {
    /// World-space orientation.
    pub rotation: Quat,
    /// Vertical field of view in degrees.
    pub fov_y_deg: f32,
    /// Offscreen target, or `None` for the camera's own output.
    pub target: Option<TargetDesc>,
}

/// A single-viewpoint renderer owned by the host.
///
/// The capture rig re-orients this camera several times per tick. Implementations only need to
/// draw the scene for the current state; saving and restoring is handled by [`CameraLease`].
pub trait Camera {
    /// Current orientation, field of view and target.
    fn state(&self) -> CameraState;

    /// Set the world-space orientation.
    fn set_rotation(&mut self, rotation: Quat);

    /// Set the vertical field of view in degrees.
    fn set_fov_y_deg(&mut self, fov_y_deg: f32);

    /// Set the output target.
    fn set_target(&mut self, target: Option<TargetDesc>);

    /// Draw the scene as seen from the current state into `out`.
    fn render(&mut self, out: &mut FaceImage) -> PanoResult<()>;

    /// Put back a previously captured state.
    fn restore(&mut self, state: CameraState) {
        self.set_rotation(state.rotation);
        self.set_fov_y_deg(state.fov_y_deg);
        self.set_target(state.target);
    }
}

/// Exclusive, scoped use of a [`Camera`].
///
/// The state at acquisition time is put back when the lease is dropped, on every exit path.
pub struct CameraLease<'a, C: Camera + ?Sized> {
    camera: &'a mut C,
    saved: CameraState,
}

impl<'a, C: Camera + ?Sized> CameraLease<'a, C> {
    /// Take over `camera`, remembering its current state.
    pub fn acquire(camera: &'a mut C) -> Self {
        let saved = camera.state();
        Self { camera, saved }
    }

    /// State the camera will return to.
    pub fn saved(&self) -> CameraState {
        self.saved
    }
}

impl<C: Camera + ?Sized> Deref for CameraLease<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.camera
    }
}

impl<C: Camera + ?Sized> DerefMut for CameraLease<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        self.camera
    }
}

impl<C: Camera + ?Sized> Drop for CameraLease<'_, C> {
    fn drop(&mut self) {
        self.camera.restore(self.saved);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/camera.rs"]
mod tests;
