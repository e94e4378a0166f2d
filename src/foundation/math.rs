//! Orientation helpers shared by the capture rig, the compositor and renderers.
//!
//! World space is right-handed with +Y up. A camera at identity rotation looks along +Z with
//! +Y up; its image right vector is `forward × up` (that is, -X at identity).

pub use glam::{Mat3, Quat, Vec3};

/// Orientation expressed as degrees of yaw, pitch and roll.
///
/// - `yaw` turns about +Y, positive values swing +Z toward +X.
/// - `pitch` raises the view, positive values point the camera upward.
/// - `roll` turns about the viewing axis.
///
/// Angles are applied roll first, then pitch, then yaw (`yaw · pitch · roll`).
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Euler {
    /// Upward tilt in degrees.
    pub pitch: f32,
    /// Heading in degrees.
    pub yaw: f32,
    /// Roll about the view axis in degrees.
    pub roll: f32,
}

impl Euler {
    /// Create an orientation from `(pitch, yaw, roll)` degrees.
    pub const fn new(pitch: f32, yaw: f32, roll: f32) -> Self {
        Self { pitch, yaw, roll }
    }

    /// Pure heading change.
    pub const fn yaw(deg: f32) -> Self {
        Self::new(0.0, deg, 0.0)
    }

    /// Pure upward tilt.
    pub const fn pitch(deg: f32) -> Self {
        Self::new(deg, 0.0, 0.0)
    }

    /// Rotation represented by these angles.
    pub fn to_quat(self) -> Quat {
        let yaw = Quat::from_rotation_y(self.yaw.to_radians());
        let pitch = Quat::from_rotation_x(-self.pitch.to_radians());
        let roll = Quat::from_rotation_z(self.roll.to_radians());
        yaw * pitch * roll
    }
}

/// Apply `step` relative to the current orientation (cumulative, local-space rotation).
pub fn rotate_local(current: Quat, step: Euler) -> Quat {
    (current * step.to_quat()).normalize()
}

/// Viewing direction of an orientation.
pub fn forward(q: Quat) -> Vec3 {
    q * Vec3::Z
}

/// Up direction of an orientation.
pub fn up(q: Quat) -> Vec3 {
    q * Vec3::Y
}

/// Image right direction of an orientation.
pub fn right(q: Quat) -> Vec3 {
    forward(q).cross(up(q))
}

/// Rotation that maps directions expressed in the `from` frame into the `to` frame.
pub fn relative_rotation(from: Quat, to: Quat) -> Quat {
    (to.inverse() * from).normalize()
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
