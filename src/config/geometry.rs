use crate::config::capture::{CaptureConfig, clamp_fov, clamp_overlap};

/// Geometry derived from a [`CaptureConfig`].
///
/// Recomputed every tick; cheap and total. Degenerate inputs are clamped, never rejected.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DerivedGeometry {
    /// Width the output would have if it covered the full 360°, capped at `8 * width`.
    pub full_width: f64,
    /// Height matching `full_width` and the vertical field of view.
    pub suggested_height: f64,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels (explicit or suggested).
    pub height: u32,
    /// Cube face resolution in pixels (explicit or derived), at least 1.
    pub face_size: u32,
    /// Overlap fraction after clamping.
    pub overlap: f32,
    /// Horizontal field of view after clamping, in degrees.
    pub horizontal_fov: f32,
    /// Vertical field of view after clamping, in degrees.
    pub vertical_fov: f32,
}

impl DerivedGeometry {
    /// Derive output and face geometry from the configuration.
    pub fn derive(cfg: &CaptureConfig) -> Self {
        let width = cfg.width.max(1);
        let w = f64::from(width);
        let h_fov = clamp_fov(cfg.horizontal_fov, 360.0);
        let v_fov = clamp_fov(cfg.vertical_fov, 180.0);
        let overlap = clamp_overlap(cfg.overlap);

        let full_width = (w * 360.0 / f64::from(h_fov)).min(8.0 * w);
        let suggested_height = full_width / 2.0 * f64::from(v_fov) / 180.0;

        let height = match cfg.height {
            Some(h) if h > 0 => h,
            _ => (suggested_height as u32).max(1),
        };
        let face_size = match cfg.cube_face_size {
            Some(s) if s > 0 => s,
            _ => ((full_width / 4.0 * (1.0 + 2.0 * f64::from(overlap))).floor() as u32).max(1),
        };

        Self {
            full_width,
            suggested_height,
            width,
            height,
            face_size,
            overlap,
            horizontal_fov: h_fov,
            vertical_fov: v_fov,
        }
    }

    /// Field of view each face is rendered with, in degrees.
    ///
    /// Wider than 90° so adjacent faces share an overlap margin.
    pub fn face_fov_deg(&self) -> f32 {
        (2.0 * (1.0 + self.overlap).atan()).to_degrees()
    }

    /// Scale from cube-plane coordinates to face-image coordinates, `1 / (1 + overlap)`.
    pub fn beta(&self) -> f32 {
        1.0 / (1.0 + self.overlap)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/geometry.rs"]
mod tests;
