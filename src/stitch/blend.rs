//! Blend weights for seam smoothing and dual-cube merging.
//!
//! Both weightings are continuous in the sampling direction, so outputs stay C0 across seams
//! even though the per-face images are shaded independently.

/// How the two cubes of a double render are combined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DualMerge {
    /// Equal-weight average of both cubes.
    Average,
    /// Favour the cube whose nearest seam is further away.
    #[default]
    SeamWeighted,
}

/// Weight of a face along one image axis.
///
/// `c` is the absolute cube-plane coordinate (1 on the cube edge) and `extent` the half-size of
/// the rendered face (`1 + overlap`). The weight is 1 well inside the face, exactly 0.5 on the
/// cube edge and falls to 0 where the rendered image ends. For a direction crossing one seam,
/// the coordinates on the two faces are reciprocal, so their weights sum to 1.
pub fn axis_weight(c: f32, extent: f32) -> f32 {
    if extent <= 1.0 {
        return if c <= 1.0 { 1.0 } else { 0.0 };
    }
    if c <= f32::MIN_POSITIVE {
        return 1.0;
    }
    (0.5 - c.ln() / (2.0 * extent.ln())).clamp(0.0, 1.0)
}

/// Weight of a face for a sample at cube-plane coordinates `(x, y)`.
pub fn face_weight(x: f32, y: f32, extent: f32) -> f32 {
    axis_weight(x.abs(), extent) * axis_weight(y.abs(), extent)
}

/// Normalised weights of the primary and secondary cube samples.
///
/// `edge0`/`edge1` are the largest absolute cube-plane coordinate of each cube's dominant face:
/// 0 at a face centre, 1 on a seam.
pub fn merge_weights(merge: DualMerge, edge0: f32, edge1: f32) -> (f32, f32) {
    match merge {
        DualMerge::Average => (0.5, 0.5),
        DualMerge::SeamWeighted => {
            let w0 = (1.0 - edge0).clamp(0.0, 1.0);
            let w1 = (1.0 - edge1).clamp(0.0, 1.0);
            let sum = w0 + w1;
            if sum <= 1e-6 {
                (0.5, 0.5)
            } else {
                (w0 / sum, w1 / sum)
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stitch/blend.rs"]
mod tests;
