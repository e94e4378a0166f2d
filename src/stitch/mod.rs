//! Cube-to-panorama stitching: face sampling, seam blending and the equirectangular remap.

/// Seam-smoothing and dual-cube merge weights.
pub mod blend;
/// Equirectangular compositor and output buffer.
pub mod equirect;
/// Face texture sampling.
pub mod sampler;
