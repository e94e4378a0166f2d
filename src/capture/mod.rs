//! Cube-face capture: face layout, camera leasing and the per-cube render sequence.

/// Camera abstraction and scoped leasing.
pub mod camera;
/// Cube faces, capture order and face storage.
pub mod cube;
/// Six-face capture of one cube.
pub mod rig;
