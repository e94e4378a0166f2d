//! panorec records 360° panoramic image sequences from a single-viewpoint renderer.
//!
//! Each output frame is produced in three stages:
//!
//! - Capture six cube faces (or twelve, with double rendering) by re-orienting a [`Camera`]
//! - Stitch the faces into one equirectangular panorama with [`EquirectCompositor`]
//! - Hand the panorama to a [`FrameWriter`] as `{prefix}{frame}.png` or `.exr`
//!
//! A [`CaptureSession`] drives these stages once per host tick and signals the host when the
//! configured frame window is exhausted.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Cube-face capture through a host camera.
pub mod capture;
/// Capture configuration and derived geometry.
pub mod config;
/// Frame writers.
pub mod encode;
/// Built-in procedural renderer.
pub mod render;
/// Per-tick capture sequencing.
pub mod session;
/// Cube-to-equirectangular stitching.
pub mod stitch;

pub use crate::foundation::core::{ColorFormat, Fps, FrameIndex};
pub use crate::foundation::error::{PanoError, PanoResult};
pub use crate::foundation::math::{
    Euler, Mat3, Quat, Vec3, forward, relative_rotation, right, rotate_local, up,
};

pub use crate::capture::camera::{Camera, CameraLease, CameraState, TargetDesc};
pub use crate::capture::cube::{CubeFace, CubeSlot, FaceImage, FaceSet};
pub use crate::capture::rig::capture_cube;
pub use crate::config::capture::{CaptureConfig, OrientationSpace, StitchingOrientation};
pub use crate::config::geometry::DerivedGeometry;
pub use crate::encode::sink::{FrameWriter, ImageFileWriter, InMemoryWriter};
pub use crate::render::procedural::{ProceduralCamera, ProceduralScene};
pub use crate::session::sequencer::{
    CaptureSession, FrameAction, HostSignal, RunStats, SessionState, TickReport, run_capture,
};
pub use crate::stitch::blend::DualMerge;
pub use crate::stitch::equirect::{CubeView, EquirectBuffer, EquirectCompositor, StitchParams};
pub use crate::stitch::sampler::SampleFilter;
