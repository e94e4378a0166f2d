use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::config::geometry::DerivedGeometry;
use crate::foundation::core::{ColorFormat, Fps, FrameIndex};
use crate::foundation::error::{PanoError, PanoResult};
use crate::foundation::math::{Euler, Quat};
use crate::stitch::blend::DualMerge;
use crate::stitch::sampler::SampleFilter;

/// Smallest field of view accepted by the geometry, in degrees.
pub const MIN_FOV_DEG: f32 = 1e-3;
/// Largest overlap fraction accepted by the geometry.
pub const MAX_OVERLAP: f32 = 0.99;
/// Supported range of output filename digits.
pub const DIGITS_RANGE: std::ops::RangeInclusive<u32> = 1..=7;

/// Space in which a stitching orientation is expressed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrientationSpace {
    /// Fixed in the world; seams stay put while the camera turns.
    #[default]
    World,
    /// Relative to the capturing camera, as if parented to it.
    Camera,
}

/// Reference frame the capture cube is aligned to instead of the raw camera axes.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StitchingOrientation {
    /// Orientation of the reference frame.
    pub rotation: Euler,
    /// Space `rotation` is expressed in.
    pub space: OrientationSpace,
}

impl StitchingOrientation {
    /// World-space rotation of the reference for a camera currently at `camera`.
    pub fn resolve(&self, camera: Quat) -> Quat {
        match self.space {
            OrientationSpace::World => self.rotation.to_quat(),
            OrientationSpace::Camera => (camera * self.rotation.to_quat()).normalize(),
        }
    }
}

/// One consistent snapshot of the capture settings.
///
/// A fresh value is handed to the sequencer on every tick; nothing in the core mutates it.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaptureConfig {
    /// Simulated frames per second (fixed time step between ticks).
    pub frame_rate: u32,
    /// Output color format.
    pub format: ColorFormat,
    /// Output path prefix: a directory (trailing separator) or a filename stem.
    pub prefix: String,
    /// Zero-padded digits in output file names.
    pub digits: u32,
    /// Overwrite frames that already exist on disk.
    pub overwrite: bool,
    /// Output width in pixels.
    pub width: u32,
    /// Explicit output height; derived from the field of view when `None`.
    pub height: Option<u32>,
    /// First frame that is actually captured; earlier ticks only advance time.
    pub start_frame: u64,
    /// Last frame to capture.
    pub end_frame: Option<u64>,
    /// Horizontal field of view of the panorama in degrees, `(0, 360]`.
    pub horizontal_fov: f32,
    /// Vertical field of view of the panorama in degrees, `(0, 180]`.
    pub vertical_fov: f32,
    /// Fractional widening of each cube face, `[0, 1)`.
    pub overlap: f32,
    /// Optional frame the capture cube is aligned to.
    pub stitching_orientation: Option<StitchingOrientation>,
    /// Draw face boundaries into the output (debug aid).
    pub show_seam_lines: bool,
    /// Explicit cube face resolution; derived when `None`.
    pub cube_face_size: Option<u32>,
    /// Capture a second cube rotated away from the first and merge both.
    pub double_render: bool,
    /// Blend neighbouring faces inside the overlap margin.
    pub smooth_stitching: bool,
    /// Texture filter used when sampling faces.
    pub filter: SampleFilter,
    /// How the two cubes of a double render are merged.
    pub dual_merge: DualMerge,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            frame_rate: 30,
            format: ColorFormat::Low,
            prefix: "Recordings/".to_string(),
            digits: 4,
            overwrite: false,
            width: 1024,
            height: None,
            start_frame: 0,
            end_frame: None,
            horizontal_fov: 360.0,
            vertical_fov: 180.0,
            overlap: 0.5,
            stitching_orientation: None,
            show_seam_lines: false,
            cube_face_size: None,
            double_render: false,
            smooth_stitching: true,
            filter: SampleFilter::Bilinear,
            dual_merge: DualMerge::SeamWeighted,
        }
    }
}

impl CaptureConfig {
    /// Parse a configuration from JSON text. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> PanoResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| PanoError::validation(format!("invalid capture config: {e}")))
    }

    /// Load a configuration from a JSON file.
    pub fn from_path(path: &Path) -> PanoResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read capture config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Return a copy with every field clamped into its supported range.
    ///
    /// Each adjusted field is reported once as a warning. This never fails.
    pub fn sanitized(&self) -> Self {
        let mut c = self.clone();
        if c.frame_rate == 0 {
            tracing::warn!("frame_rate must be > 0, using 1");
            c.frame_rate = 1;
        }
        if c.width == 0 {
            tracing::warn!("width must be > 0, using 1");
            c.width = 1;
        }
        if c.height == Some(0) {
            tracing::warn!("explicit height must be > 0, using 1");
            c.height = Some(1);
        }
        if c.cube_face_size == Some(0) {
            tracing::warn!("cube_face_size must be > 0, using 1");
            c.cube_face_size = Some(1);
        }
        if !DIGITS_RANGE.contains(&c.digits) {
            let d = c.digits.clamp(*DIGITS_RANGE.start(), *DIGITS_RANGE.end());
            tracing::warn!(digits = c.digits, clamped = d, "digits out of range");
            c.digits = d;
        }
        let h = clamp_fov(c.horizontal_fov, 360.0);
        if h != c.horizontal_fov {
            tracing::warn!(fov = c.horizontal_fov, clamped = h, "horizontal_fov out of range");
            c.horizontal_fov = h;
        }
        let v = clamp_fov(c.vertical_fov, 180.0);
        if v != c.vertical_fov {
            tracing::warn!(fov = c.vertical_fov, clamped = v, "vertical_fov out of range");
            c.vertical_fov = v;
        }
        let ov = clamp_overlap(c.overlap);
        if ov != c.overlap {
            tracing::warn!(overlap = c.overlap, clamped = ov, "overlap out of range");
            c.overlap = ov;
        }
        if c.smooth_stitching && c.overlap <= 0.0 {
            tracing::debug!("smooth_stitching has no effect without overlap");
        }
        c
    }

    /// Simulated frame rate.
    pub fn fps(&self) -> PanoResult<Fps> {
        Fps::new(self.frame_rate, 1)
    }

    /// Number of cubes captured per frame.
    pub fn cube_count(&self) -> usize {
        if self.double_render { 2 } else { 1 }
    }

    /// Whether faces are blended inside their overlap margin.
    pub fn smooth_stitching_active(&self) -> bool {
        self.smooth_stitching && clamp_overlap(self.overlap) > 0.0
    }

    /// Last frame index that will be captured.
    ///
    /// The filename digit budget bounds this regardless of `end_frame`.
    pub fn max_frame(&self) -> FrameIndex {
        let digits = self
            .digits
            .clamp(*DIGITS_RANGE.start(), *DIGITS_RANGE.end());
        let representable = 10u64.pow(digits) - 1;
        FrameIndex(self.end_frame.map_or(representable, |e| e.min(representable)))
    }

    /// Prefix resolved against `project_root` unless it is already absolute.
    pub fn absolute_prefix(&self, project_root: &Path) -> String {
        if Path::new(&self.prefix).is_absolute() {
            return self.prefix.clone();
        }
        let root = project_root.to_string_lossy();
        let root = root.trim_end_matches(['/', '\\']);
        if root.is_empty() {
            self.prefix.clone()
        } else {
            format!("{root}/{}", self.prefix)
        }
    }

    /// Output path of `frame`: `{prefix}{frame:0digits}.{ext}`.
    pub fn frame_path(&self, project_root: &Path, frame: FrameIndex) -> PathBuf {
        let digits = self
            .digits
            .clamp(*DIGITS_RANGE.start(), *DIGITS_RANGE.end()) as usize;
        PathBuf::from(format!(
            "{}{:0digits$}.{}",
            self.absolute_prefix(project_root),
            frame.0,
            self.format.extension(),
        ))
    }

    /// Human-readable overview of what a run with this configuration will do.
    pub fn summary(&self, project_root: &Path) -> String {
        let geom = DerivedGeometry::derive(self);
        format!(
            "Output file: {}\nOutput size: {}x{}\nNumber of renders: {} x {}px\nRender from frame {} to frame {}",
            self.frame_path(project_root, FrameIndex(0)).display(),
            geom.width,
            geom.height,
            6 * self.cube_count(),
            geom.face_size,
            self.start_frame,
            self.max_frame(),
        )
    }
}

pub(crate) fn clamp_fov(deg: f32, max: f32) -> f32 {
    if deg.is_nan() {
        return max;
    }
    deg.clamp(MIN_FOV_DEG, max)
}

pub(crate) fn clamp_overlap(ov: f32) -> f32 {
    if ov.is_nan() {
        return 0.0;
    }
    ov.clamp(0.0, MAX_OVERLAP)
}

#[cfg(test)]
#[path = "../../tests/unit/config/capture.rs"]
mod tests;
