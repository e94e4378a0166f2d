use crate::foundation::error::{PanoError, PanoResult};

/// Absolute 0-based frame index of a capture run.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

impl FrameIndex {
    /// Index of the following frame (saturating).
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl std::fmt::Display for FrameIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> PanoResult<Self> {
        if den == 0 {
            return Err(PanoError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(PanoError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Simulated time at the start of `frame`.
    ///
    /// Capture runs advance scene time by a fixed step per tick, so this is exact regardless of
    /// how long a tick took to render.
    pub fn frames_to_secs(self, frame: FrameIndex) -> f64 {
        (frame.0 as f64) * self.frame_duration_secs()
    }
}

/// Zeroed RGBA float storage for a `width x height` image.
///
/// Sizes that overflow or that the allocator refuses come back as [`PanoError::Render`], so a
/// capture run ends with an error instead of aborting the host.
pub(crate) fn alloc_rgba(width: u32, height: u32) -> PanoResult<Vec<f32>> {
    let len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| {
            PanoError::render(format!("{width}x{height} render target overflows memory"))
        })?;
    let mut data = Vec::new();
    data.try_reserve_exact(len).map_err(|e| {
        PanoError::render(format!("cannot allocate {width}x{height} render target: {e}"))
    })?;
    data.resize(len, 0.0);
    Ok(data)
}

/// Output color format of a capture run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorFormat {
    /// 8-bit display-referred output, written as PNG.
    #[default]
    #[serde(alias = "png")]
    Low,
    /// 32-bit float linear output, written as OpenEXR.
    #[serde(alias = "exr")]
    High,
}

impl ColorFormat {
    /// File extension (without dot) used for frames of this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Low => "png",
            Self::High => "exr",
        }
    }

    /// Whether renderers should deliver linear radiance instead of tone-mapped values.
    pub fn is_linear(self) -> bool {
        matches!(self, Self::High)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
