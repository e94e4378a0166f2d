use image::DynamicImage;
use rayon::prelude::*;

use crate::capture::cube::{CubeFace, FaceSet};
use crate::config::capture::CaptureConfig;
use crate::config::geometry::DerivedGeometry;
use crate::foundation::core::{ColorFormat, alloc_rgba};
use crate::foundation::error::{PanoError, PanoResult};
use crate::foundation::math::{Mat3, Quat, Vec3};
use crate::stitch::blend::{DualMerge, face_weight, merge_weights};
use crate::stitch::sampler::{Rgba, SampleFilter, sample};

/// Overlay colors for face boundaries of the primary and secondary cube.
pub const SEAM_LINE_COLORS: [Rgba; 2] = [[1.0, 0.0, 0.0, 1.0], [0.0, 1.0, 0.0, 1.0]];

/// Output panorama, `width x height` RGBA floats in row-major order.
#[derive(Clone, Debug, PartialEq)]
pub struct EquirectBuffer {
    width: u32,
    height: u32,
    format: ColorFormat,
    data: Vec<f32>,
}

impl Default for EquirectBuffer {
    /// Single black LOW pixel, a placeholder until the first real allocation.
    fn default() -> Self {
        Self {
            width: 1,
            height: 1,
            format: ColorFormat::Low,
            data: vec![0.0; 4],
        }
    }
}

impl EquirectBuffer {
    /// Allocate a black buffer.
    ///
    /// Fails with [`PanoError::Render`] when the buffer cannot be allocated.
    pub fn new(width: u32, height: u32, format: ColorFormat) -> PanoResult<Self> {
        let (width, height) = (width.max(1), height.max(1));
        Ok(Self {
            width,
            height,
            format,
            data: alloc_rgba(width, height)?,
        })
    }

    /// Reallocate when size or format differ. Returns `true` when a new buffer was made.
    ///
    /// On an allocation failure the buffer is left as it was.
    pub fn ensure(&mut self, width: u32, height: u32, format: ColorFormat) -> PanoResult<bool> {
        if self.width == width.max(1) && self.height == height.max(1) && self.format == format {
            return Ok(false);
        }
        *self = Self::new(width, height, format)?;
        Ok(true)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Color format of the stored values.
    pub fn format(&self) -> ColorFormat {
        self.format
    }

    /// Pixel at `(x, y)`; row 0 is the top of the panorama.
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Raw RGBA floats.
    pub fn as_raw(&self) -> &[f32] {
        &self.data
    }

    /// Convert into an encodable image: 8-bit RGB for LOW, 32-bit float RGBA for HIGH.
    pub fn to_dynamic_image(&self) -> PanoResult<DynamicImage> {
        match self.format {
            ColorFormat::Low => {
                let bytes = self
                    .data
                    .chunks_exact(4)
                    .flat_map(|p| [quantize(p[0]), quantize(p[1]), quantize(p[2])])
                    .collect();
                image::RgbImage::from_raw(self.width, self.height, bytes)
                    .map(DynamicImage::ImageRgb8)
                    .ok_or_else(|| PanoError::encode("rgb8 buffer size mismatch"))
            }
            ColorFormat::High => {
                image::Rgba32FImage::from_raw(self.width, self.height, self.data.clone())
                    .map(DynamicImage::ImageRgba32F)
                    .ok_or_else(|| PanoError::encode("rgba32f buffer size mismatch"))
            }
        }
    }
}

fn quantize(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Compositor settings for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StitchParams {
    /// Horizontal coverage of the panorama in radians.
    pub horizontal_fov: f32,
    /// Vertical coverage of the panorama in radians.
    pub vertical_fov: f32,
    /// Face overlap fraction the faces were rendered with.
    pub overlap: f32,
    /// Blend neighbouring faces inside the overlap margin.
    pub smooth: bool,
    /// Draw face boundaries.
    pub seam_lines: bool,
    /// Face texture filter.
    pub filter: SampleFilter,
    /// Dual-cube merge policy.
    pub merge: DualMerge,
    /// Output color format.
    pub format: ColorFormat,
}

impl StitchParams {
    /// Settings matching a configuration and its derived geometry.
    pub fn from_config(cfg: &CaptureConfig, geom: &DerivedGeometry) -> Self {
        Self {
            horizontal_fov: geom.horizontal_fov.to_radians(),
            vertical_fov: geom.vertical_fov.to_radians(),
            overlap: geom.overlap,
            smooth: cfg.smooth_stitching_active(),
            seam_lines: cfg.show_seam_lines,
            filter: cfg.filter,
            merge: cfg.dual_merge,
            format: cfg.format,
        }
    }

    fn extent(&self) -> f32 {
        1.0 + self.overlap
    }

    fn beta(&self) -> f32 {
        1.0 / (1.0 + self.overlap)
    }
}

/// One captured cube and the rotation from camera space into its cube space.
#[derive(Clone, Copy, Debug)]
pub struct CubeView<'a> {
    /// Rendered faces.
    pub faces: &'a FaceSet,
    /// Camera-to-cube rotation.
    pub to_cube: Quat,
}

/// Result of sampling one cube in one direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubeSample {
    /// Sampled (and possibly seam-blended) color.
    pub color: Rgba,
    /// Largest absolute cube-plane coordinate on the dominant face: 0 at its centre, 1 on a seam.
    pub edge: f32,
}

/// Longitude of output column `i` in radians; positive to the viewer's right.
pub fn longitude(i: u32, width: u32, horizontal_fov: f32) -> f32 {
    ((i as f32 + 0.5) / width as f32 - 0.5) * horizontal_fov
}

/// Latitude of output row `j` in radians; positive upward, row 0 at the top.
pub fn latitude(j: u32, height: u32, vertical_fov: f32) -> f32 {
    (0.5 - (j as f32 + 0.5) / height as f32) * vertical_fov
}

/// Camera-space unit direction for given `(sin, cos)` pairs of longitude and latitude.
pub fn direction(lon: (f32, f32), lat: (f32, f32)) -> Vec3 {
    let (slon, clon) = lon;
    let (slat, clat) = lat;
    Vec3::new(-clat * slon, slat, clat * clon)
}

/// Camera-space direction of output pixel `(i, j)`.
pub fn pixel_direction(i: u32, j: u32, width: u32, height: u32, params: &StitchParams) -> Vec3 {
    direction(
        longitude(i, width, params.horizontal_fov).sin_cos(),
        latitude(j, height, params.vertical_fov).sin_cos(),
    )
}

/// Maps captured cube faces onto an equirectangular panorama.
#[derive(Clone, Copy, Debug)]
pub struct EquirectCompositor {
    params: StitchParams,
}

impl EquirectCompositor {
    /// Create a compositor.
    pub fn new(params: StitchParams) -> Self {
        Self { params }
    }

    /// Settings in use.
    pub fn params(&self) -> &StitchParams {
        &self.params
    }

    /// Fill `out` from one cube, or from two cubes when double rendering.
    ///
    /// Every output pixel is computed independently, so rows are processed in parallel.
    #[tracing::instrument(skip_all, fields(width = out.width(), height = out.height(), cubes = cubes.len()))]
    pub fn composite(&self, cubes: &[CubeView<'_>], out: &mut EquirectBuffer) -> PanoResult<()> {
        if cubes.is_empty() || cubes.len() > 2 {
            return Err(PanoError::validation(format!(
                "compositing needs one or two cubes, got {}",
                cubes.len()
            )));
        }
        if out.format != self.params.format {
            return Err(PanoError::validation(
                "output buffer format does not match stitch settings",
            ));
        }

        let (w, h) = (out.width, out.height);
        let lon: Vec<(f32, f32)> = (0..w)
            .map(|i| longitude(i, w, self.params.horizontal_fov).sin_cos())
            .collect();
        let lat: Vec<(f32, f32)> = (0..h)
            .map(|j| latitude(j, h, self.params.vertical_fov).sin_cos())
            .collect();
        let views: Vec<(Mat3, &FaceSet)> = cubes
            .iter()
            .map(|c| (Mat3::from_quat(c.to_cube), c.faces))
            .collect();

        out.data
            .par_chunks_mut(w as usize * 4)
            .zip(lat.par_iter())
            .for_each(|(row, &lat)| {
                for (px, &lon) in row.chunks_exact_mut(4).zip(&lon) {
                    let color = self.shade(direction(lon, lat), &views);
                    px.copy_from_slice(&self.finish(color));
                }
            });
        Ok(())
    }

    /// Color seen along camera-space direction `dir`.
    fn shade(&self, dir: Vec3, views: &[(Mat3, &FaceSet)]) -> Rgba {
        let mut samples = [CubeSample {
            color: [0.0; 4],
            edge: 0.0,
        }; 2];
        for (k, (to_cube, faces)) in views.iter().enumerate().take(2) {
            samples[k] = self.sample_cube(*to_cube * dir, faces);
        }

        let mut color = if views.len() == 2 {
            let (w0, w1) = merge_weights(self.params.merge, samples[0].edge, samples[1].edge);
            mix(samples[0].color, w0, samples[1].color, w1)
        } else {
            samples[0].color
        };

        if self.params.seam_lines {
            for (k, (_, faces)) in views.iter().enumerate().take(2) {
                // One face texel in cube-plane units; marked on both sides of the seam.
                let width = 2.0 * self.params.extent() / faces.size() as f32;
                if samples[k].edge >= 1.0 - width {
                    color = SEAM_LINE_COLORS[k];
                }
            }
        }
        color
    }

    /// Sample one cube along cube-space direction `dir`.
    pub fn sample_cube(&self, dir: Vec3, faces: &FaceSet) -> CubeSample {
        let dominant = CubeFace::dominant(dir);
        let (x, y) = plane_coords(dir, dominant);
        let edge = x.abs().max(y.abs());

        let beta = self.params.beta();
        let direct = || sample(faces.face(dominant), x * beta, y * beta, self.params.filter);
        if !self.params.smooth {
            return CubeSample {
                color: direct(),
                edge,
            };
        }

        let extent = self.params.extent();
        let mut acc = [0.0f32; 4];
        let mut total = 0.0f32;
        for face in CubeFace::ALL {
            if dir.dot(face.basis().forward) <= 0.0 {
                continue;
            }
            let (fx, fy) = plane_coords(dir, face);
            let w = face_weight(fx, fy, extent);
            if w <= 0.0 {
                continue;
            }
            let c = sample(faces.face(face), fx * beta, fy * beta, self.params.filter);
            for i in 0..4 {
                acc[i] += c[i] * w;
            }
            total += w;
        }

        let color = if total > 0.0 {
            acc.map(|v| v / total)
        } else {
            direct()
        };
        CubeSample { color, edge }
    }

    fn finish(&self, c: Rgba) -> Rgba {
        match self.params.format {
            ColorFormat::Low => c.map(|v| v.clamp(0.0, 1.0)),
            ColorFormat::High => c,
        }
    }
}

/// Coordinates of `dir` on the plane of `face` at unit distance (±1 on the cube edges).
pub fn plane_coords(dir: Vec3, face: CubeFace) -> (f32, f32) {
    let b = face.basis();
    let a = dir.dot(b.forward);
    (dir.dot(b.right) / a, dir.dot(b.up) / a)
}

fn mix(a: Rgba, wa: f32, b: Rgba, wb: f32) -> Rgba {
    [
        a[0] * wa + b[0] * wb,
        a[1] * wa + b[1] * wb,
        a[2] * wa + b[2] * wb,
        a[3] * wa + b[3] * wb,
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/stitch/equirect.rs"]
mod tests;
