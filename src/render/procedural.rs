use std::path::Path;

use anyhow::Context as _;
use rayon::prelude::*;

use crate::capture::camera::{Camera, CameraState, TargetDesc};
use crate::capture::cube::FaceImage;
use crate::foundation::core::ColorFormat;
use crate::foundation::error::{PanoError, PanoResult};
use crate::foundation::math::{Quat, Vec3, forward, right, up};
use crate::stitch::sampler::Rgba;

const AMBIENT: f32 = 0.15;

/// Directional light with a visible disc and a broad halo in the sky.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Sun {
    /// Heading in degrees, measured from +Z toward +X.
    pub azimuth_deg: f32,
    /// Height above the horizon in degrees.
    pub elevation_deg: f32,
    /// Heading change per second of scene time.
    pub speed_deg_per_sec: f32,
    /// Linear radiance multiplier.
    pub intensity: f32,
    /// Linear light color.
    pub color: Vec3,
    /// Disc radius in degrees; 0 hides the disc.
    pub angular_radius_deg: f32,
    /// Strength of the halo around the sun.
    pub glow: f32,
}

impl Default for Sun {
    fn default() -> Self {
        Self {
            azimuth_deg: 30.0,
            elevation_deg: 35.0,
            speed_deg_per_sec: 0.0,
            intensity: 3.0,
            color: Vec3::new(1.0, 0.95, 0.85),
            angular_radius_deg: 2.0,
            glow: 0.5,
        }
    }
}

/// Checkered ground plane.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Ground {
    /// World-space height of the plane.
    pub height: f32,
    /// Checker tile edge length.
    pub tile_size: f32,
    /// The two alternating albedos.
    pub colors: [Vec3; 2],
    /// Exponential distance fog density toward the horizon color.
    pub fog: f32,
}

impl Default for Ground {
    fn default() -> Self {
        Self {
            height: -1.5,
            tile_size: 1.0,
            colors: [Vec3::splat(0.25), Vec3::splat(0.75)],
            fog: 0.03,
        }
    }
}

/// Diffuse sphere.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Sphere {
    /// World-space centre.
    pub center: Vec3,
    /// Radius.
    pub radius: f32,
    /// Albedo.
    pub color: Vec3,
}

/// Scene drawn by [`ProceduralCamera`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProceduralScene {
    /// Sky color straight up.
    pub sky_zenith: Vec3,
    /// Sky color at the horizon.
    pub sky_horizon: Vec3,
    /// The sun.
    pub sun: Sun,
    /// Optional ground plane.
    pub ground: Option<Ground>,
    /// Objects around the viewpoint.
    pub spheres: Vec<Sphere>,
    /// Screen-space darkening toward image corners, applied per rendered image.
    pub vignette: f32,
}

impl Default for ProceduralScene {
    fn default() -> Self {
        Self {
            sky_zenith: Vec3::new(0.12, 0.3, 0.75),
            sky_horizon: Vec3::new(0.65, 0.75, 0.9),
            sun: Sun::default(),
            ground: Some(Ground::default()),
            spheres: vec![
                Sphere {
                    center: Vec3::new(0.0, 0.0, 5.0),
                    radius: 1.0,
                    color: Vec3::new(0.8, 0.2, 0.2),
                },
                Sphere {
                    center: Vec3::new(4.0, -0.5, 0.0),
                    radius: 1.0,
                    color: Vec3::new(0.2, 0.7, 0.3),
                },
                Sphere {
                    center: Vec3::new(-3.0, 1.0, -3.0),
                    radius: 1.2,
                    color: Vec3::new(0.25, 0.35, 0.85),
                },
            ],
            vignette: 0.0,
        }
    }
}

impl ProceduralScene {
    /// Parse a scene from JSON text.
    pub fn from_json_str(json: &str) -> PanoResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| PanoError::validation(format!("invalid scene: {e}")))
    }

    /// Load a scene from a JSON file.
    pub fn from_path(path: &Path) -> PanoResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read scene '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Unit direction toward the sun at scene time `time_s`.
    pub fn sun_direction(&self, time_s: f64) -> Vec3 {
        let az = (self.sun.azimuth_deg as f64 + self.sun.speed_deg_per_sec as f64 * time_s)
            .to_radians() as f32;
        let el = self.sun.elevation_deg.to_radians();
        Vec3::new(el.cos() * az.sin(), el.sin(), el.cos() * az.cos())
    }

    /// Linear radiance arriving at `origin` from world direction `dir`.
    pub fn radiance(&self, origin: Vec3, dir: Vec3, sun_dir: Vec3) -> Vec3 {
        let light = self.sun.color * self.sun.intensity;

        let mut nearest = f32::INFINITY;
        let mut hit = None;
        for s in &self.spheres {
            if let Some(t) = intersect_sphere(origin, dir, s) {
                if t < nearest {
                    nearest = t;
                    hit = Some(s);
                }
            }
        }
        if let Some(s) = hit {
            let n = (origin + dir * nearest - s.center).normalize_or_zero();
            let lambert = n.dot(sun_dir).max(0.0);
            return s.color * (Vec3::splat(AMBIENT) + light * lambert);
        }

        if let Some(g) = &self.ground {
            if dir.y < 0.0 {
                let t = (g.height - origin.y) / dir.y;
                if t > 0.0 {
                    let p = origin + dir * t;
                    let tile = g.tile_size.max(1e-3);
                    let cell = (p.x / tile).floor() as i64 + (p.z / tile).floor() as i64;
                    let albedo = g.colors[cell.rem_euclid(2) as usize];
                    let lit = albedo * (Vec3::splat(AMBIENT) + light * sun_dir.y.max(0.0));
                    let fog = 1.0 - (-t * g.fog.max(0.0)).exp();
                    return lit.lerp(self.sky_horizon, fog);
                }
            }
        }

        self.sky(dir, sun_dir)
    }

    fn sky(&self, dir: Vec3, sun_dir: Vec3) -> Vec3 {
        let h = dir.y.max(0.0).sqrt();
        let mut c = self.sky_horizon.lerp(self.sky_zenith, h);
        let cos = dir.dot(sun_dir);
        c += self.sun.color * self.sun.glow * cos.max(0.0).powi(8);
        if self.sun.angular_radius_deg > 0.0
            && cos >= self.sun.angular_radius_deg.to_radians().cos()
        {
            c += self.sun.color * self.sun.intensity;
        }
        c
    }
}

fn intersect_sphere(origin: Vec3, dir: Vec3, s: &Sphere) -> Option<f32> {
    let oc = origin - s.center;
    let b = oc.dot(dir);
    let c = oc.length_squared() - s.radius * s.radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let root = disc.sqrt();
    [-b - root, -b + root].into_iter().find(|&t| t > 1e-4)
}

/// Map linear radiance to stored values: tone-mapped sRGB for LOW, untouched for HIGH.
pub fn encode_radiance(c: Vec3, format: ColorFormat) -> Rgba {
    if format.is_linear() {
        return [c.x, c.y, c.z, 1.0];
    }
    let m = |v: f32| {
        let v = v.max(0.0);
        linear_to_srgb(v / (1.0 + v))
    };
    [m(c.x), m(c.y), m(c.z), 1.0]
}

fn linear_to_srgb(v: f32) -> f32 {
    if v <= 0.003_130_8 {
        v * 12.92
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}

/// Deterministic software camera: a ray caster over a [`ProceduralScene`].
///
/// Used by the command-line tool and tests in place of a host engine.
#[derive(Clone, Debug)]
pub struct ProceduralCamera {
    scene: ProceduralScene,
    position: Vec3,
    rotation: Quat,
    fov_y_deg: f32,
    target: Option<TargetDesc>,
    time_s: f64,
    renders: u64,
}

impl ProceduralCamera {
    /// Camera at the origin looking along +Z with a 60 degree field of view.
    pub fn new(scene: ProceduralScene) -> Self {
        Self {
            scene,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            fov_y_deg: 60.0,
            target: None,
            time_s: 0.0,
            renders: 0,
        }
    }

    /// Move the viewpoint.
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Scene being drawn.
    pub fn scene(&self) -> &ProceduralScene {
        &self.scene
    }

    /// Viewpoint.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Advance scene time.
    pub fn set_time(&mut self, time_s: f64) {
        self.time_s = time_s;
    }

    /// Current scene time in seconds.
    pub fn time_s(&self) -> f64 {
        self.time_s
    }

    /// Number of images rendered so far.
    pub fn render_count(&self) -> u64 {
        self.renders
    }

    /// Stored value seen along world direction `dir`, without screen-space effects.
    pub fn look(&self, dir: Vec3, format: ColorFormat) -> Rgba {
        let sun = self.scene.sun_direction(self.time_s);
        encode_radiance(self.scene.radiance(self.position, dir.normalize(), sun), format)
    }
}

impl Camera for ProceduralCamera {
    fn state(&self) -> CameraState {
        CameraState {
            rotation: self.rotation,
            fov_y_deg: self.fov_y_deg,
            target: self.target,
        }
    }

    fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
    }

    fn set_fov_y_deg(&mut self, fov_y_deg: f32) {
        self.fov_y_deg = fov_y_deg;
    }

    fn set_target(&mut self, target: Option<TargetDesc>) {
        self.target = target;
    }

    fn render(&mut self, out: &mut FaceImage) -> PanoResult<()> {
        let (w, h) = out.dimensions();
        if let Some(t) = self.target {
            if (t.width, t.height) != (w, h) {
                return Err(PanoError::render(format!(
                    "target is {}x{}, output image is {w}x{h}",
                    t.width, t.height
                )));
            }
        }
        if w == 0 || h == 0 {
            return Err(PanoError::render("cannot render into an empty image"));
        }
        let format = self.target.map_or(ColorFormat::Low, |t| t.format);

        let half = (self.fov_y_deg.to_radians() * 0.5).tan();
        let aspect = w as f32 / h as f32;
        let (f, r, u) = (
            forward(self.rotation),
            right(self.rotation),
            up(self.rotation),
        );
        let sun = self.scene.sun_direction(self.time_s);
        let scene = &self.scene;
        let origin = self.position;

        out.par_chunks_mut(w as usize * 4)
            .enumerate()
            .for_each(|(j, row)| {
                let sy = 1.0 - 2.0 * (j as f32 + 0.5) / h as f32;
                for (i, px) in row.chunks_exact_mut(4).enumerate() {
                    let sx = 2.0 * (i as f32 + 0.5) / w as f32 - 1.0;
                    let dir = (f + r * (sx * half * aspect) + u * (sy * half)).normalize();
                    let mut c = scene.radiance(origin, dir, sun);
                    if scene.vignette > 0.0 {
                        let fall = 1.0 - scene.vignette * 0.5 * (sx * sx + sy * sy);
                        c *= fall.max(0.0);
                    }
                    px.copy_from_slice(&encode_radiance(c, format));
                }
            });

        self.renders += 1;
        tracing::trace!(w, h, fov = self.fov_y_deg, "procedural render");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/procedural.rs"]
mod tests;
