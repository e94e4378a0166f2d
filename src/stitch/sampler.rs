use crate::capture::cube::FaceImage;

/// RGBA sample in face storage units.
pub type Rgba = [f32; 4];

/// Texture filter used when reading a face.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleFilter {
    /// Closest texel.
    Nearest,
    /// Weighted average of the four closest texels.
    #[default]
    Bilinear,
}

/// Sample `img` at image-plane coordinates `(s, t)`.
///
/// `s` runs from -1 (left edge) to 1 (right edge) and `t` from -1 (bottom) to 1 (top).
/// Coordinates outside the image clamp to the border.
pub fn sample(img: &FaceImage, s: f32, t: f32, filter: SampleFilter) -> Rgba {
    let (w, h) = img.dimensions();
    let fx = (s + 1.0) * 0.5 * w as f32;
    let fy = (1.0 - t) * 0.5 * h as f32;
    match filter {
        SampleFilter::Nearest => texel(img, fx.floor() as i64, fy.floor() as i64),
        SampleFilter::Bilinear => {
            let x = fx - 0.5;
            let y = fy - 0.5;
            let x0 = x.floor();
            let y0 = y.floor();
            let tx = x - x0;
            let ty = y - y0;
            let (x0, y0) = (x0 as i64, y0 as i64);

            let a = texel(img, x0, y0);
            let b = texel(img, x0 + 1, y0);
            let c = texel(img, x0, y0 + 1);
            let d = texel(img, x0 + 1, y0 + 1);

            let mut out = [0.0; 4];
            for i in 0..4 {
                let top = a[i] + (b[i] - a[i]) * tx;
                let bottom = c[i] + (d[i] - c[i]) * tx;
                out[i] = top + (bottom - top) * ty;
            }
            out
        }
    }
}

/// Texel at integer coordinates, clamped to the image bounds.
pub fn texel(img: &FaceImage, x: i64, y: i64) -> Rgba {
    let (w, h) = img.dimensions();
    let x = x.clamp(0, i64::from(w) - 1) as u32;
    let y = y.clamp(0, i64::from(h) - 1) as u32;
    img.get_pixel(x, y).0
}

#[cfg(test)]
#[path = "../../tests/unit/stitch/sampler.rs"]
mod tests;
