use std::collections::HashSet;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use image::ImageFormat;

use crate::foundation::core::ColorFormat;
use crate::foundation::error::{PanoError, PanoResult};
use crate::stitch::equirect::EquirectBuffer;

/// Destination for finished panorama frames.
///
/// The capture session asks [`FrameWriter::exists`] before rendering a frame so that existing
/// files can be skipped without invoking the renderer.
pub trait FrameWriter {
    /// Whether a frame file is already present at `path`.
    fn exists(&self, path: &Path) -> bool;
    /// Called once when a capture run starts, with the directory frames will land in.
    fn prepare_dir(&mut self, dir: &Path) -> PanoResult<()>;
    /// Persist one frame at `path`, replacing any previous file.
    fn write_frame(&mut self, path: &Path, frame: &EquirectBuffer) -> PanoResult<()>;
}

/// Image container used for a color format.
pub fn image_format(format: ColorFormat) -> ImageFormat {
    match format {
        ColorFormat::Low => ImageFormat::Png,
        ColorFormat::High => ImageFormat::OpenExr,
    }
}

/// Encode a panorama into PNG (LOW) or OpenEXR (HIGH) bytes.
pub fn encode_frame(frame: &EquirectBuffer) -> PanoResult<Vec<u8>> {
    let img = frame.to_dynamic_image()?;
    let format = image_format(frame.format());
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format)
        .map_err(|e| PanoError::encode(format!("{format:?} encoding failed: {e}")))?;
    Ok(out.into_inner())
}

/// Writes frames as image files on disk.
#[derive(Debug, Default)]
pub struct ImageFileWriter {
    written: u64,
}

impl ImageFileWriter {
    /// Create a file writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames written so far.
    pub fn written(&self) -> u64 {
        self.written
    }
}

impl FrameWriter for ImageFileWriter {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn prepare_dir(&mut self, dir: &Path) -> PanoResult<()> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory '{}'", dir.display()))?;
        Ok(())
    }

    fn write_frame(&mut self, path: &Path, frame: &EquirectBuffer) -> PanoResult<()> {
        let bytes = encode_frame(frame)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create output directory '{}'", parent.display())
            })?;
        }
        std::fs::write(path, bytes)
            .with_context(|| format!("failed to write frame '{}'", path.display()))?;
        self.written += 1;
        Ok(())
    }
}

/// In-memory writer for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemoryWriter {
    existing: HashSet<PathBuf>,
    dirs: Vec<PathBuf>,
    /// Frames in write order.
    pub(crate) frames: Vec<(PathBuf, EquirectBuffer)>,
}

impl InMemoryWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer that reports `paths` as already present.
    pub fn with_existing(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            existing: paths.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[(PathBuf, EquirectBuffer)] {
        &self.frames
    }

    /// Directories passed to [`FrameWriter::prepare_dir`].
    pub fn prepared_dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

impl FrameWriter for InMemoryWriter {
    fn exists(&self, path: &Path) -> bool {
        self.existing.contains(path)
    }

    fn prepare_dir(&mut self, dir: &Path) -> PanoResult<()> {
        self.dirs.push(dir.to_path_buf());
        Ok(())
    }

    fn write_frame(&mut self, path: &Path, frame: &EquirectBuffer) -> PanoResult<()> {
        self.existing.insert(path.to_path_buf());
        self.frames.push((path.to_path_buf(), frame.clone()));
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
