use std::path::{Path, PathBuf};

use crate::capture::camera::Camera;
use crate::capture::cube::{CubeSlot, CubeTargets};
use crate::capture::rig::{capture_cube, cube_alignment};
use crate::config::capture::CaptureConfig;
use crate::config::geometry::DerivedGeometry;
use crate::encode::sink::FrameWriter;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{PanoError, PanoResult};
use crate::stitch::equirect::{CubeView, EquirectBuffer, EquirectCompositor, StitchParams};

/// Lifecycle of a capture session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// No tick has run yet.
    Idle,
    /// Ticks produce frames.
    Capturing,
    /// The run is over; further ticks do nothing.
    Terminated,
}

/// What a tick did with its frame index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrameAction {
    /// Before the start frame: nothing rendered or written.
    Waiting,
    /// The output file already existed and overwriting is disabled.
    Skipped {
        /// Path that was left untouched.
        path: PathBuf,
    },
    /// A panorama was captured and written.
    Written {
        /// Path of the new file.
        path: PathBuf,
    },
    /// The session had already terminated.
    Finished,
}

/// Instruction to the host driving the ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostSignal {
    /// Keep ticking.
    Continue,
    /// Stop driving ticks; the run is complete.
    Stop,
}

/// Outcome of one tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickReport {
    /// Frame index the tick handled.
    pub frame: FrameIndex,
    /// What happened to it.
    pub action: FrameAction,
    /// Whether the host should keep going.
    pub signal: HostSignal,
}

/// Counters accumulated over a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Ticks that advanced the frame counter.
    pub ticks: u64,
    /// Frames captured and written.
    pub frames_written: u64,
    /// Frames skipped because their file already existed.
    pub frames_skipped: u64,
    /// Ticks spent before the start frame.
    pub frames_waited: u64,
}

/// Per-tick capture driver.
///
/// One tick handles one output frame: it captures the cube(s), stitches the panorama and hands
/// it to a [`FrameWriter`]. Face and output buffers persist across ticks and are reallocated only
/// when the derived geometry changes.
#[derive(Debug)]
pub struct CaptureSession {
    project_root: PathBuf,
    state: SessionState,
    frame: FrameIndex,
    targets: CubeTargets,
    output: EquirectBuffer,
    stats: RunStats,
}

impl CaptureSession {
    /// Create an idle session writing relative prefixes under `project_root`.
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            state: SessionState::Idle,
            frame: FrameIndex(0),
            targets: CubeTargets::new(),
            output: EquirectBuffer::default(),
            stats: RunStats::default(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Frame index the next tick will handle.
    pub fn frame(&self) -> FrameIndex {
        self.frame
    }

    /// Counters so far.
    pub fn stats(&self) -> RunStats {
        self.stats
    }

    /// Root that relative prefixes resolve against.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Most recently stitched panorama.
    pub fn output(&self) -> &EquirectBuffer {
        &self.output
    }

    /// Handle one frame.
    ///
    /// Errors from target allocation, the renderer or the writer end the session: the state
    /// becomes [`SessionState::Terminated`] and the error is returned.
    #[tracing::instrument(skip_all, fields(frame = self.frame.0))]
    pub fn tick(
        &mut self,
        cfg: &CaptureConfig,
        camera: &mut dyn Camera,
        writer: &mut dyn FrameWriter,
    ) -> PanoResult<TickReport> {
        match self.state {
            SessionState::Terminated => {
                return Ok(TickReport {
                    frame: self.frame,
                    action: FrameAction::Finished,
                    signal: HostSignal::Stop,
                });
            }
            SessionState::Idle => {
                self.state = SessionState::Capturing;
                if let Err(e) = self.begin(cfg, writer) {
                    self.state = SessionState::Terminated;
                    return Err(e);
                }
            }
            SessionState::Capturing => {}
        }

        let frame = self.frame;
        let action = match self.step(cfg, camera, writer) {
            Ok(action) => action,
            Err(e) => {
                self.state = SessionState::Terminated;
                tracing::error!(frame = frame.0, error = %e, "capture run aborted");
                return Err(e);
            }
        };

        match &action {
            FrameAction::Waiting => self.stats.frames_waited += 1,
            FrameAction::Skipped { .. } => self.stats.frames_skipped += 1,
            FrameAction::Written { .. } => self.stats.frames_written += 1,
            FrameAction::Finished => {}
        }
        self.stats.ticks += 1;
        self.frame = frame.next();

        let max = cfg.max_frame();
        let signal = if self.frame > max {
            self.state = SessionState::Terminated;
            tracing::info!(
                last = max.0,
                written = self.stats.frames_written,
                skipped = self.stats.frames_skipped,
                "capture finished"
            );
            HostSignal::Stop
        } else {
            HostSignal::Continue
        };

        tracing::debug!(frame = frame.0, action = ?action, "tick");
        Ok(TickReport {
            frame,
            action,
            signal,
        })
    }

    fn begin(&mut self, cfg: &CaptureConfig, writer: &mut dyn FrameWriter) -> PanoResult<()> {
        let first = cfg.frame_path(&self.project_root, self.frame);
        match first.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => writer.prepare_dir(dir),
            _ => Ok(()),
        }
    }

    fn step(
        &mut self,
        cfg: &CaptureConfig,
        camera: &mut dyn Camera,
        writer: &mut dyn FrameWriter,
    ) -> PanoResult<FrameAction> {
        let geom = DerivedGeometry::derive(cfg);
        if self
            .targets
            .ensure(geom.face_size, cfg.cube_count(), cfg.format)?
        {
            tracing::debug!(
                face_size = geom.face_size,
                cubes = cfg.cube_count(),
                "allocated face targets"
            );
        }
        if self.output.ensure(geom.width, geom.height, cfg.format)? {
            tracing::debug!(
                width = geom.width,
                height = geom.height,
                "allocated output buffer"
            );
        }

        if self.frame.0 < cfg.start_frame {
            return Ok(FrameAction::Waiting);
        }

        let path = cfg.frame_path(&self.project_root, self.frame);
        if !cfg.overwrite && writer.exists(&path) {
            tracing::warn!(
                path = %path.display(),
                "output file exists and overwrite is disabled, skipping frame"
            );
            return Ok(FrameAction::Skipped { path });
        }

        let camera_rotation = camera.state().rotation;
        let slots = CubeSlot::for_count(cfg.cube_count());
        for &slot in slots {
            let faces = self
                .targets
                .get_mut(slot)
                .ok_or_else(|| PanoError::validation("face targets are not allocated"))?;
            capture_cube(&mut *camera, cfg, &geom, slot, faces)?;
        }

        let views = slots
            .iter()
            .map(|&slot| {
                let faces = self
                    .targets
                    .get(slot)
                    .ok_or_else(|| PanoError::validation("face targets are not allocated"))?;
                Ok(CubeView {
                    faces,
                    to_cube: cube_alignment(
                        camera_rotation,
                        cfg.stitching_orientation.as_ref(),
                        slot,
                    ),
                })
            })
            .collect::<PanoResult<Vec<_>>>()?;

        EquirectCompositor::new(StitchParams::from_config(cfg, &geom))
            .composite(&views, &mut self.output)?;
        writer.write_frame(&path, &self.output)?;
        Ok(FrameAction::Written { path })
    }
}

/// Drive `session` until it signals [`HostSignal::Stop`].
///
/// `before_tick` runs ahead of every tick with the frame index and its scene time (fixed step of
/// `1 / frame_rate`). Hosts use it to advance their scene; returning [`HostSignal::Stop`] ends the
/// run before that frame is handled.
pub fn run_capture<C, F>(
    session: &mut CaptureSession,
    cfg: &CaptureConfig,
    camera: &mut C,
    writer: &mut dyn FrameWriter,
    mut before_tick: F,
) -> PanoResult<RunStats>
where
    C: Camera,
    F: FnMut(&mut C, FrameIndex, f64) -> HostSignal,
{
    let cfg = cfg.sanitized();
    let fps = cfg.fps()?;
    tracing::info!(
        first = cfg.start_frame,
        last = cfg.max_frame().0,
        cubes = cfg.cube_count(),
        "capture started"
    );

    loop {
        let frame = session.frame();
        if before_tick(camera, frame, fps.frames_to_secs(frame)) == HostSignal::Stop {
            tracing::info!(frame = frame.0, "capture stopped by host");
            break;
        }
        let report = session.tick(&cfg, camera, writer)?;
        if report.signal == HostSignal::Stop {
            break;
        }
    }
    Ok(session.stats())
}

#[cfg(test)]
#[path = "../../tests/unit/session/sequencer.rs"]
mod tests;
