use crate::capture::camera::{Camera, CameraLease, TargetDesc};
use crate::capture::cube::{CAPTURE_SEQUENCE, CubeSlot, FaceSet, SECOND_CUBE_OFFSET};
use crate::config::capture::{CaptureConfig, StitchingOrientation};
use crate::config::geometry::DerivedGeometry;
use crate::foundation::error::{PanoError, PanoResult};
use crate::foundation::math::{Quat, relative_rotation, rotate_local};

/// World orientation of the cube in `slot` for a camera currently at `camera`.
pub fn cube_frame(
    camera: Quat,
    stitching: Option<&StitchingOrientation>,
    slot: CubeSlot,
) -> Quat {
    let base = stitching.map_or(camera, |s| s.resolve(camera));
    match slot {
        CubeSlot::Primary => base,
        CubeSlot::Secondary => rotate_local(base, SECOND_CUBE_OFFSET),
    }
}

/// Rotation taking camera-space directions into the cube space of `slot`.
///
/// This is what the compositor applies before picking a face, so it mirrors [`cube_frame`].
pub fn cube_alignment(
    camera: Quat,
    stitching: Option<&StitchingOrientation>,
    slot: CubeSlot,
) -> Quat {
    relative_rotation(camera, cube_frame(camera, stitching, slot))
}

/// Render the six faces of one cube.
///
/// The camera is leased for the duration of the capture; its orientation, field of view and
/// target are restored before returning, including when a render fails.
#[tracing::instrument(skip_all, fields(slot = ?slot, face_size = geom.face_size))]
pub fn capture_cube<C: Camera + ?Sized>(
    camera: &mut C,
    cfg: &CaptureConfig,
    geom: &DerivedGeometry,
    slot: CubeSlot,
    faces: &mut FaceSet,
) -> PanoResult<()> {
    if faces.size() != geom.face_size {
        return Err(PanoError::validation(format!(
            "face set is {}px, geometry expects {}px",
            faces.size(),
            geom.face_size
        )));
    }

    let mut lease = CameraLease::acquire(camera);
    let saved = lease.saved();

    let mut rotation = cube_frame(saved.rotation, cfg.stitching_orientation.as_ref(), slot);
    lease.set_fov_y_deg(geom.face_fov_deg());
    lease.set_target(Some(TargetDesc {
        width: geom.face_size,
        height: geom.face_size,
        format: cfg.format,
    }));

    for (face, step) in CAPTURE_SEQUENCE {
        rotation = rotate_local(rotation, step);
        lease.set_rotation(rotation);
        lease.render(faces.face_mut(face))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/capture/rig.rs"]
mod tests;
