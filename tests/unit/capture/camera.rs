use super::*;
use crate::foundation::error::PanoError;
use crate::foundation::math::Euler;

struct StubCamera {
    state: CameraState,
    renders: usize,
}

impl Camera for StubCamera {
    fn state(&self) -> CameraState {
        self.state
    }

    fn set_rotation(&mut self, rotation: Quat) {
        self.state.rotation = rotation;
    }

    fn set_fov_y_deg(&mut self, fov_y_deg: f32) {
        self.state.fov_y_deg = fov_y_deg;
    }

    fn set_target(&mut self, target: Option<TargetDesc>) {
        self.state.target = target;
    }

    fn render(&mut self, _out: &mut FaceImage) -> PanoResult<()> {
        self.renders += 1;
        Err(PanoError::render("gpu lost"))
    }
}

fn stub() -> StubCamera {
    StubCamera {
        state: CameraState {
            rotation: Euler::yaw(12.0).to_quat(),
            fov_y_deg: 60.0,
            target: None,
        },
        renders: 0,
    }
}

#[test]
fn lease_restores_on_drop() {
    let mut cam = stub();
    let before = cam.state();
    {
        let mut lease = CameraLease::acquire(&mut cam);
        lease.set_fov_y_deg(100.0);
        lease.set_rotation(Quat::IDENTITY);
        lease.set_target(Some(TargetDesc {
            width: 8,
            height: 8,
            format: ColorFormat::High,
        }));
        assert_eq!(lease.state().fov_y_deg, 100.0);
        assert_eq!(lease.saved(), before);
    }
    assert_eq!(cam.state(), before);
}

#[test]
fn lease_restores_when_render_fails() {
    fn failing_capture(cam: &mut StubCamera) -> PanoResult<()> {
        let mut lease = CameraLease::acquire(cam);
        lease.set_fov_y_deg(120.0);
        let mut img = FaceImage::new(2, 2);
        lease.render(&mut img)?;
        lease.set_fov_y_deg(10.0);
        Ok(())
    }

    let mut cam = stub();
    let before = cam.state();
    assert!(failing_capture(&mut cam).is_err());
    assert_eq!(cam.renders, 1);
    assert_eq!(cam.state(), before);
}

#[test]
fn lease_works_through_trait_objects() {
    let mut cam = stub();
    let before = cam.state();
    {
        let dyn_cam: &mut dyn Camera = &mut cam;
        let mut lease = CameraLease::acquire(dyn_cam);
        lease.set_fov_y_deg(1.0);
    }
    assert_eq!(cam.state(), before);
}
