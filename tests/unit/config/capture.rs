use super::*;

#[test]
fn defaults_match_the_recorder_defaults() {
    let c = CaptureConfig::default();
    assert_eq!(c.frame_rate, 30);
    assert_eq!(c.prefix, "Recordings/");
    assert_eq!(c.digits, 4);
    assert_eq!(c.width, 1024);
    assert_eq!(c.horizontal_fov, 360.0);
    assert_eq!(c.vertical_fov, 180.0);
    assert_eq!(c.overlap, 0.5);
    assert!(c.smooth_stitching);
    assert!(!c.double_render);
    assert!(!c.overwrite);
}

#[test]
fn json_fills_missing_fields_with_defaults() {
    let c = CaptureConfig::from_json_str(r#"{ "width": 2048, "format": "exr" }"#).unwrap();
    assert_eq!(c.width, 2048);
    assert_eq!(c.format, ColorFormat::High);
    assert_eq!(c.digits, 4);
}

#[test]
fn json_rejects_unknown_fields() {
    let err = CaptureConfig::from_json_str(r#"{ "widht": 2048 }"#).unwrap_err();
    assert!(err.to_string().contains("validation error:"));
}

#[test]
fn stitching_orientation_parses() {
    let c = CaptureConfig::from_json_str(
        r#"{ "stitching_orientation": { "rotation": { "yaw": 30.0 }, "space": "camera" } }"#,
    )
    .unwrap();
    let o = c.stitching_orientation.unwrap();
    assert_eq!(o.rotation.yaw, 30.0);
    assert_eq!(o.space, OrientationSpace::Camera);
}

#[test]
fn max_frame_is_bounded_by_digits() {
    let c = CaptureConfig {
        digits: 3,
        end_frame: None,
        ..CaptureConfig::default()
    };
    assert_eq!(c.max_frame(), FrameIndex(999));

    let c = CaptureConfig {
        digits: 2,
        end_frame: Some(5000),
        ..CaptureConfig::default()
    };
    assert_eq!(c.max_frame(), FrameIndex(99));

    let c = CaptureConfig {
        digits: 4,
        end_frame: Some(12),
        ..CaptureConfig::default()
    };
    assert_eq!(c.max_frame(), FrameIndex(12));
}

#[test]
fn frame_path_pads_and_picks_extension() {
    let c = CaptureConfig {
        prefix: "shots/take_".to_string(),
        digits: 5,
        format: ColorFormat::High,
        ..CaptureConfig::default()
    };
    let p = c.frame_path(Path::new("/proj"), FrameIndex(42));
    assert_eq!(p, PathBuf::from("/proj/shots/take_00042.exr"));

    let c = CaptureConfig {
        prefix: "Recordings/".to_string(),
        digits: 4,
        ..CaptureConfig::default()
    };
    let p = c.frame_path(Path::new("/proj/"), FrameIndex(7));
    assert_eq!(p, PathBuf::from("/proj/Recordings/0007.png"));
}

#[test]
fn frame_number_wider_than_digits_is_not_truncated() {
    let c = CaptureConfig {
        prefix: "f".to_string(),
        digits: 2,
        ..CaptureConfig::default()
    };
    let p = c.frame_path(Path::new(""), FrameIndex(123));
    assert_eq!(p, PathBuf::from("f123.png"));
}

#[cfg(unix)]
#[test]
fn absolute_prefix_ignores_project_root() {
    let c = CaptureConfig {
        prefix: "/tmp/out/".to_string(),
        ..CaptureConfig::default()
    };
    assert_eq!(c.absolute_prefix(Path::new("/proj")), "/tmp/out/");
}

#[test]
fn sanitized_clamps_every_range() {
    let c = CaptureConfig {
        frame_rate: 0,
        width: 0,
        digits: 12,
        horizontal_fov: 720.0,
        vertical_fov: 0.0,
        overlap: 1.5,
        cube_face_size: Some(0),
        ..CaptureConfig::default()
    }
    .sanitized();
    assert_eq!(c.frame_rate, 1);
    assert_eq!(c.width, 1);
    assert_eq!(c.digits, 7);
    assert_eq!(c.horizontal_fov, 360.0);
    assert_eq!(c.vertical_fov, MIN_FOV_DEG);
    assert_eq!(c.overlap, MAX_OVERLAP);
    assert_eq!(c.cube_face_size, Some(1));
    assert!(c.fps().is_ok());
}

#[test]
fn sanitized_leaves_valid_config_untouched() {
    let c = CaptureConfig::default();
    assert_eq!(c.sanitized(), c);
}

#[test]
fn smooth_stitching_requires_overlap() {
    let c = CaptureConfig {
        overlap: 0.0,
        smooth_stitching: true,
        ..CaptureConfig::default()
    };
    assert!(!c.smooth_stitching_active());
    let c = CaptureConfig {
        overlap: 0.1,
        ..c
    };
    assert!(c.smooth_stitching_active());
}

#[test]
fn summary_reports_render_count_and_window() {
    let c = CaptureConfig {
        double_render: true,
        start_frame: 3,
        end_frame: Some(40),
        ..CaptureConfig::default()
    };
    let s = c.summary(Path::new("/proj"));
    assert!(s.contains("/proj/Recordings/0000.png"));
    assert!(s.contains("Number of renders: 12 x 512px"));
    assert!(s.contains("Render from frame 3 to frame 40"));
    assert!(s.contains("Output size: 1024x512"));
}

#[test]
fn camera_space_orientation_follows_camera() {
    let o = StitchingOrientation {
        rotation: Euler::yaw(90.0),
        space: OrientationSpace::Camera,
    };
    let cam = Euler::yaw(90.0).to_quat();
    let resolved = o.resolve(cam);
    let fwd = resolved * crate::foundation::math::Vec3::Z;
    assert!((fwd - crate::foundation::math::Vec3::NEG_Z).length() < 1e-5);

    let world = StitchingOrientation {
        space: OrientationSpace::World,
        ..o
    };
    let fwd = world.resolve(cam) * crate::foundation::math::Vec3::Z;
    assert!((fwd - crate::foundation::math::Vec3::X).length() < 1e-5);
}
