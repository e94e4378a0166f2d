use super::*;

fn gradient(format: ColorFormat) -> EquirectBuffer {
    EquirectBuffer::new(6, 3, format).unwrap()
}

#[test]
fn low_frames_encode_as_png() {
    let bytes = encode_frame(&gradient(ColorFormat::Low)).unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    let img = image::load_from_memory_with_format(&bytes, ImageFormat::Png).unwrap();
    assert_eq!((img.width(), img.height()), (6, 3));
    assert!(matches!(img, image::DynamicImage::ImageRgb8(_)));
}

#[test]
fn high_frames_encode_as_exr() {
    let bytes = encode_frame(&gradient(ColorFormat::High)).unwrap();
    assert_eq!(&bytes[..4], &[0x76, 0x2f, 0x31, 0x01]);
    let img = image::load_from_memory_with_format(&bytes, ImageFormat::OpenExr).unwrap();
    assert_eq!((img.width(), img.height()), (6, 3));
}

#[test]
fn in_memory_writer_tracks_existing_paths() {
    let pre = PathBuf::from("/r/Recordings/0001.png");
    let mut w = InMemoryWriter::with_existing([pre.clone()]);
    assert!(w.exists(&pre));

    let next = PathBuf::from("/r/Recordings/0002.png");
    assert!(!w.exists(&next));
    w.prepare_dir(Path::new("/r/Recordings")).unwrap();
    w.write_frame(&next, &gradient(ColorFormat::Low)).unwrap();
    assert!(w.exists(&next));
    assert_eq!(w.frames().len(), 1);
    assert_eq!(w.prepared_dirs(), &[PathBuf::from("/r/Recordings")]);
}

#[test]
fn file_writer_creates_directories_and_overwrites() {
    let dir = Path::new("target").join("panorec_unit_sink");
    let _ = std::fs::remove_dir_all(&dir);
    let path = dir.join("nested").join("0000.png");

    let mut w = ImageFileWriter::new();
    w.prepare_dir(&dir).unwrap();
    assert!(!w.exists(&path));
    w.write_frame(&path, &gradient(ColorFormat::Low)).unwrap();
    assert!(w.exists(&path));
    w.write_frame(&path, &gradient(ColorFormat::Low)).unwrap();
    assert_eq!(w.written(), 2);
}
