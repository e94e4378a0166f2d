use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        PanoError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(PanoError::render("x").to_string().contains("render error:"));
    assert!(PanoError::encode("x").to_string().contains("encode error:"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("disk full");
    let err = PanoError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("disk full"));
}

#[test]
fn anyhow_context_converts_with_question_mark() {
    fn open_missing() -> PanoResult<()> {
        use anyhow::Context as _;
        std::fs::read("target/definitely/not/here.bin")
            .with_context(|| "read probe file".to_string())?;
        Ok(())
    }

    let err = open_missing().unwrap_err();
    assert!(matches!(err, PanoError::Other(_)));
    assert!(err.to_string().contains("read probe file"));
}
