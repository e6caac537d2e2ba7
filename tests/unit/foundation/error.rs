use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        AnnotateError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(AnnotateError::asset("x").to_string().contains("asset error:"));
    assert!(AnnotateError::decode("x").to_string().contains("decode error:"));
    assert!(AnnotateError::encode("x").to_string().contains("encode error:"));
    assert!(
        AnnotateError::persist("x")
            .to_string()
            .contains("persist error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = AnnotateError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
