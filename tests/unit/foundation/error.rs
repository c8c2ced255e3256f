use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        BackdropError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        BackdropError::payload("x")
            .to_string()
            .contains("payload error:")
    );
    assert!(
        BackdropError::decode("x")
            .to_string()
            .contains("decode error:")
    );
    assert!(
        BackdropError::evaluation("x")
            .to_string()
            .contains("evaluation error:")
    );
    assert!(
        BackdropError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = BackdropError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
