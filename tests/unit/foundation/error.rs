use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        StageError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        StageError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
    assert!(
        StageError::ownership("x")
            .to_string()
            .contains("ownership error:")
    );
    assert!(
        StageError::UnsupportedAnimation("Wobble".to_owned())
            .to_string()
            .contains("unsupported animation type 'Wobble'")
    );
}

#[test]
fn validation_path_is_rendered_and_exposed() {
    let err = StageError::validation_at("$.parameters.title", "expected text");
    assert_eq!(
        err.to_string(),
        "validation error: $.parameters.title: expected text"
    );
    assert_eq!(err.path(), Some("$.parameters.title"));
    assert_eq!(StageError::validation("bad").path(), None);
}

#[test]
fn ensure_finite_rejects_nan_and_inf() {
    assert_eq!(ensure_finite("x", 1.5).unwrap(), 1.5);
    let err = ensure_finite("x", f64::NAN).unwrap_err();
    assert_eq!(err.path(), Some("$.x"));
    assert!(ensure_finite("y", f64::INFINITY).is_err());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = StageError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
