use super::*;

#[test]
fn canvas_rejects_zero_dimensions() {
    assert!(Canvas::new(0, 10).is_err());
    let c = Canvas::new(1920, 1080).unwrap();
    assert_eq!(c.size().center(), Vec2::new(960.0, 540.0));
}

#[test]
fn time_range_rejects_reversed_bounds() {
    let err = TimeRange::new(2.0, 1.0).unwrap_err();
    assert!(matches!(err, StageError::InvalidRange { .. }));
    assert!(matches!(
        TimeRange::new(f64::NAN, 1.0),
        Err(StageError::Validation { .. })
    ));
}

#[test]
fn time_range_progress_clamps_and_steps() {
    let r = TimeRange::new(1.0, 3.0).unwrap();
    assert_eq!(r.progress(0.0), 0.0);
    assert_eq!(r.progress(2.0), 0.5);
    assert_eq!(r.progress(9.0), 1.0);
    assert!(r.contains(1.0));
    assert!(r.contains(3.0));
    assert!(!r.contains(3.0001));

    let step = TimeRange::new(2.0, 2.0).unwrap();
    assert_eq!(step.progress(1.999), 0.0);
    assert_eq!(step.progress(2.0), 1.0);
    assert_eq!(step.progress(2.001), 1.0);
}

#[test]
fn size_aspect_ratio() {
    let s = Size::new(400.0, 200.0).unwrap();
    assert_eq!(s.aspect_ratio(), 2.0);
    assert!(Size::new(0.0, 10.0).is_err());
}

#[test]
fn hex_colors() {
    assert!(is_hex_color("#fff"));
    assert!(is_hex_color("#1a2B3c"));
    assert!(is_hex_color("#11223344"));
    assert!(!is_hex_color("fff"));
    assert!(!is_hex_color("#12345"));
    assert!(!is_hex_color("#ggg"));
}
