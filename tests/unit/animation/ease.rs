use super::*;

const ALL: [Ease; 7] = [
    Ease::Linear,
    Ease::InQuad,
    Ease::OutQuad,
    Ease::InOutQuad,
    Ease::InCubic,
    Ease::OutCubic,
    Ease::InOutCubic,
];

#[test]
fn endpoints_are_fixed() {
    for e in ALL {
        assert!((e.apply(0.0) - 0.0).abs() < 1e-12, "{e:?}");
        assert!((e.apply(1.0) - 1.0).abs() < 1e-12, "{e:?}");
    }
}

#[test]
fn input_is_clamped() {
    assert_eq!(Ease::OutCubic.apply(-3.0), 0.0);
    assert_eq!(Ease::InQuad.apply(7.0), 1.0);
}

#[test]
fn in_out_curves_are_symmetric_at_half() {
    assert!((Ease::InOutQuad.apply(0.5) - 0.5).abs() < 1e-12);
    assert!((Ease::InOutCubic.apply(0.5) - 0.5).abs() < 1e-12);
}

#[test]
fn parse_accepts_common_spellings() {
    assert_eq!(Ease::parse("OutCubic").unwrap(), Ease::OutCubic);
    assert_eq!(Ease::parse("in_out_quad").unwrap(), Ease::InOutQuad);
    assert_eq!(Ease::parse(" linear ").unwrap(), Ease::Linear);
    assert!(Ease::parse("bounce").is_err());
}

#[test]
fn quarter_points_match_closed_forms() {
    let cases = [
        (Ease::InQuad, 0.0625, 0.5625),
        (Ease::OutQuad, 0.4375, 0.9375),
        (Ease::InOutQuad, 0.125, 0.875),
        (Ease::InCubic, 0.015625, 0.421875),
        (Ease::OutCubic, 0.578125, 0.984375),
        (Ease::InOutCubic, 0.0625, 0.9375),
    ];
    for (e, quarter, three_quarters) in cases {
        assert!((e.apply(0.25) - quarter).abs() < 1e-12, "{e:?}");
        assert!((e.apply(0.75) - three_quarters).abs() < 1e-12, "{e:?}");
    }
}
