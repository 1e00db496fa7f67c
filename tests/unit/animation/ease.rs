use super::*;

#[test]
fn endpoints_are_fixed() {
    for e in [Ease::Linear, Ease::OutQuad, Ease::OutCubic, Ease::InOutCubic] {
        assert!((e.apply(0.0) - 0.0).abs() < 1e-12, "{e:?}");
        assert!((e.apply(1.0) - 1.0).abs() < 1e-12, "{e:?}");
    }
}

#[test]
fn in_out_cubic_is_symmetric_around_midpoint() {
    let e = Ease::InOutCubic;
    assert!((e.apply(0.5) - 0.5).abs() < 1e-12);
    assert!((e.apply(0.25) + e.apply(0.75) - 1.0).abs() < 1e-12);
}

#[test]
fn input_is_clamped() {
    assert_eq!(Ease::OutCubic.apply(-3.0), 0.0);
    assert_eq!(Ease::OutCubic.apply(7.0), 1.0);
}

#[test]
fn parses_snake_case_names() {
    let e: Ease = serde_json::from_str("\"in_out_cubic\"").unwrap();
    assert_eq!(e, Ease::InOutCubic);
    assert_eq!(Ease::default(), Ease::InOutCubic);
}
