use super::*;

#[test]
fn samples_between_endpoints_with_easing() {
    let tw = Tween::new(0.0_f64, 100.0, 1_000, 800, Ease::Linear);
    assert_eq!(tw.sample(1_000), 0.0);
    assert_eq!(tw.sample(1_400), 50.0);
    assert_eq!(tw.sample(1_800), 100.0);
    assert_eq!(tw.sample(5_000), 100.0);
    assert!(tw.is_finished(1_800));
    assert!(!tw.is_finished(1_799));
}

#[test]
fn zero_duration_jumps_to_target() {
    let tw = Tween::new(Vec2::new(0.0, 0.0), Vec2::new(3.0, 4.0), 50, 0, Ease::InOutCubic);
    assert_eq!(tw.sample(50), Vec2::new(3.0, 4.0));
    assert!(tw.is_finished(50));
    assert_eq!(tw.end_ms(), 50);
}

#[test]
fn sampling_before_start_holds_origin() {
    let tw = Tween::new(Point::new(1.0, 1.0), Point::new(9.0, 9.0), 100, 100, Ease::OutCubic);
    assert_eq!(tw.sample(0), Point::new(1.0, 1.0));
    assert_eq!(*tw.target(), Point::new(9.0, 9.0));
}
