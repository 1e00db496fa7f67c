use super::*;

#[test]
fn viewport_rejects_degenerate_extents() {
    assert!(Viewport::new(0.0, 10.0).is_err());
    assert!(Viewport::new(10.0, f64::NAN).is_err());
    assert!(Viewport::new(1200.0, 800.0).is_ok());
}

#[test]
fn centering_translation_moves_point_to_center() {
    let vp = Viewport::new(1200.0, 800.0).unwrap();
    let t = vp.centering_translation(Point::new(500.0, 250.0));
    assert_eq!(t, Vec2::new(100.0, 150.0));
}

#[test]
fn bounds_union_ignores_non_finite_rects() {
    let b = WorldBounds::from_rects([
        centered_rect(Point::new(100.0, 100.0), 200.0, 200.0),
        centered_rect(Point::new(900.0, 400.0), 200.0, 200.0),
        Rect::new(f64::NAN, 0.0, 1.0, 1.0),
    ])
    .unwrap();
    assert_eq!(b.min_x, 0.0);
    assert_eq!(b.max_x, 1000.0);
    assert_eq!(b.min_y, 0.0);
    assert_eq!(b.max_y, 500.0);
    assert_eq!(b.width, 1000.0);
    assert_eq!(b.height, 500.0);
    assert_eq!(b.center(), Point::new(500.0, 250.0));
}

#[test]
fn bounds_of_nothing_is_none() {
    assert!(WorldBounds::from_rects(std::iter::empty()).is_none());
}
