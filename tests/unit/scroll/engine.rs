use super::*;
use crate::dataset::PageDataset;

fn viewport() -> Viewport {
    Viewport::new(1000.0, 800.0).unwrap()
}

fn page(kind: &str, points: &[(f64, f64)], rot: f64) -> PageDescriptor {
    let path: Vec<_> = points
        .iter()
        .map(|(x, y)| serde_json::json!({"x": x, "y": y}))
        .collect();
    let ds = PageDataset::from_json_str(
        &serde_json::json!([{
            "id": "p3", "type": kind,
            "world": {"x": 500.0, "y": 500.0, "rot": rot},
            "size": {"w": 400.0, "h": 600.0},
            "scrollPath": path
        }])
        .to_string(),
    )
    .unwrap();
    ds.get("p3").unwrap().clone()
}

fn zigzag(n: usize) -> Vec<(f64, f64)> {
    (0..n)
        .map(|i| (350.0 + 10.0 * i as f64, if i % 2 == 0 { 300.0 } else { 320.0 }))
        .collect()
}

#[test]
fn arm_classifies_paths() {
    let mut e = ScrollPathEngine::new(ScrollSettings::default());
    let basic = page("basic", &[], 0.0);
    assert_eq!(e.arm(&basic, basic.center(), 0), ArmOutcome::NoPath);

    let short = page("special1", &zigzag(4), 0.0);
    assert_eq!(
        e.arm(&short, short.center(), 0),
        ArmOutcome::Degenerate {
            anchor: Point::new(350.0, 300.0)
        }
    );
    assert_eq!(e.phase(), ScrollPhase::Idle);

    let long = page("special1", &zigzag(5), 0.0);
    assert_eq!(e.arm(&long, long.center(), 2), ArmOutcome::Armed);
    assert_eq!(e.phase(), ScrollPhase::Armed);
    assert_eq!(e.active_page(), Some("p3"));
}

#[test]
fn region_follows_path_length() {
    let settings = ScrollSettings::default();
    let r = ScrollRegion::new(1000.0, &settings, viewport());
    assert_eq!(r.spacer_height, 3000.0);
    assert_eq!(r.trailing_margin, 800.0);
    assert_eq!(r.progress_at(1100.0), 0.5);
    assert_eq!(r.offset_for(1.0), 2200.0);
    assert_eq!(r.max_offset(), 3000.0);

    let short = ScrollRegion::new(10.0, &settings, viewport());
    assert_eq!(short.spacer_height, 2000.0);
}

#[test]
fn updates_require_attachment() {
    let mut e = ScrollPathEngine::new(ScrollSettings::default());
    let p = page("special2", &zigzag(10), 0.0);
    e.arm(&p, p.center(), 0);
    assert!(e.update_progress(0.5, viewport()).is_none());
    e.attach(viewport()).unwrap();
    assert_eq!(e.phase(), ScrollPhase::Tracking);
    assert!(e.update_progress(0.5, viewport()).is_some());
}

#[test]
fn relayout_keeps_progress_under_a_new_viewport() {
    let mut e = ScrollPathEngine::new(ScrollSettings::default());
    let p = page("special2", &zigzag(10), 0.0);
    assert!(e.relayout(viewport()).is_none());
    e.arm(&p, p.center(), 0);
    assert!(e.relayout(viewport()).is_none());
    e.attach(viewport()).unwrap();
    e.update_progress(0.4, viewport());

    let short = Viewport::new(1000.0, 400.0).unwrap();
    let region = e.relayout(short).unwrap();
    assert_eq!(region.viewport_height, 400.0);
    assert_eq!(region.trailing_margin, 400.0);
    assert_eq!(e.region(), Some(region));
    assert_eq!(e.progress(), Some(0.4));
    assert_eq!(e.phase(), ScrollPhase::Tracking);
}

#[test]
fn frame_centers_path_point_in_world_space() {
    let mut e = ScrollPathEngine::new(ScrollSettings::default());
    let p = page("special1", &[(300.0, 200.0), (400.0, 200.0), (500.0, 200.0), (600.0, 200.0), (700.0, 200.0)], 10.0);
    e.arm(&p, p.center(), 0);
    e.attach(viewport());
    let f = e.update_progress(0.5, viewport()).unwrap();
    assert!((f.world_point.x - 500.0).abs() < 1e-9);
    assert!((f.world_point.y - 200.0).abs() < 1e-9);
    assert!((f.translation.x - 0.0).abs() < 1e-9);
    assert!((f.translation.y - 200.0).abs() < 1e-9);
    assert_eq!(f.rotation_deg, -10.0);
    assert_eq!(f.live_rot, -10.0);
}

#[test]
fn rotation_follows_tangent_for_special2() {
    let mut e = ScrollPathEngine::new(ScrollSettings::default());
    let p = page("special2", &[(300.0, 300.0), (300.0, 350.0), (300.0, 400.0), (300.0, 450.0), (300.0, 500.0)], 0.0);
    e.arm(&p, p.center(), 0);
    e.attach(viewport());
    let f = e.update_progress(0.3, viewport()).unwrap();
    // tangent 90 deg, sign -1
    assert!((f.rotation_deg + 90.0).abs() < 1e-9);
    assert!((f.live_rot - 270.0).abs() < 1e-9);
}

#[test]
fn threshold_edges_fire_once() {
    let mut e = ScrollPathEngine::new(ScrollSettings::default());
    let p = page("special2", &zigzag(10), 0.0);
    e.arm(&p, p.center(), 0);
    e.attach(viewport());

    let f = e.update_progress(0.95, viewport()).unwrap();
    assert!(f.done && f.done_reached && !f.reached_max);
    assert_eq!(e.phase(), ScrollPhase::Completing);

    let f = e.update_progress(0.995, viewport()).unwrap();
    assert!(!f.done_reached && f.reached_max);
    let f = e.update_progress(1.0, viewport()).unwrap();
    assert!(!f.reached_max && !f.left_max);

    let f = e.update_progress(0.5, viewport()).unwrap();
    assert!(f.left_max && !f.done);
    assert_eq!(e.phase(), ScrollPhase::Completing);
}

#[test]
fn unwrapped_rotation_has_no_seam_jumps() {
    let mut e = ScrollPathEngine::new(ScrollSettings::default());
    // spiral-ish loop whose tangent sweeps through the +-180 seam several times
    let pts: Vec<(f64, f64)> = (0..40)
        .map(|i| {
            let a = i as f64 * 0.4;
            (500.0 + 150.0 * a.cos(), 500.0 + 150.0 * a.sin())
        })
        .collect();
    let p = page("special2", &pts, 25.0);
    e.arm(&p, p.center(), 0);
    e.attach(viewport());

    let mut last: Option<f64> = None;
    for step in 0..=200 {
        let t = step as f64 / 200.0;
        let f = e.update_progress(t, viewport()).unwrap();
        if let Some(prev) = last {
            assert!((f.rotation_deg - prev).abs() <= 180.0, "jump at t={t}");
        }
        last = Some(f.rotation_deg);
    }
}

#[test]
fn kill_is_idempotent() {
    let mut e = ScrollPathEngine::new(ScrollSettings::default());
    assert!(!e.kill());
    let p = page("special2", &zigzag(10), 0.0);
    e.arm(&p, p.center(), 0);
    e.attach(viewport());
    assert!(e.kill());
    assert!(!e.kill());
    assert_eq!(e.phase(), ScrollPhase::Idle);
    assert!(e.status().is_none());
    assert!(e.update_progress(0.5, viewport()).is_none());
}
