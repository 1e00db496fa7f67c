use super::*;
use crate::{assets::probe::MemoryProbe, config::ImageSettings};

fn page(id: &str, x: f64, kind: &str) -> PageDescriptor {
    serde_json::from_value(serde_json::json!({
        "id": id, "type": kind,
        "world": {"x": x, "y": 0.0, "rot": 30.0},
        "size": {"w": 100.0, "h": 200.0}
    }))
    .unwrap()
}

fn dataset(n: usize) -> Arc<PageDataset> {
    let pages = (1..=n)
        .map(|i| page(&format!("p{i}"), i as f64 * 100.0, if i == 2 { "blank" } else { "basic" }))
        .collect();
    Arc::new(PageDataset::from_pages(pages).unwrap())
}

fn resolver() -> (Arc<MemoryProbe>, ImageResolver) {
    let probe = Arc::new(MemoryProbe::new(["images/p1.jpg", "images/p3.jpg"]));
    (probe.clone(), ImageResolver::new(probe, ImageSettings::default()))
}

fn branch_cfg() -> BranchConfig {
    BranchConfig {
        anchor: "p3".into(),
        arm_a_start: "p4".into(),
        arm_b_start: "p7".into(),
        arm_a_end: Some("p8".into()),
        ending_a: None,
        ending_b: None,
        default_branch: Branch::B,
    }
}

#[test]
fn ensure_creates_once_and_skips_blank_images() {
    let (probe, r) = resolver();
    let mut reg = PageRegistry::new(dataset(3));
    assert_eq!(reg.ensure(0, &r), Some(Ensured::Created));
    assert_eq!(reg.ensure(0, &r), Some(Ensured::Existing));
    assert_eq!(reg.instance_count(), 1);
    assert_eq!(probe.calls(), 1);

    assert_eq!(reg.ensure(1, &r), Some(Ensured::Created));
    assert!(reg.get(1).unwrap().image.is_none());
    assert_eq!(probe.calls(), 1);

    assert_eq!(reg.ensure(9, &r), None);
    assert_eq!(reg.max_instantiated_index(), Some(1));
    assert_eq!(reg.get(0).unwrap().live_rot, 30.0);
}

#[test]
fn branch_selection_is_idempotent_and_reselectable() {
    let mut reg = PageRegistry::new(dataset(10));
    let cfg = branch_cfg();

    assert!(reg.select_branch(Branch::A, &cfg));
    let once = reg.ids().to_vec();
    assert!(reg.select_branch(Branch::A, &cfg));
    assert_eq!(reg.ids(), once.as_slice());
    assert_eq!(once, vec!["p1", "p2", "p3", "p4", "p5", "p6", "p7"]);

    assert!(reg.select_branch(Branch::B, &cfg));
    assert_eq!(reg.ids(), ["p1", "p2", "p3", "p7", "p8", "p9", "p10"]);
}

#[test]
fn endings_default_to_arm_tails() {
    let reg = PageRegistry::new(dataset(10));
    let cfg = branch_cfg();
    assert_eq!(reg.ending_of(Branch::A, &cfg).as_deref(), Some("p7"));
    assert_eq!(reg.ending_of(Branch::B, &cfg).as_deref(), Some("p10"));
}

#[test]
fn missing_branch_ids_are_a_no_op() {
    let mut reg = PageRegistry::new(dataset(5));
    let before = reg.ids().to_vec();
    assert!(!reg.select_branch(Branch::B, &branch_cfg()));
    assert_eq!(reg.ids(), before.as_slice());
}

#[test]
fn dropped_arm_instances_survive_but_are_unreachable() {
    let (_, r) = resolver();
    let mut reg = PageRegistry::new(dataset(10));
    let cfg = branch_cfg();
    reg.select_branch(Branch::A, &cfg);
    reg.ensure(4, &r);
    assert!(reg.instance("p5").is_some());

    reg.select_branch(Branch::B, &cfg);
    assert!(reg.instance("p5").is_some());
    assert_eq!(reg.index_of("p5"), None);
}

#[test]
fn slide_in_starts_below_in_camera_frame() {
    let (_, r) = resolver();
    let mut reg = PageRegistry::new(dataset(1));
    reg.ensure(0, &r);
    let inst = reg.get_mut(0).unwrap();
    inst.rot = 0.0;
    inst.start_slide_in(100, 800, Ease::Linear);
    let start = inst.slide_offset(100);
    assert!(start.x.abs() < 1e-9);
    assert!((start.y - 240.0).abs() < 1e-9);
    let mid = inst.slide_offset(500);
    assert!((mid.y - 120.0).abs() < 1e-9);
    assert_eq!(inst.slide_offset(900), Vec2::ZERO);
    assert_eq!(inst.slide_offset(2_000), Vec2::ZERO);
}

#[test]
fn instantiated_bounds_track_created_pages() {
    let (_, r) = resolver();
    let mut reg = PageRegistry::new(dataset(3));
    assert!(reg.instantiated_bounds().is_none());
    reg.ensure(0, &r);
    reg.ensure(2, &r);
    let b = reg.instantiated_bounds().unwrap();
    assert_eq!((b.min_x, b.max_x), (50.0, 350.0));
    assert_eq!((b.min_y, b.max_y), (-100.0, 100.0));
}
