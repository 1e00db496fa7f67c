use super::*;
use crate::{
    assets::probe::MemoryProbe,
    config::{AutoAdvanceRule, BranchConfig, NarrativeTable, RevealBatch},
    dataset::PageDescriptor,
    scroll::engine::ScrollPhase,
};

fn page(id: &str, x: f64, kind: &str, path: &[(f64, f64)]) -> PageDescriptor {
    let path: Vec<_> = path
        .iter()
        .map(|(x, y)| serde_json::json!({"x": x, "y": y}))
        .collect();
    serde_json::from_value(serde_json::json!({
        "id": id, "type": kind,
        "world": {"x": x, "y": 0.0},
        "size": {"w": 400.0, "h": 600.0},
        "scrollPath": path,
    }))
    .unwrap()
}

fn ten_points(x0: f64) -> Vec<(f64, f64)> {
    (0..10).map(|i| (x0 + 20.0 * i as f64, -100.0 + 20.0 * i as f64)).collect()
}

fn session_with(pages: Vec<PageDescriptor>, narrative: NarrativeTable) -> Session {
    let dataset = Arc::new(PageDataset::from_pages(pages).unwrap());
    let config = EngineConfig {
        narrative,
        ..EngineConfig::default()
    };
    let probe = Arc::new(MemoryProbe::new(Vec::<String>::new()));
    let resolver = Arc::new(ImageResolver::new(probe, config.images.clone()));
    Session::new(dataset, config, resolver).unwrap()
}

fn plain(n: usize) -> Vec<PageDescriptor> {
    (1..=n)
        .map(|i| page(&format!("p{i}"), i as f64 * 1000.0, "basic", &[]))
        .collect()
}

#[test]
fn boot_centers_first_page_without_animation() {
    let s = session_with(plain(3), NarrativeTable::default());
    let pose = s.camera_pose();
    assert_eq!((pose.x, pose.y), (640.0 - 1000.0, 400.0));
    assert_eq!(pose.scale, 1.4);
    assert_eq!(s.camera_driver(), CameraDriver::Idle);
    assert!(!s.camera.is_animating());
    assert_eq!(s.registry().instance_count(), 1);
    assert_eq!(s.page_info(), "1 / 3");
}

#[test]
fn overwritten_move_never_settles() {
    let mut pages = plain(3);
    pages[1] = page("p2", 2000.0, "special1", &ten_points(1900.0));
    let mut s = session_with(pages, NarrativeTable::default());

    s.handle(Intent::Next);
    assert!(s.state().click_locked);
    assert_eq!(s.camera_driver(), CameraDriver::Manual);
    s.advance(300);
    assert!(!s.state().click_locked);

    s.handle(Intent::Prev);
    s.advance(2000);
    assert_eq!(s.current(), 0);
    assert_eq!(s.scroll.phase(), ScrollPhase::Idle);
    assert_eq!(s.camera_driver(), CameraDriver::Idle);
}

#[test]
fn scroll_path_owns_camera_until_overview() {
    let mut pages = plain(3);
    pages[1] = page("p2", 2000.0, "special1", &ten_points(1900.0));
    let mut s = session_with(pages, NarrativeTable::default());

    s.handle(Intent::Next);
    s.advance(1000);
    assert_eq!(s.camera_driver(), CameraDriver::ScrollPath);
    assert!(!s.scroll_blocked());

    s.handle(Intent::ScrollProgress { progress: 0.5 });
    assert_eq!(s.camera_driver(), CameraDriver::ScrollPath);

    s.handle(Intent::ToggleOverview);
    assert_eq!(s.camera_driver(), CameraDriver::Overview);
    assert!(s.scroll_blocked());
    assert!(s.scroll_status().is_none());
}

#[test]
fn auto_advance_is_cancelled_when_leaving_max() {
    let mut pages = plain(3);
    pages[1] = page("p2", 2000.0, "special1", &ten_points(1900.0));
    let mut s = session_with(pages, NarrativeTable::default());
    s.handle(Intent::Next);
    s.advance(1000);

    s.handle(Intent::ScrollProgress { progress: 1.0 });
    assert!(s.nav_timer.is_some());
    s.handle(Intent::ScrollProgress { progress: 0.5 });
    assert!(s.nav_timer.is_none());
    s.advance(1000);
    assert_eq!(s.current(), 1);

    s.handle(Intent::ScrollProgress { progress: 1.0 });
    s.advance(800);
    assert_eq!(s.current(), 2);
    assert!(s.scroll_status().is_none());
}

#[test]
fn degenerate_path_moves_on_by_itself() {
    let mut pages = plain(3);
    pages[1] = page("p2", 2000.0, "special2", &[(1900.0, 0.0), (2000.0, 0.0)]);
    let mut s = session_with(pages, NarrativeTable::default());
    s.handle(Intent::Next);
    s.advance(800);
    assert_eq!(s.current(), 1);
    assert!(s.scroll_status().is_none());
    s.advance(1000);
    assert_eq!(s.current(), 2);
}

#[test]
fn revisited_degenerate_page_waits_for_its_new_settle() {
    let mut pages = plain(3);
    pages[1] = page("p2", 2000.0, "special2", &[(1900.0, 0.0), (2000.0, 0.0)]);
    let mut s = session_with(pages, NarrativeTable::default());

    s.handle(Intent::Next);
    s.advance(810);
    assert!(s.nav_timer.is_some());
    s.handle(Intent::Prev);
    assert!(s.nav_timer.is_none());
    s.advance(290);
    s.handle(Intent::Next);
    assert_eq!(s.current(), 1);

    // The first visit's advance would have been due at 1800.
    s.advance(750);
    assert_eq!(s.now(), 1850);
    assert_eq!(s.current(), 1);
    s.advance(1049);
    assert_eq!(s.current(), 1);
    s.advance(1);
    assert_eq!(s.current(), 2);
}

#[test]
fn resize_rebuilds_the_scroll_region_at_the_same_progress() {
    let mut pages = plain(3);
    pages[1] = page("p2", 2000.0, "special1", &ten_points(1900.0));
    let mut s = session_with(pages, NarrativeTable::default());
    s.handle(Intent::Next);
    s.advance(1000);
    s.handle(Intent::ScrollProgress { progress: 0.5 });
    let before = s.camera_pose();

    s.handle(Intent::Resize {
        width: 1280.0,
        height: 400.0,
    });
    let region = s.scroll.region().unwrap();
    assert_eq!(region.viewport_height, 400.0);
    assert_eq!(region.trailing_margin, 400.0);
    assert_eq!(s.scroll.progress(), Some(0.5));
    assert_eq!(s.scroll_offset, region.offset_for(0.5));
    assert_eq!(s.camera_driver(), CameraDriver::ScrollPath);
    let after = s.camera_pose();
    assert!((after.x - before.x).abs() < 1e-9);
    assert!((after.y - (before.y - 200.0)).abs() < 1e-9);
}

#[test]
fn resize_on_a_plain_page_keeps_pending_auto_advance() {
    let narrative = NarrativeTable {
        auto_advance: vec![AutoAdvanceRule {
            id: "p2".into(),
            delay_ms: 1500,
        }],
        ..NarrativeTable::default()
    };
    let mut s = session_with(plain(3), narrative);
    s.handle(Intent::Next);
    s.advance(800);
    s.handle(Intent::Resize {
        width: 1000.0,
        height: 600.0,
    });
    assert_eq!(s.current(), 1);
    assert_eq!((s.camera_pose().x, s.camera_pose().y), (500.0 - 2000.0, 300.0));
    s.advance(1500);
    assert_eq!(s.current(), 2);
}

#[test]
fn reveal_batch_shows_pages_in_segments_and_hands_off() {
    let mut pages = plain(6);
    pages[1] = page("p2", 2000.0, "special1", &ten_points(1900.0));
    let narrative = NarrativeTable {
        reveal_batches: vec![RevealBatch {
            trigger: "p2".into(),
            pages: vec!["p3".into(), "p4".into(), "p5".into()],
            segments: 3,
            unlock_at: 0.8,
            advance_to: Some("p6".into()),
            advance_after: 0.85,
            advance_delay_ms: 500,
        }],
        ..NarrativeTable::default()
    };
    let mut s = session_with(pages, narrative);
    s.handle(Intent::Next);
    s.advance(1000);

    for id in ["p3", "p4", "p5"] {
        let inst = s.registry().instance(id).unwrap();
        assert!(inst.flags.sequence_member);
        assert!(!inst.flags.visible);
    }

    s.handle(Intent::ScrollProgress { progress: 0.5 });
    assert!(s.registry().instance("p4").unwrap().flags.visible);
    assert!(!s.registry().instance("p5").unwrap().flags.visible);
    assert_eq!(s.display_index(), 3);

    s.handle(Intent::ScrollProgress { progress: 0.9 });
    assert!(!s.state().click_locked);
    s.handle(Intent::Next);
    assert_eq!(s.current(), 1);

    s.handle(Intent::ScrollProgress { progress: 0.1 });
    assert!(s.registry().instance("p5").unwrap().flags.visible);

    s.handle(Intent::ScrollProgress { progress: 0.95 });
    s.advance(500);
    assert_eq!(s.current(), 5);
    assert_eq!(s.state().special_progress_index, None);
    assert!(s.registry().instance("p6").is_some());
}

#[test]
fn slider_warns_after_repeated_rejections() {
    let mut s = session_with(plain(10), NarrativeTable::default());
    for _ in 0..4 {
        s.handle(Intent::SliderJump { index: 8 });
    }
    assert!(s.toast().is_none());
    s.handle(Intent::SliderJump { index: 8 });
    assert!(s.toast().is_some());
    assert_eq!(s.slider_rejections, 0);
    s.advance(3000);
    assert!(s.toast().is_none());
}

#[test]
fn anchor_scroll_opens_branch_prompt_once() {
    let mut pages = plain(6);
    pages[1] = page("p2", 2000.0, "special1", &ten_points(1900.0));
    let narrative = NarrativeTable {
        branch: Some(BranchConfig {
            anchor: "p2".into(),
            arm_a_start: "p3".into(),
            arm_b_start: "p5".into(),
            arm_a_end: None,
            ending_a: None,
            ending_b: None,
            default_branch: Branch::B,
        }),
        ..NarrativeTable::default()
    };
    let mut s = session_with(pages, narrative);
    s.handle(Intent::Next);
    s.advance(1000);

    s.handle(Intent::ScrollProgress { progress: 1.0 });
    assert!(s.nav_timer.is_some());
    s.advance(499);
    assert_eq!(s.prompt(), None);
    s.advance(1);
    assert_eq!(s.prompt(), Some(Prompt::BranchChoice));
    assert!(s.state().modal_open);

    s.handle(Intent::ChooseBranch { branch: Branch::A });
    assert_eq!(s.registry().ids(), ["p1", "p2", "p3", "p4"]);
    s.advance(300);
    assert_eq!(s.current(), 2);
    assert_eq!(s.current_page_id(), Some("p3"));
}
