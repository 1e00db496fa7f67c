use std::sync::Arc;

use super::*;
use crate::{
    assets::probe::MemoryProbe, config::ImageSettings, dataset::PageDataset,
};

fn setup() -> (PageRegistry, ImageResolver) {
    let ds = PageDataset::from_json_str(
        r#"[
          {"id": "p1", "type": "basic", "world": {"x": 0, "y": 0}, "size": {"w": 10, "h": 10}},
          {"id": "p2", "type": "basic", "world": {"x": 20, "y": 0}, "size": {"w": 10, "h": 10}},
          {"id": "p3", "type": "blank", "world": {"x": 40, "y": 0}, "size": {"w": 10, "h": 10}}
        ]"#,
    )
    .unwrap();
    let probe = Arc::new(MemoryProbe::new([
        "images/p1.png",
        "images/p2.jpg",
        "images/thumbnails/p1_thumb.png",
    ]));
    let resolver = ImageResolver::new(probe, ImageSettings::default());
    let mut reg = PageRegistry::new(Arc::new(ds));
    for i in 0..3 {
        reg.ensure(i, &resolver);
    }
    (reg, resolver)
}

#[test]
fn attach_swaps_thumbnails_and_detach_restores() {
    let (mut reg, resolver) = setup();
    let mut aff = OverviewAffordances::default();
    aff.attach(&mut reg, &resolver, Some("p2"));
    assert!(aff.is_attached());
    assert_eq!(
        reg.instance("p1").unwrap().displayed.as_deref(),
        Some("images/thumbnails/p1_thumb.png")
    );
    assert_eq!(
        reg.instance("p2").unwrap().displayed.as_deref(),
        Some("images/p2.jpg")
    );
    assert!(reg.instance("p2").unwrap().flags.highlighted);
    assert!(reg.instance("p3").unwrap().displayed.is_none());

    aff.detach(&mut reg);
    assert_eq!(
        reg.instance("p1").unwrap().displayed.as_deref(),
        Some("images/p1.png")
    );
    assert!(reg.instances().all(|i| !i.flags.hover_enabled && !i.flags.highlighted));
}

#[test]
fn attach_and_detach_are_idempotent() {
    let (mut reg, resolver) = setup();
    let mut aff = OverviewAffordances::default();
    aff.detach(&mut reg);
    aff.attach(&mut reg, &resolver, None);
    reg.instance_mut("p1").unwrap().flags.hovered = true;
    aff.attach(&mut reg, &resolver, None);
    assert!(reg.instance("p1").unwrap().flags.hovered);
}

#[test]
fn hover_requires_attachment() {
    let (mut reg, resolver) = setup();
    let mut aff = OverviewAffordances::default();
    assert!(!aff.hover(&mut reg, "p1", true));
    aff.attach(&mut reg, &resolver, None);
    assert!(aff.hover(&mut reg, "p1", true));
    assert!(reg.instance("p1").unwrap().flags.hovered);
    assert!(!aff.hover(&mut reg, "missing", true));
}

#[test]
fn dimming_leaves_focus_bright() {
    let (mut reg, _) = setup();
    dim_all_except(&mut reg, "p2");
    assert!(reg.instance("p1").unwrap().flags.dimmed);
    assert!(!reg.instance("p2").unwrap().flags.dimmed);
    undim_all(&mut reg);
    assert!(reg.instances().all(|i| !i.flags.dimmed));
}
