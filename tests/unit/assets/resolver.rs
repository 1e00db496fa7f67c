use super::*;
use crate::assets::probe::MemoryProbe;

fn resolver(available: &[&str]) -> (Arc<MemoryProbe>, ImageResolver) {
    let probe = Arc::new(MemoryProbe::new(available.iter().copied()));
    let r = ImageResolver::new(probe.clone(), ImageSettings::default());
    (probe, r)
}

#[test]
fn probes_extensions_in_order_and_memoizes() {
    let (probe, r) = resolver(&["images/p1.png", "images/p1.webp"]);
    let first = r.resolve("p1");
    assert_eq!(first, ImageSource::File("images/p1.png".to_string()));
    assert_eq!(probe.calls(), 2);

    let second = r.resolve("p1");
    assert_eq!(first, second);
    assert_eq!(probe.calls(), 2);
    assert_eq!(r.cached("p1"), Some(first));
}

#[test]
fn placeholder_is_permanent() {
    let (probe, r) = resolver(&[]);
    let src = r.resolve("p9");
    assert!(src.is_placeholder());
    assert!(src.as_str().starts_with("data:image/svg+xml;utf8,"));
    assert!(src.as_str().contains("Missing%20p9"));
    assert_eq!(probe.calls(), 3);

    r.resolve("p9");
    assert_eq!(probe.calls(), 3);
}

#[test]
fn concurrent_resolution_probes_once() {
    let (probe, r) = resolver(&["images/p2.webp"]);
    let ids = vec!["p2"; 16];
    let out = r.preload(&ids);
    assert!(out.iter().all(|s| s.as_str() == "images/p2.webp"));
    assert_eq!(probe.calls(), 3);
}

#[test]
fn thumbnail_extension_follows_original() {
    let (_, r) = resolver(&["images/p1.png", "images/p2.jpg"]);
    r.resolve("p1");
    r.resolve("p2");
    assert_eq!(
        r.thumbnail_candidates("p1"),
        [
            "images/thumbnails/p1_thumb.png".to_string(),
            "images/thumbnails/p1_thumb.jpg".to_string()
        ]
    );
    assert_eq!(r.thumbnail_candidates("p2")[0], "images/thumbnails/p2_thumb.jpg");
    assert_eq!(r.thumbnail_candidates("p3")[0], "images/thumbnails/p3_thumb.jpg");
}

#[test]
fn thumbnail_falls_back_to_secondary_then_none() {
    let (_, r) = resolver(&["images/p1.jpg", "images/thumbnails/p1_thumb.png"]);
    r.resolve("p1");
    assert_eq!(
        r.resolve_thumbnail("p1").as_deref(),
        Some("images/thumbnails/p1_thumb.png")
    );
    assert_eq!(r.resolve_thumbnail("p2"), None);
}

#[test]
fn extension_folds_jpeg() {
    assert_eq!(
        ImageSource::File("a/b.JPEG".into()).extension().as_deref(),
        Some("jpg")
    );
    assert_eq!(ImageSource::Placeholder("x".into()).extension(), None);
}

#[test]
fn uri_component_encoding_matches_browser_rules() {
    assert_eq!(encode_uri_component("a b/<c>#"), "a%20b%2F%3Cc%3E%23");
    assert_eq!(encode_uri_component("it's(ok)!"), "it's(ok)!");
}
