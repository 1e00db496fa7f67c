use super::*;

#[test]
fn png_stays_png_everything_else_becomes_jpg() {
    let out = Path::new("thumbs");
    assert_eq!(
        thumbnail_path(Path::new("images/p3.png"), out),
        out.join("p3_thumb.png")
    );
    assert_eq!(
        thumbnail_path(Path::new("images/p3.WEBP"), out),
        out.join("p3_thumb.jpg")
    );
    assert_eq!(
        thumbnail_path(Path::new("images/p10.jpeg"), out),
        out.join("p10_thumb.jpg")
    );
}

#[test]
fn page_number_orders_numerically() {
    let mut files = vec![
        PathBuf::from("p10.jpg"),
        PathBuf::from("p2.png"),
        PathBuf::from("cover.jpg"),
        PathBuf::from("p1.webp"),
    ];
    files.sort_by_key(|f| page_number(f));
    assert_eq!(files[0], PathBuf::from("cover.jpg"));
    assert_eq!(files[1], PathBuf::from("p1.webp"));
    assert_eq!(files[3], PathBuf::from("p10.jpg"));
}

#[test]
fn resize_keeps_aspect_and_never_enlarges() {
    let big = DynamicImage::new_rgb8(800, 600);
    let small = resize_to_width(big, 400);
    assert_eq!((small.width(), small.height()), (400, 300));

    let tiny = DynamicImage::new_rgb8(120, 90);
    let same = resize_to_width(tiny, 400);
    assert_eq!((same.width(), same.height()), (120, 90));
}

#[test]
fn reduction_handles_empty_totals() {
    let report = ThumbnailReport::default();
    assert_eq!(report.average_reduction_pct(), 0.0);
    assert_eq!(reduction(200, 50), 75.0);
}
