use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        PagewalkError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        PagewalkError::dataset("x")
            .to_string()
            .contains("dataset error:")
    );
    assert!(PagewalkError::asset("x").to_string().contains("asset error:"));
    assert!(PagewalkError::config("x").to_string().contains("config error:"));
    assert!(
        PagewalkError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn json_errors_map_to_serde_variant() {
    let err: PagewalkError = serde_json::from_str::<Vec<u8>>("{")
        .map_err(PagewalkError::from)
        .unwrap_err();
    assert!(matches!(err, PagewalkError::Serde(_)));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = PagewalkError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
