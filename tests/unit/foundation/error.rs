use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        MemeError::asset_load("https://x/y.jpg", "404")
            .to_string()
            .contains("asset load failed for 'https://x/y.jpg'")
    );
    assert!(MemeError::draw("x").to_string().contains("draw failed:"));
    assert!(MemeError::save("x").to_string().contains("save failed:"));
    assert!(
        MemeError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        MemeError::NotReady(EngineState::Loading)
            .to_string()
            .contains("Loading")
    );
}

#[test]
fn taxonomy_errors_map_to_faults() {
    let f = MemeError::asset_load("r", "boom").fault().unwrap();
    assert_eq!(f.kind, FaultKind::AssetLoadFailed);
    assert!(f.message.contains("boom"));

    assert_eq!(
        MemeError::draw("x").fault().unwrap().kind,
        FaultKind::DrawFailed
    );
    assert_eq!(
        MemeError::save("x").fault().unwrap().kind,
        FaultKind::SaveFailed
    );
    assert_eq!(
        MemeError::NotAuthenticated.fault().unwrap().kind,
        FaultKind::NotAuthenticated
    );
}

#[test]
fn precondition_and_internal_errors_are_not_faults() {
    assert!(MemeError::NotReady(EngineState::Idle).fault().is_none());
    assert!(MemeError::validation("x").fault().is_none());
    assert!(MemeError::SessionClosed.fault().is_none());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = MemeError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
