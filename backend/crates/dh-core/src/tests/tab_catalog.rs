use crate::tests::tab;
use crate::{CoreError, DeploymentKey, TabCatalog};

#[test]
fn given_no_tabs_when_building_catalog_then_validation_error() {
    let result = TabCatalog::new(vec![]);

    assert!(matches!(result, Err(CoreError::Validation { .. })));
}

#[test]
fn given_restartable_tab_when_get_then_binding_carries_deployment() {
    let catalog = TabCatalog::new(vec![
        tab("docs", None),
        tab("code", Some(("default", "code-server"))),
    ])
    .unwrap();

    let binding = catalog.get(1).unwrap();

    assert_eq!(binding.index, 1);
    assert!(binding.is_restartable());
    assert_eq!(
        binding.deployment_key,
        Some(DeploymentKey::new("default", "code-server"))
    );
}

#[test]
fn given_out_of_range_index_when_get_then_tab_not_found() {
    let catalog = TabCatalog::new(vec![tab("docs", None)]).unwrap();

    let result = catalog.get(3);

    assert!(matches!(result, Err(CoreError::TabNotFound { index: 3, .. })));
}

#[test]
fn given_tab_without_k8s_when_assert_restartable_then_not_restartable() {
    let catalog = TabCatalog::new(vec![tab("docs", None)]).unwrap();

    let result = catalog.assert_restartable(0);

    assert!(matches!(
        result,
        Err(CoreError::TabNotRestartable { index: 0, .. })
    ));
}

#[test]
fn given_padded_fields_when_building_catalog_then_values_are_trimmed() {
    let mut padded = tab("code", Some(("  default ", " code-server  ")));
    padded.text = "  Code Server  ".to_string();
    padded.tab_color = Some("   ".to_string());

    let catalog = TabCatalog::new(vec![padded]).unwrap();
    let stored = catalog.tab(0).unwrap();

    assert_eq!(stored.text, "Code Server");
    assert_eq!(stored.tab_color, None);
    assert_eq!(
        stored.k8s,
        Some(DeploymentKey::new("default", "code-server"))
    );
}

#[test]
fn given_blank_deployment_name_when_building_catalog_then_validation_error() {
    let result = TabCatalog::new(vec![tab("code", Some(("default", "   ")))]);

    match result {
        Err(CoreError::Validation { message, .. }) => {
            assert!(message.contains("k8s.deployment"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn given_tabs_sharing_a_deployment_when_listing_deployments_then_deduplicated() {
    let catalog = TabCatalog::new(vec![
        tab("a", Some(("default", "api"))),
        tab("b", Some(("default", "api"))),
        tab("c", Some(("tools", "api"))),
        tab("d", None),
    ])
    .unwrap();

    let keys = catalog.deployments();

    assert_eq!(
        keys,
        vec![
            DeploymentKey::new("default", "api"),
            DeploymentKey::new("tools", "api"),
        ]
    );
}
