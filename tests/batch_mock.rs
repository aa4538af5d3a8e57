//! Batch workflow tests against the in-memory mock provider.
//!
//! Run with:
//!   cargo test --test batch_mock

#![cfg(feature = "mock")]

use spnmux::batch::{read_names_file, BatchPrincipalCreator};
use spnmux::lookup::find_principals;
use spnmux::providers::mock::{MockIdentityProvider, MockRoleAssigner};
use spnmux::{
    factory, Config, CreationSummary, IdentityProvider, PrincipalQuery, ProviderError,
    ProviderType, SpnError,
};

fn init_library() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        spnmux::init();
    });
}

fn mock_config() -> Config {
    Config::new(ProviderType::Mock)
}

#[tokio::test]
async fn test_partial_failure_keeps_going() {
    let config = mock_config();
    let mut provider = MockIdentityProvider::new();
    let mut assigner = MockRoleAssigner::new();
    provider.fail_on(
        "B",
        ProviderError::new("Another object with the same value for property identifierUris already exists")
            .with_code("Request_BadRequest"),
    );

    let outcome = BatchPrincipalCreator::new(&mut provider, &mut assigner, &config)
        .create_batch(&["A", "B", "C"])
        .await
        .unwrap();

    assert_eq!(outcome.created_names(), vec!["A", "C"]);
    assert_eq!(outcome.success_count(), 2);
    assert_eq!(outcome.summary(), CreationSummary::Multiple(2));
    assert_eq!(outcome.summary().to_string(), "2 service principal objects created");

    assert_eq!(outcome.failures().len(), 1);
    assert_eq!(outcome.failures()[0].display_name, "B");
    assert_eq!(outcome.failures()[0].code.as_deref(), Some("Request_BadRequest"));

    assert_eq!(provider.attempts(), ["A", "B", "C"]);
    assert_eq!(assigner.calls(), vec![vec!["A".to_string(), "C".to_string()]]);
    for created in outcome.created() {
        assert!(assigner.is_assigned(&created.app_id));
    }
}

#[tokio::test]
async fn test_single_success_summary() {
    let config = mock_config();
    let mut provider = MockIdentityProvider::new();
    let mut assigner = MockRoleAssigner::new();

    let outcome = BatchPrincipalCreator::new(&mut provider, &mut assigner, &config)
        .create_batch(&["solo"])
        .await
        .unwrap();

    assert_eq!(outcome.summary(), CreationSummary::Single);
    assert_eq!(outcome.summary().to_string(), "1 service principal object created");
    assert_eq!(assigner.calls().len(), 1);
}

#[tokio::test]
async fn test_all_failed_skips_assignment() {
    let config = mock_config();
    let mut provider = MockIdentityProvider::new();
    let mut assigner = MockRoleAssigner::new();
    provider.fail_on("x", ProviderError::new("Insufficient privileges"));
    provider.fail_on("y", ProviderError::new("Insufficient privileges"));

    let outcome = BatchPrincipalCreator::new(&mut provider, &mut assigner, &config)
        .create_batch(&["x", "y"])
        .await
        .unwrap();

    assert_eq!(outcome.summary(), CreationSummary::None);
    assert_eq!(outcome.summary().to_string(), "No service principal objects created");
    assert!(outcome.created().is_empty());
    assert_eq!(outcome.failures().len(), 2);
    assert!(assigner.calls().is_empty());
}

#[tokio::test]
async fn test_assignment_failure_keeps_created_principals() {
    let config = mock_config();
    let mut provider = MockIdentityProvider::new();
    let mut assigner = MockRoleAssigner::new();
    assigner.assign_error = Some(SpnError::Assignment("AuthorizationFailed".to_string()));

    let outcome = BatchPrincipalCreator::new(&mut provider, &mut assigner, &config)
        .create_batch(&["kept"])
        .await
        .unwrap();

    assert_eq!(outcome.success_count(), 1);
    assert_eq!(outcome.summary(), CreationSummary::Single);
    assert!(outcome
        .assignment_error()
        .unwrap()
        .contains("AuthorizationFailed"));

    let found = provider.lookup_by_name("kept").await.unwrap();
    assert_eq!(found.len(), 1);
}

#[tokio::test]
async fn test_duplicate_names_are_attempted_twice() {
    let config = mock_config();
    let mut provider = MockIdentityProvider::new();
    let mut assigner = MockRoleAssigner::new();

    let outcome = BatchPrincipalCreator::new(&mut provider, &mut assigner, &config)
        .create_batch(&["A", "A"])
        .await
        .unwrap();

    assert_eq!(outcome.created_names(), vec!["A", "A"]);
    assert_eq!(outcome.summary(), CreationSummary::Multiple(2));
    assert_ne!(outcome.created()[0].app_id, outcome.created()[1].app_id);
}

#[tokio::test]
async fn test_empty_input_never_calls_provider() {
    let config = mock_config();
    let mut provider = MockIdentityProvider::new();
    let mut assigner = MockRoleAssigner::new();

    let names: [&str; 0] = [];
    let result = BatchPrincipalCreator::new(&mut provider, &mut assigner, &config)
        .create_batch(&names)
        .await;

    assert!(matches!(result, Err(SpnError::EmptyInput)));
    assert!(provider.attempts().is_empty());
    assert!(assigner.calls().is_empty());
}

#[tokio::test]
async fn test_created_count_matches_counter() {
    let config = mock_config();
    let mut provider = MockIdentityProvider::new();
    let mut assigner = MockRoleAssigner::new();
    provider.fail_on("n2", ProviderError::new("rejected"));
    provider.fail_on("n5", ProviderError::new("rejected"));

    let names: Vec<String> = (1..=6).map(|i| format!("n{}", i)).collect();
    let outcome = BatchPrincipalCreator::new(&mut provider, &mut assigner, &config)
        .create_batch(&names)
        .await
        .unwrap();

    assert!(outcome.created().len() <= names.len());
    assert_eq!(outcome.created().len(), outcome.success_count());
    assert_eq!(outcome.created().len() + outcome.failures().len(), names.len());
    assert_eq!(outcome.created_names(), vec!["n1", "n3", "n4", "n6"]);
}

#[tokio::test]
async fn test_created_principals_are_discoverable() {
    let config = mock_config();
    let mut provider = MockIdentityProvider::new();
    let mut assigner = MockRoleAssigner::new();
    provider.set_principal("legacy-app", "legacy-app-id").await;

    let outcome = BatchPrincipalCreator::new(&mut provider, &mut assigner, &config)
        .create_batch(&["billing-api", "billing-worker", "search-api"])
        .await
        .unwrap();

    let by_name = find_principals(&provider, &PrincipalQuery::ByName("search-api".into()))
        .await
        .unwrap();
    assert_eq!(by_name.len(), 1);

    let app_id = outcome.created()[0].app_id.clone();
    let by_app_id = find_principals(&provider, &PrincipalQuery::ByAppId(app_id))
        .await
        .unwrap();
    assert_eq!(by_app_id, vec![outcome.created()[0].to_service_principal()]);

    let mut billing: Vec<String> = find_principals(&provider, &PrincipalQuery::ByWildcard("billing-*".into()))
        .await
        .unwrap()
        .into_iter()
        .map(|sp| sp.display_name)
        .collect();
    billing.sort();
    assert_eq!(billing, vec!["billing-api", "billing-worker"]);

    let everything = find_principals(&provider, &PrincipalQuery::ByWildcard("*".into()))
        .await
        .unwrap();
    assert_eq!(everything.len(), 4);
}

#[tokio::test]
async fn test_batch_from_file_through_factory() {
    init_library();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("names.txt");
    tokio::fs::write(&path, "svc-one\n\n  svc-two  \n").await.unwrap();

    let config = mock_config();
    let mut provider = factory::new_provider(config.clone()).unwrap();
    let mut assigner = factory::new_role_assigner(config.clone()).unwrap();
    provider.init().await.unwrap();

    let names = read_names_file(&path).await.unwrap();
    let outcome = BatchPrincipalCreator::new(&mut *provider, &mut *assigner, &config)
        .create_batch(&names)
        .await
        .unwrap();

    assert_eq!(outcome.created_names(), vec!["svc-one", "svc-two"]);

    let report = outcome.report(false);
    assert_eq!(report.created_count, 2);
    assert!(report
        .created
        .iter()
        .all(|p| p.secret.as_deref() == Some("[REDACTED]")));

    provider.close().await.unwrap();
}
