//! Mock provider for testing.
//!
//! An in-memory directory with error injection, so code built on spnmux can
//! be exercised without a tenant.

use crate::lookup::wildcard_match;
use crate::*;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Mock identity provider.
///
/// Stores created principals in memory. Creation can be made to fail for
/// specific display names, or slowed down to exercise call deadlines.
///
/// # Example
///
/// ```
/// use spnmux::providers::mock::MockIdentityProvider;
/// use spnmux::{IdentityProvider, ProviderError};
///
/// #[tokio::main]
/// async fn main() -> spnmux::Result<()> {
///     let mut provider = MockIdentityProvider::new();
///     provider.fail_on("broken", ProviderError::new("insufficient privileges"));
///
///     assert!(provider.create_principal("broken", None).await.is_err());
///     assert!(provider.create_principal("working", None).await.is_ok());
///     Ok(())
/// }
/// ```
pub struct MockIdentityProvider {
    principals: Arc<RwLock<Vec<ServicePrincipal>>>,
    create_errors: HashMap<String, ProviderError>,
    attempts: Vec<String>,

    /// Error to return from `init()`
    pub init_error: Option<SpnError>,
    /// Error to return from every lookup
    pub lookup_error: Option<SpnError>,
    /// Artificial delay applied to `create_principal()`
    pub create_delay: Option<Duration>,
}

impl MockIdentityProvider {
    /// Creates a new mock provider with an empty directory.
    pub fn new() -> Self {
        Self {
            principals: Arc::new(RwLock::new(Vec::new())),
            create_errors: HashMap::new(),
            attempts: Vec::new(),
            init_error: None,
            lookup_error: None,
            create_delay: None,
        }
    }

    /// Makes every creation attempt for `display_name` fail with `err`.
    pub fn fail_on(&mut self, display_name: impl Into<String>, err: ProviderError) {
        self.create_errors.insert(display_name.into(), err);
    }

    /// Pre-populates the directory with a principal.
    pub async fn set_principal(&self, display_name: impl Into<String>, app_id: impl Into<String>) {
        let mut principals = self.principals.write().await;
        principals.push(ServicePrincipal {
            app_id: app_id.into(),
            display_name: display_name.into(),
            object_id: Some(uuid::Uuid::new_v4().to_string()),
        });
    }

    /// Display names passed to `create_principal()`, in call order.
    pub fn attempts(&self) -> &[String] {
        &self.attempts
    }

    async fn filtered(&self, pred: impl Fn(&ServicePrincipal) -> bool) -> Result<Vec<ServicePrincipal>> {
        if let Some(ref err) = self.lookup_error {
            return Err(SpnError::Other(anyhow::anyhow!("{}", err)));
        }

        let principals = self.principals.read().await;
        Ok(principals.iter().filter(|sp| pred(sp)).cloned().collect())
    }
}

impl Default for MockIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn init(&mut self) -> Result<()> {
        if let Some(ref err) = self.init_error {
            return Err(SpnError::Other(anyhow::anyhow!("{}", err)));
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }

    async fn create_principal(
        &mut self,
        display_name: &str,
        credential: Option<PasswordCredential>,
    ) -> Result<CreatedPrincipal> {
        self.attempts.push(display_name.to_string());

        if let Some(delay) = self.create_delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.create_errors.get(display_name) {
            return Err(SpnError::Provider(err.clone()));
        }

        if display_name.trim().is_empty() {
            return Err(SpnError::InvalidDisplayName(
                "name cannot be empty".to_string(),
            ));
        }

        let app_id = uuid::Uuid::new_v4().to_string();
        let object_id = uuid::Uuid::new_v4().to_string();

        let mut principals = self.principals.write().await;
        principals.push(ServicePrincipal {
            app_id: app_id.clone(),
            display_name: display_name.to_string(),
            object_id: Some(object_id.clone()),
        });

        let mut created = CreatedPrincipal::new(display_name, app_id).with_object_id(object_id);
        if let Some(cred) = credential {
            created = created.with_credential(cred);
        }
        Ok(created)
    }

    async fn lookup_by_name(&self, display_name: &str) -> Result<Vec<ServicePrincipal>> {
        self.filtered(|sp| sp.display_name == display_name).await
    }

    async fn lookup_by_app_id(&self, app_id: &str) -> Result<Vec<ServicePrincipal>> {
        self.filtered(|sp| sp.app_id == app_id).await
    }

    async fn lookup_by_wildcard(&self, pattern: &str) -> Result<Vec<ServicePrincipal>> {
        self.filtered(|sp| wildcard_match(pattern, &sp.display_name)).await
    }
}

/// Mock role assigner.
///
/// Records every call so tests can check that assignment happened once, with
/// the expected principals.
pub struct MockRoleAssigner {
    calls: Vec<Vec<String>>,
    assigned: HashSet<String>,

    /// Error to return from `assign_default_role()`
    pub assign_error: Option<SpnError>,
}

impl MockRoleAssigner {
    /// Creates a new mock role assigner.
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            assigned: HashSet::new(),
            assign_error: None,
        }
    }

    /// Display names passed to each `assign_default_role()` call.
    pub fn calls(&self) -> &[Vec<String>] {
        &self.calls
    }

    /// Returns `true` if the application id was given the default role.
    pub fn is_assigned(&self, app_id: &str) -> bool {
        self.assigned.contains(app_id)
    }
}

impl Default for MockRoleAssigner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoleAssigner for MockRoleAssigner {
    fn name(&self) -> &str {
        "mock"
    }

    async fn assign_default_role(&mut self, principals: &[CreatedPrincipal]) -> Result<()> {
        self.calls
            .push(principals.iter().map(|p| p.display_name.clone()).collect());

        if let Some(ref err) = self.assign_error {
            return Err(SpnError::Assignment(err.to_string()));
        }

        self.assigned
            .extend(principals.iter().map(|p| p.app_id.clone()));
        Ok(())
    }
}

/// Registers the mock provider and role assigner with the factory.
pub fn register() {
    crate::factory::register_provider("mock", |_cfg| Ok(Box::new(MockIdentityProvider::new())));
    crate::factory::register_assigner("mock", |_cfg| Ok(Box::new(MockRoleAssigner::new())));
}
