//! Identity provider and role assigner traits.
//!
//! This module defines the two seams every directory integration plugs into:
//! [`IdentityProvider`] creates and queries service principals, and
//! [`RoleAssigner`] attaches the default authorization role to principals that
//! were just created.

use crate::{CreatedPrincipal, PasswordCredential, Result, ServicePrincipal};
use async_trait::async_trait;

/// IdentityProvider creates and queries service principals.
///
/// All implementations must be `Send + Sync` so they can be shared across
/// async tasks, even though the batch creator drives them sequentially.
///
/// # Implementations
///
/// - **CLI-based**: Azure CLI (`az`), behind the `azcli` feature
/// - **Testing**: Mock provider with per-name error injection
///
/// # Example
///
/// ```
/// use spnmux::providers::mock::MockIdentityProvider;
/// use spnmux::IdentityProvider;
///
/// #[tokio::main]
/// async fn main() -> spnmux::Result<()> {
///     let mut provider = MockIdentityProvider::new();
///     provider.init().await?;
///
///     let created = provider.create_principal("billing-api", None).await?;
///     let found = provider.lookup_by_app_id(&created.app_id).await?;
///
///     assert_eq!(found.len(), 1);
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the provider name (e.g., "mock", "azcli").
    fn name(&self) -> &str;

    /// Initializes the provider.
    ///
    /// For CLI providers this checks that the tool is installed and logged in.
    ///
    /// # Errors
    ///
    /// - [`SpnError::ProviderNotInstalled`](crate::SpnError::ProviderNotInstalled):
    ///   the CLI tool is missing
    /// - [`SpnError::NotAuthenticated`](crate::SpnError::NotAuthenticated):
    ///   there is no active login
    async fn init(&mut self) -> Result<()>;

    /// Releases provider resources. A no-op for most providers.
    async fn close(&mut self) -> Result<()>;

    /// Creates a registered application and its service principal.
    ///
    /// With `credential = None` the principal is created from the display
    /// name only. With a credential, a password is attached to the
    /// application using the credential's validity window. Providers that
    /// issue their own secret return it in
    /// [`CreatedPrincipal::credential`] in place of the requested one.
    ///
    /// # Errors
    ///
    /// - [`SpnError::Provider`](crate::SpnError::Provider): the provider
    ///   rejected the request
    /// - [`SpnError::InvalidDisplayName`](crate::SpnError::InvalidDisplayName):
    ///   the display name cannot be sent to this provider
    async fn create_principal(
        &mut self,
        display_name: &str,
        credential: Option<PasswordCredential>,
    ) -> Result<CreatedPrincipal>;

    /// Returns all service principals whose display name equals `display_name`.
    async fn lookup_by_name(&self, display_name: &str) -> Result<Vec<ServicePrincipal>>;

    /// Returns the service principal for an application id.
    ///
    /// An unknown application id yields an empty vector.
    async fn lookup_by_app_id(&self, app_id: &str) -> Result<Vec<ServicePrincipal>>;

    /// Returns service principals whose display name matches a `*` pattern.
    async fn lookup_by_wildcard(&self, pattern: &str) -> Result<Vec<ServicePrincipal>>;
}

/// RoleAssigner attaches the default role to newly created principals.
#[async_trait]
pub trait RoleAssigner: Send + Sync {
    /// Returns the assigner name.
    fn name(&self) -> &str;

    /// Assigns the configured default role and scope to every principal.
    ///
    /// Called at most once per batch with the full list of created principals.
    ///
    /// # Errors
    ///
    /// Returns [`SpnError::Assignment`](crate::SpnError::Assignment) if any
    /// assignment failed.
    async fn assign_default_role(&mut self, principals: &[CreatedPrincipal]) -> Result<()>;
}
