//! Provider factory and registration system.

use crate::{Config, IdentityProvider, Result, RoleAssigner, SpnError};
use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

/// Factory function type for creating identity providers.
pub type ProviderFactory = fn(Config) -> Result<Box<dyn IdentityProvider>>;

/// Factory function type for creating role assigners.
pub type AssignerFactory = fn(Config) -> Result<Box<dyn RoleAssigner>>;

static PROVIDER_REGISTRY: OnceLock<RwLock<HashMap<String, ProviderFactory>>> = OnceLock::new();
static ASSIGNER_REGISTRY: OnceLock<RwLock<HashMap<String, AssignerFactory>>> = OnceLock::new();

fn providers() -> &'static RwLock<HashMap<String, ProviderFactory>> {
    PROVIDER_REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

fn assigners() -> &'static RwLock<HashMap<String, AssignerFactory>> {
    ASSIGNER_REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Registers an identity provider factory under `name`.
///
/// Provider modules call this from their `register()` functions during
/// library initialization.
pub fn register_provider(name: &str, factory: ProviderFactory) {
    let mut reg = providers().write().unwrap_or_else(|e| e.into_inner());
    reg.insert(name.to_string(), factory);
}

/// Registers a role assigner factory under `name`.
pub fn register_assigner(name: &str, factory: AssignerFactory) {
    let mut reg = assigners().write().unwrap_or_else(|e| e.into_inner());
    reg.insert(name.to_string(), factory);
}

fn unknown(name: &str) -> SpnError {
    SpnError::Other(anyhow::anyhow!(
        "unknown provider: {} (did you enable the '{}' feature flag?)",
        name,
        name
    ))
}

/// Creates a new identity provider from configuration.
///
/// # Errors
///
/// Returns an error if the provider is not registered (missing feature flag
/// or `register()` call) or its factory fails.
///
/// # Example
///
/// ```
/// use spnmux::{factory, Config, IdentityProvider, ProviderType};
///
/// spnmux::init();
/// let provider = factory::new_provider(Config::new(ProviderType::Mock)).unwrap();
/// assert_eq!(provider.name(), "mock");
/// ```
pub fn new_provider(config: Config) -> Result<Box<dyn IdentityProvider>> {
    let name = config.provider.to_string();

    let factory = {
        let reg = providers().read().unwrap_or_else(|e| e.into_inner());
        *reg.get(&name).ok_or_else(|| unknown(&name))?
    };

    factory(config)
}

/// Creates a new role assigner from configuration.
///
/// # Errors
///
/// Same conditions as [`new_provider`].
pub fn new_role_assigner(config: Config) -> Result<Box<dyn RoleAssigner>> {
    let name = config.provider.to_string();

    let factory = {
        let reg = assigners().read().unwrap_or_else(|e| e.into_inner());
        *reg.get(&name).ok_or_else(|| unknown(&name))?
    };

    factory(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProviderType;

    fn failing_factory(_cfg: Config) -> Result<Box<dyn IdentityProvider>> {
        Err(SpnError::Other(anyhow::anyhow!("failing factory")))
    }

    #[test]
    fn test_provider_registration() {
        register_provider("test-provider", failing_factory);

        let reg = providers().read().unwrap();
        assert!(reg.contains_key("test-provider"));
    }

    #[test]
    #[cfg(not(feature = "azcli"))]
    fn test_unknown_provider_error() {
        let result = new_provider(Config::new(ProviderType::AzureCli));

        match result {
            Err(e) => {
                let msg = e.to_string();
                assert!(msg.contains("unknown provider"));
                assert!(msg.contains("feature flag"));
            }
            Ok(_) => panic!("azcli provider should not be registered"),
        }
    }

    #[test]
    #[cfg(feature = "mock")]
    fn test_mock_assigner_from_factory() {
        crate::init();
        let assigner = new_role_assigner(Config::new(ProviderType::Mock)).unwrap();
        assert_eq!(assigner.name(), "mock");
    }
}
