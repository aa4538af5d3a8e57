//! Azure CLI provider.
//!
//! Drives the `az` command-line tool against the signed-in tenant. Login is
//! handled entirely by the CLI (`az login`); this provider only checks that a
//! login exists.
//!
//! # Configuration
//!
//! - `az_path` option: path to the `az` executable (default: "az")
//! - [`Config::default_role`](crate::Config::default_role) and
//!   [`Config::role_scope`](crate::Config::role_scope): role granted to
//!   created principals
//!
//! # Example
//!
//! ```
//! use spnmux::{Config, ProviderType};
//!
//! let config = Config::new(ProviderType::AzureCli)
//!     .with_default_role("Contributor")
//!     .with_role_scope("/subscriptions/00000000-0000-0000-0000-000000000000/resourceGroups/apps");
//! ```

mod assigner;
mod provider;

pub use assigner::AzCliRoleAssigner;
pub use provider::AzCliProvider;

use crate::cli::{capture_command, provider_error_from_stderr};
use crate::{factory, Config, Result, SpnError};
use serde::de::DeserializeOwned;

const DEFAULT_AZ: &str = "az";

/// Keeps the CLI from printing warnings into the JSON stream.
const AZ_ENV: &[(&str, &str)] = &[("AZURE_CORE_ONLY_SHOW_ERRORS", "true")];

fn az_path(config: &Config) -> String {
    config
        .get_option("az_path")
        .cloned()
        .unwrap_or_else(|| DEFAULT_AZ.to_string())
}

/// Runs an `az` command with JSON output and parses the result.
///
/// A non-zero exit is reported through [`SpnError::Provider`] with the code
/// parsed from stderr; unparseable output through [`SpnError::Json`].
async fn az_json<T: DeserializeOwned>(az: &str, args: &[&str]) -> Result<T> {
    let mut full: Vec<&str> = args.to_vec();
    full.extend_from_slice(&["--output", "json"]);

    let output = capture_command(az, &full, AZ_ENV).await?;
    if !output.success() {
        return Err(SpnError::Provider(provider_error_from_stderr(&output.stderr)));
    }

    Ok(serde_json::from_str(&output.stdout)?)
}

/// Registers the Azure CLI provider and role assigner with the factory.
pub fn register() {
    factory::register_provider("azcli", |config| Ok(Box::new(AzCliProvider::new(config))));
    factory::register_assigner("azcli", |config| {
        Ok(Box::new(AzCliRoleAssigner::new(config)))
    });
}
