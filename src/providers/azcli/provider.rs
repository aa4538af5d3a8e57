//! Azure CLI identity provider implementation.

use super::{az_json, az_path, AZ_ENV};
use crate::cli::{capture_command, check_command_exists, run_command, StatusCache};
use crate::lookup::{literal_prefix, wildcard_match};
use crate::validation::{validate_display_name, validate_pattern};
use crate::{
    Config, CreatedPrincipal, IdentityProvider, PasswordCredential, ProviderError, Result,
    ServicePrincipal, SpnError,
};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Graph error code for a missing directory object.
const NOT_FOUND_CODE: &str = "Request_ResourceNotFound";

/// Label attached to password credentials issued by this provider.
const CREDENTIAL_LABEL: &str = "spnmux";

/// Azure CLI identity provider.
///
/// Creates an application registration, its service principal and, when
/// requested, a password credential, using three `az` calls.
pub struct AzCliProvider {
    az: String,
    status_cache: Arc<Mutex<StatusCache>>,
}

/// `az ad app create` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AzApplication {
    app_id: String,
}

/// `az ad sp create` / `az ad sp show` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AzServicePrincipal {
    id: String,
    app_id: String,
    display_name: String,
}

impl From<AzServicePrincipal> for ServicePrincipal {
    fn from(sp: AzServicePrincipal) -> Self {
        Self {
            app_id: sp.app_id,
            display_name: sp.display_name,
            object_id: Some(sp.id),
        }
    }
}

/// `az ad app credential reset` response.
#[derive(Debug, Deserialize)]
struct AzCredentialReset {
    password: String,
}

impl AzCliProvider {
    /// Creates a new Azure CLI provider from configuration.
    pub fn new(config: Config) -> Self {
        Self {
            az: az_path(&config),
            status_cache: Arc::new(Mutex::new(StatusCache::default())),
        }
    }

    /// Checks whether the CLI has an active login, using the status cache.
    pub async fn is_authenticated(&self) -> bool {
        if let Ok(cache) = self.status_cache.lock() {
            if let Some(authenticated) = cache.get() {
                return authenticated;
            }
        }

        let authenticated = capture_command(&self.az, &["account", "show", "--output", "none"], AZ_ENV)
            .await
            .map(|out| out.success())
            .unwrap_or(false);

        if let Ok(mut cache) = self.status_cache.lock() {
            cache.set(authenticated);
        }

        authenticated
    }

    /// Creates the service principal and password for a registered application.
    async fn complete_registration(
        &self,
        display_name: &str,
        app_id: &str,
        credential: Option<PasswordCredential>,
    ) -> Result<CreatedPrincipal> {
        let sp: AzServicePrincipal = az_json(&self.az, &["ad", "sp", "create", "--id", app_id])
            .await
            .map_err(|e| SpnError::provider_op("azcli", "create service principal", display_name, e))?;

        let mut created = CreatedPrincipal::new(display_name, sp.app_id).with_object_id(sp.id);

        if let Some(requested) = credential {
            let end_date = requested.end.format("%Y-%m-%dT%H:%M:%SZ").to_string();
            let reset: AzCredentialReset = az_json(
                &self.az,
                &[
                    "ad",
                    "app",
                    "credential",
                    "reset",
                    "--id",
                    app_id,
                    "--append",
                    "--display-name",
                    CREDENTIAL_LABEL,
                    "--end-date",
                    end_date.as_str(),
                ],
            )
            .await
            .map_err(|e| SpnError::provider_op("azcli", "add password", display_name, e))?;

            // The CLI issues its own secret; only the validity window carries over.
            created = created.with_credential(PasswordCredential::new(
                reset.password,
                requested.start,
                requested.end,
            ));
        }

        Ok(created)
    }

    /// Deletes an application whose registration could not be completed.
    ///
    /// Deleting the application also removes its service principal. The
    /// returned error names the application id whether or not the delete
    /// succeeded, and keeps the code of the original failure.
    async fn discard_application(&self, display_name: &str, app_id: &str, err: SpnError) -> SpnError {
        let operation = match &err {
            SpnError::ProviderOperation { operation, .. } => operation.clone(),
            _ => "create".to_string(),
        };
        let mut failure = err.into_provider_error();

        match run_command(&self.az, &["ad", "app", "delete", "--id", app_id], AZ_ENV).await {
            Ok(_) => {
                info!(display_name, app_id, "incomplete application deleted");
                failure.message = format!("{} (application {} deleted)", failure.message, app_id);
            }
            Err(cleanup) => {
                warn!(
                    display_name,
                    app_id,
                    error = %cleanup,
                    "incomplete application left in directory"
                );
                failure.message = format!(
                    "{} (application {} left in directory: {})",
                    failure.message, app_id, cleanup
                );
            }
        }

        SpnError::provider_op("azcli", operation, display_name, SpnError::Provider(failure))
    }

    async fn list(&self, args: &[&str]) -> Result<Vec<ServicePrincipal>> {
        let found: Vec<AzServicePrincipal> = az_json(&self.az, args).await?;
        Ok(found.into_iter().map(ServicePrincipal::from).collect())
    }
}

fn is_not_found(err: &ProviderError) -> bool {
    err.code.as_deref() == Some(NOT_FOUND_CODE)
        || err.message.contains("does not exist")
        || err.message.contains("doesn't exist")
}

#[async_trait]
impl IdentityProvider for AzCliProvider {
    fn name(&self) -> &str {
        "azcli"
    }

    async fn init(&mut self) -> Result<()> {
        if !check_command_exists(&self.az).await? {
            return Err(SpnError::ProviderNotInstalled(
                "az command not found - install the Azure CLI from https://aka.ms/azure-cli"
                    .to_string(),
            ));
        }

        if !self.is_authenticated().await {
            return Err(SpnError::NotAuthenticated);
        }

        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if let Ok(mut cache) = self.status_cache.lock() {
            cache.invalidate();
        }
        Ok(())
    }

    async fn create_principal(
        &mut self,
        display_name: &str,
        credential: Option<PasswordCredential>,
    ) -> Result<CreatedPrincipal> {
        validate_display_name(display_name)?;

        let app: AzApplication = az_json(&self.az, &["ad", "app", "create", "--display-name", display_name])
            .await
            .map_err(|e| SpnError::provider_op("azcli", "create application", display_name, e))?;
        debug!(display_name, app_id = %app.app_id, "application registered");

        match self.complete_registration(display_name, &app.app_id, credential).await {
            Ok(created) => Ok(created),
            Err(err) => Err(self.discard_application(display_name, &app.app_id, err).await),
        }
    }

    async fn lookup_by_name(&self, display_name: &str) -> Result<Vec<ServicePrincipal>> {
        validate_display_name(display_name)?;

        // `--display-name` is a prefix filter on the service side.
        let found = self
            .list(&["ad", "sp", "list", "--display-name", display_name])
            .await?;
        Ok(found
            .into_iter()
            .filter(|sp| sp.display_name == display_name)
            .collect())
    }

    async fn lookup_by_app_id(&self, app_id: &str) -> Result<Vec<ServicePrincipal>> {
        validate_display_name(app_id)?;

        match az_json::<AzServicePrincipal>(&self.az, &["ad", "sp", "show", "--id", app_id]).await {
            Ok(sp) => Ok(vec![sp.into()]),
            Err(SpnError::Provider(err)) if is_not_found(&err) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    async fn lookup_by_wildcard(&self, pattern: &str) -> Result<Vec<ServicePrincipal>> {
        validate_pattern(pattern)?;

        let prefix = literal_prefix(pattern);
        let found = if prefix.is_empty() {
            self.list(&["ad", "sp", "list", "--all"]).await?
        } else {
            let filter = format!("startswith(displayName,'{}')", prefix);
            self.list(&["ad", "sp", "list", "--filter", filter.as_str()]).await?
        };

        Ok(found
            .into_iter()
            .filter(|sp| wildcard_match(pattern, &sp.display_name))
            .collect())
    }
}
