//! Azure CLI role assigner.

use super::{az_json, az_path};
use crate::{Config, CreatedPrincipal, Result, RoleAssigner, SpnError};
use async_trait::async_trait;
use tracing::{debug, warn};

/// Grants the configured role to created principals with
/// `az role assignment create`.
pub struct AzCliRoleAssigner {
    az: String,
    role: String,
    scope: Option<String>,
}

impl AzCliRoleAssigner {
    /// Creates a new role assigner from configuration.
    pub fn new(config: Config) -> Self {
        Self {
            az: az_path(&config),
            role: config.default_role,
            scope: config.role_scope,
        }
    }

    async fn assign_one(&self, principal: &CreatedPrincipal, scope: &str) -> Result<()> {
        let mut args = vec!["role", "assignment", "create", "--role", self.role.as_str(), "--scope", scope];

        // A fresh principal may not have replicated yet; the object id path
        // skips the Graph lookup that would fail on it.
        match principal.object_id.as_deref() {
            Some(object_id) => args.extend_from_slice(&[
                "--assignee-object-id",
                object_id,
                "--assignee-principal-type",
                "ServicePrincipal",
            ]),
            None => args.extend_from_slice(&["--assignee", principal.app_id.as_str()]),
        }

        let _: serde_json::Value = az_json(&self.az, &args).await?;
        Ok(())
    }
}

#[async_trait]
impl RoleAssigner for AzCliRoleAssigner {
    fn name(&self) -> &str {
        "azcli"
    }

    async fn assign_default_role(&mut self, principals: &[CreatedPrincipal]) -> Result<()> {
        let scope = self.scope.as_deref().ok_or_else(|| {
            SpnError::Assignment("role scope is not configured".to_string())
        })?;

        let mut failed = Vec::new();
        for principal in principals {
            match self.assign_one(principal, scope).await {
                Ok(()) => debug!(
                    display_name = %principal.display_name,
                    role = %self.role,
                    scope,
                    "role assigned"
                ),
                Err(e) => {
                    warn!(display_name = %principal.display_name, error = %e, "role assignment failed");
                    failed.push(format!("{}: {}", principal.display_name, e));
                }
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(SpnError::Assignment(failed.join("; ")))
        }
    }
}
