//! Batch service principal creation.
//!
//! [`BatchPrincipalCreator`] walks a list of display names in order, creates
//! one principal per name, and hands the successful ones to a
//! [`RoleAssigner`] in a single call at the end. A rejected name is recorded
//! and logged but never stops the batch, and a failed role assignment never
//! undoes the principals that were already created.

use crate::principal::PrincipalReport;
use crate::secret::REDACTED;
use crate::{
    Config, CreatedPrincipal, CreationFailure, IdentityProvider, PasswordCredential,
    PrincipalCreationResult, ProviderError, Result, RoleAssigner, SpnError,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info, warn};

/// Three-way classification of a batch's success count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationSummary {
    /// Nothing was created
    None,
    /// Exactly one principal was created
    Single,
    /// Two or more principals were created
    Multiple(usize),
}

impl CreationSummary {
    /// Classifies a success count.
    pub fn from_count(count: usize) -> Self {
        match count {
            0 => Self::None,
            1 => Self::Single,
            n => Self::Multiple(n),
        }
    }
}

impl fmt::Display for CreationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "No service principal objects created"),
            Self::Single => write!(f, "1 service principal object created"),
            Self::Multiple(n) => write!(f, "{} service principal objects created", n),
        }
    }
}

/// Everything a single batch run produced.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    created: Vec<CreatedPrincipal>,
    failures: Vec<CreationFailure>,
    success_count: usize,
    assignment_error: Option<String>,
}

impl BatchOutcome {
    fn record(&mut self, result: PrincipalCreationResult) {
        match result {
            PrincipalCreationResult::Created(principal) => {
                self.created.push(principal);
                self.success_count += 1;
            }
            PrincipalCreationResult::Failed(failure) => self.failures.push(failure),
        }
    }

    /// Created principals, in creation order.
    pub fn created(&self) -> &[CreatedPrincipal] {
        &self.created
    }

    /// Rejected requests, in input order.
    pub fn failures(&self) -> &[CreationFailure] {
        &self.failures
    }

    /// Number of principals created.
    pub fn success_count(&self) -> usize {
        self.success_count
    }

    /// Role assignment error message, if assignment ran and failed.
    pub fn assignment_error(&self) -> Option<&str> {
        self.assignment_error.as_deref()
    }

    /// Classifies the success count for the final summary line.
    pub fn summary(&self) -> CreationSummary {
        CreationSummary::from_count(self.success_count)
    }

    /// Display names of the created principals, in creation order.
    pub fn created_names(&self) -> Vec<&str> {
        self.created.iter().map(|p| p.display_name.as_str()).collect()
    }

    /// Builds a serializable report. Secrets stay redacted unless `reveal` is set.
    pub fn report(&self, reveal: bool) -> BatchReport {
        BatchReport {
            summary: self.summary().to_string(),
            created_count: self.success_count,
            created: self.created.iter().map(|p| p.report(reveal)).collect(),
            failures: self.failures.clone(),
            assignment_error: self.assignment_error.clone(),
        }
    }
}

/// Serializable view of a [`BatchOutcome`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    /// Summary line
    pub summary: String,
    /// Number of principals created
    pub created_count: usize,
    /// Created principals
    pub created: Vec<PrincipalReport>,
    /// Rejected requests
    pub failures: Vec<CreationFailure>,
    /// Role assignment failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment_error: Option<String>,
}

/// Creates service principals in bulk.
///
/// # Example
///
/// ```
/// use spnmux::batch::{BatchPrincipalCreator, CreationSummary};
/// use spnmux::providers::mock::{MockIdentityProvider, MockRoleAssigner};
/// use spnmux::{Config, ProviderError};
///
/// #[tokio::main]
/// async fn main() -> spnmux::Result<()> {
///     let mut provider = MockIdentityProvider::new();
///     provider.fail_on("b", ProviderError::new("already exists"));
///     let mut assigner = MockRoleAssigner::new();
///
///     let mut creator = BatchPrincipalCreator::new(&mut provider, &mut assigner, &Config::default());
///     let outcome = creator.create_batch(&["a", "b", "c"]).await?;
///
///     assert_eq!(outcome.created_names(), vec!["a", "c"]);
///     assert_eq!(outcome.summary(), CreationSummary::Multiple(2));
///     Ok(())
/// }
/// ```
pub struct BatchPrincipalCreator<'a> {
    provider: &'a mut dyn IdentityProvider,
    assigner: &'a mut dyn RoleAssigner,
    credential_expiry: DateTime<Utc>,
    call_timeout: Option<Duration>,
}

impl<'a> BatchPrincipalCreator<'a> {
    /// Creates a batch creator over a provider and role assigner.
    pub fn new(
        provider: &'a mut dyn IdentityProvider,
        assigner: &'a mut dyn RoleAssigner,
        config: &Config,
    ) -> Self {
        Self {
            provider,
            assigner,
            credential_expiry: config.credential_expiry,
            call_timeout: config.call_timeout,
        }
    }

    /// Creates one service principal per name, in order.
    ///
    /// Duplicate names are attempted independently.
    ///
    /// # Errors
    ///
    /// Returns [`SpnError::EmptyInput`] when `names` is empty; no provider
    /// call is made in that case. Per-name and role assignment failures are
    /// reported through the returned [`BatchOutcome`], never as an error.
    pub async fn create_batch<S: AsRef<str>>(&mut self, names: &[S]) -> Result<BatchOutcome> {
        if names.is_empty() {
            return Err(SpnError::EmptyInput);
        }

        let mut outcome = BatchOutcome::default();

        for name in names {
            let result = self.create_one(name.as_ref()).await;
            outcome.record(result);
        }

        if outcome.success_count > 0 {
            if let Err(e) = self.assigner.assign_default_role(&outcome.created).await {
                error!(
                    assigner = self.assigner.name(),
                    principals = outcome.success_count,
                    error = %e,
                    "default role assignment failed; created principals are kept"
                );
                outcome.assignment_error = Some(e.to_string());
            }
        }

        info!(
            provider = self.provider.name(),
            requested = names.len(),
            created = outcome.success_count,
            failed = outcome.failures.len(),
            "{}",
            outcome.summary()
        );

        Ok(outcome)
    }

    async fn create_one(&mut self, display_name: &str) -> PrincipalCreationResult {
        let credential = PasswordCredential::generate(self.credential_expiry);

        match self.call_provider(display_name, credential).await {
            Ok(principal) => {
                let password = if principal.credential.is_some() {
                    REDACTED
                } else {
                    "none"
                };
                info!(
                    display_name,
                    app_id = %principal.app_id,
                    password,
                    "service principal created"
                );
                PrincipalCreationResult::Created(principal)
            }
            Err(err) => {
                warn!(
                    display_name,
                    error = %err.message,
                    code = err.code.as_deref().unwrap_or(""),
                    "service principal creation failed"
                );
                PrincipalCreationResult::Failed(CreationFailure::new(display_name, err))
            }
        }
    }

    async fn call_provider(
        &mut self,
        display_name: &str,
        credential: PasswordCredential,
    ) -> std::result::Result<CreatedPrincipal, ProviderError> {
        let call = self.provider.create_principal(display_name, Some(credential));

        let result = match self.call_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => {
                    return Err(ProviderError::new(format!(
                        "provider call exceeded {}s deadline",
                        limit.as_secs_f64()
                    ))
                    .with_code("Timeout"))
                }
            },
            None => call.await,
        };

        result.map_err(SpnError::into_provider_error)
    }
}

/// Creates a single principal, propagating any provider error.
///
/// With `with_password` unset the principal is created from its display name
/// only.
pub async fn create_single(
    provider: &mut dyn IdentityProvider,
    display_name: &str,
    with_password: bool,
    config: &Config,
) -> Result<CreatedPrincipal> {
    let credential = with_password.then(|| PasswordCredential::generate(config.credential_expiry));

    let principal = provider
        .create_principal(display_name, credential)
        .await
        .map_err(|e| SpnError::provider_op(provider.name(), "create", display_name, e))?;

    info!(
        provider = provider.name(),
        display_name,
        app_id = %principal.app_id,
        password = principal.credential.is_some(),
        "service principal created"
    );

    Ok(principal)
}

/// Parses batch input: one display name per line.
///
/// Lines are trimmed and blank lines skipped.
///
/// ```
/// use spnmux::batch::parse_names;
///
/// assert_eq!(parse_names("a\n\n  b \r\n"), vec!["a", "b"]);
/// ```
pub fn parse_names(input: &str) -> Vec<String> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reads batch input from a file.
///
/// # Errors
///
/// - [`SpnError::InputFile`]: the file is missing or unreadable
/// - [`SpnError::EmptyInput`]: the file contains no names
pub async fn read_names_file(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SpnError::InputFile {
            path: path.to_path_buf(),
            source,
        })?;

    let names = parse_names(&contents);
    if names.is_empty() {
        return Err(SpnError::EmptyInput);
    }
    Ok(names)
}
