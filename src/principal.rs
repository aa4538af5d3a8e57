//! Service principal data structures.

use crate::secret::{Secret, REDACTED};
use crate::ProviderError;
use base64::Engine;
use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Number of random bytes behind a generated password.
const SECRET_BYTES: usize = 32;

/// A password credential attached to a registered application.
///
/// The secret itself is wrapped in [`Secret`] and never appears in `Debug`
/// output.
#[derive(Debug)]
pub struct PasswordCredential {
    secret: Secret<String>,

    /// Start of the validity window
    pub start: DateTime<Utc>,

    /// End of the validity window
    pub end: DateTime<Utc>,
}

impl PasswordCredential {
    /// Creates a credential from an existing secret value.
    pub fn new(secret: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            secret: Secret::new(secret.into()),
            start,
            end,
        }
    }

    /// Generates a fresh random credential valid from now until `end`.
    ///
    /// # Example
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use spnmux::PasswordCredential;
    ///
    /// let end = Utc.with_ymd_and_hms(2299, 12, 31, 0, 0, 0).unwrap();
    /// let cred = PasswordCredential::generate(end);
    /// assert_eq!(cred.end, end);
    /// assert!(cred.start <= Utc::now());
    /// ```
    pub fn generate(end: DateTime<Utc>) -> Self {
        let mut bytes = [0u8; SECRET_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        let secret = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes);

        Self::new(secret, Utc::now(), end)
    }

    /// Returns the wrapped secret.
    pub fn secret(&self) -> &Secret<String> {
        &self.secret
    }
}

/// A service principal as reported by a directory lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServicePrincipal {
    /// Application (client) id
    pub app_id: String,

    /// Display name
    pub display_name: String,

    /// Directory object id of the service principal
    #[serde(rename = "id", default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
}

/// A service principal successfully created by a provider.
#[derive(Debug)]
pub struct CreatedPrincipal {
    /// Requested display name
    pub display_name: String,

    /// Application id assigned by the provider
    pub app_id: String,

    /// Directory object id of the service principal, when reported
    pub object_id: Option<String>,

    /// Password credential issued at creation, if one was requested
    pub credential: Option<PasswordCredential>,

    /// When the provider confirmed creation
    pub created: DateTime<Utc>,
}

impl CreatedPrincipal {
    /// Creates a record for a principal created without a password.
    pub fn new(display_name: impl Into<String>, app_id: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            app_id: app_id.into(),
            object_id: None,
            credential: None,
            created: Utc::now(),
        }
    }

    /// Attaches the issued password credential.
    pub fn with_credential(mut self, credential: PasswordCredential) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Sets the directory object id.
    pub fn with_object_id(mut self, object_id: impl Into<String>) -> Self {
        self.object_id = Some(object_id.into());
        self
    }

    /// Returns the lookup view of this principal.
    pub fn to_service_principal(&self) -> ServicePrincipal {
        ServicePrincipal {
            app_id: self.app_id.clone(),
            display_name: self.display_name.clone(),
            object_id: self.object_id.clone(),
        }
    }

    /// Renders the principal for reporting.
    ///
    /// The secret is replaced by `[REDACTED]` unless `reveal` is set.
    pub fn report(&self, reveal: bool) -> PrincipalReport {
        let (secret, valid_from, valid_until) = match &self.credential {
            Some(cred) => {
                let secret = if reveal {
                    cred.secret.expose_secret().clone()
                } else {
                    REDACTED.to_string()
                };
                (Some(secret), Some(cred.start), Some(cred.end))
            }
            None => (None, None, None),
        };

        PrincipalReport {
            display_name: self.display_name.clone(),
            app_id: self.app_id.clone(),
            secret,
            valid_from,
            valid_until,
        }
    }
}

/// Serializable view of a created principal.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PrincipalReport {
    /// Display name
    pub display_name: String,
    /// Application id
    pub app_id: String,
    /// Secret value or `[REDACTED]`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    /// Credential start
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<Utc>>,
    /// Credential end
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<DateTime<Utc>>,
}

/// A creation attempt the provider rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreationFailure {
    /// Requested display name
    pub display_name: String,
    /// Provider error message
    pub message: String,
    /// Provider error code, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl CreationFailure {
    /// Records a failure for `display_name`.
    pub fn new(display_name: impl Into<String>, err: ProviderError) -> Self {
        Self {
            display_name: display_name.into(),
            message: err.message,
            code: err.code,
        }
    }
}

/// Outcome of a single creation attempt.
///
/// Every request ends in exactly one of these states; there is no retry.
#[derive(Debug)]
pub enum PrincipalCreationResult {
    /// The provider created the principal.
    Created(CreatedPrincipal),
    /// The provider rejected the request.
    Failed(CreationFailure),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn far_future() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2299, 12, 31, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_generated_credentials_differ() {
        let a = PasswordCredential::generate(far_future());
        let b = PasswordCredential::generate(far_future());

        assert_ne!(a.secret().expose_secret(), b.secret().expose_secret());
        assert_eq!(a.secret().expose_secret().len(), 43);
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let cred = PasswordCredential::new("hunter2", Utc::now(), far_future());
        let debug = format!("{:?}", cred);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains(REDACTED));
    }

    #[test]
    fn test_report_redacts_by_default() {
        let principal = CreatedPrincipal::new("billing-api", "app-1")
            .with_credential(PasswordCredential::new("hunter2", Utc::now(), far_future()));

        let hidden = principal.report(false);
        assert_eq!(hidden.secret.as_deref(), Some(REDACTED));
        assert_eq!(hidden.valid_until, Some(far_future()));

        let shown = principal.report(true);
        assert_eq!(shown.secret.as_deref(), Some("hunter2"));
    }

    #[test]
    fn test_report_without_credential() {
        let report = CreatedPrincipal::new("billing-api", "app-1").report(true);
        assert!(report.secret.is_none());

        let json = serde_json::to_string(&report).unwrap();
        assert!(!json.contains("secret"));
    }

    #[test]
    fn test_service_principal_deserializes_directory_json() {
        let json = r#"{"appId":"app-1","displayName":"billing-api","id":"obj-1"}"#;
        let sp: ServicePrincipal = serde_json::from_str(json).unwrap();

        assert_eq!(sp.app_id, "app-1");
        assert_eq!(sp.display_name, "billing-api");
        assert_eq!(sp.object_id.as_deref(), Some("obj-1"));
    }

    #[test]
    fn test_creation_failure_keeps_code() {
        let failure = CreationFailure::new("b", ProviderError::new("nope").with_code("Conflict"));

        assert_eq!(failure.display_name, "b");
        assert_eq!(failure.message, "nope");
        assert_eq!(failure.code.as_deref(), Some("Conflict"));
    }
}
