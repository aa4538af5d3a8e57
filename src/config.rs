//! Configuration types for provider initialization and batch runs.

use crate::{Result, SpnError};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

/// Default role attached to created principals.
pub const DEFAULT_ROLE: &str = "Reader";

/// Provider type identifier.
///
/// Providers must be enabled via Cargo feature flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderType {
    /// In-memory provider for testing and dry runs
    Mock,
    /// Azure CLI provider (requires `az` command)
    AzureCli,
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mock => write!(f, "mock"),
            Self::AzureCli => write!(f, "azcli"),
        }
    }
}

impl FromStr for ProviderType {
    type Err = SpnError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "mock" => Ok(Self::Mock),
            "azcli" | "az" | "azure" => Ok(Self::AzureCli),
            other => Err(SpnError::InvalidConfig(format!(
                "unknown provider: {} (valid options: mock, azcli)",
                other
            ))),
        }
    }
}

/// Configuration for creating providers and running batches.
///
/// Use the builder pattern for ergonomic configuration:
///
/// ```
/// use spnmux::{Config, ProviderType};
/// use std::time::Duration;
///
/// let config = Config::new(ProviderType::AzureCli)
///     .with_default_role("Contributor")
///     .with_role_scope("/subscriptions/00000000-0000-0000-0000-000000000000")
///     .with_call_timeout(Duration::from_secs(60));
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Provider type
    pub provider: ProviderType,

    /// Fixed end of every generated password's validity window
    pub credential_expiry: DateTime<Utc>,

    /// Role attached to created principals (default: "Reader")
    pub default_role: String,

    /// Scope the default role is granted on
    pub role_scope: Option<String>,

    /// Deadline for a single provider call
    pub call_timeout: Option<Duration>,

    /// Whether generated secrets may be shown in reports
    pub reveal_secrets: bool,

    /// Provider-specific options
    pub options: HashMap<String, String>,
}

/// End of the default credential validity window: 2299-12-31T00:00:00Z.
pub fn default_credential_expiry() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2299, 12, 31, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderType::Mock,
            credential_expiry: default_credential_expiry(),
            default_role: DEFAULT_ROLE.to_string(),
            role_scope: None,
            call_timeout: None,
            reveal_secrets: false,
            options: HashMap::new(),
        }
    }
}

impl Config {
    /// Creates a new configuration for the specified provider.
    ///
    /// ```
    /// use spnmux::{Config, ProviderType};
    ///
    /// let config = Config::new(ProviderType::Mock);
    /// assert_eq!(config.provider, ProviderType::Mock);
    /// assert_eq!(config.default_role, "Reader");
    /// ```
    pub fn new(provider: ProviderType) -> Self {
        Self {
            provider,
            ..Default::default()
        }
    }

    /// Builds a configuration from `SPNMUX_*` environment variables.
    ///
    /// - `SPNMUX_PROVIDER`: provider type (default: mock)
    /// - `SPNMUX_CREDENTIAL_EXPIRY`: `YYYY-MM-DD` or RFC 3339 end date
    /// - `SPNMUX_DEFAULT_ROLE`: role name
    /// - `SPNMUX_ROLE_SCOPE`: role scope
    /// - `SPNMUX_CALL_TIMEOUT_SECS`: per-call deadline in seconds
    /// - `SPNMUX_REVEAL_SECRETS`: `true`/`1`/`yes` to print generated secrets
    ///
    /// # Errors
    ///
    /// Returns [`SpnError::InvalidConfig`] if a variable is set but malformed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let provider = match lookup("SPNMUX_PROVIDER") {
            Some(value) => value.parse()?,
            None => ProviderType::Mock,
        };

        let mut config = Self::new(provider);

        if let Some(expiry) = lookup("SPNMUX_CREDENTIAL_EXPIRY") {
            config.credential_expiry = parse_expiry(&expiry)?;
        }
        if let Some(role) = lookup("SPNMUX_DEFAULT_ROLE") {
            config.default_role = role;
        }
        if let Some(scope) = lookup("SPNMUX_ROLE_SCOPE") {
            config.role_scope = Some(scope);
        }
        if let Some(secs) = lookup("SPNMUX_CALL_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| {
                SpnError::InvalidConfig(format!("SPNMUX_CALL_TIMEOUT_SECS is not a number: {}", secs))
            })?;
            config.call_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(reveal) = lookup("SPNMUX_REVEAL_SECRETS") {
            config.reveal_secrets = parse_flag("SPNMUX_REVEAL_SECRETS", &reveal)?;
        }

        Ok(config)
    }

    /// Sets the fixed credential expiry.
    pub fn with_credential_expiry(mut self, expiry: DateTime<Utc>) -> Self {
        self.credential_expiry = expiry;
        self
    }

    /// Sets the default role attached to created principals.
    pub fn with_default_role(mut self, role: impl Into<String>) -> Self {
        self.default_role = role.into();
        self
    }

    /// Sets the scope the default role is granted on.
    pub fn with_role_scope(mut self, scope: impl Into<String>) -> Self {
        self.role_scope = Some(scope.into());
        self
    }

    /// Sets the per-call provider deadline.
    ///
    /// A call that exceeds it is recorded as a failure for that name only.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    /// Allows generated secrets to appear in reports.
    pub fn with_reveal_secrets(mut self, reveal: bool) -> Self {
        self.reveal_secrets = reveal;
        self
    }

    /// Adds a provider-specific option.
    ///
    /// **Azure CLI:**
    /// - `az_path`: path to the `az` executable (default: "az")
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Gets a provider-specific option value.
    pub fn get_option(&self, key: &str) -> Option<&String> {
        self.options.get(key)
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(SpnError::InvalidConfig(format!(
            "{} is not a boolean: {}",
            key, other
        ))),
    }
}

/// Parses a credential expiry given as `YYYY-MM-DD` or RFC 3339.
pub fn parse_expiry(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| Utc.from_utc_datetime(&dt))
        .ok_or_else(|| SpnError::InvalidConfig(format!("invalid credential expiry: {}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = Config::new(ProviderType::AzureCli)
            .with_default_role("Contributor")
            .with_role_scope("/subscriptions/sub-1")
            .with_option("az_path", "/usr/bin/az")
            .with_call_timeout(Duration::from_secs(30));

        assert_eq!(config.provider, ProviderType::AzureCli);
        assert_eq!(config.default_role, "Contributor");
        assert_eq!(config.role_scope.as_deref(), Some("/subscriptions/sub-1"));
        assert_eq!(config.get_option("az_path"), Some(&"/usr/bin/az".to_string()));
        assert_eq!(config.call_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_provider_type_display_and_parse() {
        assert_eq!(ProviderType::Mock.to_string(), "mock");
        assert_eq!(ProviderType::AzureCli.to_string(), "azcli");
        assert_eq!("AZ".parse::<ProviderType>().unwrap(), ProviderType::AzureCli);
        assert!("vault".parse::<ProviderType>().is_err());
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.provider, ProviderType::Mock);
        assert_eq!(config.default_role, DEFAULT_ROLE);
        assert_eq!(config.credential_expiry, default_credential_expiry());
        assert!(!config.reveal_secrets);
        assert!(config.call_timeout.is_none());
    }

    #[test]
    fn test_parse_expiry_formats() {
        let day = parse_expiry("2030-06-01").unwrap();
        assert_eq!(day, Utc.with_ymd_and_hms(2030, 6, 1, 0, 0, 0).unwrap());

        let full = parse_expiry("2030-06-01T12:00:00+02:00").unwrap();
        assert_eq!(full, Utc.with_ymd_and_hms(2030, 6, 1, 10, 0, 0).unwrap());

        assert!(parse_expiry("next tuesday").is_err());
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("SPNMUX_PROVIDER", "azcli"),
            ("SPNMUX_CREDENTIAL_EXPIRY", "2031-01-01"),
            ("SPNMUX_DEFAULT_ROLE", "Contributor"),
            ("SPNMUX_CALL_TIMEOUT_SECS", "45"),
            ("SPNMUX_REVEAL_SECRETS", "true"),
        ]
        .into_iter()
        .collect();

        let config = Config::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.provider, ProviderType::AzureCli);
        assert_eq!(config.default_role, "Contributor");
        assert_eq!(config.call_timeout, Some(Duration::from_secs(45)));
        assert!(config.role_scope.is_none());
        assert!(config.reveal_secrets);
    }

    #[test]
    fn test_from_lookup_reveal_secrets_flag() {
        let lookup = |value: &'static str| {
            Config::from_lookup(move |k| (k == "SPNMUX_REVEAL_SECRETS").then(|| value.to_string()))
        };

        assert!(lookup("1").unwrap().reveal_secrets);
        assert!(!lookup("no").unwrap().reveal_secrets);
        assert!(!Config::from_lookup(|_| None).unwrap().reveal_secrets);
        assert!(matches!(lookup("maybe"), Err(SpnError::InvalidConfig(_))));
    }

    #[test]
    fn test_from_lookup_rejects_bad_timeout() {
        let result = Config::from_lookup(|k| {
            (k == "SPNMUX_CALL_TIMEOUT_SECS").then(|| "soon".to_string())
        });
        assert!(matches!(result, Err(SpnError::InvalidConfig(_))));
    }
}
