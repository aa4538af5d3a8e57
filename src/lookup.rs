//! Service principal retrieval.
//!
//! A lookup is exactly one of three mutually exclusive queries. The
//! [`find_principals`] dispatcher routes it to the matching provider call.

use crate::{IdentityProvider, Result, ServicePrincipal};
use tracing::info;

/// A single service principal query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrincipalQuery {
    /// Exact display name match
    ByName(String),
    /// Application (client) id
    ByAppId(String),
    /// Display name pattern where `*` matches any run of characters
    ByWildcard(String),
}

impl PrincipalQuery {
    /// Returns the query kind, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ByName(_) => "name",
            Self::ByAppId(_) => "app_id",
            Self::ByWildcard(_) => "wildcard",
        }
    }

    /// Returns the query value.
    pub fn value(&self) -> &str {
        match self {
            Self::ByName(v) | Self::ByAppId(v) | Self::ByWildcard(v) => v,
        }
    }
}

/// Runs `query` against `provider`.
///
/// # Example
///
/// ```
/// use spnmux::lookup::{find_principals, PrincipalQuery};
/// use spnmux::providers::mock::MockIdentityProvider;
/// use spnmux::IdentityProvider;
///
/// #[tokio::main]
/// async fn main() -> spnmux::Result<()> {
///     let mut provider = MockIdentityProvider::new();
///     provider.create_principal("billing-api", None).await?;
///     provider.create_principal("billing-worker", None).await?;
///
///     let hits = find_principals(&provider, &PrincipalQuery::ByWildcard("billing-*".into())).await?;
///     assert_eq!(hits.len(), 2);
///     Ok(())
/// }
/// ```
pub async fn find_principals(
    provider: &dyn IdentityProvider,
    query: &PrincipalQuery,
) -> Result<Vec<ServicePrincipal>> {
    let found = match query {
        PrincipalQuery::ByName(name) => provider.lookup_by_name(name).await?,
        PrincipalQuery::ByAppId(app_id) => provider.lookup_by_app_id(app_id).await?,
        PrincipalQuery::ByWildcard(pattern) => provider.lookup_by_wildcard(pattern).await?,
    };

    info!(
        provider = provider.name(),
        query = query.kind(),
        value = query.value(),
        hits = found.len(),
        "service principal lookup finished"
    );

    Ok(found)
}

/// Matches `text` against a `*` pattern, ignoring ASCII case.
///
/// ```
/// use spnmux::lookup::wildcard_match;
///
/// assert!(wildcard_match("billing-*", "Billing-API"));
/// assert!(wildcard_match("*-api", "billing-api"));
/// assert!(!wildcard_match("billing", "billing-api"));
/// ```
pub fn wildcard_match(pattern: &str, text: &str) -> bool {
    let pattern = pattern.to_ascii_lowercase();
    let text = text.to_ascii_lowercase();

    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == text;
    }

    let first = parts[0];
    let last = parts[parts.len() - 1];
    if !text.starts_with(first) {
        return false;
    }

    let mut rest = &text[first.len()..];
    for part in &parts[1..parts.len() - 1] {
        match rest.find(part) {
            Some(idx) => rest = &rest[idx + part.len()..],
            None => return false,
        }
    }

    rest.len() >= last.len() && rest.ends_with(last)
}

/// Returns the literal prefix of a pattern, up to the first `*`.
pub fn literal_prefix(pattern: &str) -> &str {
    pattern.split('*').next().unwrap_or_default()
}
