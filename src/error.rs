//! Error types for spnmux operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`SpnError`].
pub type Result<T> = std::result::Result<T, SpnError>;

/// Structured error reported by an identity provider.
///
/// Every provider failure funnels through this type so callers never have to
/// inspect raw CLI or SDK output to find out what went wrong.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ProviderError {
    /// Human-readable message from the provider
    pub message: String,
    /// Provider-specific error code, if one was reported
    pub code: Option<String>,
}

impl ProviderError {
    /// Creates a provider error without a code.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    /// Attaches a provider error code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Errors that can occur while creating or looking up service principals.
#[derive(Debug, Error)]
pub enum SpnError {
    /// No display names were supplied to a batch run.
    #[error("no display names supplied")]
    EmptyInput,

    /// The batch input file could not be read.
    #[error("cannot read input file {}: {source}", path.display())]
    InputFile {
        /// Path that was requested
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The identity provider rejected an operation.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Role assignment failed after principals were created.
    #[error("role assignment failed: {0}")]
    Assignment(String),

    /// Not logged in to the provider.
    #[error("not authenticated")]
    NotAuthenticated,

    /// Required CLI tool is not installed.
    #[error("provider CLI not installed: {0}")]
    ProviderNotInstalled(String),

    /// Display name failed validation.
    #[error("invalid display name: {0}")]
    InvalidDisplayName(String),

    /// Configuration value could not be parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Provider operation failed with context.
    #[error("{provider}: {operation} {subject}: {source}")]
    ProviderOperation {
        /// Provider name
        provider: String,
        /// Operation name (create, lookup, assign)
        operation: String,
        /// Display name or application id the operation targeted
        subject: String,
        /// Underlying error
        #[source]
        source: Box<SpnError>,
    },

    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Command execution failed.
    #[error("command execution failed: {0}")]
    CommandFailed(String),

    /// Other error (catch-all).
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SpnError {
    /// Wraps an error with the provider, operation and subject that caused it.
    ///
    /// # Example
    ///
    /// ```
    /// use spnmux::{ProviderError, SpnError};
    ///
    /// let err = SpnError::Provider(ProviderError::new("quota exceeded"));
    /// let wrapped = SpnError::provider_op("azcli", "create", "billing-api", err);
    ///
    /// assert_eq!(
    ///     wrapped.to_string(),
    ///     "azcli: create billing-api: provider error: quota exceeded"
    /// );
    /// ```
    pub fn provider_op(
        provider: impl Into<String>,
        operation: impl Into<String>,
        subject: impl Into<String>,
        err: SpnError,
    ) -> Self {
        Self::ProviderOperation {
            provider: provider.into(),
            operation: operation.into(),
            subject: subject.into(),
            source: Box::new(err),
        }
    }

    /// Flattens this error into the structured provider channel.
    ///
    /// Provider errors keep their code; everything else is reported by message.
    pub fn into_provider_error(self) -> ProviderError {
        match self {
            Self::Provider(err) => err,
            Self::ProviderOperation { source, .. } => match *source {
                Self::Provider(err) => err,
                other => ProviderError::new(other.to_string()),
            },
            other => ProviderError::new(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_error_display() {
        let err = SpnError::InvalidDisplayName("name cannot be empty".to_string());
        assert_eq!(err.to_string(), "invalid display name: name cannot be empty");

        let err = SpnError::Assignment("AuthorizationFailed".to_string());
        assert_eq!(err.to_string(), "role assignment failed: AuthorizationFailed");
    }

    #[test]
    fn test_provider_operation_error() {
        let inner = SpnError::Provider(ProviderError::new("boom"));
        let err = SpnError::provider_op("mock", "create", "billing-api", inner);

        let error_string = err.to_string();
        assert!(error_string.contains("mock"));
        assert!(error_string.contains("create"));
        assert!(error_string.contains("billing-api"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_into_provider_error_keeps_code() {
        let inner = SpnError::Provider(ProviderError::new("slow").with_code("Timeout"));
        let err = SpnError::provider_op("mock", "create", "a", inner);

        let flat = err.into_provider_error();
        assert_eq!(flat.message, "slow");
        assert_eq!(flat.code.as_deref(), Some("Timeout"));
    }

    #[test]
    fn test_into_provider_error_from_other_variant() {
        let flat = SpnError::InvalidDisplayName("name cannot be empty".to_string())
            .into_provider_error();
        assert_eq!(flat.message, "invalid display name: name cannot be empty");
        assert!(flat.code.is_none());
    }

    #[test]
    fn test_input_file_error_mentions_path() {
        let err = SpnError::InputFile {
            path: PathBuf::from("/tmp/missing.txt"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.to_string().contains("/tmp/missing.txt"));
    }
}
