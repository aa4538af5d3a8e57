//! Redacting wrapper for generated credentials.

use std::fmt;

/// Placeholder written wherever a secret would otherwise be shown.
pub const REDACTED: &str = "[REDACTED]";

/// A value that never shows up in `Debug` or `Display` output.
///
/// Generated passwords are wrapped in `Secret` as soon as they exist so a
/// stray `{:?}` in a log statement cannot leak them. The only way to read
/// the value is [`expose_secret`](Self::expose_secret).
///
/// ```
/// use spnmux::Secret;
///
/// let password = Secret::new("s3cr3t".to_string());
/// assert_eq!(format!("{}", password), "[REDACTED]");
/// assert_eq!(password.expose_secret(), "s3cr3t");
/// ```
// Do not derive Clone or Default: duplicating secrets must be a deliberate act.
pub struct Secret<T> {
    inner: T,
}

impl<T> Secret<T> {
    /// Wraps a sensitive value.
    pub fn new(value: T) -> Self {
        Self { inner: value }
    }

    /// Explicitly exposes the secret value.
    pub fn expose_secret(&self) -> &T {
        &self.inner
    }
}

impl<T> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<T> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}
