//! Display name validation for providers that shell out.

use crate::{Result, SpnError};

/// Characters that would be interpreted by a shell or break an OData filter.
const DANGEROUS_CHARS: &str = ";|&$`<>\\\"'";

/// Maximum display name length accepted by the directory.
const MAX_NAME_LENGTH: usize = 120;

/// Validates a service principal display name.
///
/// Rejects:
/// - Empty or whitespace-only names
/// - Names longer than 120 characters
/// - Null bytes and control characters
/// - Shell metacharacters and quotes
///
/// # Errors
///
/// Returns [`SpnError::InvalidDisplayName`] if validation fails.
///
/// # Example
///
/// ```
/// use spnmux::validation::validate_display_name;
///
/// assert!(validate_display_name("billing-api").is_ok());
/// assert!(validate_display_name("Billing API (prod)").is_ok());
///
/// assert!(validate_display_name("").is_err());
/// assert!(validate_display_name("name; az logout").is_err());
/// ```
pub fn validate_display_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(SpnError::InvalidDisplayName(
            "name cannot be empty".to_string(),
        ));
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(SpnError::InvalidDisplayName(format!(
            "name exceeds maximum length of {} characters",
            MAX_NAME_LENGTH
        )));
    }

    if name.contains('\0') {
        return Err(SpnError::InvalidDisplayName(
            "name contains null byte".to_string(),
        ));
    }

    if name.chars().any(|c| c.is_control()) {
        return Err(SpnError::InvalidDisplayName(
            "name contains control characters".to_string(),
        ));
    }

    if name.chars().any(|c| DANGEROUS_CHARS.contains(c)) {
        return Err(SpnError::InvalidDisplayName(format!(
            "name contains dangerous characters (not allowed: {})",
            DANGEROUS_CHARS
        )));
    }

    Ok(())
}

/// Validates a wildcard lookup pattern.
///
/// Same rules as [`validate_display_name`]; `*` is allowed.
pub fn validate_pattern(pattern: &str) -> Result<()> {
    validate_display_name(pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(validate_display_name("billing-api").is_ok());
        assert!(validate_display_name("Billing API").is_ok());
        assert!(validate_display_name("svc.prod.reporting").is_ok());
        assert!(validate_display_name("team/app (eu)").is_ok());
    }

    #[test]
    fn test_empty_name() {
        let result = validate_display_name("   ");
        assert!(result.unwrap_err().to_string().contains("empty"));
    }

    #[test]
    fn test_too_long() {
        let result = validate_display_name(&"a".repeat(121));
        assert!(result.unwrap_err().to_string().contains("maximum length"));
        assert!(validate_display_name(&"a".repeat(120)).is_ok());
    }

    #[test]
    fn test_control_characters() {
        let result = validate_display_name("name\x01x");
        assert!(result.unwrap_err().to_string().contains("control"));

        let result = validate_display_name("name\0x");
        assert!(result.unwrap_err().to_string().contains("null byte"));
    }

    #[test]
    fn test_injection_attempts() {
        let dangerous = [
            "name; az logout",
            "name|tee",
            "name&&whoami",
            "name$(whoami)",
            "name`id`",
            "name<in",
            "name'quote",
            "name\"quote",
            "name\\slash",
        ];

        for name in dangerous {
            let result = validate_display_name(name);
            assert!(result.is_err(), "expected '{}' to fail validation", name);
            assert!(result
                .unwrap_err()
                .to_string()
                .contains("dangerous characters"));
        }
    }

    #[test]
    fn test_pattern_allows_wildcard() {
        assert!(validate_pattern("billing-*").is_ok());
        assert!(validate_pattern("*; rm").is_err());
    }
}
