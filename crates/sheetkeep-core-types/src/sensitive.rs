//! Redaction wrapper for secrets
//!
//! LLM provider configs carry API keys. `Sensitive<T>` keeps them out of
//! `Debug`/`Display` output so they cannot leak through tracing fields or
//! panic messages.

use std::fmt;

const REDACTED: &str = "***REDACTED***";

/// Wrapper for sensitive data that redacts itself in Debug and Display
///
/// # Example
///
/// ```
/// use sheetkeep_core_types::Sensitive;
///
/// let key = Sensitive::new("sk-live-123");
/// assert_eq!(format!("{:?}", key), "***REDACTED***");
/// assert_eq!(key.expose(), &"sk-live-123");
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    /// Wrap a sensitive value
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Expose the underlying value
    pub fn expose(&self) -> &T {
        &self.0
    }

    /// Consume the wrapper and return the inner value
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> From<T> for Sensitive<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_and_display_are_redacted() {
        let secret = Sensitive::new("sk-test-abcdef");
        assert_eq!(format!("{:?}", secret), REDACTED);
        assert_eq!(format!("{}", secret), REDACTED);
    }

    #[test]
    fn test_expose_and_into_inner() {
        let secret = Sensitive::new(String::from("token"));
        assert_eq!(secret.expose(), "token");
        assert_eq!(secret.into_inner(), "token");
    }

    #[test]
    fn test_redaction_inside_derived_debug() {
        #[derive(Debug)]
        #[allow(dead_code)]
        struct Provider {
            name: String,
            api_key: Sensitive<String>,
        }

        let provider = Provider {
            name: "openai".to_string(),
            api_key: Sensitive::new("sk-secret".to_string()),
        };

        let debug_str = format!("{:?}", provider);
        assert!(debug_str.contains("openai"));
        assert!(debug_str.contains(REDACTED));
        assert!(!debug_str.contains("sk-secret"));
    }
}
