//! Browser error types

use std::time::Duration;
use thiserror::Error;

/// Browser-related errors
#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("JavaScript error: {0}")]
    JavaScriptError(String),

    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Timed out after {waited:?} waiting for selector {selector}")]
    SelectorTimeout { selector: String, waited: Duration },

    #[error("Login failed: {0}")]
    LoginFailed(String),

    #[error("Switched client does not match: expected {expected}, got {actual}")]
    ClientMismatch { expected: String, actual: String },

    #[error("No alternate client to switch to (current: {current})")]
    NoAlternateClient { current: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl BrowserError {
    /// Likely causes for wait and navigation failures, logged when an account run fails.
    pub fn diagnostic_hint(&self) -> Option<&'static str> {
        match self {
            BrowserError::Timeout(_)
            | BrowserError::SelectorTimeout { .. }
            | BrowserError::ElementNotFound(_)
            | BrowserError::NavigationFailed(_) => Some(
                "Possible issues:\n  \
                 - Incorrect selectors for login elements or the target element\n  \
                 - Slow website loading, adjust the timeout or navigation wait\n  \
                 - Login failure, check your credentials and the login success condition",
            ),
            _ => None,
        }
    }
}

impl From<BrowserError> for String {
    fn from(err: BrowserError) -> String {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_hint_covers_wait_failures() {
        let err = BrowserError::SelectorTimeout {
            selector: "#username".to_string(),
            waited: Duration::from_secs(10),
        };
        assert!(err.diagnostic_hint().is_some());

        let err = BrowserError::NavigationFailed("net::ERR_CONNECTION_REFUSED".to_string());
        assert!(err.diagnostic_hint().is_some());
    }

    #[test]
    fn test_diagnostic_hint_absent_for_domain_failures() {
        let err = BrowserError::ClientMismatch {
            expected: "Acme Corp".to_string(),
            actual: "Globex".to_string(),
        };
        assert!(err.diagnostic_hint().is_none());

        let err = BrowserError::NoAlternateClient {
            current: "Acme Corp".to_string(),
        };
        assert!(err.diagnostic_hint().is_none());
    }

    #[test]
    fn test_selector_timeout_names_the_selector() {
        let err = BrowserError::SelectorTimeout {
            selector: "#kc-login".to_string(),
            waited: Duration::from_secs(10),
        };
        assert!(err.to_string().contains("#kc-login"));
    }
}
