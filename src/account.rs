//! Account credentials
//!
//! Accounts come from a pipe-delimited file (`username|password` per line)
//! or from the environment in single-account mode.

use std::path::Path;

use anyhow::Context;
use tracing::warn;

/// Environment variables for single-account mode
const ENV_USERNAME: &str = "CLIENT_SWITCHER_USERNAME";
const ENV_PASSWORD: &str = "CLIENT_SWITCHER_PASSWORD";

/// Login credentials for one account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub username: String,
    pub password: String,
}

impl Account {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Password with everything but the trailing 3 characters masked
    pub fn masked_password(&self) -> String {
        mask_password(&self.password)
    }

    /// Single-account mode from the environment; `None` unless both
    /// variables are set and non-empty
    pub fn from_env() -> Option<Self> {
        let username = std::env::var(ENV_USERNAME).ok()?;
        let password = std::env::var(ENV_PASSWORD).ok()?;

        if username.trim().is_empty() || password.trim().is_empty() {
            return None;
        }

        Some(Self::new(username, password))
    }

    /// Load accounts from a pipe-delimited file
    pub fn load_file(path: &Path) -> anyhow::Result<Vec<Self>> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read account file {}", path.display()))?;
        Ok(Self::parse(&content))
    }

    /// Parse `username|password` lines. The password is everything after the
    /// first pipe. Blank lines and lines missing either part are skipped with
    /// a warning rather than producing a broken account.
    pub fn parse(content: &str) -> Vec<Self> {
        let mut accounts = Vec::new();

        for (lineno, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match line.split_once('|') {
                Some((username, password)) => {
                    let username = username.trim();
                    let password = password.trim();
                    if username.is_empty() || password.is_empty() {
                        warn!(
                            "Skipping malformed account line {}: empty username or password",
                            lineno + 1
                        );
                        continue;
                    }
                    accounts.push(Self::new(username, password));
                }
                None => {
                    warn!(
                        "Skipping malformed account line {}: expected 'username|password'",
                        lineno + 1
                    );
                }
            }
        }

        accounts
    }
}

/// Mask a password to all but its trailing 3 characters. Passwords of 3 or
/// fewer characters mask entirely so short credentials never log in the clear.
pub fn mask_password(password: &str) -> String {
    let chars: Vec<char> = password.chars().collect();

    if chars.len() <= 3 {
        return "*".repeat(chars.len());
    }

    let visible: String = chars[chars.len() - 3..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 3), visible)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_shows_only_trailing_three() {
        assert_eq!(mask_password("hunter2pass"), "********ass");
        assert_eq!(mask_password("abcd"), "*bcd");
    }

    #[test]
    fn test_mask_hides_short_passwords_entirely() {
        assert_eq!(mask_password("abc"), "***");
        assert_eq!(mask_password("ab"), "**");
        assert_eq!(mask_password(""), "");
    }

    #[test]
    fn test_mask_counts_characters_not_bytes() {
        assert_eq!(mask_password("pässwörd"), "*****örd");
    }

    #[test]
    fn test_parse_reads_pipe_delimited_lines() {
        let accounts = Account::parse("alice|hunter2pass\nbob|secret99\n");

        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0], Account::new("alice", "hunter2pass"));
        assert_eq!(accounts[1], Account::new("bob", "secret99"));
    }

    #[test]
    fn test_parse_skips_blank_and_malformed_lines() {
        let accounts = Account::parse("alice|hunter2pass\n\nnot-a-record\n|nouser\nnopass|\n");

        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].username, "alice");
    }

    #[test]
    fn test_parse_keeps_pipes_inside_passwords() {
        let accounts = Account::parse("carol|pass|word");

        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].password, "pass|word");
    }

    #[test]
    fn test_parse_handles_crlf_line_endings() {
        let accounts = Account::parse("alice|hunter2pass\r\nbob|secret99\r\n");

        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[1].password, "secret99");
    }
}
