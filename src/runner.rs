//! Per-account run orchestration
//!
//! Drives login, initial selection and the switch loop for each account in
//! turn, one browser session per account, and collects typed outcomes into
//! a run summary.

use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::account::Account;
use crate::browser::{BrowserError, BrowserSession, BrowserSessionConfig, Locator};
use crate::config::AppConfig;
use crate::flows::{clients, login, switcher};

/// Outcome of one account's run
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountOutcome {
    pub username: String,
    pub passed: bool,
    /// Failure description when `passed` is false
    pub error: Option<String>,
}

/// Summary of a whole run across all accounts
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub outcomes: Vec<AccountOutcome>,
}

impl RunSummary {
    /// Number of accounts that passed
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed).count()
    }

    /// Number of accounts that failed
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }
}

/// Run the switch-client flow for every account sequentially
pub async fn run_all(config: &AppConfig, accounts: &[Account], rounds: u32) -> RunSummary {
    let started_at = Utc::now();
    let started = Instant::now();

    info!(
        "Run switch client {} times for each of {} account(s) (target: {})",
        rounds,
        accounts.len(),
        config.base_url
    );

    let mut outcomes = Vec::with_capacity(accounts.len());

    for account in accounts {
        info!("------------- Account: {} -------------", account.username);

        match run_account(config, account, rounds).await {
            Ok(()) => {
                info!("Account {} passed", account.username);
                outcomes.push(AccountOutcome {
                    username: account.username.clone(),
                    passed: true,
                    error: None,
                });
            }
            Err(e) => {
                error!("Account {} failed: {}", account.username, e);
                if let Some(hint) = e.diagnostic_hint() {
                    warn!("{}", hint);
                }
                outcomes.push(AccountOutcome {
                    username: account.username.clone(),
                    passed: false,
                    error: Some(e.into()),
                });
            }
        }
    }

    let summary = RunSummary {
        started_at,
        duration_ms: started.elapsed().as_millis() as u64,
        outcomes,
    };

    info!(
        "Run finished: {}/{} account(s) passed in {}ms",
        summary.passed(),
        summary.outcomes.len(),
        summary.duration_ms
    );
    if let Ok(json) = serde_json::to_string(&summary) {
        debug!("Run summary: {}", json);
    }

    summary
}

/// One account: launch a session, drive the flow, always tear down
async fn run_account(
    config: &AppConfig,
    account: &Account,
    rounds: u32,
) -> Result<(), BrowserError> {
    let session_id = Uuid::new_v4().to_string();
    let session_config = BrowserSessionConfig::for_session(&session_id)
        .headless(config.headless)
        .chrome_path(config.chrome_path.clone())
        .window(config.window_width, config.window_height)
        .poll_interval(config.timeouts.poll_ms);

    let session = BrowserSession::new(session_config).await?;

    let result = drive(&session, config, account, rounds).await;

    if result.is_err() && !session.is_alive() {
        warn!("Session {} lost Chrome mid-run", session.id());
    }

    // Let in-flight requests settle before tearing the browser down
    tokio::time::sleep(config.timeouts.settle()).await;

    if let Err(e) = session.close().await {
        warn!("Session {} teardown failed: {}", session.id(), e);
    }

    result
}

/// Login, initial selection, then the switch loop
async fn drive(
    session: &BrowserSession,
    config: &AppConfig,
    account: &Account,
    rounds: u32,
) -> Result<(), BrowserError> {
    session.navigate(&config.base_url).await?;

    info!("------------- Login --------------");
    login::run(session, config, account).await?;
    info!("------------- Checking multiple clients --------------");
    login::confirm(session, config).await?;

    info!("Getting client list...");
    let list = Locator::css(config.ui.initial_client_list.clone());
    clients::select(session, config, &list, None).await?;

    switcher::run(session, config, rounds).await?;

    info!(
        "------------- Test successful with {} in {} times --------------",
        account.username, rounds
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary_with(outcomes: Vec<AccountOutcome>) -> RunSummary {
        RunSummary {
            started_at: Utc::now(),
            duration_ms: 1234,
            outcomes,
        }
    }

    #[test]
    fn test_summary_counts_pass_and_fail() {
        let summary = summary_with(vec![
            AccountOutcome {
                username: "alice".into(),
                passed: true,
                error: None,
            },
            AccountOutcome {
                username: "bob".into(),
                passed: false,
                error: Some("Login failed".into()),
            },
        ]);

        assert_eq!(summary.passed(), 1);
        assert_eq!(summary.failed(), 1);
        assert!(!summary.all_passed());
    }

    #[test]
    fn test_empty_summary_counts_as_all_passed() {
        let summary = summary_with(vec![]);

        assert!(summary.all_passed());
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let summary = summary_with(vec![AccountOutcome {
            username: "alice".into(),
            passed: true,
            error: None,
        }]);

        let json = serde_json::to_string(&summary).unwrap();

        assert!(json.contains("startedAt"));
        assert!(json.contains("durationMs"));
        assert!(json.contains("\"passed\":true"));
    }
}
