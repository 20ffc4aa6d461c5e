//! Two-step login flow
//!
//! The identity provider asks for the username first, then reveals the
//! password screen. Submission triggers a navigation to the landing page.

use tracing::info;

use crate::account::Account;
use crate::browser::{BrowserError, BrowserSession};
use crate::config::AppConfig;

/// Drive the two-step credential form and wait for the post-login navigation
pub async fn run(
    session: &BrowserSession,
    config: &AppConfig,
    account: &Account,
) -> Result<(), BrowserError> {
    let ui = &config.ui;
    let element_wait = config.timeouts.element_wait();

    session
        .wait_for_selector(&ui.username_field, element_wait)
        .await?;
    session
        .type_text(&ui.username_field, &account.username)
        .await?;
    session.click(&ui.next_button).await?;

    session
        .wait_for_selector(&ui.password_field, element_wait)
        .await?;
    session
        .type_text(&ui.password_field, &account.password)
        .await?;

    info!(
        "Login with username: {} password: {}",
        account.username,
        account.masked_password()
    );

    // Subscribe before submitting so a fast navigation is not missed
    let idle = session.watch_network_idle().await?;
    session.click(&ui.submit_button).await?;
    idle.wait(config.timeouts.nav_wait()).await?;

    Ok(())
}

/// Check the landing page shows the multi-client indicator. Accounts with a
/// single client render a different landing page and cannot run the flow.
pub async fn confirm(session: &BrowserSession, config: &AppConfig) -> Result<(), BrowserError> {
    session
        .wait_for_selector(&config.ui.login_indicator, config.timeouts.element_wait())
        .await
        .map_err(|_| {
            BrowserError::LoginFailed(
                "This account does not have multiple access clients".to_string(),
            )
        })
}
