//! Switch-client loop
//!
//! Opens the account menu in the header, invokes the switch item, resolves
//! the dialog that pops up and delegates entry selection to the client flow.

use std::time::Instant;

use tracing::info;

use super::{clients, js_string};
use crate::browser::{menu_item, resolve_nth, BrowserError, BrowserSession, Locator};
use crate::config::AppConfig;

/// Run the switch loop `rounds` times. Each round ends with a different
/// client active than the one it started with.
pub async fn run(
    session: &BrowserSession,
    config: &AppConfig,
    rounds: u32,
) -> Result<(), BrowserError> {
    for round in 1..=rounds {
        info!("------------ Switch round {}/{} ------------", round, rounds);
        switch_once(session, config).await?;
    }

    Ok(())
}

/// One round: open the menu, click the switch item, select from the dialog
async fn switch_once(session: &BrowserSession, config: &AppConfig) -> Result<(), BrowserError> {
    let ui = &config.ui;
    let element_wait = config.timeouts.element_wait();

    // The menu trigger sits in the header's last child; the child count
    // varies with what else the header currently renders
    session.wait_for_selector(&ui.header_bar, element_wait).await?;
    let header_children = child_count(session, &ui.header_bar).await?;
    let trigger = resolve_nth(&ui.menu_trigger, header_children);
    session.wait_for_selector(&trigger, element_wait).await?;
    session.click(&trigger).await?;

    let item = menu_item(&ui.switch_menu, ui.switch_item_index);
    session.wait_for_selector(&item, element_wait).await?;
    session.click(&item).await?;

    let dialog = resolve_dialog_list(session, config).await?;

    // The header indicator stays in the DOM under the dialog overlay
    let current = session.text_content(&ui.active_client_header).await?;
    info!("Current client: {}", current);

    clients::select(session, config, &Locator::css(dialog), Some(&current)).await?;

    Ok(())
}

/// Immediate element child count of the node at `selector`
async fn child_count(session: &BrowserSession, selector: &str) -> Result<u32, BrowserError> {
    let script = format!(
        r#"
        (function() {{
            const el = document.querySelector({sel});
            return el ? el.childElementCount : -1;
        }})()
        "#,
        sel = js_string(selector),
    );

    let count = session.execute_js(&script).await?.as_i64().unwrap_or(-1);
    if count < 0 {
        return Err(BrowserError::ElementNotFound(selector.to_string()));
    }

    Ok(count as u32)
}

/// Resolve the dialog's client list container. The dialog mounts as the last
/// body child, so a body count taken too early points at the wrong node;
/// re-resolve on every probe until the container is present, bounded by the
/// element wait.
async fn resolve_dialog_list(
    session: &BrowserSession,
    config: &AppConfig,
) -> Result<String, BrowserError> {
    let timeout = config.timeouts.element_wait();
    let deadline = Instant::now() + timeout;

    loop {
        let body_children = child_count(session, "body").await?;
        let selector = resolve_nth(&config.ui.dialog_list, body_children);

        let script = format!(
            "document.querySelector({sel}) !== null",
            sel = js_string(&selector),
        );
        if session.execute_js(&script).await?.as_bool() == Some(true) {
            return Ok(selector);
        }

        if Instant::now() >= deadline {
            return Err(BrowserError::SelectorTimeout {
                selector,
                waited: timeout,
            });
        }

        tokio::time::sleep(config.timeouts.poll()).await;
    }
}
