//! Client list selection
//!
//! Enumerates the entries of a client list container, draws a random entry
//! other than the currently active one, activates it and confirms the UI
//! actually landed on it.

use rand::Rng;
use tracing::info;

use super::js_string;
use crate::browser::{BrowserError, BrowserSession, Locator};
use crate::config::AppConfig;

/// Pick a random client from `list`, excluding `current`, activate it and
/// confirm the active-client indicator shows its name.
///
/// Returns the confirmed client name.
pub async fn select(
    session: &BrowserSession,
    config: &AppConfig,
    list: &Locator,
    current: Option<&str>,
) -> Result<String, BrowserError> {
    let container = list.to_css();
    let element_wait = config.timeouts.element_wait();

    session.wait_for_selector(&container, element_wait).await?;

    let names = entry_names(session, &container, &config.ui.client_name_heading).await?;

    info!("Getting {} clients:", names.len());
    for name in &names {
        if current.is_some_and(|c| c.trim() == name.trim()) {
            info!(" - {} <---------- Current client", name);
        } else {
            info!(" - {}", name);
        }
    }

    let candidates = candidate_entries(&names, current);
    if candidates.is_empty() {
        return Err(BrowserError::NoAlternateClient {
            current: current.unwrap_or_default().to_string(),
        });
    }

    let pick = rand::thread_rng().gen_range(0..candidates.len());
    let (entry_index, chosen) = candidates[pick].clone();
    info!("Selected random client: {}", chosen);

    // Subscribe before clicking so a fast navigation is not missed
    let idle = session.watch_network_idle().await?;
    click_entry(session, &container, entry_index, &config.ui.entry_button).await?;
    idle.wait(config.timeouts.nav_wait()).await?;

    session
        .wait_for_selector(&config.ui.active_client_indicator, element_wait)
        .await?;
    let actual = session
        .text_content(&config.ui.active_client_indicator)
        .await?;
    info!("Navigated client name: {}", actual);

    if actual.trim() != chosen.trim() {
        return Err(BrowserError::ClientMismatch {
            expected: chosen.trim().to_string(),
            actual: actual.trim().to_string(),
        });
    }

    Ok(actual.trim().to_string())
}

/// Entries eligible for selection: every entry whose name differs from the
/// current client. Indices refer to positions in the full entry list.
fn candidate_entries(names: &[String], current: Option<&str>) -> Vec<(usize, String)> {
    names
        .iter()
        .enumerate()
        .filter(|(_, name)| match current {
            Some(current) => name.trim() != current.trim(),
            None => true,
        })
        .map(|(i, name)| (i, name.clone()))
        .collect()
}

/// Read the display name of every immediate child entry of the container
async fn entry_names(
    session: &BrowserSession,
    container: &str,
    heading: &str,
) -> Result<Vec<String>, BrowserError> {
    let script = format!(
        r#"
        (function() {{
            const container = document.querySelector({container});
            if (!container) {{
                return {{ ok: false, error: 'container not found' }};
            }}
            const names = [];
            for (const entry of container.querySelectorAll(':scope > div')) {{
                const heading = entry.querySelector({heading});
                names.push(heading ? heading.textContent : '');
            }}
            return {{ ok: true, names: names }};
        }})()
        "#,
        container = js_string(container),
        heading = js_string(heading),
    );

    let result = session.execute_js(&script).await?;

    if result.get("ok").and_then(|v| v.as_bool()) != Some(true) {
        let error = result
            .get("error")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown error");
        return Err(BrowserError::JavaScriptError(format!(
            "Failed to enumerate client entries: {}",
            error
        )));
    }

    let names = result
        .get("names")
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .map(|v| v.as_str().unwrap_or_default().to_string())
                .collect()
        })
        .unwrap_or_default();

    Ok(names)
}

/// Click the activation button inside the entry at `index`
async fn click_entry(
    session: &BrowserSession,
    container: &str,
    index: usize,
    button: &str,
) -> Result<(), BrowserError> {
    let script = format!(
        r#"
        (function() {{
            const container = document.querySelector({container});
            if (!container) {{
                return {{ ok: false, error: 'container not found' }};
            }}
            const entries = container.querySelectorAll(':scope > div');
            const entry = entries[{index}];
            if (!entry) {{
                return {{ ok: false, error: 'entry ' + {index} + ' not found' }};
            }}
            const button = entry.querySelector({button});
            if (!button) {{
                return {{ ok: false, error: 'activation button not found' }};
            }}
            button.click();
            return {{ ok: true }};
        }})()
        "#,
        container = js_string(container),
        index = index,
        button = js_string(button),
    );

    let result = session.execute_js(&script).await?;

    if result.get("ok").and_then(|v| v.as_bool()) != Some(true) {
        let error = result
            .get("error")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown error");
        return Err(BrowserError::ElementNotFound(format!(
            "Client entry activation failed: {}",
            error
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_exclude_the_current_client() {
        let names = vec![
            "Acme Corp".to_string(),
            "Globex".to_string(),
            "Initech".to_string(),
        ];

        let candidates = candidate_entries(&names, Some("Globex"));

        assert_eq!(
            candidates,
            vec![(0, "Acme Corp".to_string()), (2, "Initech".to_string())]
        );
    }

    #[test]
    fn test_no_current_keeps_every_entry() {
        let names = vec!["Acme Corp".to_string(), "Globex".to_string()];

        let candidates = candidate_entries(&names, None);

        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn test_whitespace_differences_do_not_defeat_exclusion() {
        let names = vec!["  Acme Corp ".to_string(), "Globex".to_string()];

        let candidates = candidate_entries(&names, Some("Acme Corp"));

        assert_eq!(candidates, vec![(1, "Globex".to_string())]);
    }

    #[test]
    fn test_single_entry_matching_current_leaves_no_candidates() {
        let names = vec!["Acme Corp".to_string()];

        assert!(candidate_entries(&names, Some("Acme Corp")).is_empty());
    }

    #[test]
    fn test_duplicate_current_names_are_all_excluded() {
        let names = vec![
            "Acme Corp".to_string(),
            "Acme Corp".to_string(),
            "Globex".to_string(),
        ];

        let candidates = candidate_entries(&names, Some("Acme Corp"));

        assert_eq!(candidates, vec![(2, "Globex".to_string())]);
    }
}
