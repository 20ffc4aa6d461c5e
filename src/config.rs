//! Runtime configuration
//!
//! Settings load from an optional JSON file, with env and CLI overrides
//! applied by the binary. Every selector the flows touch lives in the UI
//! profile so a markup change means editing config, not code.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};

/// Application configuration
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    /// Login page of the application under test
    pub base_url: String,
    /// Run Chrome headless
    pub headless: bool,
    /// Explicit Chrome executable path (auto-detected when unset)
    pub chrome_path: Option<String>,
    /// Browser window width
    pub window_width: u32,
    /// Browser window height
    pub window_height: u32,
    /// Wait durations
    pub timeouts: Timeouts,
    /// Selectors for the UI under test
    pub ui: UiProfile,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "https://app.dev.compscience.com/".to_string(),
            headless: false,
            chrome_path: None,
            window_width: 1920,
            window_height: 1080,
            timeouts: Timeouts::default(),
            ui: UiProfile::default(),
        }
    }
}

/// Bounded wait durations, all in milliseconds
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Timeouts {
    /// Wait for an element to appear
    pub element_wait_ms: u64,
    /// Wait for a navigation to reach network idle
    pub nav_wait_ms: u64,
    /// Interval between element presence probes
    pub poll_ms: u64,
    /// Pause before session teardown so final requests settle
    pub settle_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            element_wait_ms: 10_000,
            nav_wait_ms: 30_000,
            poll_ms: 100,
            settle_ms: 1_500,
        }
    }
}

impl Timeouts {
    pub fn element_wait(&self) -> Duration {
        Duration::from_millis(self.element_wait_ms)
    }

    pub fn nav_wait(&self) -> Duration {
        Duration::from_millis(self.nav_wait_ms)
    }

    pub fn poll(&self) -> Duration {
        Duration::from_millis(self.poll_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

/// CSS selectors and positional knobs for the UI under test.
///
/// The `{n}` placeholder in `menu_trigger` and `dialog_list` is replaced
/// with a child count resolved at runtime; see [`crate::browser::resolve_nth`].
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiProfile {
    /// Username input on the first login screen
    pub username_field: String,
    /// Continue button on the username screen
    pub next_button: String,
    /// Password input on the second login screen
    pub password_field: String,
    /// Submit button on the password screen
    pub submit_button: String,
    /// Element that only renders for accounts with multiple clients
    pub login_indicator: String,
    /// Client list container on the landing page after login
    pub initial_client_list: String,
    /// Heading inside each client entry carrying the display name
    pub client_name_heading: String,
    /// Activation button inside each client entry
    pub entry_button: String,
    /// Element showing the active client name after a switch
    pub active_client_indicator: String,
    /// Header container whose child count locates the menu trigger
    pub header_bar: String,
    /// Menu trigger template; `{n}` is the header child count
    pub menu_trigger: String,
    /// Popup menu container holding the switch item
    pub switch_menu: String,
    /// 1-based position of the switch item inside the menu
    pub switch_item_index: u32,
    /// Dialog client list template; `{n}` is the body child count
    pub dialog_list: String,
    /// Header element showing the currently active client
    pub active_client_header: String,
}

impl Default for UiProfile {
    fn default() -> Self {
        Self {
            username_field: "#username".to_string(),
            next_button: "#next-button".to_string(),
            password_field: "#password".to_string(),
            submit_button: "#kc-login".to_string(),
            login_indicator: "#root > div.jss1.jss2 > div > p".to_string(),
            initial_client_list: "#root > div > div > div:nth-child(4)".to_string(),
            client_name_heading: "h2".to_string(),
            entry_button: r#"button[type="button"]"#.to_string(),
            active_client_indicator: ".jss36".to_string(),
            header_bar: "#root > div.MuiGrid-root.MuiGrid-container > div:nth-child(1) > div > header > div"
                .to_string(),
            menu_trigger: "#root > div.MuiGrid-root.MuiGrid-container > div:nth-child(1) > div > header > div > div:nth-child({n}) > button"
                .to_string(),
            switch_menu: "#fade-menu > div.MuiPaper-root.MuiMenu-paper.MuiPopover-paper.MuiPaper-elevation8.MuiPaper-rounded"
                .to_string(),
            switch_item_index: 5,
            dialog_list: "body > div:nth-child({n}) > div:nth-child(3) > div > div:nth-child(5)"
                .to_string(),
            active_client_header: "#root > div.MuiGrid-root.MuiGrid-container > div:nth-child(1) > div > header > div > div > button > span.MuiButton-label > div:nth-child(2) > div:nth-child(2)"
                .to_string(),
        }
    }
}

impl AppConfig {
    /// Config file path under the platform config directory
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("client-switcher").join("config.json"))
    }

    /// Load config from the default location, falling back to defaults
    pub fn load() -> Self {
        if let Some(path) = Self::config_path() {
            if path.exists() {
                match std::fs::read_to_string(&path) {
                    Ok(content) => match serde_json::from_str(&content) {
                        Ok(config) => {
                            info!("Loaded config from {:?}", path);
                            return config;
                        }
                        Err(e) => {
                            warn!("Failed to parse config file: {}", e);
                        }
                    },
                    Err(e) => {
                        warn!("Failed to read config file: {}", e);
                    }
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit path; errors instead of falling back
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Check the loaded values make sense before driving a browser
    pub fn validate(&self) -> anyhow::Result<()> {
        let url = url::Url::parse(&self.base_url)
            .with_context(|| format!("Invalid base URL: {}", self.base_url))?;

        // file is allowed so fixture pages can be driven locally
        if !matches!(url.scheme(), "http" | "https" | "file") {
            anyhow::bail!(
                "Unsupported scheme '{}' in base URL {}",
                url.scheme(),
                self.base_url
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_the_known_ui() {
        let config = AppConfig::default();

        assert_eq!(config.base_url, "https://app.dev.compscience.com/");
        assert!(!config.headless);
        assert_eq!(config.ui.username_field, "#username");
        assert_eq!(config.ui.switch_item_index, 5);
        assert_eq!(config.timeouts.element_wait(), Duration::from_secs(10));
        assert_eq!(config.timeouts.settle(), Duration::from_millis(1500));
    }

    #[test]
    fn test_partial_json_fills_missing_fields_from_defaults() {
        let json = r#"{
            "baseUrl": "https://staging.example.com/",
            "headless": true,
            "timeouts": { "elementWaitMs": 2000 }
        }"#;

        let config: AppConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.base_url, "https://staging.example.com/");
        assert!(config.headless);
        assert_eq!(config.timeouts.element_wait_ms, 2000);
        // Untouched fields keep their defaults
        assert_eq!(config.timeouts.nav_wait_ms, 30_000);
        assert_eq!(config.ui.password_field, "#password");
    }

    #[test]
    fn test_validate_rejects_unparseable_url() {
        let config = AppConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_file_urls_for_local_fixtures() {
        let config = AppConfig {
            base_url: "file:///tmp/fixtures/login.html".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
