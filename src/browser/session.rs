//! Browser session management
//!
//! Launches and controls a single Chrome instance over the DevTools protocol.
//! One session drives one logged-in account run and is torn down afterwards.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::{
    EventLifecycleEvent, SetLifecycleEventsEnabledParams,
};
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::BrowserError;

/// Global counter for sequential session naming (Session-1, Session-2, ...)
static SESSION_COUNTER: AtomicU32 = AtomicU32::new(1);

/// Default timeout for injected script evaluation
const JS_TIMEOUT_SECS: u64 = 30;

/// Find Chrome/Chromium executable on the system
pub fn find_chrome() -> Option<PathBuf> {
    let candidates: Vec<PathBuf> = if cfg!(target_os = "windows") {
        let mut paths = vec![
            PathBuf::from(r"C:\Program Files\Google\Chrome\Application\chrome.exe"),
            PathBuf::from(r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe"),
        ];
        // Also check %LOCALAPPDATA%
        if let Ok(local) = std::env::var("LOCALAPPDATA") {
            paths.push(PathBuf::from(format!(
                r"{}\Google\Chrome\Application\chrome.exe",
                local
            )));
        }
        paths
    } else if cfg!(target_os = "macos") {
        vec![
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"),
            PathBuf::from("/Applications/Chromium.app/Contents/MacOS/Chromium"),
        ]
    } else {
        vec![
            PathBuf::from("/usr/bin/google-chrome"),
            PathBuf::from("/usr/bin/google-chrome-stable"),
            PathBuf::from("/usr/bin/chromium"),
            PathBuf::from("/usr/bin/chromium-browser"),
        ]
    };

    candidates.into_iter().find(|p| p.exists())
}

/// Configuration for a browser session
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserSessionConfig {
    /// Path to Chrome/Chromium executable
    pub chrome_path: Option<String>,
    /// Run in headless mode
    pub headless: bool,
    /// User data directory
    pub user_data_dir: Option<String>,
    /// Interval between element presence probes, in milliseconds
    pub poll_interval_ms: u64,
    /// Window width
    pub window_width: u32,
    /// Window height
    pub window_height: u32,
}

impl Default for BrowserSessionConfig {
    fn default() -> Self {
        Self {
            chrome_path: None,
            headless: false,
            user_data_dir: None,
            poll_interval_ms: 100,
            window_width: 1920,
            window_height: 1080,
        }
    }
}

impl BrowserSessionConfig {
    /// Create config for a specific session with its own data directory
    pub fn for_session(session_id: &str) -> Self {
        let base = std::env::temp_dir()
            .join("client-switcher")
            .join("browser_data");

        let user_data_dir = base.join(session_id).to_string_lossy().to_string();

        Self {
            user_data_dir: Some(user_data_dir),
            ..Default::default()
        }
    }

    /// Set headless mode
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set Chrome path
    pub fn chrome_path(mut self, path: Option<String>) -> Self {
        self.chrome_path = path;
        self
    }

    /// Set window size
    pub fn window(mut self, width: u32, height: u32) -> Self {
        self.window_width = width;
        self.window_height = height;
        self
    }

    /// Set the element probe interval
    pub fn poll_interval(mut self, millis: u64) -> Self {
        self.poll_interval_ms = millis;
        self
    }

    // A zero interval would spin on the CDP connection
    fn poll_interval_duration(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(10))
    }
}

/// A browser session driving one account run
pub struct BrowserSession {
    /// Display name, e.g. "Session-1"
    id: String,
    /// The browser instance
    browser: Arc<RwLock<Option<Browser>>>,
    /// Current active page
    page: Arc<RwLock<Option<Page>>>,
    /// Session configuration
    config: BrowserSessionConfig,
    /// Whether Chrome is still attached
    alive: Arc<AtomicBool>,
}

impl BrowserSession {
    /// Launch Chrome with the given config and attach to its first page
    pub async fn new(config: BrowserSessionConfig) -> Result<Self, BrowserError> {
        let session_id = format!("Session-{}", SESSION_COUNTER.fetch_add(1, Ordering::Relaxed));

        info!(
            "Launching browser session {} (headless: {})",
            session_id, config.headless
        );

        // Check Chrome availability before attempting a launch
        if config.chrome_path.is_none() && find_chrome().is_none() {
            return Err(BrowserError::LaunchFailed(
                "Chrome not found. Install Google Chrome or Chromium, or configure an explicit chrome path.".to_string(),
            ));
        }

        let mut builder = BrowserConfig::builder();

        if config.headless {
            // Modern Chrome needs --headless=new for a fully working headless DOM
            builder = builder.arg("--headless=new");
        } else {
            builder = builder.with_head();
        }

        if let Some(ref path) = config.chrome_path {
            builder = builder.chrome_executable(path);
        } else if let Some(chrome_path) = find_chrome() {
            info!("Auto-detected Chrome at: {}", chrome_path.display());
            builder = builder.chrome_executable(chrome_path);
        }

        if let Some(ref dir) = config.user_data_dir {
            std::fs::create_dir_all(dir)?;
            builder = builder.user_data_dir(dir);
        }

        builder = builder
            .window_size(config.window_width, config.window_height)
            // The window is the real surface; no emulated viewport on top of it
            .viewport(None)
            .arg("--disable-infobars")
            .arg("--no-default-browser-check")
            .arg("--disable-session-crashed-bubble")
            .arg("--disable-restore-session-state")
            // Required when running as root (e.g. in Docker or on a CI runner)
            .arg("--no-sandbox");

        let browser_config = builder.build().map_err(BrowserError::LaunchFailed)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        // Spawn the handler in the background; when it ends, Chrome is gone
        let session_id_clone = session_id.clone();
        let alive_flag = Arc::new(AtomicBool::new(true));
        let alive_for_handler = alive_flag.clone();
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Session {} handler error: {}", session_id_clone, e);
                }
            }
            warn!(
                "Session {} Chrome disconnected (event handler ended)",
                session_id_clone
            );
            alive_for_handler.store(false, Ordering::Relaxed);
        });

        // Chrome opens with a blank tab; take it as the main page, close extras
        let page = {
            let mut pages = browser
                .pages()
                .await
                .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

            let main_page = if !pages.is_empty() {
                pages.remove(0)
            } else {
                browser
                    .new_page("about:blank")
                    .await
                    .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?
            };

            for extra_page in pages {
                debug!("Closing extra blank tab");
                let _ = extra_page.close().await;
            }

            main_page
        };

        // Lifecycle events back the network-idle watch
        page.execute(SetLifecycleEventsEnabledParams::new(true))
            .await
            .map_err(|e| {
                BrowserError::LaunchFailed(format!("Failed to enable lifecycle events: {}", e))
            })?;

        info!("Browser session {} created", session_id);

        Ok(Self {
            id: session_id,
            browser: Arc::new(RwLock::new(Some(browser))),
            page: Arc::new(RwLock::new(Some(page))),
            config,
            alive: alive_flag,
        })
    }

    /// Get session ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Check if Chrome is still attached
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }

    /// Navigate to a URL
    pub async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        let page = self.page.read().await;
        let page = page
            .as_ref()
            .ok_or(BrowserError::ConnectionLost("No active page".into()))?;

        debug!("Session {} navigating to: {}", self.id, url);
        page.goto(url)
            .await
            .map_err(|e| BrowserError::NavigationFailed(e.to_string()))?;

        Ok(())
    }

    /// Execute JavaScript on the page with the default timeout
    pub async fn execute_js(&self, script: &str) -> Result<serde_json::Value, BrowserError> {
        self.execute_js_with_timeout(script, JS_TIMEOUT_SECS).await
    }

    /// Execute JavaScript on the page with a custom timeout (in seconds)
    pub async fn execute_js_with_timeout(
        &self,
        script: &str,
        timeout_secs: u64,
    ) -> Result<serde_json::Value, BrowserError> {
        let page = self.page.read().await;
        let page = page
            .as_ref()
            .ok_or(BrowserError::ConnectionLost("No active page".into()))?;

        let result = tokio::time::timeout(Duration::from_secs(timeout_secs), page.evaluate(script))
            .await
            .map_err(|_| {
                BrowserError::Timeout(format!(
                    "JavaScript execution timed out after {}s",
                    timeout_secs
                ))
            })?
            .map_err(|e| BrowserError::JavaScriptError(e.to_string()))?;

        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    /// Wait until a selector is present in the DOM
    pub async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        let deadline = Instant::now() + timeout;

        loop {
            {
                let page = self.page.read().await;
                let page = page
                    .as_ref()
                    .ok_or(BrowserError::ConnectionLost("No active page".into()))?;
                if page.find_element(selector).await.is_ok() {
                    return Ok(());
                }
            }

            if !self.is_alive() {
                return Err(BrowserError::ConnectionLost(
                    "Chrome exited while waiting".into(),
                ));
            }
            if Instant::now() >= deadline {
                return Err(BrowserError::SelectorTimeout {
                    selector: selector.to_string(),
                    waited: timeout,
                });
            }

            tokio::time::sleep(self.config.poll_interval_duration()).await;
        }
    }

    /// Click on an element by selector
    pub async fn click(&self, selector: &str) -> Result<(), BrowserError> {
        let page = self.page.read().await;
        let page = page
            .as_ref()
            .ok_or(BrowserError::ConnectionLost("No active page".into()))?;

        let element = page
            .find_element(selector)
            .await
            .map_err(|e| BrowserError::ElementNotFound(format!("{}: {}", selector, e)))?;

        element
            .click()
            .await
            .map_err(|e| BrowserError::JavaScriptError(e.to_string()))?;

        Ok(())
    }

    /// Type text into an element
    pub async fn type_text(&self, selector: &str, text: &str) -> Result<(), BrowserError> {
        let page = self.page.read().await;
        let page = page
            .as_ref()
            .ok_or(BrowserError::ConnectionLost("No active page".into()))?;

        let element = page
            .find_element(selector)
            .await
            .map_err(|e| BrowserError::ElementNotFound(format!("{}: {}", selector, e)))?;

        // Focus the field first
        element.click().await.ok();
        element
            .type_str(text)
            .await
            .map_err(|e| BrowserError::JavaScriptError(e.to_string()))?;

        Ok(())
    }

    /// Read the trimmed inner text of an element
    pub async fn text_content(&self, selector: &str) -> Result<String, BrowserError> {
        let page = self.page.read().await;
        let page = page
            .as_ref()
            .ok_or(BrowserError::ConnectionLost("No active page".into()))?;

        let element = page
            .find_element(selector)
            .await
            .map_err(|e| BrowserError::ElementNotFound(format!("{}: {}", selector, e)))?;

        let text = element
            .inner_text()
            .await
            .map_err(|e| BrowserError::JavaScriptError(e.to_string()))?;

        Ok(text.unwrap_or_default().trim().to_string())
    }

    /// Subscribe to page lifecycle events ahead of an action that triggers a
    /// navigation. Subscribing before acting closes the gap where a fast
    /// navigation settles before the caller starts listening.
    pub async fn watch_network_idle(&self) -> Result<NetworkIdleWatch, BrowserError> {
        let page = self.page.read().await;
        let page = page
            .as_ref()
            .ok_or(BrowserError::ConnectionLost("No active page".into()))?;

        let mut events = page
            .event_listener::<EventLifecycleEvent>()
            .await
            .map_err(|e| BrowserError::ConnectionLost(e.to_string()))?;

        let (tx, rx) = tokio::sync::oneshot::channel();
        let task = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if event.name == "networkIdle" {
                    let _ = tx.send(());
                    break;
                }
            }
        });

        Ok(NetworkIdleWatch { rx, task })
    }

    /// Close the browser session
    pub async fn close(&self) -> Result<(), BrowserError> {
        // Mark as not alive first to stop new operations
        self.alive.store(false, Ordering::Relaxed);

        {
            let mut page = self.page.write().await;
            if let Some(p) = page.take() {
                let _ = p.close().await;
            }
        }

        {
            let mut browser = self.browser.write().await;
            if let Some(mut b) = browser.take() {
                // Graceful close first; the grace period lets Chrome child
                // processes exit before the force kill
                let _ = b.close().await;
                tokio::time::sleep(Duration::from_millis(500)).await;
                let _ = b.kill().await;
            }
        }

        info!("Browser session {} closed", self.id);
        Ok(())
    }
}

/// Pending network-idle signal for one navigation
pub struct NetworkIdleWatch {
    rx: tokio::sync::oneshot::Receiver<()>,
    task: tokio::task::JoinHandle<()>,
}

impl NetworkIdleWatch {
    /// Wait for the page to reach network idle, bounded by `timeout`
    pub async fn wait(self, timeout: Duration) -> Result<(), BrowserError> {
        let outcome = tokio::time::timeout(timeout, self.rx).await;
        self.task.abort();

        match outcome {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(BrowserError::ConnectionLost(
                "Lifecycle event stream closed".into(),
            )),
            Err(_) => Err(BrowserError::Timeout(format!(
                "Network idle not reached within {}ms",
                timeout.as_millis()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_session_uses_per_session_data_dir() {
        let config = BrowserSessionConfig::for_session("abc-123");
        let dir = config.user_data_dir.expect("data dir set");
        assert!(dir.contains("abc-123"));
        assert!(dir.contains("client-switcher"));
    }

    #[test]
    fn test_builder_methods_override_defaults() {
        let config = BrowserSessionConfig::for_session("abc")
            .headless(true)
            .chrome_path(Some("/opt/chrome".to_string()))
            .window(1280, 720)
            .poll_interval(50);

        assert!(config.headless);
        assert_eq!(config.chrome_path.as_deref(), Some("/opt/chrome"));
        assert_eq!((config.window_width, config.window_height), (1280, 720));
        assert_eq!(config.poll_interval_ms, 50);
    }

    #[test]
    fn test_poll_interval_floor_prevents_busy_spin() {
        let config = BrowserSessionConfig::default().poll_interval(0);
        assert!(config.poll_interval_duration() >= Duration::from_millis(10));
    }
}
