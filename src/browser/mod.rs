//! Browser automation module
//!
//! Handles launching and controlling a Chrome/Chromium instance over the
//! DevTools protocol, one session per account run.

mod errors;
mod locator;
mod session;

pub use errors::BrowserError;
pub use locator::{menu_item, resolve_nth, Locator};
pub use session::{find_chrome, BrowserSession, BrowserSessionConfig, NetworkIdleWatch};
