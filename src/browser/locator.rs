//! Element locator strategies
//!
//! The flows never hardcode how an element is found. They build a [`Locator`]
//! and the session renders it to a CSS selector at the driver boundary, so a
//! target UI that grows stable test ids or ARIA roles only needs new
//! configuration, not new flow code.

use std::fmt;

/// Strategy for locating an element on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// Raw CSS selector (e.g. "#kc-login")
    Css(String),
    /// data-testid attribute value
    TestId(String),
    /// ARIA role, optionally filtered by accessible name
    Role {
        role: String,
        name: Option<String>,
    },
}

impl Locator {
    /// Create a CSS locator
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a test ID locator
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::TestId(id.into())
    }

    /// Create a role locator
    pub fn role(role: impl Into<String>) -> Self {
        Self::Role {
            role: role.into(),
            name: None,
        }
    }

    /// Create a role locator with an accessible name filter
    pub fn role_with_name(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Role {
            role: role.into(),
            name: Some(name.into()),
        }
    }

    /// Render to the CSS selector handed to the browser session.
    pub fn to_css(&self) -> String {
        match self {
            Self::Css(selector) => selector.clone(),
            Self::TestId(id) => format!("[data-testid=\"{}\"]", id),
            Self::Role { role, name: None } => format!("[role=\"{}\"]", role),
            Self::Role {
                role,
                name: Some(name),
            } => format!("[role=\"{}\"][aria-label=\"{}\"]", role, name),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_css())
    }
}

/// Fill the `{n}` placeholder in a positional selector template.
///
/// The target UI mounts its account menu and client dialog as the last child
/// of a container whose child count shifts between builds, so those selectors
/// are configured as templates and resolved against a live count.
pub fn resolve_nth(template: &str, n: u32) -> String {
    template.replace("{n}", &n.to_string())
}

/// Selector for the nth item of a popup menu list.
pub fn menu_item(menu: &str, index: u32) -> String {
    format!("{} > ul > li:nth-child({})", menu, index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_locator_passes_through() {
        let locator = Locator::css("#root > div > button");
        assert_eq!(locator.to_css(), "#root > div > button");
    }

    #[test]
    fn test_test_id_locator_renders_attribute_selector() {
        let locator = Locator::test_id("client-list");
        assert_eq!(locator.to_css(), "[data-testid=\"client-list\"]");
    }

    #[test]
    fn test_role_locator_with_and_without_name() {
        assert_eq!(Locator::role("dialog").to_css(), "[role=\"dialog\"]");
        assert_eq!(
            Locator::role_with_name("button", "Switch client").to_css(),
            "[role=\"button\"][aria-label=\"Switch client\"]"
        );
    }

    #[test]
    fn test_display_matches_to_css() {
        let locator = Locator::css(".jss36");
        assert_eq!(locator.to_string(), locator.to_css());
    }

    #[test]
    fn test_resolve_nth_fills_placeholder() {
        let resolved = resolve_nth("body > div:nth-child({n}) > div:nth-child(3)", 7);
        assert_eq!(resolved, "body > div:nth-child(7) > div:nth-child(3)");
    }

    #[test]
    fn test_resolve_nth_without_placeholder_is_identity() {
        assert_eq!(resolve_nth("#static", 3), "#static");
    }

    #[test]
    fn test_menu_item_targets_nth_list_entry() {
        assert_eq!(
            menu_item("#fade-menu > div.paper", 5),
            "#fade-menu > div.paper > ul > li:nth-child(5)"
        );
    }
}
