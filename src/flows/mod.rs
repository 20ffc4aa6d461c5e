//! UI flows for the application under test
//!
//! Each flow drives one screen: the two-step login form, the client list,
//! and the switch-client menu. Flows only know selectors through the UI
//! profile in [`crate::config::UiProfile`].

pub mod clients;
pub mod login;
pub mod switcher;

/// Quote a string as a JavaScript literal for injection into a script
pub(crate) fn js_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_string_quotes_and_escapes() {
        assert_eq!(js_string("plain"), r#""plain""#);
        assert_eq!(js_string(r#"with "quotes""#), r#""with \"quotes\"""#);
        assert_eq!(
            js_string(r#"button[type="button"]"#),
            r#""button[type=\"button\"]""#
        );
    }
}
