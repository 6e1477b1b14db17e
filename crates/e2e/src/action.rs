//! Driver command set
//!
//! Every browser interaction is one [`Action`]. The Playwright driver sends
//! actions to its node process as JSON lines; the scripted driver interprets
//! them in memory.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single browser command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Load an absolute URL
    Navigate { url: String },

    Click {
        selector: String,
        index: usize,
        timeout_ms: u64,
    },

    /// Replace the value of a text input
    Fill {
        selector: String,
        index: usize,
        value: String,
        timeout_ms: u64,
    },

    /// Pick an option of a `<select>` by value
    Select {
        selector: String,
        index: usize,
        value: String,
        timeout_ms: u64,
    },

    /// Tick a checkbox or radio button
    Check {
        selector: String,
        index: usize,
        timeout_ms: u64,
    },

    /// Trimmed inner text of an element
    Text {
        selector: String,
        index: usize,
        timeout_ms: u64,
    },

    /// Number of elements currently matching
    Count { selector: String },

    /// Wait until the condition holds, failing after the timeout
    Expect {
        selector: String,
        index: usize,
        condition: Condition,
        timeout_ms: u64,
    },

    Url,

    SetCookie {
        name: String,
        value: String,
        url: String,
    },

    Screenshot { path: String },

    /// End the browser session
    Close,
}

/// Element state awaited by [`Action::Expect`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    Visible,
    Hidden,
    /// Whole trimmed text equals `expected`
    Text { expected: String },
    ContainsText { expected: String },
}

impl Action {
    /// Element the action targets, with its index and wait
    pub fn target(&self) -> Option<(&str, usize, u64)> {
        match self {
            Action::Click { selector, index, timeout_ms }
            | Action::Fill { selector, index, timeout_ms, .. }
            | Action::Select { selector, index, timeout_ms, .. }
            | Action::Check { selector, index, timeout_ms }
            | Action::Text { selector, index, timeout_ms }
            | Action::Expect { selector, index, timeout_ms, .. } => {
                Some((selector.as_str(), *index, *timeout_ms))
            }
            Action::Count { selector } => Some((selector.as_str(), 0, 0)),
            _ => None,
        }
    }

    /// Short label for logs and step names
    pub fn name(&self) -> String {
        match self {
            Action::Navigate { url } => format!("navigate:{}", url),
            Action::Click { selector, index, .. } => format!("click:{}[{}]", selector, index),
            Action::Fill { selector, .. } => format!("fill:{}", selector),
            Action::Select { selector, value, .. } => format!("select:{}={}", selector, value),
            Action::Check { selector, .. } => format!("check:{}", selector),
            Action::Text { selector, index, .. } => format!("text:{}[{}]", selector, index),
            Action::Count { selector } => format!("count:{}", selector),
            Action::Expect { selector, condition, .. } => {
                format!("expect:{}:{}", selector, condition.describe())
            }
            Action::Url => "url".to_string(),
            Action::SetCookie { name, .. } => format!("set_cookie:{}", name),
            Action::Screenshot { path } => format!("screenshot:{}", path),
            Action::Close => "close".to_string(),
        }
    }
}

impl Condition {
    pub fn describe(&self) -> String {
        match self {
            Condition::Visible => "visible".to_string(),
            Condition::Hidden => "hidden".to_string(),
            Condition::Text { expected } => format!("text '{}'", expected),
            Condition::ContainsText { expected } => format!("contains '{}'", expected),
        }
    }
}

/// One reply line from the driver process
#[derive(Debug, Clone, Deserialize)]
pub struct Reply {
    /// Id of the command answered; absent when the command could not be parsed
    #[serde(default)]
    pub id: Option<u64>,
    pub ok: bool,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format() {
        let action = Action::Expect {
            selector: "#booking-reference".to_string(),
            index: 0,
            condition: Condition::Text {
                expected: "Welsh".to_string(),
            },
            timeout_ms: 5000,
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["action"], "expect");
        assert_eq!(json["condition"]["kind"], "text");
        assert_eq!(json["condition"]["expected"], "Welsh");
        assert_eq!(json["timeout_ms"], 5000);

        let close = serde_json::to_string(&Action::Close).unwrap();
        assert_eq!(close, r#"{"action":"close"}"#);
    }

    #[test]
    fn test_reply_defaults() {
        let reply: Reply = serde_json::from_str(r#"{"ok":true}"#).unwrap();
        assert!(reply.ok);
        assert!(reply.value.is_null());

        let reply: Reply =
            serde_json::from_str(r#"{"ok":false,"error":"Timeout 5000ms exceeded"}"#).unwrap();
        assert_eq!(reply.error.as_deref(), Some("Timeout 5000ms exceeded"));
    }

    #[test]
    fn test_target() {
        let click = Action::Click {
            selector: "button".to_string(),
            index: 2,
            timeout_ms: 100,
        };
        assert_eq!(click.target(), Some(("button", 2, 100)));
        assert_eq!(Action::Url.target(), None);
    }
}
