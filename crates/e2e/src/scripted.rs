//! In-memory driver for exercising page objects and helpers without a browser

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::action::{Action, Condition};
use crate::driver::{Driver, DriverFactory};
use crate::error::{E2eError, E2eResult};

#[derive(Default)]
struct Script {
    texts: HashMap<(String, usize), String>,
    hidden: HashSet<String>,
    missing: HashSet<String>,
    counts: HashMap<String, usize>,
    performed: Vec<Action>,
    cookies: Vec<(String, String)>,
    url: String,
    closed: bool,
}

/// Driver answering from canned page content.
///
/// Every element exists and is visible unless marked hidden or missing.
/// Text assertions are checked against scripted text and pass when none is
/// scripted. Clones share state, so a test can keep a handle after boxing a
/// clone into a [`crate::Ui`].
#[derive(Clone, Default)]
pub struct ScriptedDriver {
    script: Arc<Mutex<Script>>,
}

impl ScriptedDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text of the first element matching `selector`
    pub fn with_text(self, selector: &str, text: &str) -> Self {
        self.with_text_at(selector, 0, text)
    }

    pub fn with_text_at(self, selector: &str, index: usize, text: &str) -> Self {
        self.script
            .lock()
            .texts
            .insert((selector.to_string(), index), text.to_string());
        self
    }

    /// Element exists but is not displayed
    pub fn hidden(self, selector: &str) -> Self {
        self.script.lock().hidden.insert(selector.to_string());
        self
    }

    /// Element is absent; interactions with it fail
    pub fn missing(self, selector: &str) -> Self {
        self.script.lock().missing.insert(selector.to_string());
        self
    }

    pub fn with_count(self, selector: &str, count: usize) -> Self {
        self.script.lock().counts.insert(selector.to_string(), count);
        self
    }

    pub fn performed(&self) -> Vec<Action> {
        self.script.lock().performed.clone()
    }

    /// Selectors awaited as visible, in order
    pub fn visible_checks(&self) -> Vec<String> {
        self.script
            .lock()
            .performed
            .iter()
            .filter_map(|action| match action {
                Action::Expect {
                    selector,
                    condition: Condition::Visible,
                    ..
                } => Some(selector.clone()),
                _ => None,
            })
            .collect()
    }

    /// Last value typed into `selector`
    pub fn filled(&self, selector: &str) -> Option<String> {
        self.script
            .lock()
            .performed
            .iter()
            .rev()
            .find_map(|action| match action {
                Action::Fill { selector: s, value, .. } if s == selector => Some(value.clone()),
                _ => None,
            })
    }

    pub fn clicked(&self, selector: &str) -> bool {
        self.script.lock().performed.iter().any(|action| {
            matches!(action, Action::Click { selector: s, .. } | Action::Check { selector: s, .. } if s == selector)
        })
    }

    pub fn cookies(&self) -> Vec<(String, String)> {
        self.script.lock().cookies.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.script.lock().closed
    }
}

fn present(script: &Script, selector: &str) -> E2eResult<()> {
    if script.missing.contains(selector) {
        return Err(E2eError::Driver(format!("no element matches {}", selector)));
    }
    if script.hidden.contains(selector) {
        return Err(E2eError::Driver(format!("{} is not visible", selector)));
    }
    Ok(())
}

fn expect(script: &Script, selector: &str, index: usize, condition: &Condition) -> E2eResult<()> {
    let scripted = script.texts.get(&(selector.to_string(), index));
    match condition {
        Condition::Visible => present(script, selector),
        Condition::Hidden => {
            if script.missing.contains(selector) || script.hidden.contains(selector) {
                Ok(())
            } else {
                Err(E2eError::Driver(format!("{} is visible", selector)))
            }
        }
        Condition::Text { expected } => {
            present(script, selector)?;
            match scripted {
                Some(actual) if actual != expected => Err(E2eError::Driver(format!(
                    "expected text '{}', found '{}'",
                    expected, actual
                ))),
                _ => Ok(()),
            }
        }
        Condition::ContainsText { expected } => {
            present(script, selector)?;
            match scripted {
                Some(actual) if !actual.contains(expected.as_str()) => Err(E2eError::Driver(
                    format!("expected text containing '{}', found '{}'", expected, actual),
                )),
                _ => Ok(()),
            }
        }
    }
}

#[async_trait]
impl Driver for ScriptedDriver {
    async fn perform(&mut self, action: &Action) -> E2eResult<Value> {
        let mut script = self.script.lock();
        script.performed.push(action.clone());

        match action {
            Action::Navigate { url } => {
                script.url = url.clone();
                Ok(Value::Null)
            }
            Action::Click { selector, .. }
            | Action::Fill { selector, .. }
            | Action::Select { selector, .. }
            | Action::Check { selector, .. } => {
                present(&script, selector)?;
                Ok(Value::Null)
            }
            Action::Text { selector, index, .. } => {
                present(&script, selector)?;
                script
                    .texts
                    .get(&(selector.clone(), *index))
                    .map(|text| Value::String(text.clone()))
                    .ok_or_else(|| E2eError::Driver(format!("no text scripted for {}", selector)))
            }
            Action::Count { selector } => {
                let count = match script.counts.get(selector) {
                    Some(count) => *count,
                    None if script.missing.contains(selector) => 0,
                    None => 1,
                };
                Ok(Value::from(count))
            }
            Action::Expect {
                selector,
                index,
                condition,
                ..
            } => {
                expect(&script, selector, *index, condition)?;
                Ok(Value::Null)
            }
            Action::Url => Ok(Value::String(script.url.clone())),
            Action::SetCookie { name, value, .. } => {
                script.cookies.push((name.clone(), value.clone()));
                Ok(Value::Null)
            }
            Action::Screenshot { .. } => Ok(Value::Null),
            Action::Close => {
                script.closed = true;
                Ok(Value::Null)
            }
        }
    }
}

/// Hands out clones of one scripted driver
#[derive(Clone, Default)]
pub struct ScriptedFactory {
    pub driver: ScriptedDriver,
}

#[async_trait]
impl DriverFactory for ScriptedFactory {
    async fn launch(&self) -> E2eResult<Box<dyn Driver>> {
        Ok(Box::new(self.driver.clone()))
    }
}
