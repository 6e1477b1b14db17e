//! Interaction and assertion primitives
//!
//! [`Ui`] is the only thing page objects talk to. Each primitive is one
//! driver action with a bounded wait; any failure surfaces as
//! [`E2eError::Assertion`] naming the selector, index and wait.

use serde_json::Value;
use std::path::PathBuf;
use tracing::{debug, warn};

use ftts_common::config::clamp_timeout;
use ftts_common::{SessionData, SuiteConfig};

use crate::action::{Action, Condition};
use crate::driver::Driver;
use crate::error::{E2eError, E2eResult};
use crate::graph::Page;
use ftts_common::Locale;

pub struct Ui {
    driver: Box<dyn Driver>,
    base_url: String,
    default_timeout_ms: u64,
    long_timeout_ms: u64,
    screenshot_dir: PathBuf,
}

impl Ui {
    pub fn new(driver: Box<dyn Driver>, config: &SuiteConfig) -> Self {
        Self {
            driver,
            base_url: config.booking_app_url.trim_end_matches('/').to_string(),
            default_timeout_ms: config.default_timeout_ms(),
            long_timeout_ms: config.long_timeout_ms(),
            screenshot_dir: PathBuf::from(&config.browser.screenshot_dir),
        }
    }

    pub fn default_timeout_ms(&self) -> u64 {
        self.default_timeout_ms
    }

    /// Wait used for slow screens such as payment and change confirmation
    pub fn long_timeout_ms(&self) -> u64 {
        self.long_timeout_ms
    }

    pub fn app_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn run(&mut self, action: Action) -> E2eResult<Value> {
        debug!(step = %action.name(), "UI action");
        match self.driver.perform(&action).await {
            Ok(value) => Ok(value),
            Err(E2eError::Driver(reason)) => match action.target() {
                Some((selector, index, timeout_ms)) => Err(E2eError::Assertion {
                    selector: selector.to_string(),
                    index,
                    timeout_ms,
                    reason,
                }),
                None => Err(E2eError::Driver(reason)),
            },
            Err(e) => Err(e),
        }
    }

    // Navigation

    pub async fn navigate(&mut self, url: &str) -> E2eResult<()> {
        self.run(Action::Navigate { url: url.to_string() }).await?;
        Ok(())
    }

    /// Navigate to an app path, carrying the fixture's target and locale when given
    pub async fn navigate_path(&mut self, path: &str, data: Option<&SessionData>) -> E2eResult<()> {
        let mut url = self.app_url(path);
        if let Some(data) = data {
            url.push_str(&data.query_string());
        }
        self.navigate(&url).await
    }

    pub async fn current_url(&mut self) -> E2eResult<String> {
        let value = self.run(Action::Url).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    pub async fn set_cookie(&mut self, name: &str, value: &str) -> E2eResult<()> {
        let url = self.app_url("");
        self.run(Action::SetCookie {
            name: name.to_string(),
            value: value.to_string(),
            url,
        })
        .await?;
        Ok(())
    }

    /// Full-page screenshot under the configured screenshot directory
    pub async fn screenshot(&mut self, name: &str) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.screenshot_dir)?;
        let path = self.screenshot_dir.join(format!("{}.png", name));
        self.run(Action::Screenshot {
            path: path.to_string_lossy().to_string(),
        })
        .await?;
        Ok(path)
    }

    pub async fn close(&mut self) -> E2eResult<()> {
        self.driver.close().await
    }

    // Interactions

    pub async fn click(&mut self, selector: &str) -> E2eResult<()> {
        self.click_nth(selector, 0).await
    }

    pub async fn click_nth(&mut self, selector: &str, index: usize) -> E2eResult<()> {
        self.click_with_timeout(selector, index, self.default_timeout_ms).await
    }

    pub async fn click_with_timeout(&mut self, selector: &str, index: usize, timeout_ms: u64) -> E2eResult<()> {
        self.run(Action::Click {
            selector: selector.to_string(),
            index,
            timeout_ms: clamp_timeout(timeout_ms),
        })
        .await?;
        Ok(())
    }

    pub async fn type_text(&mut self, selector: &str, value: &str) -> E2eResult<()> {
        self.type_text_with_timeout(selector, value, self.default_timeout_ms).await
    }

    pub async fn type_text_with_timeout(&mut self, selector: &str, value: &str, timeout_ms: u64) -> E2eResult<()> {
        self.run(Action::Fill {
            selector: selector.to_string(),
            index: 0,
            value: value.to_string(),
            timeout_ms: clamp_timeout(timeout_ms),
        })
        .await?;
        Ok(())
    }

    pub async fn select_option(&mut self, selector: &str, value: &str) -> E2eResult<()> {
        self.select_option_with_timeout(selector, value, self.default_timeout_ms).await
    }

    pub async fn select_option_with_timeout(&mut self, selector: &str, value: &str, timeout_ms: u64) -> E2eResult<()> {
        self.run(Action::Select {
            selector: selector.to_string(),
            index: 0,
            value: value.to_string(),
            timeout_ms: clamp_timeout(timeout_ms),
        })
        .await?;
        Ok(())
    }

    /// Tick a radio button or checkbox
    pub async fn check(&mut self, selector: &str) -> E2eResult<()> {
        self.check_with_timeout(selector, self.default_timeout_ms).await
    }

    pub async fn check_with_timeout(&mut self, selector: &str, timeout_ms: u64) -> E2eResult<()> {
        self.run(Action::Check {
            selector: selector.to_string(),
            index: 0,
            timeout_ms: clamp_timeout(timeout_ms),
        })
        .await?;
        Ok(())
    }

    // Reads

    pub async fn get_text(&mut self, selector: &str, index: usize) -> E2eResult<String> {
        self.get_text_with_timeout(selector, index, self.default_timeout_ms).await
    }

    pub async fn get_text_with_timeout(&mut self, selector: &str, index: usize, timeout_ms: u64) -> E2eResult<String> {
        let value = self
            .run(Action::Text {
                selector: selector.to_string(),
                index,
                timeout_ms: clamp_timeout(timeout_ms),
            })
            .await?;
        Ok(value.as_str().unwrap_or_default().trim().to_string())
    }

    pub async fn count(&mut self, selector: &str) -> E2eResult<usize> {
        let value = self
            .run(Action::Count {
                selector: selector.to_string(),
            })
            .await?;
        Ok(value.as_u64().unwrap_or(0) as usize)
    }

    // Assertions

    async fn expect(&mut self, selector: &str, index: usize, condition: Condition, timeout_ms: u64) -> E2eResult<()> {
        self.run(Action::Expect {
            selector: selector.to_string(),
            index,
            condition,
            timeout_ms: clamp_timeout(timeout_ms),
        })
        .await?;
        Ok(())
    }

    /// Whole trimmed text of the first match equals `expected`
    pub async fn verify_text(&mut self, selector: &str, expected: &str) -> E2eResult<()> {
        self.verify_text_with_timeout(selector, 0, expected, self.default_timeout_ms).await
    }

    pub async fn verify_text_nth(&mut self, selector: &str, index: usize, expected: &str) -> E2eResult<()> {
        self.verify_text_with_timeout(selector, index, expected, self.default_timeout_ms).await
    }

    pub async fn verify_text_with_timeout(
        &mut self,
        selector: &str,
        index: usize,
        expected: &str,
        timeout_ms: u64,
    ) -> E2eResult<()> {
        let condition = Condition::Text {
            expected: expected.to_string(),
        };
        self.expect(selector, index, condition, timeout_ms).await
    }

    pub async fn verify_contains(&mut self, selector: &str, expected: &str) -> E2eResult<()> {
        self.verify_contains_with_timeout(selector, 0, expected, self.default_timeout_ms).await
    }

    pub async fn verify_contains_with_timeout(
        &mut self,
        selector: &str,
        index: usize,
        expected: &str,
        timeout_ms: u64,
    ) -> E2eResult<()> {
        let condition = Condition::ContainsText {
            expected: expected.to_string(),
        };
        self.expect(selector, index, condition, timeout_ms).await
    }

    pub async fn verify_visible(&mut self, selector: &str) -> E2eResult<()> {
        self.verify_visible_with_timeout(selector, 0, self.default_timeout_ms).await
    }

    pub async fn verify_visible_with_timeout(&mut self, selector: &str, index: usize, timeout_ms: u64) -> E2eResult<()> {
        self.expect(selector, index, Condition::Visible, timeout_ms).await
    }

    pub async fn verify_hidden(&mut self, selector: &str) -> E2eResult<()> {
        self.verify_hidden_with_timeout(selector, 0, self.default_timeout_ms).await
    }

    pub async fn verify_hidden_with_timeout(&mut self, selector: &str, index: usize, timeout_ms: u64) -> E2eResult<()> {
        self.expect(selector, index, Condition::Hidden, timeout_ms).await
    }

    // Pages

    /// Confirm the browser is on `P` and return its page object
    pub async fn arrive<P: Page>(&mut self, locale: Locale) -> E2eResult<P> {
        let timeout_ms = self.default_timeout_ms;
        self.arrive_within(locale, timeout_ms).await
    }

    /// As [`Ui::arrive`] with the long wait
    pub async fn arrive_slow<P: Page>(&mut self, locale: Locale) -> E2eResult<P> {
        let timeout_ms = self.long_timeout_ms;
        self.arrive_within(locale, timeout_ms).await
    }

    async fn arrive_within<P: Page>(&mut self, locale: Locale, timeout_ms: u64) -> E2eResult<P> {
        self.verify_visible_with_timeout(P::HEADING, 0, timeout_ms).await?;
        let page = P::at(locale);
        page.verify_loaded(self).await?;
        debug!(page = ?P::ID, "On page");
        Ok(page)
    }

    /// Load `P` directly by URL
    pub async fn open<P: Page>(&mut self, data: &SessionData) -> E2eResult<P> {
        self.navigate_path(P::PATH, Some(data)).await?;
        self.arrive(data.locale).await
    }

    /// Screenshot that never fails the caller
    pub async fn capture_failure(&mut self, name: &str) {
        if let Err(e) = self.screenshot(name).await {
            warn!("Failure screenshot '{}' not taken: {}", name, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::ScriptedDriver;

    fn ui(driver: &ScriptedDriver) -> Ui {
        let config = SuiteConfig {
            booking_app_url: "https://booking.test/".to_string(),
            default_timeout_ms: 5_000,
            long_timeout_ms: 120_000,
            ..Default::default()
        };
        Ui::new(Box::new(driver.clone()), &config)
    }

    #[tokio::test]
    async fn test_failures_become_assertions() {
        let driver = ScriptedDriver::new().with_text_at(".govuk-summary-list__value", 2, "Car");
        let mut ui = ui(&driver);

        let err = ui
            .verify_text_nth(".govuk-summary-list__value", 2, "Motorcycle")
            .await
            .unwrap_err();
        match err {
            E2eError::Assertion {
                selector,
                index,
                timeout_ms,
                reason,
            } => {
                assert_eq!(selector, ".govuk-summary-list__value");
                assert_eq!(index, 2);
                assert_eq!(timeout_ms, 5_000);
                assert!(reason.contains("Car"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_waits_are_clamped() {
        let driver = ScriptedDriver::new();
        let mut ui = ui(&driver);
        assert_eq!(ui.long_timeout_ms(), 60_000);

        ui.click_with_timeout("#continue", 0, 600_000).await.unwrap();
        assert_eq!(
            driver.performed()[0],
            Action::Click {
                selector: "#continue".to_string(),
                index: 0,
                timeout_ms: 60_000,
            }
        );
    }

    #[tokio::test]
    async fn test_navigate_path_carries_query() {
        let driver = ScriptedDriver::new();
        let mut ui = ui(&driver);
        let data = SessionData::new(ftts_common::Target::Ni);

        ui.navigate_path("/manage-booking/login", Some(&data)).await.unwrap();
        assert_eq!(
            ui.current_url().await.unwrap(),
            "https://booking.test/manage-booking/login?target=ni&lang=en"
        );
    }

    #[tokio::test]
    async fn test_get_text_and_count() {
        let driver = ScriptedDriver::new()
            .with_text("#booking-reference", " B-000-123-456 ")
            .with_count(".centre-result", 3);
        let mut ui = ui(&driver);
        assert_eq!(ui.get_text("#booking-reference", 0).await.unwrap(), "B-000-123-456");
        assert_eq!(ui.count(".centre-result").await.unwrap(), 3);
    }
}
