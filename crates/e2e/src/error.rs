//! Error types for the browser suite

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Playwright not found. Install with: npm install @playwright/test && npx playwright install")]
    PlaywrightNotFound,

    #[error("Playwright error: {0}")]
    Playwright(String),

    /// The driver could not carry out an action; mapped to [`E2eError::Assertion`] by the UI layer
    #[error("Driver error: {0}")]
    Driver(String),

    #[error("Assertion failed on '{selector}'[{index}] within {timeout_ms} ms: {reason}")]
    Assertion {
        selector: String,
        index: usize,
        timeout_ms: u64,
        reason: String,
    },

    #[error("Unexpected page content: {0}")]
    Content(String),

    #[error("Fixture cannot take this journey: {0}")]
    Journey(String),

    #[error("App not reachable at {url} after {attempts} attempts")]
    AppUnreachable { url: String, attempts: usize },

    #[error("Scenario not found: {0}")]
    ScenarioNotFound(String),

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("CRM error: {0}")]
    Crm(#[from] ftts_crm::CrmError),

    #[error("Fixture error: {0}")]
    Fixture(#[from] ftts_common::Error),

    #[error("Session store error: {0}")]
    SessionStore(#[from] redis::RedisError),

    #[error("Session cookie error: {0}")]
    SessionCookie(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type E2eResult<T> = Result<T, E2eError>;
