//! Suite configuration
//!
//! Loaded from an optional TOML file and then overlaid with the environment
//! variables the CI pipeline sets.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::error::{Error, Result};

/// Upper bound for any single UI wait
pub const MAX_TIMEOUT_MS: u64 = 60_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Root URL of the booking app under test
    pub booking_app_url: String,

    /// Run with a visible browser on a developer machine
    pub run_tests_locally: bool,

    /// Default wait for element assertions
    pub default_timeout_ms: u64,

    /// Wait used for slow pages such as booking confirmation
    pub long_timeout_ms: u64,

    pub browser: BrowserConfig,
    pub crm: CrmConfig,
    pub session_store: SessionStoreConfig,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            booking_app_url: "http://localhost:3000".to_string(),
            run_tests_locally: false,
            default_timeout_ms: 5_000,
            long_timeout_ms: MAX_TIMEOUT_MS,
            browser: BrowserConfig::default(),
            crm: CrmConfig::default(),
            session_store: SessionStoreConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// chromium, firefox or webkit
    pub name: String,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub screenshot_dir: String,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            name: "chromium".to_string(),
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            screenshot_dir: "test-results/screenshots".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrmConfig {
    /// Organisation URL, e.g. `https://org.crm11.dynamics.com`
    pub base_url: String,
    pub api_version: String,
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    /// Token endpoint override; defaults to the Azure AD v2 endpoint for the tenant
    pub token_url: Option<String>,
}

impl Default for CrmConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_version: "9.1".to_string(),
            tenant_id: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            token_url: None,
        }
    }
}

impl CrmConfig {
    /// Web API root, e.g. `https://org.crm11.dynamics.com/api/data/v9.1`
    pub fn api_url(&self) -> String {
        format!(
            "{}/api/data/v{}",
            self.base_url.trim_end_matches('/'),
            self.api_version
        )
    }

    pub fn token_url(&self) -> String {
        self.token_url.clone().unwrap_or_else(|| {
            format!(
                "https://login.microsoftonline.com/{}/oauth2/v2.0/token",
                self.tenant_id
            )
        })
    }

    /// OAuth scope covering the organisation's Web API
    pub fn scope(&self) -> String {
        format!("{}/.default", self.base_url.trim_end_matches('/'))
    }

    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty()
            && !self.tenant_id.is_empty()
            && !self.client_id.is_empty()
            && !self.client_secret.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionStoreConfig {
    /// Redis backing the app's session store; `None` disables seeding
    pub redis_url: Option<String>,
    pub cookie_name: String,
    pub key_prefix: String,
    pub ttl_secs: u64,
    /// The app's session secret; cookies are sent unsigned without it
    pub secret: Option<String>,
}

impl Default for SessionStoreConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            cookie_name: "session".to_string(),
            key_prefix: "sess:".to_string(),
            ttl_secs: 1800,
            secret: None,
        }
    }
}

impl SuiteConfig {
    /// Load configuration from file, falling back to defaults when absent
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            Ok(config)
        } else {
            debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Overlay values from the process environment
    pub fn apply_env(self) -> Result<Self> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    /// Overlay values from any variable source
    pub fn apply_vars<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("BOOKING_APP_URL") {
            self.booking_app_url = url;
        }
        if let Some(local) = lookup("RUN_TESTS_LOCALLY") {
            self.run_tests_locally = parse_flag("RUN_TESTS_LOCALLY", &local)?;
        }
        if let Some(url) = lookup("CRM_BASE_URL") {
            self.crm.base_url = url;
        }
        if let Some(tenant) = lookup("CRM_TENANT_ID") {
            self.crm.tenant_id = tenant;
        }
        if let Some(client) = lookup("CRM_CLIENT_ID") {
            self.crm.client_id = client;
        }
        if let Some(secret) = lookup("CRM_CLIENT_SECRET") {
            self.crm.client_secret = secret;
        }
        if let Some(url) = lookup("REDIS_URL") {
            self.session_store.redis_url = Some(url);
        }
        if let Some(secret) = lookup("SESSION_SECRET") {
            self.session_store.secret = Some(secret);
        }

        if self.run_tests_locally {
            self.browser.headless = false;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.booking_app_url.starts_with("http://") && !self.booking_app_url.starts_with("https://") {
            return Err(Error::InvalidConfig(format!(
                "booking_app_url must be an http(s) URL, got '{}'",
                self.booking_app_url
            )));
        }
        if self.default_timeout_ms == 0 {
            return Err(Error::InvalidConfig("default_timeout_ms must be positive".to_string()));
        }
        Ok(())
    }

    /// App URL for a path such as `manage-booking/login`
    pub fn app_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.booking_app_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn default_timeout_ms(&self) -> u64 {
        clamp_timeout(self.default_timeout_ms)
    }

    pub fn long_timeout_ms(&self) -> u64 {
        clamp_timeout(self.long_timeout_ms)
    }
}

/// Limit a wait to the suite maximum
pub fn clamp_timeout(timeout_ms: u64) -> u64 {
    timeout_ms.min(MAX_TIMEOUT_MS)
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        other => Err(Error::InvalidConfig(format!("{name} must be a boolean, got '{other}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = SuiteConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.default_timeout_ms, 5_000);
        assert!(config.browser.headless);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/suite.toml");
        let mut config = SuiteConfig::default();
        config.booking_app_url = "https://booking.test".to_string();
        config.crm.base_url = "https://org.crm11.dynamics.com".to_string();
        config.save(&path).unwrap();

        let loaded = SuiteConfig::load(&path).unwrap();
        assert_eq!(loaded.booking_app_url, "https://booking.test");
        assert_eq!(loaded.crm.api_url(), "https://org.crm11.dynamics.com/api/data/v9.1");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("suite.toml");
        std::fs::write(&path, "default_timeout_ms = 8000\n[crm]\ntenant_id = \"t\"\n").unwrap();
        let config = SuiteConfig::load(&path).unwrap();
        assert_eq!(config.default_timeout_ms, 8000);
        assert_eq!(config.crm.tenant_id, "t");
        assert_eq!(config.crm.api_version, "9.1");
    }

    #[test]
    fn test_env_overlay() {
        let env = vars(&[
            ("BOOKING_APP_URL", "https://book.example.gov"),
            ("RUN_TESTS_LOCALLY", "true"),
            ("CRM_TENANT_ID", "tenant"),
            ("REDIS_URL", "redis://localhost:6379"),
            ("SESSION_SECRET", "keyboard cat"),
        ]);
        let config = SuiteConfig::default()
            .apply_vars(|k| env.get(k).cloned())
            .unwrap();
        assert_eq!(config.app_url("/manage-booking/login"), "https://book.example.gov/manage-booking/login");
        assert!(config.run_tests_locally);
        assert!(!config.browser.headless);
        assert_eq!(config.crm.token_url(), "https://login.microsoftonline.com/tenant/oauth2/v2.0/token");
        assert_eq!(config.session_store.redis_url.as_deref(), Some("redis://localhost:6379"));
        assert_eq!(config.session_store.secret.as_deref(), Some("keyboard cat"));
    }

    #[test]
    fn test_env_overlay_rejects_bad_values() {
        let env = vars(&[("RUN_TESTS_LOCALLY", "maybe")]);
        assert!(SuiteConfig::default().apply_vars(|k| env.get(k).cloned()).is_err());

        let env = vars(&[("BOOKING_APP_URL", "booking.local")]);
        assert!(SuiteConfig::default().apply_vars(|k| env.get(k).cloned()).is_err());
    }

    #[test]
    fn test_timeouts_are_clamped() {
        let mut config = SuiteConfig::default();
        config.long_timeout_ms = 120_000;
        assert_eq!(config.long_timeout_ms(), MAX_TIMEOUT_MS);
        assert_eq!(clamp_timeout(10_000), 10_000);
    }
}
