//! Session cookie seeding
//!
//! Writes a session document straight into the app's Redis session store and
//! hands the browser the matching cookie, so a scenario can start part-way
//! through a journey. Seeding is best effort: on any failure the scenario
//! carries on through the normal UI.
//!
//! The app only accepts cookies signed with its session secret
//! (`s:<id>.<hmac>`). Without `session_store.secret` the raw id is sent,
//! which the app ignores, so scenarios then always sign in through the UI.

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use redis::AsyncCommands;
use sha2::Sha256;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use ftts_common::{SessionData, SessionStoreConfig};

use crate::error::{E2eError, E2eResult};
use crate::ui::Ui;

type HmacSha256 = Hmac<Sha256>;

/// Cookie value the session middleware accepts for `session_id`
pub fn signed_cookie_value(session_id: &str, secret: &str) -> E2eResult<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| E2eError::SessionCookie(e.to_string()))?;
    mac.update(session_id.as_bytes());
    let signature = STANDARD_NO_PAD.encode(mac.finalize().into_bytes());
    Ok(uri_encode(&format!("s:{}.{}", session_id, signature)))
}

// Only ':' '+' '/' can occur in a signed value
fn uri_encode(value: &str) -> String {
    value.replace(':', "%3A").replace('+', "%2B").replace('/', "%2F")
}

/// Session document in the shape the app's session middleware stores
pub fn session_document(data: &SessionData, ttl_secs: u64) -> E2eResult<Value> {
    Ok(json!({
        "cookie": {
            "originalMaxAge": ttl_secs * 1000,
            "httpOnly": true,
            "path": "/",
        },
        "candidate": serde_json::to_value(&data.candidate)?,
        "currentBooking": serde_json::to_value(&data.current_booking)?,
        "journey": serde_json::to_value(&data.journey)?,
        "target": serde_json::to_value(data.target)?,
        "locale": serde_json::to_value(data.locale)?,
    }))
}

pub struct SessionSeeder {
    client: redis::Client,
    config: SessionStoreConfig,
}

impl SessionSeeder {
    /// `None` when no session store is configured
    pub fn from_config(config: &SessionStoreConfig) -> E2eResult<Option<Self>> {
        let Some(url) = config.redis_url.as_deref() else {
            debug!("No session store configured, cookie seeding disabled");
            return Ok(None);
        };
        let client = redis::Client::open(url)?;
        if config.secret.is_none() {
            warn!("No session secret configured; seeded cookies are unsigned and will be ignored by the app");
        }
        info!(url = %url, "Session seeding enabled");
        Ok(Some(Self {
            client,
            config: config.clone(),
        }))
    }

    pub fn key(&self, session_id: &str) -> String {
        format!("{}{}", self.config.key_prefix, session_id)
    }

    pub fn cookie_value(&self, session_id: &str) -> E2eResult<String> {
        match &self.config.secret {
            Some(secret) => signed_cookie_value(session_id, secret),
            None => Ok(session_id.to_string()),
        }
    }

    /// Store a session for `data`, returning its id
    pub async fn store(&self, data: &SessionData) -> E2eResult<String> {
        let session_id = Uuid::new_v4().simple().to_string();
        let document = session_document(data, self.config.ttl_secs)?;
        let key = self.key(&session_id);

        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set_ex::<_, _, ()>(&key, document.to_string(), self.config.ttl_secs)
            .await?;
        debug!(key = %key, ttl_secs = self.config.ttl_secs, "Stored session");
        Ok(session_id)
    }

    /// Store a session and give the browser its cookie. Returns whether the
    /// browser now carries a seeded session.
    pub async fn seed(&self, ui: &mut Ui, data: &SessionData) -> bool {
        let session_id = match self.store(data).await {
            Ok(id) => id,
            Err(e) => {
                warn!("Session seeding failed, continuing through the UI: {}", e);
                return false;
            }
        };
        let value = match self.cookie_value(&session_id) {
            Ok(value) => value,
            Err(e) => {
                warn!("Session cookie not signed, continuing through the UI: {}", e);
                return false;
            }
        };
        match ui.set_cookie(&self.config.cookie_name, &value).await {
            Ok(()) => {
                info!(cookie = %self.config.cookie_name, "Session cookie seeded");
                true
            }
            Err(e) => {
                warn!("Session cookie not set, continuing through the UI: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::ScriptedDriver;
    use ftts_common::{SuiteConfig, Target};

    fn store_config(redis_url: Option<&str>) -> SessionStoreConfig {
        SessionStoreConfig {
            redis_url: redis_url.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_document_carries_journey_state() {
        let data = SessionData::new(Target::Gb);
        let document = session_document(&data, 1800).unwrap();

        assert_eq!(document["cookie"]["originalMaxAge"], 1_800_000);
        assert_eq!(document["candidate"]["email"], data.candidate.email.as_str());
        assert!(document["currentBooking"].is_object());
        assert!(document["journey"].is_object());
    }

    #[test]
    fn test_disabled_without_url() {
        assert!(SessionSeeder::from_config(&store_config(None)).unwrap().is_none());
    }

    #[test]
    fn test_key_uses_prefix() {
        let seeder = SessionSeeder::from_config(&store_config(Some("redis://127.0.0.1:6379")))
            .unwrap()
            .unwrap();
        assert_eq!(seeder.key("abc"), "sess:abc");
    }

    #[test]
    fn test_cookie_signed_like_express_session() {
        assert_eq!(
            signed_cookie_value("0f3c9a1e", "keyboard cat").unwrap(),
            "s%3A0f3c9a1e.AKyRNQmSNyTen6NQAofSbRZS5mMtcRNPmAss1drF8zU"
        );
        assert_eq!(
            signed_cookie_value("sess00", "keyboard cat").unwrap(),
            "s%3Asess00.aQtkK%2BJeGuN%2F%2BvEkSwe3F%2Bg5CPrTpgYylPdCd6u%2BSZ4"
        );
    }

    #[test]
    fn test_cookie_unsigned_without_secret() {
        let mut config = store_config(Some("redis://127.0.0.1:6379"));
        let seeder = SessionSeeder::from_config(&config).unwrap().unwrap();
        assert_eq!(seeder.cookie_value("abc").unwrap(), "abc");

        config.secret = Some("keyboard cat".to_string());
        let seeder = SessionSeeder::from_config(&config).unwrap().unwrap();
        assert!(seeder.cookie_value("abc").unwrap().starts_with("s%3Aabc."));
    }

    #[test]
    fn test_rejects_malformed_url() {
        assert!(SessionSeeder::from_config(&store_config(Some("not a url"))).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_store_falls_back_to_ui() {
        let seeder = SessionSeeder::from_config(&store_config(Some("redis://127.0.0.1:1")))
            .unwrap()
            .unwrap();
        let driver = ScriptedDriver::new();
        let mut ui = Ui::new(Box::new(driver.clone()), &SuiteConfig::default());

        let seeded = seeder.seed(&mut ui, &SessionData::new(Target::Gb)).await;

        assert!(!seeded);
        assert!(driver.cookies().is_empty());
    }
}
