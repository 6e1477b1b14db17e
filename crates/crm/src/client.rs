//! CRM Web API client

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

use ftts_common::CrmConfig;

use crate::error::{CrmError, CrmResult};
use crate::query::{parse_entity_id, ODataQuery};

/// Refresh tokens this long before they expire
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// The three request shapes the seeding helper needs
#[async_trait]
pub trait CrmApi: Send + Sync {
    /// Create a record and return its id
    async fn create(&self, entity_set: &str, body: Value) -> CrmResult<String>;

    async fn update(&self, entity_set: &str, id: &str, body: Value) -> CrmResult<()>;

    async fn retrieve_multiple(&self, entity_set: &str, query: &ODataQuery) -> CrmResult<Vec<Value>>;
}

#[async_trait]
impl<T: CrmApi + ?Sized> CrmApi for std::sync::Arc<T> {
    async fn create(&self, entity_set: &str, body: Value) -> CrmResult<String> {
        (**self).create(entity_set, body).await
    }

    async fn update(&self, entity_set: &str, id: &str, body: Value) -> CrmResult<()> {
        (**self).update(entity_set, id, body).await
    }

    async fn retrieve_multiple(&self, entity_set: &str, query: &ODataQuery) -> CrmResult<Vec<Value>> {
        (**self).retrieve_multiple(entity_set, query).await
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct CollectionResponse {
    #[serde(default)]
    value: Vec<Value>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Client-credentials authenticated Dynamics Web API client
pub struct DynamicsClient {
    config: CrmConfig,
    http_client: reqwest::Client,
    token: Mutex<Option<CachedToken>>,
}

impl DynamicsClient {
    pub fn new(config: CrmConfig) -> CrmResult<Self> {
        if !config.is_configured() {
            return Err(CrmError::NotConfigured(
                "CRM_BASE_URL, CRM_TENANT_ID, CRM_CLIENT_ID and CRM_CLIENT_SECRET are required".to_string(),
            ));
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            config,
            http_client,
            token: Mutex::new(None),
        })
    }

    /// Bearer token, fetched on first use and refreshed near expiry
    async fn access_token(&self) -> CrmResult<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() + TOKEN_EXPIRY_MARGIN < token.expires_at {
                return Ok(token.access_token.clone());
            }
        }

        debug!("Requesting CRM access token");
        let scope = self.config.scope();
        let resp = self
            .http_client
            .post(self.config.token_url())
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("scope", scope.as_str()),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(CrmError::Auth(format!("token endpoint returned {}: {}", status, body)));
        }

        let token: TokenResponse = resp.json().await?;
        let expires_at = Instant::now() + Duration::from_secs(token.expires_in.unwrap_or(3600));
        *cached = Some(CachedToken {
            access_token: token.access_token.clone(),
            expires_at,
        });
        Ok(token.access_token)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_url(), path)
    }

    async fn request(&self, method: reqwest::Method, path: &str) -> CrmResult<reqwest::RequestBuilder> {
        let token = self.access_token().await?;
        Ok(self
            .http_client
            .request(method, self.url(path))
            .bearer_auth(token)
            .header("OData-MaxVersion", "4.0")
            .header("OData-Version", "4.0")
            .header(reqwest::header::ACCEPT, "application/json"))
    }
}

async fn check(
    resp: reqwest::Response,
    operation: &'static str,
    entity_set: &str,
) -> CrmResult<reqwest::Response> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    Err(CrmError::Request {
        operation,
        entity_set: entity_set.to_string(),
        status,
        body,
    })
}

#[async_trait]
impl CrmApi for DynamicsClient {
    async fn create(&self, entity_set: &str, body: Value) -> CrmResult<String> {
        debug!(entity_set, "CRM create");
        let resp = self
            .request(reqwest::Method::POST, entity_set)
            .await?
            .json(&body)
            .send()
            .await?;
        let resp = check(resp, "create", entity_set).await?;

        resp.headers()
            .get("OData-EntityId")
            .and_then(|h| h.to_str().ok())
            .and_then(parse_entity_id)
            .ok_or_else(|| CrmError::MissingId {
                entity_set: entity_set.to_string(),
            })
    }

    async fn update(&self, entity_set: &str, id: &str, body: Value) -> CrmResult<()> {
        debug!(entity_set, id, "CRM update");
        let resp = self
            .request(reqwest::Method::PATCH, &format!("{}({})", entity_set, id))
            .await?
            .json(&body)
            .send()
            .await?;
        check(resp, "update", entity_set).await?;
        Ok(())
    }

    async fn retrieve_multiple(&self, entity_set: &str, query: &ODataQuery) -> CrmResult<Vec<Value>> {
        debug!(entity_set, filter = ?query.filter_expression(), "CRM retrieve multiple");
        let resp = self
            .request(reqwest::Method::GET, entity_set)
            .await?
            .query(&query.pairs())
            .send()
            .await?;
        let resp = check(resp, "retrieve multiple", entity_set).await?;
        let collection: CollectionResponse = resp.json().await?;
        Ok(collection.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_client_is_rejected() {
        let result = DynamicsClient::new(CrmConfig::default());
        assert!(matches!(result, Err(CrmError::NotConfigured(_))));
    }

    #[test]
    fn test_urls() {
        let client = DynamicsClient::new(CrmConfig {
            base_url: "https://org.crm11.dynamics.com/".to_string(),
            tenant_id: "tenant".to_string(),
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            client.url("ftts_bookings"),
            "https://org.crm11.dynamics.com/api/data/v9.1/ftts_bookings"
        );
    }

    #[test]
    fn test_collection_response_tolerates_missing_value() {
        let parsed: CollectionResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.value.is_empty());
    }
}
