//! Error types for CRM calls

use thiserror::Error;

pub type CrmResult<T> = Result<T, CrmError>;

#[derive(Error, Debug)]
pub enum CrmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CRM is not configured: {0}")]
    NotConfigured(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("CRM {operation} on {entity_set} failed with status {status}: {body}")]
    Request {
        operation: &'static str,
        entity_set: String,
        status: u16,
        body: String,
    },

    #[error("CRM response for {entity_set} carried no record id")]
    MissingId { entity_set: String },

    #[error("No {entity_set} record matches {filter}")]
    NotFound { entity_set: String, filter: String },

    #[error("Seeding step '{step}' failed ({ids}): {source}")]
    Seed {
        step: &'static str,
        ids: String,
        #[source]
        source: Box<CrmError>,
    },
}
