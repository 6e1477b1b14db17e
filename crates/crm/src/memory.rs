//! In-memory CRM used by unit and integration tests

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

use crate::client::CrmApi;
use crate::error::{CrmError, CrmResult};
use crate::query::ODataQuery;

/// One request the fake received
#[derive(Debug, Clone, PartialEq)]
pub enum CrmRequest {
    Create { entity_set: String, body: Value },
    Update { entity_set: String, id: String, body: Value },
    RetrieveMultiple { entity_set: String, filter: Option<String> },
}

impl CrmRequest {
    pub fn entity_set(&self) -> &str {
        match self {
            CrmRequest::Create { entity_set, .. }
            | CrmRequest::Update { entity_set, .. }
            | CrmRequest::RetrieveMultiple { entity_set, .. } => entity_set,
        }
    }
}

#[derive(Default)]
struct State {
    records: HashMap<String, Vec<(String, Map<String, Value>)>>,
    requests: Vec<CrmRequest>,
    failing: HashSet<(&'static str, String)>,
    next_id: u64,
}

/// Records requests and stores created records so lookups see them.
///
/// Filters support `field eq 'value'` clauses joined with `and`.
#[derive(Default)]
pub struct InMemoryCrm {
    state: Mutex<State>,
}

impl InMemoryCrm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preload a record, returning its id
    pub fn insert(&self, entity_set: &str, record: Value) -> String {
        let mut state = self.state.lock();
        state.next_id += 1;
        let id = format!("{:08x}-0000-0000-0000-000000000000", state.next_id);
        let fields = match record {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        state
            .records
            .entry(entity_set.to_string())
            .or_default()
            .push((id.clone(), fields));
        id
    }

    /// Make every `operation` (`create`, `update`, `retrieve`) on `entity_set` fail
    pub fn fail_on(&self, operation: &'static str, entity_set: &str) {
        self.state.lock().failing.insert((operation, entity_set.to_string()));
    }

    pub fn requests(&self) -> Vec<CrmRequest> {
        self.state.lock().requests.clone()
    }

    pub fn record(&self, entity_set: &str, id: &str) -> Option<Value> {
        let state = self.state.lock();
        state
            .records
            .get(entity_set)?
            .iter()
            .find(|(record_id, _)| record_id == id)
            .map(|(_, fields)| Value::Object(fields.clone()))
    }

    pub fn count(&self, entity_set: &str) -> usize {
        self.state.lock().records.get(entity_set).map_or(0, Vec::len)
    }

    fn check_failure(state: &State, operation: &'static str, entity_set: &str) -> CrmResult<()> {
        if state.failing.contains(&(operation, entity_set.to_string())) {
            return Err(CrmError::Request {
                operation,
                entity_set: entity_set.to_string(),
                status: 500,
                body: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_filter(filter: &str) -> Vec<(String, String)> {
    filter
        .split(" and ")
        .filter_map(|clause| {
            let (field, value) = clause.split_once(" eq ")?;
            let value = value.trim().trim_matches('\'').replace("''", "'");
            Some((field.trim().to_string(), value))
        })
        .collect()
}

fn matches(fields: &Map<String, Value>, clauses: &[(String, String)]) -> bool {
    clauses.iter().all(|(field, expected)| match fields.get(field) {
        Some(Value::String(s)) => s == expected,
        Some(other) => other.to_string() == *expected,
        None => false,
    })
}

#[async_trait]
impl CrmApi for InMemoryCrm {
    async fn create(&self, entity_set: &str, body: Value) -> CrmResult<String> {
        {
            let mut state = self.state.lock();
            state.requests.push(CrmRequest::Create {
                entity_set: entity_set.to_string(),
                body: body.clone(),
            });
            Self::check_failure(&state, "create", entity_set)?;
        }
        Ok(self.insert(entity_set, body))
    }

    async fn update(&self, entity_set: &str, id: &str, body: Value) -> CrmResult<()> {
        let mut state = self.state.lock();
        state.requests.push(CrmRequest::Update {
            entity_set: entity_set.to_string(),
            id: id.to_string(),
            body: body.clone(),
        });
        Self::check_failure(&state, "update", entity_set)?;

        let record = state
            .records
            .get_mut(entity_set)
            .and_then(|records| records.iter_mut().find(|(record_id, _)| record_id == id))
            .ok_or_else(|| CrmError::Request {
                operation: "update",
                entity_set: entity_set.to_string(),
                status: 404,
                body: format!("no record {}", id),
            })?;
        if let Value::Object(changes) = body {
            record.1.extend(changes);
        }
        Ok(())
    }

    async fn retrieve_multiple(&self, entity_set: &str, query: &ODataQuery) -> CrmResult<Vec<Value>> {
        let mut state = self.state.lock();
        state.requests.push(CrmRequest::RetrieveMultiple {
            entity_set: entity_set.to_string(),
            filter: query.filter_expression().map(String::from),
        });
        Self::check_failure(&state, "retrieve", entity_set)?;

        let clauses = query.filter_expression().map(parse_filter).unwrap_or_default();
        let id_field = format!("{}id", entity_set.trim_end_matches('s'));
        Ok(state
            .records
            .get(entity_set)
            .map(|records| {
                records
                    .iter()
                    .filter(|(_, fields)| matches(fields, &clauses))
                    .map(|(id, fields)| {
                        let mut fields = fields.clone();
                        fields.insert(id_field.clone(), Value::String(id.clone()));
                        Value::Object(fields)
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_then_retrieve_by_filter() {
        let crm = InMemoryCrm::new();
        crm.create("ftts_bookings", json!({"ftts_reference": "B-000-000-001"})).await.unwrap();
        let id = crm
            .create("ftts_bookings", json!({"ftts_reference": "B-000-000-002"}))
            .await
            .unwrap();

        let found = crm
            .retrieve_multiple(
                "ftts_bookings",
                &ODataQuery::new().filter_eq("ftts_reference", "B-000-000-002"),
            )
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["ftts_bookingid"], json!(id));
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let crm = InMemoryCrm::new();
        let id = crm.insert("contacts", json!({"firstname": "Ava", "lastname": "Jones"}));
        crm.update("contacts", &id, json!({"lastname": "Evans"})).await.unwrap();
        let record = crm.record("contacts", &id).unwrap();
        assert_eq!(record["firstname"], "Ava");
        assert_eq!(record["lastname"], "Evans");
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let crm = InMemoryCrm::new();
        crm.fail_on("create", "contacts");
        assert!(crm.create("contacts", json!({})).await.is_err());
        assert_eq!(crm.requests().len(), 1);
        assert_eq!(crm.count("contacts"), 0);
    }

    #[test]
    fn test_parse_filter_handles_quotes() {
        assert_eq!(
            parse_filter("lastname eq 'O''Neill' and statecode eq 0"),
            vec![
                ("lastname".to_string(), "O'Neill".to_string()),
                ("statecode".to_string(), "0".to_string()),
            ]
        );
    }
}
