use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::config::DEFAULT_CURSOR_KEY;
use crate::cursor::Cursor;
use crate::error::Result;
use crate::params::RequestParams;

/// One page as returned by the query layer. A present `next_cursor` is the only signal that
/// more pages exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResultPage<T> {
    pub items: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<Cursor>,
}

impl<T> QueryResultPage<T> {
    pub fn has_next_page(&self) -> bool {
        self.next_cursor.as_ref().is_some_and(Cursor::is_present)
    }
}

/// The query layer: turns request parameters into a page of results.
pub trait PageSource {
    type Item;

    fn fetch(&self, params: &RequestParams) -> Result<QueryResultPage<Self::Item>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureRecord {
    pub id: u64,
    pub status: String,
}

const FIXTURE_STATUSES: [&str; 3] = ["active", "pending", "closed"];

/// A forward-only backend over in-memory records, ordered by id, that pages like a
/// DynamoDB scan: the continuation token is `{"id": <last id returned>}`.
#[derive(Debug, Clone)]
pub struct FixtureSource {
    records: Vec<FixtureRecord>,
    cursor_key: String,
    status_key: String,
}

impl FixtureSource {
    pub fn new(count: u64) -> Self {
        let records = (1..=count)
            .map(|id| FixtureRecord {
                id,
                status: FIXTURE_STATUSES[(id as usize - 1) % FIXTURE_STATUSES.len()].to_string(),
            })
            .collect();
        Self {
            records,
            cursor_key: DEFAULT_CURSOR_KEY.to_string(),
            status_key: "status".to_string(),
        }
    }

    pub fn with_cursor_key(mut self, cursor_key: &str) -> Self {
        self.cursor_key = cursor_key.to_string();
        self
    }

    fn start_after(&self, params: &RequestParams) -> u64 {
        params
            .get_str(&self.cursor_key)
            .map(Cursor::from_token)
            .and_then(|cursor| cursor.as_value().get("id").and_then(|id| id.as_u64()))
            .unwrap_or(0)
    }
}

impl PageSource for FixtureSource {
    type Item = FixtureRecord;

    fn fetch(&self, params: &RequestParams) -> Result<QueryResultPage<FixtureRecord>> {
        let status = params.get_str(&self.status_key);
        let start_after = self.start_after(params);
        let mut matching = self
            .records
            .iter()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .filter(|r| r.id > start_after)
            .peekable();

        let mut items = Vec::new();
        while items.len() < params.page_size as usize {
            match matching.next() {
                Some(record) => items.push(record.clone()),
                None => break,
            }
        }
        let next_cursor = match (items.last(), matching.peek()) {
            (Some(last), Some(_)) => Some(Cursor::new(json!({ "id": last.id }))),
            _ => None,
        };
        debug!(start_after, returned = items.len(), more = next_cursor.is_some(), "fixture scan");

        Ok(QueryResultPage {
            items,
            total: None,
            next_cursor,
        })
    }
}
