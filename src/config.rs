use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const PAGE_KEY: &str = "page";
pub const PAGE_SIZE_KEY: &str = "pageSize";
pub const START_DAY_KEY: &str = "start_day";
pub const END_DAY_KEY: &str = "end_day";
pub const DEFAULT_CURSOR_KEY: &str = "lastEvaluatedKey";

/// URL keys holding the start and end of the date filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateRangeKeys {
    pub start: String,
    pub end: String,
}

impl Default for DateRangeKeys {
    fn default() -> Self {
        Self {
            start: START_DAY_KEY.to_string(),
            end: END_DAY_KEY.to_string(),
        }
    }
}

impl DateRangeKeys {
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        [&self.start, &self.end].into_iter()
    }
}

/// Defaults applied when deriving backend request parameters from the URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BuildOptions {
    /// When non-zero, requests always carry a date window reaching this many months back.
    pub default_lookback_months: u32,
    pub default_page_size: u32,
    /// URL key whose value is sent as the free-text `query`.
    pub primary_search_key: String,
    pub date_range_keys: DateRangeKeys,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            default_lookback_months: 0,
            default_page_size: 10,
            primary_search_key: "search".to_string(),
            date_range_keys: DateRangeKeys::default(),
        }
    }
}

/// Configuration of one logical table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableConfig {
    /// Must be unique among the tables sharing a cursor store.
    pub storage_key: String,
    pub cursor_key: String,
    pub filter_keys: Vec<String>,
    pub sort_field_key: String,
    pub sort_order_key: String,
    pub build: BuildOptions,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            storage_key: "table".to_string(),
            cursor_key: DEFAULT_CURSOR_KEY.to_string(),
            filter_keys: Vec::new(),
            sort_field_key: "sortField".to_string(),
            sort_order_key: "sortOrder".to_string(),
            build: BuildOptions::default(),
        }
    }
}

impl TableConfig {
    pub fn new(storage_key: &str) -> Self {
        Self {
            storage_key: storage_key.to_string(),
            ..Self::default()
        }
    }

    pub fn with_filter_keys(mut self, keys: &[&str]) -> Self {
        self.filter_keys = keys.iter().map(|k| k.to_string()).collect();
        self
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}
