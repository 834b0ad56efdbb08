use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::{TableConfig, PAGE_KEY, PAGE_SIZE_KEY};
use crate::cursor::Cursor;
use crate::error::Error;
use crate::net::{ParamValue, QueryState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascend,
    Descend,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SortOrder::Ascend => write!(f, "ascend"),
            SortOrder::Descend => write!(f, "descend"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ascend" | "asc" => Ok(SortOrder::Ascend),
            "descend" | "desc" => Ok(SortOrder::Descend),
            other => Err(Error::Other(format!("unknown sort order: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    pub order: SortOrder,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Read-only snapshot of a table's view parameters, taken from the URL on each render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub page: Option<u32>,
    pub page_size: u32,
    pub cursor: Option<Cursor>,
    /// One entry per configured filter key; `None` when the key is absent from the URL.
    pub filters: BTreeMap<String, Option<ParamValue>>,
    pub date_range: DateRange,
    pub sort: Option<Sort>,
}

impl ViewState {
    pub fn from_query(query: &QueryState, config: &TableConfig) -> Self {
        let page = query
            .get_str(PAGE_KEY)
            .and_then(|p| p.parse::<u32>().ok())
            .filter(|p| *p > 0);
        let page_size = query
            .get_str(PAGE_SIZE_KEY)
            .and_then(|p| p.parse::<u32>().ok())
            .filter(|p| *p > 0)
            .unwrap_or(config.build.default_page_size);
        let cursor = query.get_str(&config.cursor_key).map(Cursor::from_token);
        let filters = config
            .filter_keys
            .iter()
            .map(|key| {
                let value = query.get(key).filter(|v| !v.is_empty()).cloned();
                (key.clone(), value)
            })
            .collect();
        let date_keys = &config.build.date_range_keys;
        let date_range = DateRange {
            start: query.get_str(&date_keys.start).map(str::to_string),
            end: query.get_str(&date_keys.end).map(str::to_string),
        };
        let sort = match (
            query.get_str(&config.sort_field_key),
            query.get_str(&config.sort_order_key).map(str::parse::<SortOrder>),
        ) {
            (Some(field), Some(Ok(order))) => Some(Sort {
                field: field.to_string(),
                order,
            }),
            _ => None,
        };

        Self {
            page,
            page_size,
            cursor,
            filters,
            date_range,
            sort,
        }
    }

    pub fn filter(&self, key: &str) -> Option<&ParamValue> {
        self.filters.get(key).and_then(Option::as_ref)
    }
}
