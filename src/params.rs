use std::collections::BTreeMap;

use chrono::{Local, Months, NaiveDate};
use serde::Serialize;

use crate::config::{BuildOptions, PAGE_KEY, PAGE_SIZE_KEY};
use crate::net::{ParamValue, QueryState};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortDate {
    pub start: String,
    pub end: String,
}

/// Parameters handed to the query layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestParams {
    pub current: u32,
    pub page_size: u32,
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_date: Option<SortDate>,
    /// Every other non-empty URL parameter, copied as is.
    #[serde(flatten)]
    pub extra: BTreeMap<String, ParamValue>,
}

impl RequestParams {
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.extra.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(ParamValue::as_str)
    }
}

fn positive(value: Option<&str>) -> Option<u32> {
    value.and_then(|v| v.parse::<u32>().ok()).filter(|v| *v > 0)
}

/// Derives backend request parameters from the URL state. Pure: the caller supplies `today`.
pub fn build(query: &QueryState, options: &BuildOptions, today: NaiveDate) -> RequestParams {
    let current = positive(query.get_str(PAGE_KEY)).unwrap_or(1);
    let page_size = positive(query.get_str(PAGE_SIZE_KEY)).unwrap_or(options.default_page_size);
    let search = query
        .get_str(&options.primary_search_key)
        .unwrap_or_default()
        .to_string();

    let date_keys = &options.date_range_keys;
    let start_day = query.get_str(&date_keys.start);
    let end_day = query.get_str(&date_keys.end);
    let sort_date = if start_day.is_some() || end_day.is_some() || options.default_lookback_months > 0 {
        let lookback_start = today
            .checked_sub_months(Months::new(options.default_lookback_months))
            .unwrap_or(today);
        Some(SortDate {
            start: start_day
                .map(str::to_string)
                .unwrap_or_else(|| lookback_start.format(DATE_FORMAT).to_string()),
            end: end_day
                .map(str::to_string)
                .unwrap_or_else(|| today.format(DATE_FORMAT).to_string()),
        })
    } else {
        None
    };

    let reserved = [
        PAGE_KEY,
        PAGE_SIZE_KEY,
        options.primary_search_key.as_str(),
        date_keys.start.as_str(),
        date_keys.end.as_str(),
    ];
    let extra = query
        .iter()
        .filter(|(key, value)| !reserved.contains(&key.as_str()) && !value.is_empty())
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    RequestParams {
        current,
        page_size,
        query: search,
        sort_date,
        extra,
    }
}

pub fn build_today(query: &QueryState, options: &BuildOptions) -> RequestParams {
    build(query, options, Local::now().date_naive())
}
