//! Next-URL computations for filter edits. Every handler lands the table back on page 1.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::config::{TableConfig, PAGE_KEY, PAGE_SIZE_KEY};
use crate::net::{ParamValue, QueryState};
use crate::params::DATE_FORMAT;
use crate::view::Sort;

/// Submitted filter values. A configured key missing from the map is cleared from the URL.
///
/// Callers map "no selection" sentinels such as `"all"` to absence before submitting.
pub type FilterValues = BTreeMap<String, ParamValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyOptions {
    pub reset_page: bool,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self { reset_page: true }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FilterMutations<'a> {
    config: &'a TableConfig,
}

impl<'a> FilterMutations<'a> {
    pub fn new(config: &'a TableConfig) -> Self {
        Self { config }
    }

    pub fn apply_filters(
        &self,
        current: &QueryState,
        values: &FilterValues,
        options: ApplyOptions,
    ) -> QueryState {
        let mut next = current.clone();
        for key in &self.config.filter_keys {
            match values.get(key).filter(|v| !v.is_empty()) {
                Some(value) => next.set(key, value.clone()),
                None => {
                    next.remove(key);
                }
            }
        }
        if options.reset_page {
            self.reset_pagination(&mut next);
        }
        next
    }

    pub fn clear_filters(&self, current: &QueryState) -> QueryState {
        let mut next = current.clone();
        for key in self
            .config
            .filter_keys
            .iter()
            .chain(self.config.build.date_range_keys.iter())
        {
            next.remove(key);
        }
        self.reset_pagination(&mut next);
        next
    }

    pub fn apply_date_range(
        &self,
        current: &QueryState,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> QueryState {
        let keys = &self.config.build.date_range_keys;
        let mut next = current.clone();
        next.set_or_remove(&keys.start, start.map(|d| d.format(DATE_FORMAT).to_string()));
        next.set_or_remove(&keys.end, end.map(|d| d.format(DATE_FORMAT).to_string()));
        self.reset_pagination(&mut next);
        next
    }

    pub fn apply_sort(&self, current: &QueryState, sort: Option<&Sort>) -> QueryState {
        let mut next = current.clone();
        next.set_or_remove(&self.config.sort_field_key, sort.map(|s| s.field.clone()));
        next.set_or_remove(&self.config.sort_order_key, sort.map(|s| s.order.to_string()));
        self.reset_pagination(&mut next);
        next
    }

    pub fn apply_page_size(&self, current: &QueryState, page_size: u32) -> QueryState {
        let mut next = current.clone();
        if page_size == self.config.build.default_page_size || page_size == 0 {
            next.remove(PAGE_SIZE_KEY);
        } else {
            next.set(PAGE_SIZE_KEY, page_size.to_string());
        }
        self.reset_pagination(&mut next);
        next
    }

    /// Back to page 1 of a new result set; the old cursor does not apply to it.
    fn reset_pagination(&self, next: &mut QueryState) {
        next.set(PAGE_KEY, "1");
        next.remove(&self.config.cursor_key);
    }
}
