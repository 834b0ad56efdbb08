use chrono::NaiveDate;
use tracing::debug;

use crate::config::{TableConfig, PAGE_KEY};
use crate::cursor::Cursor;
use crate::filters::{ApplyOptions, FilterMutations, FilterValues};
use crate::net::{Location, MemoryRouter, NavigationMode, QueryState, Router};
use crate::pagination::{CursorPagination, PaginationControls};
use crate::params::{self, RequestParams};
use crate::store::CursorStore;
use crate::view::{Sort, ViewState};

/// The state engine behind one list screen: URL-backed filters plus cursor pagination.
///
/// Filter edits replace the current history entry; page moves push a new one.
#[derive(Debug)]
pub struct TableController<R, S> {
    config: TableConfig,
    router: R,
    pagination: CursorPagination<S>,
}

impl<R: Router, S: CursorStore> TableController<R, S> {
    pub fn new(config: TableConfig, router: R, store: S) -> Self {
        let mut pagination = CursorPagination::new(store, &config.storage_key, &config.cursor_key);
        pagination.sync(&router.location().query);
        Self {
            config,
            router,
            pagination,
        }
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    pub fn pagination(&self) -> &CursorPagination<S> {
        &self.pagination
    }

    pub fn location(&self) -> &Location {
        self.router.location()
    }

    pub fn query(&self) -> &QueryState {
        &self.router.location().query
    }

    pub fn view_state(&self) -> ViewState {
        ViewState::from_query(self.query(), &self.config)
    }

    pub fn request_params(&self, today: NaiveDate) -> RequestParams {
        params::build(self.query(), &self.config.build, today)
    }

    pub fn controls(&self, response_cursor: Option<&Cursor>) -> PaginationControls {
        self.pagination.controls(response_cursor, self.query())
    }

    /// Re-reads the URL, e.g. after the host router navigated on its own.
    pub fn sync(&mut self) {
        self.pagination.sync(&self.router.location().query);
    }

    pub fn next_page(&mut self, response_cursor: &Cursor) {
        self.pagination.next(&mut self.router, response_cursor);
    }

    pub fn previous_page(&mut self) {
        self.pagination.previous(&mut self.router);
    }

    pub fn apply_filters(&mut self, values: &FilterValues, options: ApplyOptions) {
        let next = self.mutations().apply_filters(self.query(), values, options);
        self.replace_query(next);
    }

    pub fn clear_filters(&mut self) {
        let next = self.mutations().clear_filters(self.query());
        self.replace_query(next);
    }

    pub fn apply_date_range(&mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) {
        let next = self.mutations().apply_date_range(self.query(), start, end);
        self.replace_query(next);
    }

    pub fn apply_sort(&mut self, sort: Option<&Sort>) {
        let next = self.mutations().apply_sort(self.query(), sort);
        self.replace_query(next);
    }

    pub fn apply_page_size(&mut self, page_size: u32) {
        let next = self.mutations().apply_page_size(self.query(), page_size);
        self.replace_query(next);
    }

    /// Drops the cursor stack and returns to page 1, keeping filters.
    pub fn reset_pagination(&mut self) {
        let mut query = self.query().clone();
        query.remove(&self.config.cursor_key);
        query.remove(PAGE_KEY);
        self.pagination.reset();
        self.replace_query(query);
    }

    /// Hands back the router and the store, e.g. to rebuild the table after a reload.
    pub fn into_parts(self) -> (R, S) {
        (self.router, self.pagination.into_store())
    }

    fn mutations(&self) -> FilterMutations<'_> {
        FilterMutations::new(&self.config)
    }

    fn replace_query(&mut self, query: QueryState) {
        let location = self.router.location().with_query(query);
        debug!(location = %location, "filters changed");
        self.router.navigate(location, NavigationMode::Replace);
        self.sync();
    }
}

impl<S: CursorStore> TableController<MemoryRouter, S> {
    /// Browser "back", followed by a sync. Returns false at the start of history.
    pub fn back(&mut self) -> bool {
        let moved = self.router.rewind().is_some();
        if moved {
            self.sync();
        }
        moved
    }

    /// Browser "forward", followed by a sync. Returns false at the end of history.
    pub fn forward(&mut self) -> bool {
        let moved = self.router.forward().is_some();
        if moved {
            self.sync();
        }
        moved
    }
}
