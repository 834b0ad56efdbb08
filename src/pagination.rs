//! Bidirectional paging over a forward-only cursor API.
//!
//! The backend only hands out a continuation token for the page after the current one. Going
//! back is emulated with a client-side stack of the tokens already visited: [`reduce`] is the
//! pure transition function over [`PaginationState`], and [`CursorPagination`] binds it to the
//! router's URL and to the persisted [`CursorHistory`].

use serde::Serialize;
use tracing::debug;

use crate::config::PAGE_KEY;
use crate::cursor::Cursor;
use crate::history::CursorHistory;
use crate::net::{Location, NavigationMode, QueryState, Router};
use crate::store::CursorStore;

/// The page shown for a given URL: an explicit positive page hint wins, otherwise any cursor
/// means page 2 and no cursor means page 1.
pub fn current_page(page_hint: Option<u32>, has_cursor: bool) -> u32 {
    match page_hint {
        Some(page) if page > 0 => page,
        _ if has_cursor => 2,
        _ => 1,
    }
}

fn page_hint(page: u32) -> Option<u32> {
    (page > 1).then_some(page)
}

/// What the pagination controls render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationControls {
    pub has_next_page: bool,
    pub current_page: u32,
}

pub fn compute(
    response_cursor: Option<&Cursor>,
    url_cursor: Option<&str>,
    url_page_hint: Option<u32>,
) -> PaginationControls {
    PaginationControls {
        has_next_page: response_cursor.is_some_and(Cursor::is_present),
        current_page: current_page(url_page_hint, url_cursor.is_some_and(|c| !c.is_empty())),
    }
}

/// Cursor, page hint, and back stack of one table, as one value.
///
/// `history` holds the tokens of pages `2..current_page`, oldest first; the token of the page
/// on screen is `cursor`. On page 1 there is no cursor and the history is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationState {
    pub cursor: Option<String>,
    pub page: Option<u32>,
    pub history: Vec<String>,
}

impl PaginationState {
    pub fn first_page() -> Self {
        Self::default()
    }

    pub fn current_page(&self) -> u32 {
        current_page(self.page, self.cursor.is_some())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageAction {
    /// Advance using the continuation token of the page on screen.
    Next(Cursor),
    Previous,
    Reset,
    /// The URL changed outside of `Next`/`Previous`: reload, browser back/forward, filters.
    Sync {
        cursor: Option<String>,
        page: Option<u32>,
    },
}

fn push_unique(history: &mut Vec<String>, token: &str) {
    if history.last().map(String::as_str) != Some(token) {
        history.push(token.to_string());
    }
}

pub fn reduce(state: &PaginationState, action: PageAction) -> PaginationState {
    match action {
        PageAction::Next(cursor) => {
            if !cursor.is_present() {
                return state.clone();
            }
            let mut history = state.history.clone();
            if let Some(active) = &state.cursor {
                push_unique(&mut history, active);
            }
            PaginationState {
                cursor: Some(cursor.to_token()),
                page: page_hint(state.current_page().saturating_add(1)),
                history,
            }
        }
        PageAction::Previous => {
            let mut history = state.history.clone();
            match history.pop() {
                None => PaginationState::first_page(),
                Some(cursor) => PaginationState {
                    cursor: Some(cursor),
                    page: page_hint(state.current_page().saturating_sub(1)),
                    history,
                },
            }
        }
        PageAction::Reset => PaginationState::first_page(),
        PageAction::Sync { cursor, page } => {
            let page = page.filter(|p| *p > 0);
            match cursor {
                None => PaginationState {
                    cursor: None,
                    page,
                    history: Vec::new(),
                },
                Some(token) if state.cursor.as_ref() == Some(&token) => PaginationState {
                    page,
                    ..state.clone()
                },
                Some(token) => {
                    let mut history = state.history.clone();
                    if let Some(idx) = history.iter().position(|t| *t == token) {
                        // Back to an already visited page, possibly several steps at once.
                        history.truncate(idx);
                    } else if let Some(active) = &state.cursor {
                        push_unique(&mut history, active);
                    }
                    PaginationState {
                        cursor: Some(token),
                        page,
                        history,
                    }
                }
            }
        }
    }
}

/// Cursor pagination for one table, bound to the URL and to persisted history.
///
/// `next` and `previous` are the only operations that write the cursor and page parameters.
/// Each persists the history first and then performs exactly one navigation.
#[derive(Debug)]
pub struct CursorPagination<S> {
    history: CursorHistory<S>,
    cursor_key: String,
    state: PaginationState,
}

impl<S: CursorStore> CursorPagination<S> {
    pub fn new(store: S, storage_key: &str, cursor_key: &str) -> Self {
        Self {
            history: CursorHistory::new(store, storage_key),
            cursor_key: cursor_key.to_string(),
            state: PaginationState::first_page(),
        }
    }

    /// The state as of the last sync or navigation.
    pub fn state(&self) -> &PaginationState {
        &self.state
    }

    pub fn history(&self) -> &CursorHistory<S> {
        &self.history
    }

    pub fn into_store(self) -> S {
        self.history.into_store()
    }

    pub fn url_cursor<'a>(&self, query: &'a QueryState) -> Option<&'a str> {
        query.get_str(&self.cursor_key)
    }

    pub fn url_page(query: &QueryState) -> Option<u32> {
        query
            .get_str(PAGE_KEY)
            .and_then(|p| p.parse::<u32>().ok())
            .filter(|p| *p > 0)
    }

    pub fn controls(
        &self,
        response_cursor: Option<&Cursor>,
        query: &QueryState,
    ) -> PaginationControls {
        compute(response_cursor, self.url_cursor(query), Self::url_page(query))
    }

    /// Reconciles the stack with the URL. Call whenever the URL may have changed.
    pub fn sync(&mut self, query: &QueryState) {
        let current = PaginationState {
            history: self.history.load(),
            ..self.state.clone()
        };
        let next = reduce(&current, self.sync_action(query));
        if next.history != current.history {
            debug!(
                from = current.history.len(),
                to = next.history.len(),
                "cursor history resynced with url"
            );
            self.history.save(&next.history);
        }
        self.state = next;
    }

    /// Moves to the page after the current one. Does nothing without a continuation token.
    pub fn next<R: Router>(&mut self, router: &mut R, response_cursor: &Cursor) {
        if !response_cursor.is_present() {
            debug!("no continuation token, staying on the last page");
            return;
        }
        self.navigate(router, PageAction::Next(response_cursor.clone()));
    }

    /// Moves back one page; on page 1 this keeps the table on page 1.
    pub fn previous<R: Router>(&mut self, router: &mut R) {
        self.navigate(router, PageAction::Previous);
    }

    /// Forgets the stack without navigating, for callers that clear the cursor themselves.
    pub fn reset(&mut self) {
        self.state = reduce(&self.state, PageAction::Reset);
        self.history.clear();
    }

    fn sync_action(&self, query: &QueryState) -> PageAction {
        PageAction::Sync {
            cursor: self.url_cursor(query).map(str::to_string),
            page: Self::url_page(query),
        }
    }

    fn navigate<R: Router>(&mut self, router: &mut R, action: PageAction) {
        let location = router.location().clone();
        let current = reduce(
            &PaginationState {
                history: self.history.load(),
                ..self.state.clone()
            },
            self.sync_action(&location.query),
        );
        let next = reduce(&current, action);
        // Staying on page 1 keeps the URL as written, an explicit `page=1` included.
        let (next, target) = if current.cursor.is_none()
            && next.cursor.is_none()
            && current.current_page() == 1
        {
            (current, location.clone())
        } else {
            let target = self.apply(&location, &next);
            (next, target)
        };
        self.history.save(&next.history);

        let mode = if target == location {
            NavigationMode::Replace
        } else {
            NavigationMode::Push
        };
        debug!(
            page = next.current_page(),
            depth = next.history.len(),
            "paginate"
        );
        router.navigate(target, mode);
        self.state = next;
    }

    fn apply(&self, location: &Location, state: &PaginationState) -> Location {
        let mut query = location.query.clone();
        query.set_or_remove(&self.cursor_key, state.cursor.as_deref());
        query.set_or_remove(PAGE_KEY, state.page.map(|p| p.to_string()));
        location.with_query(query)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::history::tests::BrokenStore;
    use crate::net::MemoryRouter;
    use crate::store::MemoryStore;

    fn tokens(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn state(cursor: Option<&str>, page: Option<u32>, history: &[&str]) -> PaginationState {
        PaginationState {
            cursor: cursor.map(str::to_string),
            page,
            history: tokens(history),
        }
    }

    fn setup(location: &str) -> (MemoryRouter, CursorPagination<MemoryStore>) {
        let router = MemoryRouter::with_initial_location(location).unwrap();
        let mut pagination = CursorPagination::new(MemoryStore::new(), "loans", "lastEvaluatedKey");
        pagination.sync(&router.location().query);
        (router, pagination)
    }

    fn url_cursor(router: &MemoryRouter) -> Option<String> {
        router
            .location()
            .query
            .get_str("lastEvaluatedKey")
            .map(str::to_string)
    }

    fn stored(pagination: &mut CursorPagination<MemoryStore>) -> Vec<String> {
        pagination.history.load()
    }

    #[test]
    fn current_page_prefers_hint() {
        assert_eq!(current_page(None, false), 1);
        assert_eq!(current_page(None, true), 2);
        assert_eq!(current_page(Some(5), true), 5);
        assert_eq!(current_page(Some(3), false), 3);
        assert_eq!(current_page(Some(0), true), 2);
    }

    #[test]
    fn compute_controls() {
        let more = Cursor::new(json!({"id": 10}));
        let controls = compute(Some(&more), Some("K1"), None);
        assert!(controls.has_next_page);
        assert_eq!(controls.current_page, 2);

        let controls = compute(Some(&Cursor::from("")), None, Some(4));
        assert!(!controls.has_next_page);
        assert_eq!(controls.current_page, 4);

        assert!(!compute(None, None, None).has_next_page);
        assert!(!compute(Some(&Cursor::new(json!({}))), None, None).has_next_page);
    }

    #[test]
    fn reduce_next_and_previous() {
        let s = reduce(&PaginationState::first_page(), PageAction::Next("K1".into()));
        assert_eq!(s, state(Some("K1"), Some(2), &[]));
        let s = reduce(&s, PageAction::Next("K2".into()));
        assert_eq!(s, state(Some("K2"), Some(3), &["K1"]));

        let s = reduce(&s, PageAction::Previous);
        assert_eq!(s, state(Some("K1"), Some(2), &[]));
        let s = reduce(&s, PageAction::Previous);
        assert_eq!(s, PaginationState::first_page());
    }

    #[test]
    fn reduce_next_without_cursor_is_noop() {
        let s = state(Some("K1"), Some(2), &[]);
        assert_eq!(reduce(&s, PageAction::Next(Cursor::from(""))), s);
        assert_eq!(reduce(&s, PageAction::Next(Cursor::new(json!(null)))), s);
    }

    #[test]
    fn reduce_stack_balance() {
        for n in 1..8 {
            let mut s = PaginationState::first_page();
            for i in 0..n {
                s = reduce(&s, PageAction::Next(Cursor::from(format!("K{}", i).as_str())));
            }
            assert_eq!(s.current_page(), n + 1);
            assert_eq!(s.history.len() as u32, n - 1);
            for _ in 0..n {
                s = reduce(&s, PageAction::Previous);
            }
            assert_eq!(s.current_page(), 1);
            assert!(s.history.is_empty());
            assert_eq!(s.cursor, None);
        }
    }

    #[test]
    fn reduce_previous_at_floor_is_idempotent() {
        let s = PaginationState::first_page();
        let once = reduce(&s, PageAction::Previous);
        assert_eq!(once, s);
        assert_eq!(reduce(&once, PageAction::Previous), s);
    }

    #[test]
    fn reduce_reset() {
        let s = state(Some("K3"), Some(4), &["K1", "K2"]);
        assert_eq!(reduce(&s, PageAction::Reset), PaginationState::first_page());
    }

    #[test]
    fn reduce_sync_cases() {
        let s = state(Some("K3"), Some(4), &["K1", "K2"]);

        // Reload: same cursor, nothing grows.
        let reloaded = reduce(
            &s,
            PageAction::Sync {
                cursor: Some("K3".into()),
                page: Some(4),
            },
        );
        assert_eq!(reloaded, s);

        // Browser back one step.
        let back = reduce(
            &s,
            PageAction::Sync {
                cursor: Some("K2".into()),
                page: Some(3),
            },
        );
        assert_eq!(back, state(Some("K2"), Some(3), &["K1"]));

        // Browser back two steps at once.
        let back2 = reduce(
            &s,
            PageAction::Sync {
                cursor: Some("K1".into()),
                page: Some(2),
            },
        );
        assert_eq!(back2, state(Some("K1"), Some(2), &[]));

        // Forward to a page not seen from here.
        let forward = reduce(
            &back,
            PageAction::Sync {
                cursor: Some("K3".into()),
                page: Some(4),
            },
        );
        assert_eq!(forward, s);

        // Cursor removed from the URL.
        let cleared = reduce(
            &s,
            PageAction::Sync {
                cursor: None,
                page: Some(1),
            },
        );
        assert_eq!(cleared, state(None, Some(1), &[]));
    }

    #[test]
    fn scenario_forward_then_back() {
        let (mut router, mut pagination) = setup("/loans");

        pagination.next(&mut router, &Cursor::from("K1"));
        assert_eq!(router.location().query.get_str("lastEvaluatedKey"), Some("K1"));
        assert_eq!(router.location().query.get_str("page"), Some("2"));
        assert!(stored(&mut pagination).is_empty());

        pagination.next(&mut router, &Cursor::from("K2"));
        assert_eq!(router.location().to_string(), "/loans?lastEvaluatedKey=K2&page=3");
        assert_eq!(stored(&mut pagination), tokens(&["K1"]));

        pagination.previous(&mut router);
        assert_eq!(router.location().to_string(), "/loans?lastEvaluatedKey=K1&page=2");
        assert!(stored(&mut pagination).is_empty());

        pagination.previous(&mut router);
        assert_eq!(router.location().to_string(), "/loans");
        assert!(stored(&mut pagination).is_empty());
        assert_eq!(pagination.state(), &PaginationState::first_page());
    }

    #[test]
    fn previous_on_first_page_is_a_noop() {
        let (mut router, mut pagination) = setup("/loans?status=active");
        pagination.previous(&mut router);
        pagination.previous(&mut router);
        assert_eq!(router.location().to_string(), "/loans?status=active");
        assert_eq!(router.history_len(), 1);
        assert!(stored(&mut pagination).is_empty());
    }

    #[test]
    fn previous_keeps_explicit_first_page_hint() {
        let (mut router, mut pagination) = setup("/loans?page=1&status=active");
        pagination.previous(&mut router);
        pagination.previous(&mut router);
        assert_eq!(router.location().to_string(), "/loans?page=1&status=active");
        assert_eq!(router.history_len(), 1);
        assert_eq!(pagination.state().current_page(), 1);
        assert!(stored(&mut pagination).is_empty());
    }

    #[test]
    fn next_saturates_at_max_page_hint() {
        let max = u32::MAX.to_string();
        let (mut router, mut pagination) =
            setup(&format!("/loans?page={}&lastEvaluatedKey=K1", max));
        pagination.next(&mut router, &Cursor::from("K2"));
        assert_eq!(router.location().query.get_str("lastEvaluatedKey"), Some("K2"));
        assert_eq!(router.location().query.get_str("page"), Some(max.as_str()));
        assert_eq!(stored(&mut pagination), tokens(&["K1"]));
    }

    #[test]
    fn next_without_cursor_does_not_navigate() {
        let (mut router, mut pagination) = setup("/loans");
        pagination.next(&mut router, &Cursor::from(""));
        assert_eq!(router.history_len(), 1);
        assert_eq!(pagination.state(), &PaginationState::first_page());
    }

    #[test]
    fn reload_does_not_grow_history() {
        let (mut router, mut pagination) = setup("/loans");
        pagination.next(&mut router, &Cursor::from("K1"));
        pagination.next(&mut router, &Cursor::from("K2"));
        pagination.next(&mut router, &Cursor::from("K3"));
        let before = stored(&mut pagination);
        assert_eq!(before, tokens(&["K1", "K2"]));

        let store = pagination.into_store();
        let mut reloaded = CursorPagination::new(store, "loans", "lastEvaluatedKey");
        reloaded.sync(&router.location().query);
        reloaded.sync(&router.location().query);
        assert_eq!(stored(&mut reloaded), before);
        assert_eq!(reloaded.state().current_page(), 4);

        reloaded.previous(&mut router);
        assert_eq!(router.location().to_string(), "/loans?lastEvaluatedKey=K2&page=3");
    }

    #[test]
    fn browser_back_and_forward_keep_stack_consistent() {
        let (mut router, mut pagination) = setup("/loans");
        pagination.next(&mut router, &Cursor::from("K1"));
        pagination.next(&mut router, &Cursor::from("K2"));
        pagination.next(&mut router, &Cursor::from("K3"));

        router.rewind();
        pagination.sync(&router.location().query);
        assert_eq!(pagination.state().cursor.as_deref(), Some("K2"));
        assert_eq!(stored(&mut pagination), tokens(&["K1"]));

        router.rewind();
        router.rewind();
        pagination.sync(&router.location().query);
        assert_eq!(pagination.state(), &PaginationState::first_page());
        assert!(stored(&mut pagination).is_empty());

        router.forward();
        pagination.sync(&router.location().query);
        router.forward();
        pagination.sync(&router.location().query);
        assert_eq!(pagination.state().cursor.as_deref(), Some("K2"));
        assert_eq!(stored(&mut pagination), tokens(&["K1"]));

        pagination.previous(&mut router);
        assert_eq!(router.location().to_string(), "/loans?lastEvaluatedKey=K1&page=2");
    }

    #[test]
    fn rapid_next_reads_fresh_state() {
        let (mut router, mut pagination) = setup("/loans");
        // Two clicks before any re-render: no sync in between.
        pagination.next(&mut router, &Cursor::from("K1"));
        pagination.next(&mut router, &Cursor::from("K2"));
        pagination.next(&mut router, &Cursor::from("K3"));
        assert_eq!(stored(&mut pagination), tokens(&["K1", "K2"]));
        assert_eq!(router.location().query.get_str("page"), Some("4"));
    }

    #[test]
    fn cursor_removed_externally_clears_history() {
        let (mut router, mut pagination) = setup("/loans");
        pagination.next(&mut router, &Cursor::from("K1"));
        pagination.next(&mut router, &Cursor::from("K2"));

        let mut query = router.location().query.clone();
        query.remove("lastEvaluatedKey");
        query.set("page", "1");
        router.replace(router.location().with_query(query));
        pagination.sync(&router.location().query);

        assert!(stored(&mut pagination).is_empty());
        assert_eq!(pagination.state().current_page(), 1);
    }

    #[test]
    fn object_cursors_are_canonicalized() {
        let (mut router, mut pagination) = setup("/deposits");
        pagination.next(&mut router, &Cursor::new(json!({"pk": "d#1", "at": 5})));
        assert_eq!(
            router.location().query.get_str("lastEvaluatedKey"),
            Some(r#"{"at":5,"pk":"d#1"}"#)
        );
        pagination.next(&mut router, &Cursor::from(r#"{"pk":"d#9","at":7}"#));
        assert_eq!(stored(&mut pagination), tokens(&[r#"{"at":5,"pk":"d#1"}"#]));
    }

    #[test]
    fn deterministic_backend_replays_forward_sequence() {
        let (mut router, mut pagination) = setup("/loans");
        let backend = |query: &QueryState| match query.get_str("lastEvaluatedKey") {
            None => "K1".to_string(),
            Some(k) => format!("K{}", k[1..].parse::<u32>().unwrap() + 1),
        };

        let mut forward = vec![None];
        for _ in 0..5 {
            let cursor = backend(&router.location().query);
            pagination.next(&mut router, &Cursor::from(cursor.as_str()));
            pagination.sync(&router.location().query);
            forward.push(url_cursor(&router));
        }

        let mut backward = vec![url_cursor(&router)];
        for i in 0..5 {
            if i == 2 {
                // Reload in the middle of the walk back.
                let store = pagination.into_store();
                pagination = CursorPagination::new(store, "loans", "lastEvaluatedKey");
                pagination.sync(&router.location().query);
            }
            pagination.previous(&mut router);
            pagination.sync(&router.location().query);
            backward.push(url_cursor(&router));
        }
        backward.reverse();
        assert_eq!(backward, forward);
    }

    #[test]
    fn broken_storage_keeps_working_in_memory() {
        let mut router = MemoryRouter::with_initial_location("/wallets").unwrap();
        let mut pagination = CursorPagination::new(BrokenStore, "wallets", "lastEvaluatedKey");
        pagination.sync(&router.location().query);

        pagination.next(&mut router, &Cursor::from("K1"));
        pagination.next(&mut router, &Cursor::from("K2"));
        pagination.next(&mut router, &Cursor::from("K3"));
        assert!(pagination.history().is_degraded());

        pagination.previous(&mut router);
        assert_eq!(router.location().to_string(), "/wallets?lastEvaluatedKey=K2&page=3");

        // A reload loses the in-memory copy, so previous lands on page 1.
        let mut reloaded = CursorPagination::new(BrokenStore, "wallets", "lastEvaluatedKey");
        reloaded.sync(&router.location().query);
        assert_eq!(reloaded.state().current_page(), 3);
        reloaded.previous(&mut router);
        assert_eq!(router.location().to_string(), "/wallets");
        assert_eq!(reloaded.state(), &PaginationState::first_page());
    }
}
