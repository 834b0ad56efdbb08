use tracing::{debug, warn};

use crate::error::Error;
use crate::store::CursorStore;

pub const HISTORY_KEY_SUFFIX: &str = "-cursor-history";

/// The persisted back stack of cursor tokens for one table.
///
/// Every read goes to the store, so two quick navigations never act on a stale copy.
/// Once the store fails, the history keeps working from an in-memory mirror for the rest
/// of the session; a reload then loses it and "previous" falls back to page 1.
#[derive(Debug)]
pub struct CursorHistory<S> {
    store: S,
    key: String,
    mirror: Vec<String>,
    degraded: bool,
}

impl<S: CursorStore> CursorHistory<S> {
    pub fn new(store: S, storage_key: &str) -> Self {
        Self {
            store,
            key: format!("{}{}", storage_key, HISTORY_KEY_SUFFIX),
            mirror: Vec::new(),
            degraded: false,
        }
    }

    /// The key the history is persisted under.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn load(&mut self) -> Vec<String> {
        if self.degraded {
            return self.mirror.clone();
        }
        match self.store.get(&self.key) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(history) => {
                    self.mirror = history.clone();
                    history
                }
                Err(e) => {
                    warn!(key = %self.key, error = %e, "discarding malformed cursor history");
                    self.mirror.clear();
                    Vec::new()
                }
            },
            Ok(None) => {
                self.mirror.clear();
                Vec::new()
            }
            Err(e) => {
                self.degrade(e);
                self.mirror.clone()
            }
        }
    }

    pub fn save(&mut self, history: &[String]) {
        self.mirror = history.to_vec();
        if self.degraded {
            return;
        }
        let written = if history.is_empty() {
            self.store.remove(&self.key)
        } else {
            serde_json::to_string(history)
                .map_err(Error::from)
                .and_then(|raw| self.store.set(&self.key, &raw))
        };
        match written {
            Ok(()) => debug!(key = %self.key, depth = history.len(), "saved cursor history"),
            Err(e) => self.degrade(e),
        }
    }

    pub fn clear(&mut self) {
        self.save(&[]);
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn degrade(&mut self, error: Error) {
        warn!(
            key = %self.key,
            error = %error,
            "cursor storage unavailable, keeping history in memory for this session"
        );
        self.degraded = true;
    }
}
