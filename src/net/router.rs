use tracing::debug;

use crate::error::Result;
use crate::net::location::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationMode {
    /// Adds an entry to the navigation history.
    Push,
    /// Overwrites the current entry.
    Replace,
}

/// The host router's URL state: read the current location, navigate to a new one.
pub trait Router {
    fn location(&self) -> &Location;

    fn navigate(&mut self, location: Location, mode: NavigationMode);
}

/// An in-memory router with browser-like back/forward history.
#[derive(Debug, Clone)]
pub struct MemoryRouter {
    current: Location,
    back_stack: Vec<Location>,
    forward_stack: Vec<Location>,
}

impl Default for MemoryRouter {
    fn default() -> Self {
        Self::new(Location::new("/", Default::default()))
    }
}

impl MemoryRouter {
    pub fn new(initial: Location) -> Self {
        Self {
            current: initial,
            back_stack: Vec::new(),
            forward_stack: Vec::new(),
        }
    }

    pub fn with_initial_location(location: &str) -> Result<Self> {
        Ok(Self::new(location.parse()?))
    }

    pub fn push(&mut self, location: Location) {
        self.forward_stack.clear();
        let previous = std::mem::replace(&mut self.current, location);
        self.back_stack.push(previous);
    }

    pub fn replace(&mut self, location: Location) {
        self.current = location;
    }

    /// Browser "back". Returns the new current location, or `None` at the start of history.
    pub fn rewind(&mut self) -> Option<&Location> {
        let previous = self.back_stack.pop()?;
        let current = std::mem::replace(&mut self.current, previous);
        self.forward_stack.push(current);
        debug!(location = %self.current, "navigated back");
        Some(&self.current)
    }

    /// Browser "forward". Returns the new current location, or `None` at the end of history.
    pub fn forward(&mut self) -> Option<&Location> {
        let next = self.forward_stack.pop()?;
        let current = std::mem::replace(&mut self.current, next);
        self.back_stack.push(current);
        debug!(location = %self.current, "navigated forward");
        Some(&self.current)
    }

    pub fn is_rewindable(&self) -> bool {
        !self.back_stack.is_empty()
    }

    pub fn is_forwardable(&self) -> bool {
        !self.forward_stack.is_empty()
    }

    /// Number of entries in the navigation history, the current one included.
    pub fn history_len(&self) -> usize {
        self.back_stack.len() + 1 + self.forward_stack.len()
    }
}

impl Router for MemoryRouter {
    fn location(&self) -> &Location {
        &self.current
    }

    fn navigate(&mut self, location: Location, mode: NavigationMode) {
        debug!(location = %location, ?mode, "navigate");
        match mode {
            NavigationMode::Push => self.push(location),
            NavigationMode::Replace => self.replace(location),
        }
    }
}
