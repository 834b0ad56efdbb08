#![deny(unsafe_code)]

mod app;
mod controller;
mod utils;

pub mod config;
pub mod cursor;
pub mod error;
pub mod filters;
pub mod history;
pub mod net;
pub mod pagination;
pub mod params;
pub mod source;
pub mod store;
pub mod view;

pub use app::{Config, ReportLevel, Runner, Step, StepReport};
pub use config::{BuildOptions, TableConfig};
pub use controller::TableController;
pub use cursor::Cursor;
pub use error::{Error, Result};
pub use pagination::{CursorPagination, PageAction, PaginationControls, PaginationState};
pub use store::{CursorStore, FileStore, MemoryStore};
