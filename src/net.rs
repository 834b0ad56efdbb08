pub mod location;
pub mod query;
pub mod router;

pub use location::Location;
pub use query::{ParamValue, QueryState};
pub use router::{MemoryRouter, NavigationMode, Router};
