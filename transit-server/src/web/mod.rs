//! Web query surface.
//!
//! A JSON API over the core's query surface. Presentation layers (map
//! views, departure boards) consume these endpoints; their UI logic lives
//! elsewhere. No core failure surfaces as an error here: lookups miss with
//! 404 and everything else answers with whatever data is available.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::create_router;
pub use state::AppState;
