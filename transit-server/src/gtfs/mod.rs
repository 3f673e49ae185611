//! Static GTFS schedule: loading and the in-memory index.
//!
//! The loader parses the agency's delimited schedule files into entity
//! collections; the index runs the linking pass over them and then answers
//! every schedule query. Loading is tolerant by design: malformed rows are
//! skipped and a missing file yields an empty collection, so the
//! application starts even with partial data.

mod index;
mod loader;

pub use index::{RoutePath, ScheduleIndex};
pub use loader::{Schedule, load_schedule};
