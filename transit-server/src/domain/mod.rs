//! Domain types for the transit engine.
//!
//! Static-schedule entities (stops, routes, trips, stop-times, shape
//! points) and the realtime types layered on top of them. Link fields that
//! carry invariants (append-only, no duplicates) are private and mutated
//! only through the crate-internal linking pass.

mod arrival;
mod route;
mod shape;
mod stop;
mod time;
mod trip;
mod vehicle;

pub use arrival::{DelayStatus, RealtimeArrival};
pub use route::Route;
pub use shape::ShapePoint;
pub use stop::Stop;
pub use time::{InvalidServiceTime, SECS_PER_DAY, ServiceTime};
pub use trip::{StopTime, Trip};
pub use vehicle::{BEARING_UNKNOWN, VehiclePosition};
