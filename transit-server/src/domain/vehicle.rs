//! Vehicle position, live or simulated.

/// Sentinel bearing for "direction unknown".
pub const BEARING_UNKNOWN: f32 = -1.0;

/// Where a vehicle is and which way it is heading.
///
/// Live positions come from the realtime feed and are keyed by vehicle id;
/// simulated positions reuse the trip id as the vehicle id. Either way the
/// value is rebuilt wholesale every cycle and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct VehiclePosition {
    pub vehicle_id: String,
    pub route_id: String,
    pub lat: f64,
    pub lon: f64,
    /// Compass heading in degrees, in `[0, 360)`, or [`BEARING_UNKNOWN`].
    pub bearing: f32,
}

impl VehiclePosition {
    pub fn has_bearing(&self) -> bool {
        self.bearing >= 0.0
    }
}
