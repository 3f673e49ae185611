//! Schedule-based vehicle position simulation.
//!
//! When the realtime feed is unavailable the map still needs vehicles.
//! This module estimates where each trip's vehicle would be right now by
//! interpolating between consecutive scheduled stop-times, and caches the
//! result briefly since every position moves together with the clock.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, Timelike};
use moka::future::Cache;

use crate::domain::{SECS_PER_DAY, VehiclePosition};
use crate::gtfs::ScheduleIndex;

/// Default time-to-live of a computed snapshot.
const DEFAULT_REFRESH_TTL: Duration = Duration::from_secs(10);

/// Configuration for the simulated-position cache.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// How long a computed snapshot stays valid.
    pub refresh_ttl: Duration,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            refresh_ttl: DEFAULT_REFRESH_TTL,
        }
    }
}

/// Estimate the position of every trip's vehicle at `now_secs` seconds
/// past midnight.
///
/// For each trip with at least two stop-times, the first consecutive pair
/// whose scheduled window contains the current time yields one vehicle,
/// positioned by linear interpolation between the two stops and headed
/// along the initial great-circle bearing from the first to the second.
/// Schedule times past 24:00 keep their day offset, so the window check
/// also tries the clock shifted one day forward. Pairs with unparseable
/// times or unknown stop ids are skipped; a trip with no matching pair
/// contributes nothing.
pub fn simulate(index: &ScheduleIndex, now_secs: u32) -> Vec<VehiclePosition> {
    let mut vehicles = Vec::new();
    let now = i64::from(now_secs);

    for trip in index.trips() {
        let stop_times = trip.stop_times();
        if stop_times.len() < 2 {
            continue;
        }

        for pair in stop_times.windows(2) {
            let (Ok(depart), Ok(arrive)) =
                (pair[0].service_time(), pair[1].service_time())
            else {
                continue;
            };
            let start = i64::from(depart.seconds());
            let end = i64::from(arrive.seconds());

            let now = if start <= now && now <= end {
                now
            } else if start <= now + i64::from(SECS_PER_DAY)
                && now + i64::from(SECS_PER_DAY) <= end
            {
                now + i64::from(SECS_PER_DAY)
            } else {
                continue;
            };

            let (Some(from), Some(to)) =
                (index.stop(&pair[0].stop_id), index.stop(&pair[1].stop_id))
            else {
                continue;
            };

            let duration = (end - start) as f64;
            let progress = if duration == 0.0 {
                0.0
            } else {
                (now - start) as f64 / duration
            };

            vehicles.push(VehiclePosition {
                vehicle_id: trip.id.clone(),
                route_id: trip.route_id.clone(),
                lat: from.lat + (to.lat - from.lat) * progress,
                lon: from.lon + (to.lon - from.lon) * progress,
                bearing: initial_bearing(from.lat, from.lon, to.lat, to.lon),
            });
            break;
        }
    }

    vehicles
}

/// Initial great-circle bearing from one point to another, in degrees
/// normalised into `[0, 360)`.
fn initial_bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f32 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let y = delta_lambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    let bearing = y.atan2(x).to_degrees().rem_euclid(360.0) as f32;
    // Narrowing to f32 can round a value just under 360 back onto it.
    if bearing >= 360.0 { 0.0 } else { bearing }
}

/// Read-through cache over [`simulate`].
///
/// Recomputes at most once per TTL window; concurrent readers during a
/// recompute keep seeing the previous complete snapshot. The computation
/// runs on the blocking pool so it never stalls the async runtime.
pub struct SimulatedPositions {
    index: Arc<ScheduleIndex>,
    cache: Cache<(), Arc<Vec<VehiclePosition>>>,
}

impl SimulatedPositions {
    pub fn new(index: Arc<ScheduleIndex>, config: SimulationConfig) -> Self {
        let cache = Cache::builder()
            .time_to_live(config.refresh_ttl)
            .max_capacity(1)
            .build();

        Self { index, cache }
    }

    /// The current snapshot, recomputed when the cached one has expired.
    pub async fn positions(&self) -> Arc<Vec<VehiclePosition>> {
        if let Some(cached) = self.cache.get(&()).await {
            return cached;
        }

        let index = self.index.clone();
        let now_secs = Local::now().time().num_seconds_from_midnight();
        let snapshot = match tokio::task::spawn_blocking(move || simulate(&index, now_secs)).await
        {
            Ok(positions) => Arc::new(positions),
            Err(_) => Arc::new(Vec::new()),
        };

        self.cache.insert((), snapshot.clone()).await;
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::domain::{Route, Stop, StopTime, Trip};
    use crate::gtfs::Schedule;

    use super::*;

    fn index_with(
        stops: &[(&str, f64, f64)],
        trips: Vec<Trip>,
    ) -> ScheduleIndex {
        let mut schedule = Schedule::default();
        for (id, lat, lon) in stops {
            schedule
                .stops
                .insert(id.to_string(), Stop::new(*id, *id, *lat, *lon));
        }
        schedule
            .routes
            .insert("R1".into(), Route::new("R1", "Line 1", "3"));
        schedule.trips = trips;
        ScheduleIndex::build(schedule)
    }

    fn trip(id: &str, stop_times: &[(&str, &str)]) -> Trip {
        let mut trip = Trip::new(id, "R1", None);
        for (stop_id, time) in stop_times {
            trip.add_stop_time(StopTime::new(id, *stop_id, *time));
        }
        trip
    }

    fn secs(time: &str) -> u32 {
        crate::domain::ServiceTime::parse(time).unwrap().seconds()
    }

    #[test]
    fn interpolates_between_consecutive_stops() {
        let index = index_with(
            &[("A", 0.0, 0.0), ("B", 0.0, 1.0)],
            vec![trip("T1", &[("A", "10:00:00"), ("B", "10:10:00")])],
        );

        let vehicles = simulate(&index, secs("10:05:00"));

        assert_eq!(vehicles.len(), 1);
        let v = &vehicles[0];
        assert_eq!(v.vehicle_id, "T1");
        assert_eq!(v.route_id, "R1");
        assert!((v.lat - 0.0).abs() < 1e-9);
        assert!((v.lon - 0.5).abs() < 1e-9);
        // Due east along the equator.
        assert!((v.bearing - 90.0).abs() < 1e-4);
    }

    #[test]
    fn zero_duration_segment_pins_position_to_first_stop() {
        let index = index_with(
            &[("A", 41.9, 12.5), ("B", 41.8, 12.4)],
            vec![trip("T1", &[("A", "10:00:00"), ("B", "10:00:00")])],
        );

        let vehicles = simulate(&index, secs("10:00:00"));

        assert_eq!(vehicles.len(), 1);
        assert_eq!(vehicles[0].lat, 41.9);
        assert_eq!(vehicles[0].lon, 12.5);
    }

    #[test]
    fn trip_outside_its_window_yields_nothing() {
        let index = index_with(
            &[("A", 0.0, 0.0), ("B", 0.0, 1.0)],
            vec![trip("T1", &[("A", "10:00:00"), ("B", "10:10:00")])],
        );

        assert!(simulate(&index, secs("09:59:59")).is_empty());
        assert!(simulate(&index, secs("10:10:01")).is_empty());
    }

    #[test]
    fn a_trip_contributes_at_most_one_vehicle() {
        // At 10:10 both the A-B and B-C windows contain the clock; only
        // the first match counts.
        let index = index_with(
            &[("A", 0.0, 0.0), ("B", 0.0, 1.0), ("C", 0.0, 2.0)],
            vec![trip(
                "T1",
                &[("A", "10:00:00"), ("B", "10:10:00"), ("C", "10:10:00")],
            )],
        );

        let vehicles = simulate(&index, secs("10:10:00"));

        assert_eq!(vehicles.len(), 1);
        // The A-B pair wins and the clock sits at its end.
        assert!((vehicles[0].lon - 1.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_stop_skips_the_pair_not_the_scan() {
        let index = index_with(
            &[("A", 0.0, 0.0), ("B", 0.0, 1.0)],
            vec![trip(
                "T1",
                &[("GHOST", "10:00:00"), ("A", "10:10:00"), ("B", "10:20:00")],
            )],
        );

        // 10:05 falls in the GHOST-A pair, which is skipped; 10:15 falls
        // in the valid A-B pair.
        assert!(simulate(&index, secs("10:05:00")).is_empty());
        assert_eq!(simulate(&index, secs("10:15:00")).len(), 1);
    }

    #[test]
    fn unparseable_time_skips_the_pair() {
        let index = index_with(
            &[("A", 0.0, 0.0), ("B", 0.0, 1.0)],
            vec![trip("T1", &[("A", "bogus"), ("B", "10:10:00")])],
        );

        assert!(simulate(&index, secs("10:05:00")).is_empty());
    }

    #[test]
    fn service_past_midnight_matches_the_small_hours() {
        let index = index_with(
            &[("A", 0.0, 0.0), ("B", 0.0, 1.0)],
            vec![trip("T1", &[("A", "25:50:00"), ("B", "25:55:00")])],
        );

        // 01:52 is inside the 25:50-25:55 window once shifted a day.
        let vehicles = simulate(&index, secs("01:52:00"));
        assert_eq!(vehicles.len(), 1);

        assert!(simulate(&index, secs("01:40:00")).is_empty());
    }

    #[test]
    fn single_stop_trip_is_ignored() {
        let index = index_with(
            &[("A", 0.0, 0.0)],
            vec![trip("T1", &[("A", "10:00:00")])],
        );

        assert!(simulate(&index, secs("10:00:00")).is_empty());
    }

    #[test]
    fn bearing_cardinal_directions() {
        // North.
        assert!((initial_bearing(0.0, 0.0, 1.0, 0.0) - 0.0).abs() < 1e-4);
        // East.
        assert!((initial_bearing(0.0, 0.0, 0.0, 1.0) - 90.0).abs() < 1e-4);
        // South.
        assert!((initial_bearing(1.0, 0.0, 0.0, 0.0) - 180.0).abs() < 1e-4);
        // West wraps into the upper half of the range.
        assert!((initial_bearing(0.0, 1.0, 0.0, 0.0) - 270.0).abs() < 1e-4);
    }

    #[tokio::test]
    async fn cached_snapshot_is_shared_until_expiry() {
        let index = Arc::new(index_with(
            &[("A", 0.0, 0.0), ("B", 0.0, 1.0)],
            vec![trip("T1", &[("A", "00:00:00"), ("B", "23:59:59")])],
        ));
        let simulated = SimulatedPositions::new(
            index,
            SimulationConfig {
                refresh_ttl: Duration::from_secs(60),
            },
        );

        let first = simulated.positions().await;
        let second = simulated.positions().await;

        // Same Arc, not a recomputation.
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 1);
    }

    proptest! {
        #[test]
        fn bearing_is_always_in_range(
            lat1 in -80.0f64..80.0, lon1 in -180.0f64..180.0,
            lat2 in -80.0f64..80.0, lon2 in -180.0f64..180.0,
        ) {
            let bearing = initial_bearing(lat1, lon1, lat2, lon2);
            prop_assert!(!bearing.is_nan());
            prop_assert!((0.0..360.0).contains(&bearing));
        }

        #[test]
        fn identical_points_have_a_defined_bearing(
            lat in -80.0f64..80.0, lon in -180.0f64..180.0,
        ) {
            let bearing = initial_bearing(lat, lon, lat, lon);
            prop_assert!(!bearing.is_nan());
            prop_assert!(bearing >= 0.0);
        }
    }
}
