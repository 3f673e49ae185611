//! Periodic feed polling and the live maps.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use gtfs_realtime::FeedMessage;
use tokio::sync::{RwLock, watch};
use tracing::{info, warn};

use crate::domain::{BEARING_UNKNOWN, RealtimeArrival, VehiclePosition};

use super::client::FeedClient;

/// Public Roma Mobilità vehicle position feed.
pub const DEFAULT_VEHICLE_POSITIONS_URL: &str =
    "https://romamobilita.it/sites/default/files/rome_rtgtfs_vehicle_positions_feed.pb";

/// Public Roma Mobilità trip update feed.
pub const DEFAULT_TRIP_UPDATES_URL: &str =
    "https://romamobilita.it/sites/default/files/rome_rtgtfs_trip_updates_feed.pb";

/// Default period between poll cycles.
const DEFAULT_POLL_PERIOD: Duration = Duration::from_secs(30);

/// Configuration for the realtime poller.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub vehicle_positions_url: String,
    pub trip_updates_url: String,
    pub poll_period: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            vehicle_positions_url: DEFAULT_VEHICLE_POSITIONS_URL.to_string(),
            trip_updates_url: DEFAULT_TRIP_UPDATES_URL.to_string(),
            poll_period: DEFAULT_POLL_PERIOD,
        }
    }
}

impl PollerConfig {
    /// Set custom feed endpoints.
    pub fn with_urls(
        mut self,
        vehicle_positions_url: impl Into<String>,
        trip_updates_url: impl Into<String>,
    ) -> Self {
        self.vehicle_positions_url = vehicle_positions_url.into();
        self.trip_updates_url = trip_updates_url.into();
        self
    }

    /// Set a custom poll period.
    pub fn with_poll_period(mut self, period: Duration) -> Self {
        self.poll_period = period;
        self
    }
}

struct Shared {
    client: FeedClient,
    config: PollerConfig,
    vehicles: RwLock<HashMap<String, VehiclePosition>>,
    arrivals: RwLock<HashMap<String, Vec<RealtimeArrival>>>,
}

/// Polls the two feed resources and owns the live maps.
///
/// The maps are mutated only by the poll task and fully replaced per
/// successful cycle; readers take a snapshot under a read lock. The two
/// resources update independently: one failing never blocks the other,
/// and a failed resource keeps its previous cycle's data until the next
/// success.
pub struct RealtimePoller {
    shared: Arc<Shared>,
    shutdown: Mutex<Option<watch::Sender<bool>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl RealtimePoller {
    pub fn new(client: FeedClient, config: PollerConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                client,
                config,
                vehicles: RwLock::new(HashMap::new()),
                arrivals: RwLock::new(HashMap::new()),
            }),
            shutdown: Mutex::new(None),
        }
    }

    /// Start polling. The first cycle runs immediately. Idempotent.
    pub fn start(&self) {
        let mut slot = lock(&self.shutdown);
        if slot.is_some() {
            return;
        }

        let (tx, mut rx) = watch::channel(false);
        let shared = self.shared.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(shared.config.poll_period);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        shared.poll_cycle().await;
                    }
                    _ = rx.changed() => break,
                }
            }
        });

        *slot = Some(tx);
    }

    /// Stop polling. Idempotent. An in-flight cycle runs to completion;
    /// only the next scheduled one is prevented.
    pub fn stop(&self) {
        if let Some(tx) = lock(&self.shutdown).take() {
            let _ = tx.send(true);
        }
    }

    /// Whether the poll task is active.
    pub fn is_running(&self) -> bool {
        lock(&self.shutdown).is_some()
    }

    /// Snapshot of every live vehicle position.
    pub async fn vehicle_positions(&self) -> Vec<VehiclePosition> {
        self.shared.vehicles.read().await.values().cloned().collect()
    }

    /// Live predictions for a stop, earliest first. Empty when none.
    pub async fn arrivals_for_stop(&self, stop_id: &str) -> Vec<RealtimeArrival> {
        let mut list = self
            .shared
            .arrivals
            .read()
            .await
            .get(stop_id)
            .cloned()
            .unwrap_or_default();
        list.sort_by_key(|a| a.arrival_time);
        list
    }

    /// Whether any prediction is currently held for a stop.
    pub async fn has_arrivals_for(&self, stop_id: &str) -> bool {
        self.shared
            .arrivals
            .read()
            .await
            .get(stop_id)
            .is_some_and(|list| !list.is_empty())
    }

    /// Replace the vehicle map from an already-decoded feed.
    pub(crate) async fn ingest_vehicle_feed(&self, feed: &FeedMessage) {
        *self.shared.vehicles.write().await = collect_vehicle_positions(feed);
    }

    /// Replace the arrival map from an already-decoded feed, dropping
    /// predictions not strictly in the future of `now_epoch`.
    pub(crate) async fn ingest_trip_update_feed(&self, feed: &FeedMessage, now_epoch: i64) {
        *self.shared.arrivals.write().await = collect_arrivals(feed, now_epoch);
    }
}

impl Shared {
    async fn poll_cycle(&self) {
        self.update_vehicle_positions().await;
        self.update_trip_updates().await;
    }

    async fn update_vehicle_positions(&self) {
        match self.client.fetch_feed(&self.config.vehicle_positions_url).await {
            Ok(feed) => {
                let fresh = collect_vehicle_positions(&feed);
                info!(vehicles = fresh.len(), "live vehicle positions updated");
                *self.vehicles.write().await = fresh;
            }
            Err(e) => {
                warn!(error = %e, "vehicle position update failed; keeping previous data");
            }
        }
    }

    async fn update_trip_updates(&self) {
        let now_epoch = Utc::now().timestamp();
        match self.client.fetch_feed(&self.config.trip_updates_url).await {
            Ok(feed) => {
                let fresh = collect_arrivals(&feed, now_epoch);
                let predictions: usize = fresh.values().map(Vec::len).sum();
                info!(predictions, stops = fresh.len(), "live arrival predictions updated");
                *self.arrivals.write().await = fresh;
            }
            Err(e) => {
                warn!(error = %e, "trip update fetch failed; keeping previous data");
            }
        }
    }
}

/// Extract vehicle positions from a decoded feed.
///
/// Entities without a position or a vehicle id are skipped; a missing
/// bearing becomes the unknown sentinel. Occupancy fields carried by the
/// schema are deliberately not read.
fn collect_vehicle_positions(feed: &FeedMessage) -> HashMap<String, VehiclePosition> {
    let mut out = HashMap::new();

    for entity in &feed.entity {
        let Some(vehicle) = &entity.vehicle else {
            continue;
        };
        let Some(position) = &vehicle.position else {
            continue;
        };

        let vehicle_id = vehicle
            .vehicle
            .as_ref()
            .and_then(|descriptor| descriptor.id.clone())
            .unwrap_or_default();
        if vehicle_id.is_empty() {
            continue;
        }

        let route_id = vehicle
            .trip
            .as_ref()
            .and_then(|trip| trip.route_id.clone())
            .unwrap_or_default();

        out.insert(
            vehicle_id.clone(),
            VehiclePosition {
                vehicle_id,
                route_id,
                lat: f64::from(position.latitude),
                lon: f64::from(position.longitude),
                bearing: position.bearing.unwrap_or(BEARING_UNKNOWN),
            },
        );
    }

    out
}

/// Extract per-stop arrival predictions from a decoded feed.
///
/// Only stop-time updates carrying an arrival event with an absolute time
/// contribute; predictions at or before `now_epoch` are dropped at
/// ingestion.
fn collect_arrivals(feed: &FeedMessage, now_epoch: i64) -> HashMap<String, Vec<RealtimeArrival>> {
    let mut out: HashMap<String, Vec<RealtimeArrival>> = HashMap::new();

    for entity in &feed.entity {
        let Some(update) = &entity.trip_update else {
            continue;
        };
        let route_id = update.trip.route_id.clone().unwrap_or_default();

        for stop_update in &update.stop_time_update {
            let stop_id = stop_update.stop_id.clone().unwrap_or_default();
            let Some(arrival) = &stop_update.arrival else {
                continue;
            };
            let Some(arrival_time) = arrival.time else {
                continue;
            };
            if arrival_time <= now_epoch {
                continue;
            }

            out.entry(stop_id).or_default().push(RealtimeArrival {
                route_id: route_id.clone(),
                arrival_time,
                delay_secs: arrival.delay.unwrap_or(0),
            });
        }
    }

    out
}
