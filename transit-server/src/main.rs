use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use transit_server::arrivals::ArrivalBoard;
use transit_server::config::AppConfig;
use transit_server::connectivity::{ConnectivityMonitor, MonitorConfig, TcpProbe};
use transit_server::gtfs::{ScheduleIndex, load_schedule};
use transit_server::realtime::{FeedClient, PollerConfig, RealtimePoller};
use transit_server::simulator::{SimulatedPositions, SimulationConfig};
use transit_server::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env();

    // Load and index the static schedule before serving anything.
    let data_dir = config.data_dir.clone();
    let schedule = tokio::task::spawn_blocking(move || load_schedule(&data_dir))
        .await
        .expect("schedule load task panicked");
    let index = Arc::new(ScheduleIndex::build(schedule));

    // Connectivity: one explicit check before any feed decision is
    // trusted, then periodic background checks.
    let monitor = Arc::new(ConnectivityMonitor::new(
        TcpProbe::new(config.probe_host.clone(), config.probe_port),
        MonitorConfig::default().with_check_period(config.check_period),
    ));

    let feed_client = FeedClient::new().expect("failed to create feed client");
    let poller = Arc::new(RealtimePoller::new(
        feed_client,
        PollerConfig::default()
            .with_urls(
                config.vehicle_positions_url.clone(),
                config.trip_updates_url.clone(),
            )
            .with_poll_period(config.poll_period),
    ));

    // The poller runs only while online; connectivity transitions gate it.
    {
        let poller = poller.clone();
        monitor.add_listener("realtime-poller", move |online, _first_check| {
            if online {
                poller.start();
            } else {
                poller.stop();
            }
        });
    }

    monitor.check_now().await;
    monitor.start();

    let simulator = Arc::new(SimulatedPositions::new(
        index.clone(),
        SimulationConfig::default(),
    ));
    let board = Arc::new(ArrivalBoard::new(
        index.clone(),
        monitor.clone(),
        poller.clone(),
    ));

    let state = AppState::new(index, monitor, poller, simulator, board);
    let app = create_router(state);

    info!(addr = %config.listen_addr, "transit server listening");
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .expect("failed to bind listen address");
    axum::serve(listener, app).await.expect("server error");
}
