//! Online/offline state machine.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info};

use super::probe::Probe;

/// Default period between background checks.
const DEFAULT_CHECK_PERIOD: Duration = Duration::from_secs(15);

/// Callback invoked with `(is_online, is_first_check)`.
pub type ConnectivityListener = Box<dyn Fn(bool, bool) + Send + Sync>;

/// Configuration for the connectivity monitor.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Period between background probes.
    pub check_period: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            check_period: DEFAULT_CHECK_PERIOD,
        }
    }
}

impl MonitorConfig {
    /// Set a custom check period.
    pub fn with_check_period(mut self, period: Duration) -> Self {
        self.check_period = period;
        self
    }
}

struct Inner {
    probe: Box<dyn Probe>,
    online: AtomicBool,
    first_check_done: AtomicBool,
    listeners: Mutex<HashMap<String, ConnectivityListener>>,
}

/// Tracks network reachability and notifies listeners on transitions.
///
/// Constructed explicitly and shared by handle; every component needing
/// connectivity state receives a clone of the `Arc` that owns it. The
/// state starts OFFLINE; callers run one explicit [`check_now`] at startup
/// before trusting any feed decision, then [`start`] the periodic checks.
///
/// [`check_now`]: ConnectivityMonitor::check_now
/// [`start`]: ConnectivityMonitor::start
pub struct ConnectivityMonitor {
    inner: Arc<Inner>,
    config: MonitorConfig,
    shutdown: Mutex<Option<watch::Sender<bool>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ConnectivityMonitor {
    pub fn new(probe: impl Probe, config: MonitorConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                probe: Box::new(probe),
                online: AtomicBool::new(false),
                first_check_done: AtomicBool::new(false),
                listeners: Mutex::new(HashMap::new()),
            }),
            config,
            shutdown: Mutex::new(None),
        }
    }

    /// Last observed state. Offline until the first check completes.
    pub fn is_online(&self) -> bool {
        self.inner.online.load(Ordering::SeqCst)
    }

    /// Run one probe now and notify listeners if warranted.
    ///
    /// Listeners fire on a state change, and on the very first completed
    /// check regardless of its result. A repeated check confirming the
    /// same state stays silent.
    pub async fn check_now(&self) -> bool {
        self.inner.run_check().await
    }

    /// Register a listener under a key. Registering an existing key is a
    /// no-op, so double registration cannot produce double notification.
    pub fn add_listener(
        &self,
        key: impl Into<String>,
        listener: impl Fn(bool, bool) + Send + Sync + 'static,
    ) {
        lock(&self.inner.listeners)
            .entry(key.into())
            .or_insert_with(|| Box::new(listener));
    }

    /// Remove a listener. Removing an unknown key is a no-op.
    pub fn remove_listener(&self, key: &str) {
        lock(&self.inner.listeners).remove(key);
    }

    /// Start the periodic background checks. Idempotent.
    ///
    /// The first periodic check runs one full period after start; the
    /// startup check is the caller's explicit [`check_now`].
    ///
    /// [`check_now`]: ConnectivityMonitor::check_now
    pub fn start(&self) {
        let mut slot = lock(&self.shutdown);
        if slot.is_some() {
            return;
        }

        let (tx, mut rx) = watch::channel(false);
        let inner = self.inner.clone();
        let period = self.config.check_period;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The immediate first tick is consumed here; the startup check
            // already ran synchronously.
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        inner.run_check().await;
                    }
                    _ = rx.changed() => break,
                }
            }
        });

        *slot = Some(tx);
    }

    /// Stop the periodic checks. Idempotent; an in-flight check completes.
    pub fn stop(&self) {
        if let Some(tx) = lock(&self.shutdown).take() {
            let _ = tx.send(true);
        }
    }

    /// Whether the periodic background task is active.
    pub fn is_running(&self) -> bool {
        lock(&self.shutdown).is_some()
    }
}

impl Inner {
    async fn run_check(&self) -> bool {
        let online = self.probe.check().await;
        let previous = self.online.swap(online, Ordering::SeqCst);
        let first = !self.first_check_done.swap(true, Ordering::SeqCst);

        if online != previous {
            info!(online, "connectivity state changed");
        } else {
            debug!(online, "connectivity state confirmed");
        }

        if online != previous || first {
            let listeners = lock(&self.listeners);
            for listener in listeners.values() {
                listener(online, first);
            }
        }

        online
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::ScriptProbe;
    use super::*;

    fn recording_monitor(
        results: &[bool],
    ) -> (ConnectivityMonitor, Arc<Mutex<Vec<(bool, bool)>>>) {
        let monitor =
            ConnectivityMonitor::new(ScriptProbe::new(results), MonitorConfig::default());
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        monitor.add_listener("recorder", move |online, first| {
            lock(&sink).push((online, first));
        });
        (monitor, events)
    }

    #[test]
    fn initial_state_is_offline() {
        let monitor =
            ConnectivityMonitor::new(ScriptProbe::new(&[true]), MonitorConfig::default());
        assert!(!monitor.is_online());
    }

    #[tokio::test]
    async fn notifies_on_first_check_and_transitions_only() {
        let (monitor, events) = recording_monitor(&[false, false, true, true, false]);

        for _ in 0..5 {
            monitor.check_now().await;
        }

        // Checks 0 (first), 2 (offline to online) and 4 (online to
        // offline) notify; 1 and 3 confirm an unchanged state silently.
        let events = lock(&events).clone();
        assert_eq!(events, [(false, true), (true, false), (false, false)]);
    }

    #[tokio::test]
    async fn first_check_notifies_even_when_state_does_not_change() {
        let (monitor, events) = recording_monitor(&[false]);

        monitor.check_now().await;

        assert_eq!(lock(&events).as_slice(), [(false, true)]);
        assert!(!monitor.is_online());
    }

    #[tokio::test]
    async fn check_now_reports_and_stores_the_new_state() {
        let monitor =
            ConnectivityMonitor::new(ScriptProbe::new(&[true, false]), MonitorConfig::default());

        assert!(monitor.check_now().await);
        assert!(monitor.is_online());

        assert!(!monitor.check_now().await);
        assert!(!monitor.is_online());
    }

    #[tokio::test]
    async fn adding_a_listener_twice_is_a_no_op() {
        let monitor =
            ConnectivityMonitor::new(ScriptProbe::new(&[true]), MonitorConfig::default());
        let count = Arc::new(Mutex::new(0u32));

        let sink = count.clone();
        monitor.add_listener("dup", move |_, _| *lock(&sink) += 1);
        let sink = count.clone();
        monitor.add_listener("dup", move |_, _| *lock(&sink) += 1);

        monitor.check_now().await;

        assert_eq!(*lock(&count), 1);
    }

    #[tokio::test]
    async fn removed_listener_no_longer_fires() {
        let (monitor, events) = recording_monitor(&[false, true]);

        monitor.check_now().await;
        monitor.remove_listener("recorder");
        monitor.remove_listener("recorder");
        monitor.check_now().await;

        assert_eq!(lock(&events).as_slice(), [(false, true)]);
    }

    #[tokio::test]
    async fn start_and_stop_are_idempotent() {
        let monitor = ConnectivityMonitor::new(
            ScriptProbe::new(&[]),
            MonitorConfig::default().with_check_period(Duration::from_secs(3600)),
        );

        monitor.start();
        monitor.start();
        assert!(monitor.is_running());

        monitor.stop();
        monitor.stop();
        assert!(!monitor.is_running());
    }
}
