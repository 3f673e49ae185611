//! Realtime arrival prediction.

use std::fmt;

/// A live arrival prediction for one stop.
///
/// Predictions are recreated from scratch on every poll cycle; a cycle's
/// predictions fully replace the previous cycle's for that stop.
#[derive(Debug, Clone, PartialEq)]
pub struct RealtimeArrival {
    pub route_id: String,
    /// Predicted arrival as a unix timestamp in seconds.
    pub arrival_time: i64,
    /// Signed offset from the schedule in seconds; positive is late.
    pub delay_secs: i32,
}

impl RealtimeArrival {
    pub fn delay_status(&self) -> DelayStatus {
        DelayStatus::from_delay_secs(self.delay_secs)
    }
}

/// Bucketed delay classification for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayStatus {
    /// More than a minute early, by this many whole minutes.
    Early(u32),
    OnTime,
    /// More than a minute late, by this many whole minutes.
    Late(u32),
}

impl DelayStatus {
    /// Classify a signed delay in seconds. Offsets within a minute of the
    /// schedule count as on time.
    pub fn from_delay_secs(delay_secs: i32) -> Self {
        if delay_secs > 60 {
            DelayStatus::Late(delay_secs as u32 / 60)
        } else if delay_secs < -60 {
            DelayStatus::Early(delay_secs.unsigned_abs() / 60)
        } else {
            DelayStatus::OnTime
        }
    }
}

impl fmt::Display for DelayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DelayStatus::Early(mins) => write!(f, "-{mins} min"),
            DelayStatus::OnTime => write!(f, "on time"),
            DelayStatus::Late(mins) => write!(f, "+{mins} min"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_buckets_at_minute_boundary() {
        assert_eq!(DelayStatus::from_delay_secs(0), DelayStatus::OnTime);
        assert_eq!(DelayStatus::from_delay_secs(60), DelayStatus::OnTime);
        assert_eq!(DelayStatus::from_delay_secs(-60), DelayStatus::OnTime);
        assert_eq!(DelayStatus::from_delay_secs(61), DelayStatus::Late(1));
        assert_eq!(DelayStatus::from_delay_secs(-61), DelayStatus::Early(1));
        assert_eq!(DelayStatus::from_delay_secs(150), DelayStatus::Late(2));
        assert_eq!(DelayStatus::from_delay_secs(-3600), DelayStatus::Early(60));
    }

    #[test]
    fn delay_display() {
        assert_eq!(DelayStatus::from_delay_secs(30).to_string(), "on time");
        assert_eq!(DelayStatus::from_delay_secs(180).to_string(), "+3 min");
        assert_eq!(DelayStatus::from_delay_secs(-120).to_string(), "-2 min");
    }
}
