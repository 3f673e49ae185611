//! Service-day time handling.

use std::fmt;

/// Seconds in one day.
pub const SECS_PER_DAY: u32 = 86_400;

/// Error returned when parsing an invalid service time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid service time: {reason}")]
pub struct InvalidServiceTime {
    reason: &'static str,
}

/// A time of day on a GTFS service day, as seconds from midnight.
///
/// Schedules denote service running past midnight with hour values of 24
/// and above (`25:10:00` is 01:10 the following morning). The hour is kept
/// as an explicit offset into the next day, so `25:10:00` parses to 90600
/// seconds; it is never wrapped back onto the same day.
///
/// Because schedule strings are zero-padded, their lexicographic order
/// agrees with the numeric order of the parsed values, which is what lets
/// the index sort arrivals on the verbatim strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServiceTime(u32);

impl ServiceTime {
    /// Parse a zero-padded `HH:MM:SS` string. Hours may exceed 23.
    pub fn parse(s: &str) -> Result<Self, InvalidServiceTime> {
        let mut parts = s.trim().splitn(4, ':');
        let (Some(h), Some(m), Some(sec), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(InvalidServiceTime {
                reason: "expected HH:MM:SS",
            });
        };

        let h: u32 = h.parse().map_err(|_| InvalidServiceTime {
            reason: "hours not numeric",
        })?;
        let m: u32 = m.parse().map_err(|_| InvalidServiceTime {
            reason: "minutes not numeric",
        })?;
        let sec: u32 = sec.parse().map_err(|_| InvalidServiceTime {
            reason: "seconds not numeric",
        })?;

        if m > 59 {
            return Err(InvalidServiceTime {
                reason: "minutes out of range",
            });
        }
        if sec > 59 {
            return Err(InvalidServiceTime {
                reason: "seconds out of range",
            });
        }

        Ok(ServiceTime(h * 3600 + m * 60 + sec))
    }

    /// Seconds since midnight of the service day. May exceed one day.
    pub fn seconds(self) -> u32 {
        self.0
    }

    /// Whether this time falls past midnight into the following day.
    pub fn is_next_day(self) -> bool {
        self.0 >= SECS_PER_DAY
    }
}

impl fmt::Display for ServiceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.0 / 3600,
            self.0 % 3600 / 60,
            self.0 % 60
        )
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn parses_ordinary_times() {
        assert_eq!(ServiceTime::parse("00:00:00").unwrap().seconds(), 0);
        assert_eq!(ServiceTime::parse("08:30:15").unwrap().seconds(), 30_615);
        assert_eq!(ServiceTime::parse("23:59:59").unwrap().seconds(), 86_399);
    }

    #[test]
    fn keeps_day_offset_past_midnight() {
        let after_midnight = ServiceTime::parse("24:01:00").unwrap();
        assert_eq!(after_midnight.seconds(), 86_460);
        assert!(after_midnight.is_next_day());

        let later = ServiceTime::parse("25:10:00").unwrap();
        assert_eq!(later.seconds(), 90_600);
        assert!(ServiceTime::parse("01:10:00").unwrap() < later);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(ServiceTime::parse("").is_err());
        assert!(ServiceTime::parse("08:30").is_err());
        assert!(ServiceTime::parse("08:30:15:00").is_err());
        assert!(ServiceTime::parse("08:61:00").is_err());
        assert!(ServiceTime::parse("08:00:60").is_err());
        assert!(ServiceTime::parse("-1:00:00").is_err());
        assert!(ServiceTime::parse("abc").is_err());
    }

    #[test]
    fn displays_zero_padded() {
        let t = ServiceTime::parse("07:05:09").unwrap();
        assert_eq!(t.to_string(), "07:05:09");
        assert_eq!(ServiceTime::parse("25:10:00").unwrap().to_string(), "25:10:00");
    }

    proptest! {
        #[test]
        fn lexicographic_order_agrees_with_numeric(
            h1 in 0u32..48, m1 in 0u32..60, s1 in 0u32..60,
            h2 in 0u32..48, m2 in 0u32..60, s2 in 0u32..60,
        ) {
            let a = format!("{h1:02}:{m1:02}:{s1:02}");
            let b = format!("{h2:02}:{m2:02}:{s2:02}");
            let ta = ServiceTime::parse(&a).unwrap();
            let tb = ServiceTime::parse(&b).unwrap();
            prop_assert_eq!(a.cmp(&b), ta.cmp(&tb));
        }
    }
}
