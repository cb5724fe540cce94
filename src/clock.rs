//! Wall-clock time in the controller's zone.

use jiff::{Timestamp, civil::DateTime, tz::TimeZone};

/// Resolves "now" as a civil date-time in a fixed time zone.
#[derive(Debug, Clone)]
pub struct Clock {
    tz: TimeZone,
}

impl Clock {
    pub fn new(tz: TimeZone) -> Self {
        Self { tz }
    }

    /// The host's configured zone.
    pub fn system() -> Self {
        Self::new(TimeZone::system())
    }

    /// An IANA zone by name, e.g. `Australia/Canberra`.
    pub fn in_zone(name: &str) -> Result<Self, jiff::Error> {
        TimeZone::get(name).map(Self::new)
    }

    pub fn now(&self) -> DateTime {
        self.at(Timestamp::now())
    }

    pub fn at(&self, timestamp: Timestamp) -> DateTime {
        timestamp.to_zoned(self.tz.clone()).datetime()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::{civil::date, tz};

    #[test]
    fn converts_into_zone() {
        let clock = Clock::new(TimeZone::fixed(tz::offset(10)));
        let timestamp: Timestamp = "2024-06-01T04:30:00Z".parse().unwrap();

        assert_eq!(clock.at(timestamp), date(2024, 6, 1).at(14, 30, 0, 0));
    }

    #[test]
    fn date_rolls_over_with_offset() {
        let clock = Clock::new(TimeZone::fixed(tz::offset(10)));
        let timestamp: Timestamp = "2024-06-01T20:00:00Z".parse().unwrap();

        assert_eq!(clock.at(timestamp).date(), date(2024, 6, 2));
    }

    #[test]
    fn unknown_zone_is_rejected() {
        assert!(Clock::in_zone("Nowhere/Atlantis").is_err());
    }
}
