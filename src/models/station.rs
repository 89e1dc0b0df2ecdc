use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::DateRange;

/// One row of the fixed-width station metadata file, after parsing.
///
/// The validity interval `[valid_from, valid_to]` states the period for
/// which the station reported observations.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StationRecord {
    pub id: u32,

    #[validate(length(min = 1))]
    pub name: String,

    pub region: String,

    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,

    pub elevation: Option<i32>,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

impl StationRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: u32,
        name: String,
        region: String,
        valid_from: NaiveDate,
        valid_to: NaiveDate,
        elevation: Option<i32>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            id,
            name,
            region,
            valid_from,
            valid_to,
            elevation,
            latitude,
            longitude,
        }
    }

    /// A station qualifies for an analysis period only when its validity
    /// interval covers the period entirely.
    pub fn covers(&self, period: &DateRange) -> bool {
        self.valid_from <= period.start && self.valid_to >= period.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_station() -> StationRecord {
        StationRecord::new(
            403,
            "Berlin-Dahlem".to_string(),
            "Berlin".to_string(),
            date(1950, 1, 1),
            date(2023, 12, 31),
            Some(51),
            52.4537,
            13.3017,
        )
    }

    #[test]
    fn test_station_validation() {
        let station = sample_station();
        assert!(station.validate().is_ok());
    }

    #[test]
    fn test_invalid_coordinates() {
        let mut station = sample_station();
        station.latitude = 91.0;
        assert!(station.validate().is_err());
    }

    #[test]
    fn test_covers_requires_full_interval() {
        let station = sample_station();

        let inside = DateRange::new(date(2000, 1, 1), date(2000, 12, 31)).unwrap();
        assert!(station.covers(&inside));

        let starts_too_early = DateRange::new(date(1949, 6, 1), date(1950, 6, 1)).unwrap();
        assert!(!station.covers(&starts_too_early));

        let ends_too_late = DateRange::new(date(2023, 6, 1), date(2024, 6, 1)).unwrap();
        assert!(!station.covers(&ends_too_late));
    }
}
