use chrono::NaiveDateTime;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// One parsed row of a raw observation file. Both measured columns are
/// carried; the sentinel missing marker has already been translated to
/// `None` by the reader, so downstream arithmetic never sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawObservation {
    pub station_id: u32,
    pub timestamp: NaiveDateTime,
    pub temperature: Option<f64>,
    pub cloud_cover: Option<f64>,
}

/// One cached row of a single measure's table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRecord {
    pub station_id: u32,
    pub timestamp: NaiveDateTime,
    pub value: Option<f64>,
}

impl ObservationRecord {
    pub fn new(station_id: u32, timestamp: NaiveDateTime, value: Option<f64>) -> Self {
        Self {
            station_id,
            timestamp,
            value,
        }
    }
}

/// The measured quantity a run operates on. Names the cache table and
/// selects the matching column of a [`RawObservation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Measure {
    Temperature,
    Cloudiness,
}

impl Measure {
    pub const ALL: [Measure; 2] = [Measure::Temperature, Measure::Cloudiness];

    pub fn table_name(&self) -> &'static str {
        match self {
            Measure::Temperature => "temperature",
            Measure::Cloudiness => "cloudiness",
        }
    }

    pub fn extract(&self, raw: &RawObservation) -> Option<f64> {
        match self {
            Measure::Temperature => raw.temperature,
            Measure::Cloudiness => raw.cloud_cover,
        }
    }
}

impl std::fmt::Display for Measure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table_name())
    }
}
