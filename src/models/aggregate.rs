use chrono::NaiveDate;
use clap::ValueEnum;
use h3o::CellIndex;

/// Per-station, per-date summary of the intra-day readings.
///
/// `count` is the number of present (non-missing) samples. Groups where
/// every sample was missing keep `None` extrema rather than a zero.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyAggregate {
    pub station_id: u32,
    pub date: NaiveDate,
    pub count: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl DailyAggregate {
    pub fn extremum(&self, which: Extremum) -> Option<f64> {
        match which {
            Extremum::Min => self.min,
            Extremum::Max => self.max,
        }
    }
}

/// Which daily extremum a run visualizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Extremum {
    Min,
    Max,
}

/// Daily value of one grid cell after merging co-located stations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellAggregate {
    pub cell: CellIndex,
    pub date: NaiveDate,
    pub value: f64,
}

/// One point of the rolling-mean series for a cell. `None` when every
/// sample inside the window was absent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothedPoint {
    pub cell: CellIndex,
    pub date: NaiveDate,
    pub value: Option<f64>,
}
