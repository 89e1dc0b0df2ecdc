pub mod csv_cache;

pub use csv_cache::CsvCache;

use chrono::NaiveDate;

use crate::error::Result;
use crate::models::ObservationRecord;

/// Durable store of raw observations, addressable as named tables.
///
/// Populated once per table; read on every run. Single writer per run;
/// once a table is committed it is read-only for the rest of the run.
pub trait ObservationCache {
    fn has(&self, table: &str) -> bool;

    /// Bulk write, replacing any existing contents of `table`.
    fn write(&self, table: &str, records: &[ObservationRecord]) -> Result<()>;

    /// Read rows whose timestamp falls on or after `date_floor`.
    fn read(&self, table: &str, date_floor: NaiveDate) -> Result<Vec<ObservationRecord>>;
}
