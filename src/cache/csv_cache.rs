use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::cache::ObservationCache;
use crate::error::{PipelineError, Result};
use crate::models::ObservationRecord;

/// CSV-backed observation cache: one file per table under the cache
/// root. Absent values round-trip as empty fields.
pub struct CsvCache {
    root: PathBuf,
}

impl CsvCache {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    fn table_path(&self, table: &str) -> PathBuf {
        self.root.join(format!("{table}.csv"))
    }
}

impl ObservationCache for CsvCache {
    fn has(&self, table: &str) -> bool {
        self.table_path(table).is_file()
    }

    fn write(&self, table: &str, records: &[ObservationRecord]) -> Result<()> {
        let mut writer = csv::Writer::from_path(self.table_path(table))?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }

    fn read(&self, table: &str, date_floor: NaiveDate) -> Result<Vec<ObservationRecord>> {
        let path = self.table_path(table);
        if !path.is_file() {
            return Err(PipelineError::Cache(format!(
                "Table '{table}' does not exist; run ingestion first"
            )));
        }

        let mut reader = csv::Reader::from_path(&path)?;
        let mut records = Vec::new();
        for row in reader.deserialize() {
            let record: ObservationRecord = row?;
            if record.timestamp.date() >= date_floor {
                records.push(record);
            }
        }

        Ok(records)
    }
}
