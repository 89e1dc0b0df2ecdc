use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use memmap2::Mmap;
use tracing::warn;

use crate::error::{PipelineError, Result};
use crate::models::RawObservation;
use crate::utils::constants::{DEFAULT_BUFFER_SIZE, SENTINEL_MISSING, STATION_DATE_FORMAT};

/// Result of parsing one observation file: the usable records plus how
/// many rows had to be dropped.
#[derive(Debug, Default)]
pub struct ParsedObservations {
    pub records: Vec<RawObservation>,
    pub dropped_rows: usize,
}

/// Parses `;`-delimited sub-daily observation files.
///
/// Row layout: station id; timestamp (`YYYYMMDDHH` or `YYYYMMDD`);
/// quality flag; temperature; cloud cover. The sentinel missing marker
/// (−999) is translated to `None` here, at the ingestion boundary, and
/// nowhere else.
pub struct ObservationReader {
    skip_headers: bool,
    use_mmap: bool,
}

impl ObservationReader {
    pub fn new() -> Self {
        Self {
            skip_headers: true,
            use_mmap: false,
        }
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    pub fn read_observations(&self, path: &Path) -> Result<ParsedObservations> {
        if self.use_mmap {
            self.read_observations_mmap(path)
        } else {
            self.read_observations_buffered(path)
        }
    }

    fn read_observations_buffered(&self, path: &Path) -> Result<ParsedObservations> {
        let file = File::open(path)?;
        let reader = BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file);

        let mut parsed = ParsedObservations::default();
        for line_result in reader.lines() {
            let line = line_result?;
            self.consume_line(&line, &mut parsed);
        }

        Ok(parsed)
    }

    /// Memory-mapped fast path for large observation files.
    fn read_observations_mmap(&self, path: &Path) -> Result<ParsedObservations> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        let content = std::str::from_utf8(&mmap)
            .map_err(|e| PipelineError::InvalidFormat(format!("Invalid UTF-8: {e}")))?;

        let mut parsed = ParsedObservations::default();
        for line in content.lines() {
            self.consume_line(line, &mut parsed);
        }

        Ok(parsed)
    }

    fn consume_line(&self, line: &str, parsed: &mut ParsedObservations) {
        if line.trim().is_empty() {
            return;
        }

        // The header row starts with a column name, not a station id.
        if self.skip_headers
            && !line
                .trim_start()
                .chars()
                .next()
                .unwrap_or(' ')
                .is_ascii_digit()
        {
            return;
        }

        match self.parse_observation_line(line) {
            Ok(Some(record)) => parsed.records.push(record),
            Ok(None) => parsed.dropped_rows += 1,
            Err(e) => {
                warn!("Dropping malformed observation row: {e}");
                parsed.dropped_rows += 1;
            }
        }
    }

    /// Parse one data row. Returns `Ok(None)` for rows with too few
    /// columns.
    fn parse_observation_line(&self, line: &str) -> Result<Option<RawObservation>> {
        let parts: Vec<&str> = line.split(';').map(|s| s.trim()).collect();

        if parts.len() < 5 {
            return Ok(None);
        }

        let station_id = parts[0].parse::<u32>().map_err(|_| {
            PipelineError::InvalidFormat(format!("Invalid station id: '{}'", parts[0]))
        })?;

        let timestamp = parse_timestamp(parts[1])?;
        // parts[2] is the quality flag; all released rows pass here.
        let temperature = parse_value(parts[3])?;
        let cloud_cover = parse_value(parts[4])?;

        Ok(Some(RawObservation {
            station_id,
            timestamp,
            temperature,
            cloud_cover,
        }))
    }
}

impl Default for ObservationReader {
    fn default() -> Self {
        Self::new()
    }
}

/// `YYYYMMDDHH` with an optional hour suffix; hour-less rows land on
/// midnight.
fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    let date_part = raw.get(..8).ok_or_else(|| {
        PipelineError::InvalidFormat(format!("Timestamp too short: '{raw}'"))
    })?;
    let date = NaiveDate::parse_from_str(date_part, STATION_DATE_FORMAT)?;

    let hour = match raw.get(8..10) {
        Some(h) => h.parse::<u32>().map_err(|_| {
            PipelineError::InvalidFormat(format!("Invalid hour in timestamp: '{raw}'"))
        })?,
        None => 0,
    };

    date.and_hms_opt(hour, 0, 0)
        .ok_or_else(|| PipelineError::InvalidFormat(format!("Invalid hour in timestamp: '{raw}'")))
}

/// Numeric column with the sentinel missing marker mapped to `None`.
fn parse_value(raw: &str) -> Result<Option<f64>> {
    if raw.is_empty() {
        return Ok(None);
    }

    let value = raw
        .parse::<f64>()
        .map_err(|_| PipelineError::InvalidFormat(format!("Invalid measurement: '{raw}'")))?;

    if value == SENTINEL_MISSING {
        Ok(None)
    } else {
        Ok(Some(value))
    }
}
