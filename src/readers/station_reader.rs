use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use encoding_rs::WINDOWS_1252;
use tracing::warn;
use validator::Validate;

use crate::error::{PipelineError, Result};
use crate::models::{DateRange, StationRecord};
use crate::utils::constants::{STATION_COLUMN_WIDTHS, STATION_DATE_FORMAT};

/// Parses the fixed-width station metadata file.
///
/// The file is Latin-1 encoded with header and separator rows before the
/// data. Malformed rows are dropped with a diagnostic; they never abort
/// the load.
pub struct StationReader {
    skip_headers: bool,
}

impl StationReader {
    pub fn new() -> Self {
        Self { skip_headers: true }
    }

    pub fn with_skip_headers(skip_headers: bool) -> Self {
        Self { skip_headers }
    }

    pub fn read_stations(&self, path: &Path) -> Result<Vec<StationRecord>> {
        let bytes = fs::read(path)?;
        let (text, _, _) = WINDOWS_1252.decode(&bytes);

        let mut stations = Vec::new();
        let mut dropped = 0usize;

        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }

            // Header and separator rows never start with a station id.
            if self.skip_headers
                && !line
                    .trim_start()
                    .chars()
                    .next()
                    .unwrap_or(' ')
                    .is_ascii_digit()
            {
                continue;
            }

            match self.parse_station_line(line) {
                Ok(Some(station)) => {
                    if let Err(e) = station.validate() {
                        warn!(station_id = station.id, "Dropping invalid station row: {e}");
                        dropped += 1;
                        continue;
                    }
                    stations.push(station);
                }
                Ok(None) => dropped += 1,
                Err(e) => {
                    warn!("Dropping malformed station row: {e}");
                    dropped += 1;
                }
            }
        }

        if dropped > 0 {
            warn!(dropped, "Skipped unparsable station metadata rows");
        }

        Ok(stations)
    }

    /// Keep only stations whose validity interval fully covers `period`.
    pub fn filter_covering(
        stations: Vec<StationRecord>,
        period: &DateRange,
    ) -> Vec<StationRecord> {
        stations.into_iter().filter(|s| s.covers(period)).collect()
    }

    /// Parse one fixed-width data row. Returns `Ok(None)` for rows too
    /// short to hold the coordinate columns.
    fn parse_station_line(&self, line: &str) -> Result<Option<StationRecord>> {
        let fields = split_fixed_width(line, &STATION_COLUMN_WIDTHS);

        // id, from, to, elevation, lat, lon are mandatory.
        if fields[5].is_empty() {
            return Ok(None);
        }

        let id = fields[0].parse::<u32>().map_err(|_| {
            PipelineError::InvalidFormat(format!("Invalid station id: '{}'", fields[0]))
        })?;

        let valid_from = NaiveDate::parse_from_str(&fields[1], STATION_DATE_FORMAT)?;
        let valid_to = NaiveDate::parse_from_str(&fields[2], STATION_DATE_FORMAT)?;

        let elevation = if fields[3].is_empty() || fields[3] == "-999" {
            None
        } else {
            Some(fields[3].parse::<i32>().map_err(|_| {
                PipelineError::InvalidFormat(format!("Invalid elevation: '{}'", fields[3]))
            })?)
        };

        let latitude = fields[4].parse::<f64>().map_err(|_| {
            PipelineError::InvalidCoordinate(format!("Invalid latitude: '{}'", fields[4]))
        })?;
        let longitude = fields[5].parse::<f64>().map_err(|_| {
            PipelineError::InvalidCoordinate(format!("Invalid longitude: '{}'", fields[5]))
        })?;

        let name = fields[6].clone();
        let region = fields[7].clone();
        // fields[8] is the release flag; it carries no semantics here.

        Ok(Some(StationRecord::new(
            id, name, region, valid_from, valid_to, elevation, latitude, longitude,
        )))
    }
}

impl Default for StationReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Slice a line into trimmed columns of the given character widths.
/// Columns beyond the end of the line come back empty.
fn split_fixed_width(line: &str, widths: &[usize]) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    let mut fields = Vec::with_capacity(widths.len());
    let mut offset = 0usize;

    for &width in widths {
        if offset >= chars.len() {
            fields.push(String::new());
        } else {
            let end = (offset + width).min(chars.len());
            let field: String = chars[offset..end].iter().collect();
            fields.push(field.trim().to_string());
        }
        offset += width;
    }

    fields
}
