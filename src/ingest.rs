use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::archive::{ArchiveExtractor, ArchiveSource};
use crate::cache::ObservationCache;
use crate::error::{PipelineError, Result};
use crate::models::{Measure, ObservationRecord};
use crate::readers::ObservationReader;
use crate::utils::ProgressReporter;

/// What one ingestion run did, for the console summary and the JSON
/// report written next to the cache.
#[derive(Debug, Default, Serialize)]
pub struct IngestSummary {
    pub archives_found: usize,
    pub archives_ingested: usize,
    pub archives_skipped: Vec<String>,
    pub tables_reused: Vec<String>,
    pub tables_written: Vec<String>,
    pub rows_cached: usize,
    pub rows_dropped: usize,
}

impl IngestSummary {
    pub fn console_summary(&self) -> String {
        let mut lines = vec![format!(
            "Archives: {} found, {} ingested, {} skipped",
            self.archives_found,
            self.archives_ingested,
            self.archives_skipped.len()
        )];
        for name in &self.archives_skipped {
            lines.push(format!("  skipped: {name}"));
        }
        if !self.tables_reused.is_empty() {
            lines.push(format!("Tables reused: {}", self.tables_reused.join(", ")));
        }
        if !self.tables_written.is_empty() {
            lines.push(format!(
                "Tables written: {} ({} rows, {} rows dropped)",
                self.tables_written.join(", "),
                self.rows_cached,
                self.rows_dropped
            ));
        }
        lines.join("\n")
    }
}

/// Populates the observation cache from an archive source. One table per
/// measure; tables that already exist are reused, which makes a
/// cancelled run resumable without re-parsing archives.
pub struct Ingestor<'a, C: ObservationCache> {
    cache: &'a C,
    reader: ObservationReader,
    force: bool,
}

impl<'a, C: ObservationCache> Ingestor<'a, C> {
    pub fn new(cache: &'a C) -> Self {
        Self {
            cache,
            reader: ObservationReader::new(),
            force: false,
        }
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.reader = ObservationReader::new().with_mmap(use_mmap);
        self
    }

    pub fn ingest(
        &self,
        source: &dyn ArchiveSource,
        progress: Option<&ProgressReporter>,
    ) -> Result<IngestSummary> {
        let mut summary = IngestSummary::default();

        let missing: Vec<Measure> = Measure::ALL
            .iter()
            .copied()
            .filter(|m| self.force || !self.cache.has(m.table_name()))
            .collect();
        summary.tables_reused = Measure::ALL
            .iter()
            .filter(|m| !missing.contains(*m))
            .map(|m| m.table_name().to_string())
            .collect();

        if missing.is_empty() {
            info!("All cache tables present; skipping ingestion");
            return Ok(summary);
        }

        let archives = source.discover()?;
        summary.archives_found = archives.len();
        if archives.is_empty() {
            return Err(PipelineError::NoData(
                "No observation archives found in the source directory".to_string(),
            ));
        }

        let extractor = ArchiveExtractor::new()?;
        let mut tables: HashMap<Measure, Vec<ObservationRecord>> = HashMap::new();

        for archive in &archives {
            if let Some(p) = progress {
                p.set_message(&format!("Ingesting station {:05}", archive.station_id));
            }

            let parsed = match extractor
                .extract_data_member(archive)
                .and_then(|path| self.reader.read_observations(&path))
            {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!(
                        station_id = archive.station_id,
                        "Skipping unreadable archive: {e}"
                    );
                    summary.archives_skipped.push(
                        archive
                            .path
                            .file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or_else(|| archive.path.display().to_string()),
                    );
                    continue;
                }
            };

            summary.rows_dropped += parsed.dropped_rows;
            for record in &parsed.records {
                for &measure in &missing {
                    tables.entry(measure).or_default().push(ObservationRecord::new(
                        record.station_id,
                        record.timestamp,
                        measure.extract(record),
                    ));
                }
            }

            summary.archives_ingested += 1;
            if let Some(p) = progress {
                p.increment(1);
            }
        }

        if summary.archives_ingested == 0 {
            return Err(PipelineError::NoData(
                "Every discovered archive failed to ingest".to_string(),
            ));
        }

        for measure in &missing {
            let mut rows = tables.remove(measure).unwrap_or_default();
            rows.sort_by_key(|r| (r.station_id, r.timestamp));
            summary.rows_cached += rows.len();
            self.cache.write(measure.table_name(), &rows)?;
            summary.tables_written.push(measure.table_name().to_string());
        }

        Ok(summary)
    }
}

/// Write the ingest summary as JSON for later inspection.
pub fn write_report(summary: &IngestSummary, path: &Path) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, summary)?;
    Ok(())
}
