use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use image::AnimationDecoder;
use tempfile::TempDir;
use zip::write::FileOptions;
use zip::ZipWriter;

use dwd_hexmap::archive::LocalDirSource;
use dwd_hexmap::cache::{CsvCache, ObservationCache};
use dwd_hexmap::config::RunConfig;
use dwd_hexmap::error::Result;
use dwd_hexmap::ingest::Ingestor;
use dwd_hexmap::models::Measure;
use dwd_hexmap::pipeline::{aggregate_daily, PipelineRunner};

fn station_line(id: u32, lat: f64, lon: f64, name: &str) -> String {
    format!(
        "{:<6}{:<9}{:<9}{:<15}{:<12}{:<10}{:<41}{:<41}{:<5}",
        id, "19500101", "20301231", "51", lat, lon, name, "Berlin", "Frei"
    )
}

fn write_stations_file(dir: &Path) -> PathBuf {
    let path = dir.join("stations.txt");
    let mut file = File::create(&path).unwrap();
    writeln!(
        file,
        "Stations_id von_datum bis_datum Stationshoehe geoBreite geoLaenge Stationsname Bundesland Abgabe"
    )
    .unwrap();
    writeln!(file, "----------- --------- ---------").unwrap();
    writeln!(file, "{}", station_line(403, 52.4537, 13.3017, "Berlin-Dahlem")).unwrap();
    writeln!(file, "{}", station_line(3379, 48.1351, 11.5820, "Muenchen-Stadt")).unwrap();
    path
}

/// Ten consecutive July days with two intra-day readings each, except:
/// day 4 of station 403 carries an extra sentinel reading, and day 10
/// has a single reading for both stations (too little evidence for a
/// daily extremum).
fn observation_rows(station_id: u32) -> String {
    let mut rows = String::new();
    for day in 1..=9 {
        rows.push_str(&format!(
            "{station_id};202307{day:02}07;1;{};4.0;eor\n",
            10 + day
        ));
        rows.push_str(&format!(
            "{station_id};202307{day:02}14;1;{};6.0;eor\n",
            20 + day
        ));
    }
    if station_id == 403 {
        rows.push_str(&format!("{station_id};2023070421;1;-999;-999;eor\n"));
    }
    rows.push_str(&format!("{station_id};2023071007;1;25.0;5.0;eor\n"));
    rows
}

fn write_archive(dir: &Path, station_id: u32) -> PathBuf {
    let path = dir.join(format!("stundenwerte_TU_{station_id:05}_terminwerte.zip"));
    let file = File::create(&path).unwrap();
    let mut writer = ZipWriter::new(file);
    writer
        .start_file(
            format!("produkt_tu_termin_{station_id:05}.txt"),
            FileOptions::default(),
        )
        .unwrap();
    writer
        .write_all(b"STATIONS_ID;MESS_DATUM;QN_4;TT_TER;N_TER;eor\n")
        .unwrap();
    writer
        .write_all(observation_rows(station_id).as_bytes())
        .unwrap();
    writer.finish().unwrap();
    path
}

#[tokio::test]
async fn test_end_to_end_scenario() -> Result<()> {
    let dir = TempDir::new()?;
    let input_dir = dir.path().join("archives");
    std::fs::create_dir_all(&input_dir)?;
    write_archive(&input_dir, 403);
    write_archive(&input_dir, 3379);
    let stations_file = write_stations_file(dir.path());
    let cache_dir = dir.path().join("cache");
    let output_dir = dir.path().join("output");

    // Ingest both archives into both measure tables.
    let cache = CsvCache::new(&cache_dir)?;
    let summary = Ingestor::new(&cache).ingest(&LocalDirSource::new(&input_dir), None)?;
    assert_eq!(summary.archives_ingested, 2);

    // The sentinel reading survives ingestion as an absent value.
    let observations = cache.read("temperature", NaiveDate::MIN)?;
    let sentinel_row = observations
        .iter()
        .find(|r| {
            r.station_id == 403
                && r.timestamp
                    == NaiveDate::from_ymd_opt(2023, 7, 4)
                        .unwrap()
                        .and_hms_opt(21, 0, 0)
                        .unwrap()
        })
        .expect("sentinel row should be cached");
    assert_eq!(sentinel_row.value, None);

    // Nine daily aggregates per station: day 10 has a single reading.
    let aggregates = aggregate_daily(&observations);
    let per_station = |id: u32| aggregates.iter().filter(|a| a.station_id == id).count();
    assert_eq!(per_station(403), 9);
    assert_eq!(per_station(3379), 9);
    // Day 4 of station 403 ignored the sentinel but kept both present
    // readings.
    let day4 = aggregates
        .iter()
        .find(|a| a.station_id == 403 && a.date == NaiveDate::from_ymd_opt(2023, 7, 4).unwrap())
        .unwrap();
    assert_eq!(day4.count, 2);
    assert_eq!(day4.min, Some(14.0));
    assert_eq!(day4.max, Some(24.0));

    // Full run: period derived from the data (July 1-9), window 7.
    let config = RunConfig::new(cache_dir, stations_file, output_dir.clone(), Measure::Temperature)
        .with_frame_size(160, 200)
        .with_max_workers(2)
        .with_silent(true);
    let outcome = PipelineRunner::new(config).run().await?;

    assert_eq!(
        outcome.period.start,
        NaiveDate::from_ymd_opt(2023, 7, 1).unwrap()
    );
    assert_eq!(
        outcome.period.end,
        NaiveDate::from_ymd_opt(2023, 7, 9).unwrap()
    );
    assert_eq!(outcome.frame_count, 9);
    assert_eq!(outcome.station_count, 2);
    assert_eq!(outcome.cell_count, 2);

    // Both stations report identical daily maxima (21..29), so the
    // global color domain comes from the partial-window boundary means:
    // day 1 averages days 1-4, day 9 averages days 6-9.
    assert!((outcome.domain.min - 22.5).abs() < 1e-9);
    assert!((outcome.domain.max - 27.5).abs() < 1e-9);

    // One deterministically named frame per date.
    for day in 1..=9 {
        let frame_path = output_dir.join(format!("frame-2023-07-{day:02}.png"));
        assert!(frame_path.is_file(), "missing {}", frame_path.display());
    }

    // The animation decodes back to the same ordered frame count.
    let decoder = image::codecs::gif::GifDecoder::new(std::io::BufReader::new(File::open(
        &outcome.animation_path,
    )?))?;
    let frames = decoder.into_frames().collect_frames()?;
    assert_eq!(frames.len(), 9);

    Ok(())
}

#[tokio::test]
async fn test_reingest_is_idempotent() -> Result<()> {
    let dir = TempDir::new()?;
    let input_dir = dir.path().join("archives");
    std::fs::create_dir_all(&input_dir)?;
    write_archive(&input_dir, 403);
    let cache_dir = dir.path().join("cache");

    let cache = CsvCache::new(&cache_dir)?;
    let source = LocalDirSource::new(&input_dir);

    let first = Ingestor::new(&cache).ingest(&source, None)?;
    assert_eq!(first.archives_ingested, 1);
    let rows_before = cache.read("temperature", NaiveDate::MIN)?;

    // Second run reuses the committed tables without touching archives.
    let second = Ingestor::new(&cache).ingest(&source, None)?;
    assert_eq!(second.archives_ingested, 0);
    assert_eq!(second.tables_reused.len(), 2);
    assert_eq!(cache.read("temperature", NaiveDate::MIN)?, rows_before);

    Ok(())
}

#[tokio::test]
async fn test_animate_without_covering_station_fails() -> Result<()> {
    let dir = TempDir::new()?;
    let input_dir = dir.path().join("archives");
    std::fs::create_dir_all(&input_dir)?;
    write_archive(&input_dir, 403);

    // Validity interval ends before the observation period.
    let stations_path = dir.path().join("stations.txt");
    let mut file = File::create(&stations_path)?;
    writeln!(
        file,
        "{:<6}{:<9}{:<9}{:<15}{:<12}{:<10}{:<41}{:<41}{:<5}",
        403, "19500101", "20000101", "51", 52.4537, 13.3017, "Berlin-Dahlem", "Berlin", "Frei"
    )?;

    let cache_dir = dir.path().join("cache");
    let cache = CsvCache::new(&cache_dir)?;
    Ingestor::new(&cache).ingest(&LocalDirSource::new(&input_dir), None)?;

    let config = RunConfig::new(
        cache_dir,
        stations_path,
        dir.path().join("output"),
        Measure::Temperature,
    )
    .with_silent(true);

    let result = PipelineRunner::new(config).run().await;
    assert!(result.is_err());

    Ok(())
}
