use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use h3o::{CellIndex, LatLng, Resolution};
use tracing::{debug, warn};

use crate::models::{CellAggregate, DailyAggregate, Extremum, StationRecord};

/// Polygon geometry of one grid cell; vertices as (lat, lon) degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct CellPolygon {
    pub vertices: Vec<(f64, f64)>,
}

/// Seam to the geometry backend resolving cell ids to polygons.
pub trait GeometryResolver {
    fn geometry(&self, cell: CellIndex) -> CellPolygon;
}

/// Resolver backed by the H3 cell boundary.
pub struct H3GeometryResolver;

impl GeometryResolver for H3GeometryResolver {
    fn geometry(&self, cell: CellIndex) -> CellPolygon {
        let vertices = cell
            .boundary()
            .iter()
            .map(|v| (v.lat(), v.lng()))
            .collect();
        CellPolygon { vertices }
    }
}

/// Station → cell assignment at one fixed resolution, with each cell's
/// resolved polygon.
#[derive(Debug, Clone)]
pub struct CellLookup {
    resolution: Resolution,
    station_cells: HashMap<u32, CellIndex>,
    geometries: HashMap<CellIndex, CellPolygon>,
}

impl CellLookup {
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn cell_for_station(&self, station_id: u32) -> Option<CellIndex> {
        self.station_cells.get(&station_id).copied()
    }

    pub fn geometry(&self, cell: CellIndex) -> Option<&CellPolygon> {
        self.geometries.get(&cell)
    }

    pub fn cells(&self) -> impl Iterator<Item = CellIndex> + '_ {
        self.geometries.keys().copied()
    }

    pub fn cell_count(&self) -> usize {
        self.geometries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }
}

/// Map station coordinates onto grid cells at the run's resolution.
///
/// Identical coordinates are deduplicated before indexing, so two
/// stations at the same location resolve the cell once and always share
/// it. A station whose coordinate cannot be indexed is excluded with a
/// diagnostic; the run continues for the others.
pub fn index_stations(
    stations: &[StationRecord],
    resolution: Resolution,
    resolver: &dyn GeometryResolver,
) -> CellLookup {
    let mut coord_cells: HashMap<(u64, u64), CellIndex> = HashMap::new();
    let mut station_cells = HashMap::new();
    let mut geometries = HashMap::new();

    for station in stations {
        let key = (station.latitude.to_bits(), station.longitude.to_bits());

        let cell = match coord_cells.get(&key) {
            Some(&cell) => cell,
            None => match LatLng::new(station.latitude, station.longitude) {
                Ok(coord) => {
                    let cell = coord.to_cell(resolution);
                    coord_cells.insert(key, cell);
                    cell
                }
                Err(e) => {
                    warn!(
                        station_id = station.id,
                        "Station has no resolvable coordinate, excluding it: {e}"
                    );
                    continue;
                }
            },
        };

        station_cells.insert(station.id, cell);
        geometries
            .entry(cell)
            .or_insert_with(|| resolver.geometry(cell));
    }

    CellLookup {
        resolution,
        station_cells,
        geometries,
    }
}

/// Annotate daily aggregates with their station's cell and merge
/// co-located stations per date by arithmetic mean. Each (cell, date)
/// appears exactly once in the sorted output.
pub fn join_cells(
    aggregates: &[DailyAggregate],
    lookup: &CellLookup,
    extremum: Extremum,
) -> Vec<CellAggregate> {
    let mut merged: BTreeMap<(CellIndex, NaiveDate), (f64, usize)> = BTreeMap::new();

    for aggregate in aggregates {
        let Some(cell) = lookup.cell_for_station(aggregate.station_id) else {
            // Stations outside the filtered registry are expected here.
            debug!(
                station_id = aggregate.station_id,
                "Aggregate for unindexed station excluded from join"
            );
            continue;
        };
        let Some(value) = aggregate.extremum(extremum) else {
            continue;
        };

        let entry = merged.entry((cell, aggregate.date)).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }

    merged
        .into_iter()
        .map(|((cell, date), (sum, n))| CellAggregate {
            cell,
            date,
            value: sum / n as f64,
        })
        .collect()
}
