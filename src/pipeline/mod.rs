pub mod aggregate;
pub mod grid;
pub mod runner;
pub mod smooth;

pub use aggregate::aggregate_daily;
pub use grid::{index_stations, join_cells, CellLookup, CellPolygon, GeometryResolver, H3GeometryResolver};
pub use runner::{PipelineRunner, RunOutcome};
pub use smooth::smooth;
