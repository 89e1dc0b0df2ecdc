pub mod aggregate;
pub mod observation;
pub mod period;
pub mod station;

pub use aggregate::{CellAggregate, DailyAggregate, Extremum, SmoothedPoint};
pub use observation::{Measure, ObservationRecord, RawObservation};
pub use period::DateRange;
pub use station::StationRecord;
