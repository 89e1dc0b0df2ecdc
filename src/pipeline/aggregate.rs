use std::collections::HashMap;

use chrono::NaiveDate;

use crate::models::{DailyAggregate, ObservationRecord};
use crate::utils::constants::MIN_DAILY_SAMPLES;

/// Collapse intra-day observations into daily extrema per station.
///
/// Absent values are excluded from the extrema and the sample count; a
/// group whose values are all absent keeps absent extrema instead of a
/// zero. Groups with fewer than [`MIN_DAILY_SAMPLES`] present samples
/// carry too little evidence for a daily extremum and are dropped.
pub fn aggregate_daily(observations: &[ObservationRecord]) -> Vec<DailyAggregate> {
    let mut groups: HashMap<(u32, NaiveDate), (usize, Option<f64>, Option<f64>)> = HashMap::new();

    for obs in observations {
        let entry = groups
            .entry((obs.station_id, obs.timestamp.date()))
            .or_insert((0, None, None));

        if let Some(value) = obs.value {
            entry.0 += 1;
            entry.1 = Some(entry.1.map_or(value, |m: f64| m.min(value)));
            entry.2 = Some(entry.2.map_or(value, |m: f64| m.max(value)));
        }
    }

    let mut aggregates: Vec<DailyAggregate> = groups
        .into_iter()
        .filter(|(_, (count, _, _))| *count >= MIN_DAILY_SAMPLES)
        .map(|((station_id, date), (count, min, max))| DailyAggregate {
            station_id,
            date,
            count,
            min,
            max,
        })
        .collect();

    aggregates.sort_by_key(|a| (a.station_id, a.date));
    aggregates
}
