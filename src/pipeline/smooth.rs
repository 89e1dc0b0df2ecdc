use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use h3o::CellIndex;

use crate::models::{CellAggregate, DateRange, SmoothedPoint};

/// Centered rolling mean per cell with partial-window handling.
///
/// The date index is padded by half the window on both sides with absent
/// placeholder rows, so in-range dates near the range boundary still see
/// a full window of whatever real neighbors exist. Absent samples are
/// excluded from both the sum and the divisor; an all-absent window
/// yields an absent point. Output is restricted to `range` and sorted by
/// (cell, date).
pub fn smooth(
    cell_aggregates: &[CellAggregate],
    range: DateRange,
    window_width: usize,
) -> Vec<SmoothedPoint> {
    let half = window_width / 2;
    let padded = range.expanded(half as u32);
    let dates: Vec<NaiveDate> = padded.days().collect();

    let mut by_cell: BTreeMap<CellIndex, HashMap<NaiveDate, f64>> = BTreeMap::new();
    for aggregate in cell_aggregates {
        by_cell
            .entry(aggregate.cell)
            .or_default()
            .insert(aggregate.date, aggregate.value);
    }

    let mut smoothed = Vec::new();
    for (cell, values) in &by_cell {
        let series: Vec<Option<f64>> = dates.iter().map(|d| values.get(d).copied()).collect();

        for (i, date) in dates.iter().enumerate() {
            if !range.contains(*date) {
                continue;
            }

            let lo = i.saturating_sub(half);
            let hi = (i + half).min(series.len() - 1);

            let mut sum = 0.0;
            let mut present = 0usize;
            for value in series[lo..=hi].iter().flatten() {
                sum += value;
                present += 1;
            }

            smoothed.push(SmoothedPoint {
                cell: *cell,
                date: *date,
                value: (present > 0).then(|| sum / present as f64),
            });
        }
    }

    smoothed
}

#[cfg(test)]
mod tests {
    use super::*;
    use h3o::{LatLng, Resolution};
    use pretty_assertions::assert_eq;

    fn cell() -> CellIndex {
        LatLng::new(52.4537, 13.3017)
            .unwrap()
            .to_cell(Resolution::Five)
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 7, day).unwrap()
    }

    fn series(values: &[(u32, f64)]) -> Vec<CellAggregate> {
        values
            .iter()
            .map(|&(day, value)| CellAggregate {
                cell: cell(),
                date: date(day),
                value,
            })
            .collect()
    }

    fn value_at(points: &[SmoothedPoint], day: u32) -> Option<f64> {
        points.iter().find(|p| p.date == date(day)).unwrap().value
    }

    #[test]
    fn test_interior_date_uses_full_window() {
        // Days 1..=9 with values 1..=9; window 7 centered on day 5 covers
        // days 2..=8, mean = 5.
        let aggregates = series(&(1..=9).map(|d| (d, d as f64)).collect::<Vec<_>>());
        let range = DateRange::new(date(1), date(9)).unwrap();

        let points = smooth(&aggregates, range, 7);

        assert_eq!(points.len(), 9);
        assert_eq!(value_at(&points, 5), Some(5.0));
    }

    #[test]
    fn test_boundary_date_uses_partial_window() {
        let aggregates = series(&(1..=9).map(|d| (d, d as f64)).collect::<Vec<_>>());
        let range = DateRange::new(date(1), date(9)).unwrap();

        let points = smooth(&aggregates, range, 7);

        // Day 1: padded neighbors before the range are absent, so only
        // days 1..=4 contribute: (1+2+3+4)/4.
        assert_eq!(value_at(&points, 1), Some(2.5));
        // Day 9 mirrors it: (6+7+8+9)/4.
        assert_eq!(value_at(&points, 9), Some(7.5));
        // And that differs from a zero-padded full-window mean, which
        // would have been 10/7.
        assert_ne!(value_at(&points, 1), Some(10.0 / 7.0));
    }

    #[test]
    fn test_absent_interior_sample_shrinks_divisor() {
        // Day 3 missing from the aggregates entirely.
        let aggregates = series(&[(1, 2.0), (2, 4.0), (4, 8.0), (5, 6.0)]);
        let range = DateRange::new(date(1), date(5)).unwrap();

        let points = smooth(&aggregates, range, 3);

        // Window on day 3 is days 2..=4 with day 3 absent: (4+8)/2.
        assert_eq!(value_at(&points, 3), Some(6.0));
        // Window on day 2 is days 1..=3: (2+4)/2.
        assert_eq!(value_at(&points, 2), Some(3.0));
    }

    #[test]
    fn test_all_absent_window_is_absent() {
        let aggregates = series(&[(1, 2.0), (9, 4.0)]);
        let range = DateRange::new(date(1), date(9)).unwrap();

        let points = smooth(&aggregates, range, 3);

        // Day 5's window (4..=6) holds no present samples at all.
        assert_eq!(value_at(&points, 5), None);
    }

    #[test]
    fn test_window_of_one_is_identity() {
        let aggregates = series(&[(1, 2.0), (2, 4.0), (3, 8.0)]);
        let range = DateRange::new(date(1), date(3)).unwrap();

        let points = smooth(&aggregates, range, 1);

        assert_eq!(value_at(&points, 1), Some(2.0));
        assert_eq!(value_at(&points, 2), Some(4.0));
        assert_eq!(value_at(&points, 3), Some(8.0));
    }

    #[test]
    fn test_output_restricted_to_range() {
        let aggregates = series(&(1..=9).map(|d| (d, d as f64)).collect::<Vec<_>>());
        let range = DateRange::new(date(3), date(7)).unwrap();

        let points = smooth(&aggregates, range, 7);

        assert_eq!(points.len(), 5);
        assert!(points.iter().all(|p| range.contains(p.date)));
        // Real out-of-range neighbors (days 1, 2) still feed the window
        // for day 3: mean over days 1..=6.
        assert_eq!(value_at(&points, 3), Some(3.5));
    }
}
