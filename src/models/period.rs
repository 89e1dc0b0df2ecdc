use chrono::{Duration, NaiveDate};

use crate::error::{PipelineError, Result};

/// Inclusive date interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(PipelineError::InvalidFormat(format!(
                "Invalid date range: start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of dates in the range, endpoints included.
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Every date in the range in ascending order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    /// Range widened by `days` on both ends.
    pub fn expanded(&self, days: u32) -> DateRange {
        DateRange {
            start: self.start - Duration::days(days as i64),
            end: self.end + Duration::days(days as i64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_rejects_inverted_range() {
        assert!(DateRange::new(date(2023, 5, 2), date(2023, 5, 1)).is_err());
    }

    #[test]
    fn test_days_and_length() {
        let range = DateRange::new(date(2023, 5, 1), date(2023, 5, 3)).unwrap();
        assert_eq!(range.num_days(), 3);
        let days: Vec<_> = range.days().collect();
        assert_eq!(days, vec![date(2023, 5, 1), date(2023, 5, 2), date(2023, 5, 3)]);
    }

    #[test]
    fn test_expanded_pads_both_ends() {
        let range = DateRange::new(date(2023, 5, 10), date(2023, 5, 12)).unwrap();
        let padded = range.expanded(4);
        assert_eq!(padded.start, date(2023, 5, 6));
        assert_eq!(padded.end, date(2023, 5, 16));
    }
}
