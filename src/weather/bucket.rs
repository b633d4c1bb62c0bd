//! Groups columnar forecast series into local calendar days

use chrono::{DateTime, FixedOffset, NaiveDate};

use crate::error::MappingError;

/// Time window of a columnar forecast section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesWindow {
    /// First sample, unix seconds
    pub start: i64,
    /// Exclusive end, unix seconds
    pub end: i64,
    /// Spacing between samples in seconds
    pub interval: i64,
    /// Fixed offset of the location's local time
    pub utc_offset_seconds: i32,
}

impl SeriesWindow {
    /// Local timestamps at `interval` spacing over `[start, end)`
    pub fn timestamps(&self) -> Result<Vec<DateTime<FixedOffset>>, MappingError> {
        let step = usize::try_from(self.interval)
            .ok()
            .filter(|step| *step > 0)
            .ok_or_else(|| {
                MappingError::format(format!("non-positive series interval {}", self.interval))
            })?;
        let offset = FixedOffset::east_opt(self.utc_offset_seconds).ok_or_else(|| {
            MappingError::format(format!("invalid utc offset {}", self.utc_offset_seconds))
        })?;

        (self.start..self.end)
            .step_by(step)
            .map(|secs| {
                DateTime::from_timestamp(secs, 0)
                    .map(|utc| utc.with_timezone(&offset))
                    .ok_or_else(|| MappingError::format(format!("timestamp {secs} out of range")))
            })
            .collect()
    }
}

/// A contiguous run of records sharing one local calendar date
#[derive(Debug, Clone, PartialEq)]
pub struct DayGroup<T> {
    pub date: NaiveDate,
    pub items: Vec<T>,
}

/// Group consecutive records by the local date of their timestamp.
///
/// Order is preserved within and across groups and the last open group is
/// always flushed.
pub fn group_by_local_date<T>(
    records: impl IntoIterator<Item = (DateTime<FixedOffset>, T)>,
) -> Vec<DayGroup<T>> {
    let mut groups = Vec::new();
    let mut current: Option<DayGroup<T>> = None;

    for (timestamp, record) in records {
        let date = timestamp.date_naive();
        if let Some(group) = current.as_mut().filter(|group| group.date == date) {
            group.items.push(record);
            continue;
        }
        let next = DayGroup {
            date,
            items: vec![record],
        };
        if let Some(finished) = current.replace(next) {
            groups.push(finished);
        }
    }

    groups.extend(current);
    groups
}

/// Generate the window's timestamps, build one record per timestamp and
/// group the records into local days.
///
/// `build` receives the sample index, which addresses the same row in every
/// column of the section.
pub fn bucket_series<T, F>(
    window: &SeriesWindow,
    mut build: F,
) -> Result<Vec<DayGroup<T>>, MappingError>
where
    F: FnMut(usize, &DateTime<FixedOffset>) -> Result<T, MappingError>,
{
    let records = window
        .timestamps()?
        .into_iter()
        .enumerate()
        .map(|(index, timestamp)| build(index, &timestamp).map(|record| (timestamp, record)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(group_by_local_date(records))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: i64 = 3600;
    const DAY: i64 = 86_400;
    // 2021-01-01T00:00:00Z
    const NEW_YEAR: i64 = 1_609_459_200;

    fn window(samples: i64, interval: i64, utc_offset_seconds: i32) -> SeriesWindow {
        SeriesWindow {
            start: NEW_YEAR,
            end: NEW_YEAR + samples * interval,
            interval,
            utc_offset_seconds,
        }
    }

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_end_is_exclusive() {
        let timestamps = window(3, HOUR, 0).timestamps().unwrap();
        assert_eq!(timestamps.len(), 3);
        assert_eq!(timestamps[0].to_rfc3339(), "2021-01-01T00:00:00+00:00");
        assert_eq!(timestamps[2].to_rfc3339(), "2021-01-01T02:00:00+00:00");
    }

    #[test]
    fn test_timestamps_are_rendered_in_local_offset() {
        let timestamps = window(1, HOUR, 7200).timestamps().unwrap();
        assert_eq!(timestamps[0].to_rfc3339(), "2021-01-01T02:00:00+02:00");
    }

    #[test]
    fn test_empty_series_yields_no_buckets() {
        let groups = bucket_series(&window(0, HOUR, 0), |index, _| Ok(index)).unwrap();
        assert!(groups.is_empty());
    }

    #[test]
    fn test_single_sample_yields_one_bucket() {
        let groups = bucket_series(&window(1, HOUR, 0), |index, _| Ok(index)).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].items, vec![0]);
    }

    #[test]
    fn test_two_days_of_hours_split_at_midnight() {
        let groups = bucket_series(&window(48, HOUR, 0), |index, _| Ok(index)).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].date, date("2021-01-01"));
        assert_eq!(groups[0].items.len(), 24);
        assert_eq!(groups[1].date, date("2021-01-02"));
        assert_eq!(groups[1].items.len(), 24);
    }

    #[test]
    fn test_offset_moves_bucket_boundaries() {
        // 00:00Z is 19:00 on Dec 31st at UTC-5
        let groups = bucket_series(&window(48, HOUR, -5 * 3600), |index, _| Ok(index)).unwrap();
        let sizes: Vec<usize> = groups.iter().map(|group| group.items.len()).collect();
        assert_eq!(groups[0].date, date("2020-12-31"));
        assert_eq!(sizes, vec![5, 24, 19]);
    }

    #[test]
    fn test_no_sample_dropped_or_duplicated() {
        let groups = bucket_series(&window(100, HOUR, 3600), |index, _| Ok(index)).unwrap();
        let flattened: Vec<usize> = groups.iter().flat_map(|group| group.items.clone()).collect();
        assert_eq!(flattened, (0..100).collect::<Vec<_>>());
        for group in &groups {
            assert!(!group.items.is_empty());
        }
    }

    #[test]
    fn test_daily_cadence_yields_one_sample_per_bucket() {
        let groups = bucket_series(&window(7, DAY, 3600), |index, _| Ok(index)).unwrap();
        assert_eq!(groups.len(), 7);
        for (index, group) in groups.iter().enumerate() {
            assert_eq!(group.items, vec![index]);
        }
    }

    #[test]
    fn test_build_failure_aborts_whole_series() {
        let result = bucket_series(&window(5, HOUR, 0), |index, _| {
            if index == 3 {
                Err(MappingError::InvalidWeatherCode(4))
            } else {
                Ok(index)
            }
        });
        assert_eq!(result, Err(MappingError::InvalidWeatherCode(4)));
    }

    #[test]
    fn test_non_positive_interval_is_rejected() {
        assert!(window(3, 0, 0).timestamps().is_err());
        assert!(window(3, -HOUR, 0).timestamps().is_err());
    }
}
