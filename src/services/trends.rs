use chrono::{FixedOffset, Timelike};

use crate::models::{HistoryRecord, TrendPoint};

/// Park hours for trend purposes: 8 AM up to (but not including) midnight,
/// in park-local time.
const OPERATIONAL_HOURS: std::ops::Range<u32> = 8..24;

/// Computes pairwise wait-time deltas between consecutive samples of one
/// ride's history. `history` must already be sorted ascending by
/// `last_updated`.
///
/// Samples outside the operational window are dropped first, as are samples
/// with no wait-time reading; a delta against "no reading" is meaningless.
/// Fewer than two surviving samples yield no trends. No smoothing or outlier
/// rejection happens here: a single noisy sample shows up as a spike.
pub fn wait_time_trends(history: &[HistoryRecord], park_offset: FixedOffset) -> Vec<TrendPoint> {
    let samples: Vec<(chrono::DateTime<chrono::Utc>, i32)> = history
        .iter()
        .filter_map(|r| r.standby_wait_time.map(|w| (r.last_updated, w)))
        .filter(|(t, _)| OPERATIONAL_HOURS.contains(&t.with_timezone(&park_offset).hour()))
        .collect();

    samples
        .windows(2)
        .map(|pair| TrendPoint {
            trend: i64::from(pair[1].1) - i64::from(pair[0].1),
            start_time: pair[0].0,
            end_time: pair[1].0,
        })
        .collect()
}
