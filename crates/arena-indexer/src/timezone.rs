//! Venue timezone inference.
//!
//! The arena page prints local calendar dates, while the store keeps UTC
//! start times. For a game matched by id, only some UTC offsets put the
//! stored instant on the printed date; those offsets form one contiguous
//! window. The detector counts, for every whole-hour offset between UTC-12
//! and UTC+14, how many games it explains.
//!
//! The best-supported offsets usually form a run rather than a single value
//! (games tend to start at the same hour). The middle of that run is
//! reported for display, and the run's bounds travel with it so that
//! callers placing instants on local days can stay safe under all of them.

use arena_types::TimezoneDetection;
use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Lowest whole-hour offset considered.
pub const MIN_OFFSET_HOURS: i32 = -12;

/// Highest whole-hour offset considered.
pub const MAX_OFFSET_HOURS: i32 = 14;

/// A listed game matched to a stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedPair {
    pub game_id: String,

    /// Date printed in the table.
    pub local_date: NaiveDate,

    /// Start time held by the store.
    pub utc_start: DateTime<Utc>,
}

impl MatchedPair {
    pub fn new(game_id: impl Into<String>, local_date: NaiveDate, utc_start: DateTime<Utc>) -> Self {
        Self {
            game_id: game_id.into(),
            local_date,
            utc_start,
        }
    }

    /// Whether an offset puts the stored instant on the printed date.
    pub fn agrees_with(&self, offset_hours: i32) -> bool {
        (self.utc_start + Duration::hours(offset_hours as i64)).date_naive() == self.local_date
    }
}

/// Infers a venue's UTC offset from matched games.
#[derive(Debug, Clone, Copy)]
pub struct TimezoneDetector {
    threshold: f64,
}

impl TimezoneDetector {
    /// Create a detector requiring `threshold` (in `(0, 1]`) of pairs to agree.
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Detect the offset explaining the most pairs.
    ///
    /// Fails with [`TimezoneDetection::NoMatchedPairs`] on empty input, and
    /// with [`TimezoneDetection::Ambiguous`] when the best offset is
    /// supported by less than the threshold or when two separate runs of
    /// offsets tie for best.
    pub fn detect(&self, pairs: &[MatchedPair]) -> TimezoneDetection {
        let total_pairs = pairs.len();
        if total_pairs == 0 {
            return TimezoneDetection::NoMatchedPairs;
        }

        let support: Vec<(i32, usize)> = (MIN_OFFSET_HOURS..=MAX_OFFSET_HOURS)
            .map(|h| (h, pairs.iter().filter(|p| p.agrees_with(h)).count()))
            .collect();

        let best = support.iter().map(|(_, n)| *n).max().unwrap_or(0);
        if best == 0 {
            return TimezoneDetection::Ambiguous {
                best_offset_minutes: None,
                supporting_pairs: 0,
                total_pairs,
            };
        }

        let runs = best_runs(&support, best);
        let run = &runs[0];
        let offset_minutes = run[(run.len() - 1) / 2] * 60;

        let share = best as f64 / total_pairs as f64;
        if runs.len() > 1 || share < self.threshold {
            tracing::debug!(
                "timezone ambiguous: best support {}/{} across {} runs",
                best,
                total_pairs,
                runs.len()
            );
            return TimezoneDetection::Ambiguous {
                best_offset_minutes: (runs.len() == 1).then_some(offset_minutes),
                supporting_pairs: best,
                total_pairs,
            };
        }

        TimezoneDetection::Detected {
            offset_minutes,
            min_offset_minutes: run[0] * 60,
            max_offset_minutes: run[run.len() - 1] * 60,
            supporting_pairs: best,
            total_pairs,
        }
    }
}

/// Contiguous runs of offsets whose support equals `best`.
fn best_runs(support: &[(i32, usize)], best: usize) -> Vec<Vec<i32>> {
    let mut runs: Vec<Vec<i32>> = Vec::new();
    let mut previous: Option<i32> = None;
    for (offset, count) in support {
        if *count != best {
            continue;
        }
        match (previous, runs.last_mut()) {
            (Some(p), Some(run)) if p + 1 == *offset => run.push(*offset),
            _ => runs.push(vec![*offset]),
        }
        previous = Some(*offset);
    }
    runs
}

/// Start of a local calendar day as a UTC instant.
pub fn local_day_start(date: NaiveDate, offset_minutes: i32) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc() - Duration::minutes(offset_minutes as i64)
}

/// End of a local calendar day (start of the next one) as a UTC instant.
pub fn local_day_end(date: NaiveDate, offset_minutes: i32) -> DateTime<Utc> {
    local_day_start(date, offset_minutes) + Duration::days(1)
}
