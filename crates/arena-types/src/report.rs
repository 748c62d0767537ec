//! Reconciliation reports and diagnostics.
//!
//! Everything a reconciliation run has to say ends up in a
//! [`ReconciliationReport`]: counts, per-period detail, the detected venue
//! timezone, and structured [`Diagnostic`] entries for anything skipped or
//! suspicious along the way. Batch runs aggregate reports into a
//! [`BatchReport`].

use crate::PeriodPrices;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a diagnostic entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticLevel {
    Info,
    Warning,
    Error,
}

/// Pipeline stage that produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticStage {
    Table,
    Row,
    Period,
    Timezone,
    Store,
    Unlisted,
}

/// One structured diagnostic entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub stage: DiagnosticStage,

    /// Table row the entry refers to, if any.
    pub row_index: Option<usize>,

    pub message: String,
}

impl Diagnostic {
    pub fn new(level: DiagnosticLevel, stage: DiagnosticStage, message: impl Into<String>) -> Self {
        Self {
            level,
            stage,
            row_index: None,
            message: message.into(),
        }
    }

    pub fn info(stage: DiagnosticStage, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Info, stage, message)
    }

    pub fn warning(stage: DiagnosticStage, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Warning, stage, message)
    }

    pub fn error(stage: DiagnosticStage, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Error, stage, message)
    }

    pub fn at_row(mut self, row_index: usize) -> Self {
        self.row_index = Some(row_index);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.row_index {
            Some(row) => write!(f, "[{:?}/{:?}] row {}: {}", self.level, self.stage, row, self.message),
            None => write!(f, "[{:?}/{:?}] {}", self.level, self.stage, self.message),
        }
    }
}

/// Outcome of venue timezone detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum TimezoneDetection {
    /// A single run of UTC offsets explains enough of the matched games.
    ///
    /// `offset_minutes` is the middle of the run; every offset from
    /// `min_offset_minutes` to `max_offset_minutes` fits equally well.
    Detected {
        offset_minutes: i32,
        min_offset_minutes: i32,
        max_offset_minutes: i32,
        supporting_pairs: usize,
        total_pairs: usize,
    },

    /// No offset reached the agreement threshold.
    Ambiguous {
        best_offset_minutes: Option<i32>,
        supporting_pairs: usize,
        total_pairs: usize,
    },

    /// No game could be matched against a stored start time.
    NoMatchedPairs,
}

impl TimezoneDetection {
    /// The detected offset, only when detection succeeded.
    pub fn offset_minutes(&self) -> Option<i32> {
        match self {
            TimezoneDetection::Detected { offset_minutes, .. } => Some(*offset_minutes),
            _ => None,
        }
    }

    /// Lowest and highest equally supported offsets, only when detection
    /// succeeded.
    pub fn offset_range(&self) -> Option<(i32, i32)> {
        match self {
            TimezoneDetection::Detected {
                min_offset_minutes,
                max_offset_minutes,
                ..
            } => Some((*min_offset_minutes, *max_offset_minutes)),
            _ => None,
        }
    }

    #[inline]
    pub fn is_detected(&self) -> bool {
        matches!(self, TimezoneDetection::Detected { .. })
    }

    /// Human-readable label such as `UTC-05:00`, or `None` on failure.
    pub fn label(&self) -> Option<String> {
        self.offset_minutes().map(format_utc_offset)
    }
}

/// Format an offset in minutes as `UTC±HH:MM`.
pub fn format_utc_offset(offset_minutes: i32) -> String {
    let sign = if offset_minutes < 0 { '-' } else { '+' };
    let abs = offset_minutes.unsigned_abs();
    format!("UTC{}{:02}:{:02}", sign, abs / 60, abs % 60)
}

/// Overall outcome of one reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReportStatus {
    /// Every write succeeded.
    Completed,

    /// The run finished but at least one store write failed.
    CompletedWithErrors,

    /// Nothing was written.
    Failed { reason: String },
}

/// What happened to one pricing period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodDetail {
    pub period_index: usize,
    pub boundary_start_index: usize,
    pub boundary_end_index: usize,
    pub prices: PeriodPrices,

    /// Member games found in the store.
    pub matched_game_ids: Vec<String>,

    /// Member games the store does not know.
    pub unmatched_game_ids: Vec<String>,

    /// Game rows of the period without a usable match identifier.
    pub unidentified_game_rows: Vec<usize>,

    /// Matched games left untouched because no prices were known.
    pub unpriced_game_ids: Vec<String>,

    /// Games whose price write failed.
    pub failed_game_ids: Vec<String>,

    /// Stored home games absent from the table that were priced by date.
    pub unlisted_game_ids: Vec<String>,
}

/// Result of reconciling one team's arena page against the game store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub team_id: String,
    #[serde(flatten)]
    pub status: ReportStatus,

    /// Listed games whose prices were written.
    pub games_updated: usize,

    /// Listed games (including rows without identifier) absent from the store.
    pub games_not_found: usize,

    /// Matched games in the current period with no known current prices.
    pub games_unpriced: usize,

    /// Price-change rows partitioning the table.
    pub price_changes_processed: usize,

    /// Unlisted home games priced by date.
    pub unlisted_games_updated: usize,

    pub write_failures: usize,

    pub detected_timezone: TimezoneDetection,
    pub per_period_detail: Vec<PeriodDetail>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ReconciliationReport {
    /// An empty, completed report.
    pub fn new(team_id: impl Into<String>) -> Self {
        Self {
            team_id: team_id.into(),
            status: ReportStatus::Completed,
            games_updated: 0,
            games_not_found: 0,
            games_unpriced: 0,
            price_changes_processed: 0,
            unlisted_games_updated: 0,
            write_failures: 0,
            detected_timezone: TimezoneDetection::NoMatchedPairs,
            per_period_detail: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// A report for a run that failed before touching the store.
    ///
    /// All counts are zero; diagnostics gathered so far are kept.
    pub fn failed(team_id: impl Into<String>, reason: impl Into<String>, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            status: ReportStatus::Failed {
                reason: reason.into(),
            },
            diagnostics,
            ..Self::new(team_id)
        }
    }

    #[inline]
    pub fn is_failed(&self) -> bool {
        matches!(self.status, ReportStatus::Failed { .. })
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match &self.status {
            ReportStatus::Failed { reason } => Some(reason),
            _ => None,
        }
    }
}

/// A team that could not be reconciled in a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamError {
    pub team_id: String,
    pub message: String,
}

/// Aggregate over a batch of teams.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub teams_processed: usize,
    pub teams_succeeded: usize,
    pub teams_failed: usize,
    pub total_games_updated: usize,
    pub reports: Vec<ReconciliationReport>,
    pub errors: Vec<TeamError>,
}

impl BatchReport {
    /// Aggregate per-team reports. Failed reports become [`TeamError`]s.
    pub fn from_reports(reports: Vec<ReconciliationReport>) -> Self {
        let mut batch = BatchReport::default();
        for report in &reports {
            batch.teams_processed += 1;
            batch.total_games_updated += report.games_updated + report.unlisted_games_updated;
            match report.failure_reason() {
                Some(reason) => {
                    batch.teams_failed += 1;
                    batch.errors.push(TeamError {
                        team_id: report.team_id.clone(),
                        message: reason.to_string(),
                    });
                }
                None => batch.teams_succeeded += 1,
            }
        }
        batch.reports = reports;
        batch
    }
}
