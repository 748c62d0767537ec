//! Reconciliation of an arena page against the game store.
//!
//! [`ReconciliationService::reconcile`] runs the whole pipeline for one team:
//!
//! 1. isolate and check the attendance table
//! 2. parse rows into an event sequence
//! 3. assign games to pricing periods
//! 4. read the team's games (and current prices) from the store
//! 5. detect the venue timezone from matched games
//! 6. write each period's prices onto its matched games, then onto unlisted
//!    home games when the timezone is known
//!
//! Steps 1 to 4 must all succeed before anything is written. A failure there
//! produces a failed report with zero counts. Write failures are counted and
//! do not stop the remaining writes.
//!
//! Every run recomputes from the full page, so running twice on the same
//! page leaves the store in the same state and reports the same counts.

use crate::config::ReconcilerConfig;
use crate::error::IndexerError;
use crate::period::PeriodAssigner;
use crate::store::GameStore;
use crate::timezone::{MatchedPair, TimezoneDetector};
use crate::unlisted::{place_unlisted, safe_windows};
use arena_ingestion::{IngestionError, RowParser, TableIsolator, TableStructure};
use arena_types::{
    Diagnostic, DiagnosticStage, EventSequence, GameRecord, PeriodDetail, PeriodPrices,
    PriceSnapshot, PricingPeriod, ReconciliationReport, ReportStatus, TimezoneDetection,
};
use scraper::Html;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Everything derived from one page before the store is consulted.
#[derive(Debug, Clone)]
pub struct DocumentAnalysis {
    pub structure: TableStructure,
    pub events: EventSequence,
    pub periods: Vec<PricingPeriod>,
    pub diagnostics: Vec<Diagnostic>,
}

/// A price write decided by the plan.
struct PlannedWrite {
    period_index: usize,
    game_id: String,
    prices: PriceSnapshot,
    unlisted: bool,
}

/// Reconciles arena pages against a [`GameStore`].
pub struct ReconciliationService<S> {
    store: Arc<S>,
    config: ReconcilerConfig,
    isolator: TableIsolator,
    parser: RowParser,
    assigner: PeriodAssigner,
    detector: TimezoneDetector,
}

impl<S: GameStore> ReconciliationService<S> {
    /// Create a service over a store.
    ///
    /// # Errors
    ///
    /// [`IndexerError::Config`] for an invalid threshold, or an ingestion
    /// error if the table layout does not produce valid selectors.
    pub fn new(store: Arc<S>, config: ReconcilerConfig) -> Result<Self, IndexerError> {
        config.validate()?;
        Ok(Self {
            isolator: TableIsolator::new(config.layout.clone())?,
            parser: RowParser::new(config.layout.clone())?,
            assigner: PeriodAssigner::new(),
            detector: TimezoneDetector::new(config.timezone_threshold),
            store,
            config,
        })
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Parse a page and assign periods without touching the store.
    ///
    /// # Errors
    ///
    /// - [`IngestionError::TableNotFound`] if the page has no attendance table
    /// - [`IngestionError::InvalidTableStructure`] if the table has no header row
    /// - [`IndexerError::DuplicateGameAssignment`] if a game is listed twice
    pub fn analyze(&self, html: &str) -> Result<DocumentAnalysis, IndexerError> {
        let document = Html::parse_document(html);
        let table = self.isolator.isolate(&document)?;

        let structure = self.isolator.inspect_structure(&table);
        if !structure.header_present {
            return Err(IngestionError::InvalidTableStructure("missing header row".to_string()).into());
        }

        let mut diagnostics = Vec::new();
        if !structure.headers_match {
            diagnostics.push(Diagnostic::warning(
                DiagnosticStage::Table,
                format!("unexpected column headers: {}", structure.headers.join(", ")),
            ));
        }

        let parsed = self.parser.parse(&table)?;
        diagnostics.extend(parsed.diagnostics);

        let periods = self.assigner.assign(&parsed.events)?;

        Ok(DocumentAnalysis {
            structure,
            events: parsed.events,
            periods,
            diagnostics,
        })
    }

    /// Reconcile one team's arena page against the store.
    ///
    /// Never returns an error: failures before the first write yield a
    /// report with [`ReportStatus::Failed`] and zero counts.
    pub async fn reconcile(&self, team_id: &str, html: &str) -> ReconciliationReport {
        let analysis = match self.analyze(html) {
            Ok(analysis) => analysis,
            Err(e) => {
                let stage = match e {
                    IndexerError::DuplicateGameAssignment { .. } => DiagnosticStage::Period,
                    _ => DiagnosticStage::Table,
                };
                return self.fail(team_id, &e, stage, Vec::new());
            }
        };

        let records = match self.store.games_for_team(team_id).await {
            Ok(records) => records,
            Err(e) => return self.fail(team_id, &IndexerError::from(e), DiagnosticStage::Store, analysis.diagnostics),
        };
        let current = match self.store.current_prices(team_id).await {
            Ok(current) => current,
            Err(e) => return self.fail(team_id, &IndexerError::from(e), DiagnosticStage::Store, analysis.diagnostics),
        };

        let mut report = ReconciliationReport::new(team_id);
        report.diagnostics = analysis.diagnostics;
        report.price_changes_processed = analysis.events.price_changes().count();

        let by_id: HashMap<&str, &GameRecord> = records.iter().map(|r| (r.game_id.as_str(), r)).collect();

        report.detected_timezone = self.detect_timezone(&analysis.events, &by_id);
        if !report.detected_timezone.is_detected() {
            let entry = Diagnostic::warning(
                DiagnosticStage::Timezone,
                format!("timezone not detected: {:?}", report.detected_timezone),
            );
            tracing::warn!("team {}: {}", team_id, entry.message);
            report.diagnostics.push(entry);
        }

        let mut writes = Vec::new();
        for period in &analysis.periods {
            let prices = resolve_prices(&period.prices, current.as_ref());
            let mut detail = PeriodDetail {
                period_index: period.period_index,
                boundary_start_index: period.boundary_start_index,
                boundary_end_index: period.boundary_end_index,
                prices: period.prices.clone(),
                matched_game_ids: Vec::new(),
                unmatched_game_ids: Vec::new(),
                unidentified_game_rows: period.unidentified_game_rows.clone(),
                unpriced_game_ids: Vec::new(),
                failed_game_ids: Vec::new(),
                unlisted_game_ids: Vec::new(),
            };

            for id in &period.member_game_ids {
                if !by_id.contains_key(id.as_str()) {
                    report.games_not_found += 1;
                    detail.unmatched_game_ids.push(id.clone());
                    continue;
                }
                detail.matched_game_ids.push(id.clone());
                match &prices {
                    Some(prices) => writes.push(PlannedWrite {
                        period_index: period.period_index,
                        game_id: id.clone(),
                        prices: prices.clone(),
                        unlisted: false,
                    }),
                    None => {
                        report.games_unpriced += 1;
                        detail.unpriced_game_ids.push(id.clone());
                    }
                }
            }
            report.games_not_found += period.unidentified_game_rows.len();

            report.per_period_detail.push(detail);
        }

        if report.games_unpriced > 0 {
            report.diagnostics.push(Diagnostic::info(
                DiagnosticStage::Store,
                format!("{} games left unpriced: no current prices known", report.games_unpriced),
            ));
        }

        if self.config.price_unlisted_games {
            self.plan_unlisted(&analysis.periods, &records, &by_id, current.as_ref(), &mut report, &mut writes);
        }

        self.apply(writes, &mut report).await;

        if report.write_failures > 0 {
            report.status = ReportStatus::CompletedWithErrors;
        }

        tracing::info!(
            "team {}: {} games updated, {} not found, {} unlisted updated, {} write failures, timezone {}",
            team_id,
            report.games_updated,
            report.games_not_found,
            report.unlisted_games_updated,
            report.write_failures,
            report.detected_timezone.label().unwrap_or_else(|| "unknown".to_string())
        );

        report
    }

    fn detect_timezone(&self, events: &EventSequence, by_id: &HashMap<&str, &GameRecord>) -> TimezoneDetection {
        let pairs: Vec<MatchedPair> = events
            .games()
            .filter_map(|game| {
                let id = game.game_id.as_deref()?;
                let local_date = game.date_parsed?;
                let utc_start = by_id.get(id)?.start_time?;
                Some(MatchedPair::new(id, local_date, utc_start))
            })
            .collect();
        self.detector.detect(&pairs)
    }

    fn plan_unlisted(
        &self,
        periods: &[PricingPeriod],
        records: &[GameRecord],
        by_id: &HashMap<&str, &GameRecord>,
        current: Option<&PriceSnapshot>,
        report: &mut ReconciliationReport,
        writes: &mut Vec<PlannedWrite>,
    ) {
        let listed: HashSet<&str> = periods
            .iter()
            .flat_map(|p| p.member_game_ids.iter().map(String::as_str))
            .collect();
        let home: Vec<&GameRecord> = records.iter().filter(|r| r.is_home).collect();
        if home.iter().all(|r| listed.contains(r.game_id.as_str())) {
            return;
        }

        let Some(offset_range) = report.detected_timezone.offset_range() else {
            report.diagnostics.push(Diagnostic::info(
                DiagnosticStage::Unlisted,
                "unlisted home games left untouched: timezone not detected",
            ));
            return;
        };

        let windows = safe_windows(periods, by_id, offset_range);
        for (record, period_index) in place_unlisted(&home, &listed, &windows) {
            let Some(period) = periods.iter().find(|p| p.period_index == period_index) else {
                continue;
            };
            match resolve_prices(&period.prices, current) {
                Some(prices) => writes.push(PlannedWrite {
                    period_index,
                    game_id: record.game_id.clone(),
                    prices,
                    unlisted: true,
                }),
                None => report.diagnostics.push(Diagnostic::info(
                    DiagnosticStage::Unlisted,
                    format!("unlisted game {} falls in a period without known prices", record.game_id),
                )),
            }
        }
    }

    async fn apply(&self, writes: Vec<PlannedWrite>, report: &mut ReconciliationReport) {
        for write in writes {
            let result = self.store.write_game_prices(&write.game_id, &write.prices).await;
            let detail = report
                .per_period_detail
                .iter_mut()
                .find(|d| d.period_index == write.period_index);

            match result {
                Ok(()) if write.unlisted => {
                    report.unlisted_games_updated += 1;
                    if let Some(detail) = detail {
                        detail.unlisted_game_ids.push(write.game_id);
                    }
                }
                Ok(()) => report.games_updated += 1,
                Err(e) => {
                    tracing::error!("price write failed for game {}: {}", write.game_id, e);
                    report.write_failures += 1;
                    report.diagnostics.push(
                        Diagnostic::error(
                            DiagnosticStage::Store,
                            format!("price write failed for game {}: {}", write.game_id, e),
                        ),
                    );
                    if let Some(detail) = detail {
                        detail.failed_game_ids.push(write.game_id);
                    }
                }
            }
        }
    }

    fn fail(
        &self,
        team_id: &str,
        error: &IndexerError,
        stage: DiagnosticStage,
        mut diagnostics: Vec<Diagnostic>,
    ) -> ReconciliationReport {
        tracing::error!("team {}: reconciliation failed: {}", team_id, error);
        diagnostics.push(Diagnostic::error(stage, error.to_string()));
        ReconciliationReport::failed(team_id, error.to_string(), diagnostics)
    }
}

/// Prices to write for a period: its own snapshot, or today's prices for
/// the current period.
fn resolve_prices(prices: &PeriodPrices, current: Option<&PriceSnapshot>) -> Option<PriceSnapshot> {
    match prices {
        PeriodPrices::Snapshot(snapshot) => Some(snapshot.clone()),
        PeriodPrices::Current => current.cloned(),
    }
}
