//! Reconciling many teams in one run.
//!
//! Pages are fetched through a [`DocumentSource`] and reconciled with a
//! shared [`ReconciliationService`]. A per-team lock keeps at most one
//! reconciliation in flight for any team, also across concurrent batch
//! calls on the same reconciler. Locks live only while a team is being
//! reconciled or waited on.

use crate::config::BatchConfig;
use crate::reconcile::ReconciliationService;
use crate::store::GameStore;
use arena_ingestion::DocumentSource;
use arena_types::{BatchReport, Diagnostic, DiagnosticStage, ReconciliationReport};
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Runs reconciliation for a list of teams.
pub struct BatchReconciler<S, D> {
    service: Arc<ReconciliationService<S>>,
    source: Arc<D>,
    config: BatchConfig,
    team_locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl<S, D> Clone for BatchReconciler<S, D> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            source: Arc::clone(&self.source),
            config: self.config,
            team_locks: Arc::clone(&self.team_locks),
        }
    }
}

impl<S: GameStore, D: DocumentSource> BatchReconciler<S, D> {
    pub fn new(service: Arc<ReconciliationService<S>>, source: Arc<D>, config: BatchConfig) -> Self {
        Self {
            service,
            source,
            config,
            team_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn service(&self) -> &Arc<ReconciliationService<S>> {
        &self.service
    }

    async fn team_lock(&self, team_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.team_locks.lock().await;
        Arc::clone(locks.entry(team_id.to_string()).or_default())
    }

    /// Drop a team's lock once nobody holds or waits on it.
    async fn release_team_lock(&self, team_id: &str) {
        let mut locks = self.team_locks.lock().await;
        if locks.get(team_id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(team_id);
        }
    }

    /// Fetch and reconcile one team.
    ///
    /// Waits for any reconciliation of the same team to finish first. A
    /// fetch failure yields a failed report.
    pub async fn reconcile_team(&self, team_id: &str) -> ReconciliationReport {
        let lock = self.team_lock(team_id).await;
        let report = {
            let _guard = lock.lock().await;
            self.fetch_and_reconcile(team_id).await
        };
        drop(lock);
        self.release_team_lock(team_id).await;
        report
    }

    async fn fetch_and_reconcile(&self, team_id: &str) -> ReconciliationReport {
        if !self.config.request_delay.is_zero() {
            tokio::time::sleep(self.config.request_delay).await;
        }

        let html = match self.source.fetch_arena_page(team_id).await {
            Ok(html) => html,
            Err(e) => {
                tracing::error!("team {}: fetch failed: {}", team_id, e);
                let reason = format!("fetch failed: {e}");
                let diagnostic = Diagnostic::error(DiagnosticStage::Table, reason.clone());
                return ReconciliationReport::failed(team_id, reason, vec![diagnostic]);
            }
        };

        self.service.reconcile(team_id, &html).await
    }

    /// Reconcile a list of teams and aggregate the outcome.
    ///
    /// Up to `max_concurrent_teams` teams run at once; reports come back in
    /// input order.
    pub async fn reconcile_teams(&self, team_ids: &[String]) -> BatchReport {
        tracing::info!(
            "reconciling {} teams (concurrency {})",
            team_ids.len(),
            self.config.max_concurrent_teams
        );

        let reports: Vec<ReconciliationReport> = stream::iter(team_ids)
            .map(|team_id| self.reconcile_team(team_id))
            .buffered(self.config.max_concurrent_teams.max(1))
            .collect()
            .await;

        let batch = BatchReport::from_reports(reports);
        tracing::info!(
            "batch done: {}/{} teams succeeded, {} games updated",
            batch.teams_succeeded,
            batch.teams_processed,
            batch.total_games_updated
        );
        batch
    }
}
