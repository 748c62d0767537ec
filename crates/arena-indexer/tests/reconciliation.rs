//! End-to-end reconciliation against an in-memory store.
//!
//! Run with: cargo test -p arena-indexer --test reconciliation

use arena_indexer::{
    GameStore, IndexerError, MemoryStore, ReconcilerConfig, ReconciliationService, ReportStatus, StoreError,
    TimezoneDetection,
};
use arena_types::{DiagnosticStage, GameRecord, PriceSnapshot, SeatCategory};
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

const TEAM: &str = "27795";
const PAGE: &str = include_str!("../../arena-ingestion/tests/fixtures/team_27795_arenapage.html");

fn utc(m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, m, d, h, min, 0).unwrap()
}

fn prices(b: Decimal, l: Decimal, c: Decimal, x: Decimal) -> PriceSnapshot {
    PriceSnapshot::from_columns([Some(b), Some(l), Some(c), Some(x)])
}

fn current_prices() -> PriceSnapshot {
    prices(dec!(18), dec!(50), dec!(95), dec!(950))
}

/// Stored games for the fixture page. Start times put the venue at UTC-4.
fn fixture_games() -> Vec<GameRecord> {
    vec![
        GameRecord::new("135000010", TEAM).with_start_time(utc(7, 13, 0, 0)),
        GameRecord::new("135000009", TEAM).with_start_time(utc(7, 11, 3, 30)),
        GameRecord::new("135000008", TEAM).with_start_time(utc(7, 5, 4, 30)),
        GameRecord::new("135000007", TEAM).with_start_time(utc(7, 4, 0, 0)),
        GameRecord::new("135000006", TEAM).with_start_time(utc(6, 29, 0, 0)),
        // Friendly between the two price updates, not on the page.
        GameRecord::new("135100001", TEAM).with_start_time(utc(7, 4, 16, 0)),
        // Friendly on the day of a price update.
        GameRecord::new("135100002", TEAM).with_start_time(utc(7, 8, 18, 0)),
        // Away game inside a window.
        GameRecord::new("135100003", TEAM).with_start_time(utc(7, 6, 0, 0)).away(),
        // Another team's game.
        GameRecord::new("135200000", "999").with_start_time(utc(7, 5, 0, 0)),
    ]
}

fn service(store: MemoryStore) -> ReconciliationService<MemoryStore> {
    ReconciliationService::new(Arc::new(store), ReconcilerConfig::default()).unwrap()
}

fn table(rows: &str) -> String {
    format!(
        r#"<table id="cphContent_seatingStats">
             <tr class="tableHeader"><th>Date</th><th>Opponent</th><th>Bleachers</th><th>Lower Tier</th>
             <th>Courtside Seats</th><th>Luxury Boxes</th><th>Total Attendance</th><th>Game Type</th></tr>
             {rows}
           </table>"#
    )
}

fn game_row(id: &str, date: &str) -> String {
    format!(
        r#"<tr><td><a href="/match/{id}/boxscore.aspx">{date}</a></td><td>Opp</td>
           <td>100</td><td>50</td><td>10</td><td>1</td><td>161</td><td>League</td></tr>"#
    )
}

fn price_row(date: &str, bleachers: u32) -> String {
    format!(
        r#"<tr><td>{date}</td><td>Ticket Price Update</td><td>${bleachers}</td><td>$40</td>
           <td>$85</td><td>$850</td><td>-1</td><td></td></tr>"#
    )
}

#[tokio::test]
async fn test_fixture_page_prices_every_period() {
    let store = MemoryStore::with_games(fixture_games()).with_current_prices(TEAM, current_prices());
    let service = service(store.clone());

    let report = service.reconcile(TEAM, PAGE).await;

    assert_eq!(report.status, ReportStatus::Completed);
    assert_eq!(report.games_updated, 5);
    assert_eq!(report.games_not_found, 0);
    assert_eq!(report.games_unpriced, 0);
    assert_eq!(report.price_changes_processed, 2);
    assert_eq!(report.unlisted_games_updated, 1);
    assert_eq!(report.write_failures, 0);
    assert_eq!(report.detected_timezone.offset_minutes(), Some(-240));
    assert_eq!(report.per_period_detail.len(), 3);

    let newest = store.get("135000010").await.unwrap();
    assert_eq!(newest.prices, Some(current_prices()));

    // Games below the 7/8 update carry its prices.
    let mid = store.get("135000008").await.unwrap().prices.unwrap();
    assert_eq!(mid.get(SeatCategory::Bleachers), Some(dec!(15)));
    assert_eq!(mid.get(SeatCategory::LuxuryBoxes), Some(dec!(900)));

    let oldest = store.get("135000006").await.unwrap().prices.unwrap();
    assert_eq!(oldest, prices(dec!(12), dec!(40), dec!(85), dec!(850)));

    // Unlisted friendly inside the middle period.
    assert_eq!(store.get("135100001").await.unwrap().prices, Some(mid.clone()));
    assert_eq!(report.per_period_detail[1].unlisted_game_ids, vec!["135100001"]);

    // Price-update day, away game and the other team stay untouched.
    assert_eq!(store.get("135100002").await.unwrap().prices, None);
    assert_eq!(store.get("135100003").await.unwrap().prices, None);
    assert_eq!(store.get("135200000").await.unwrap().prices, None);
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let store = MemoryStore::with_games(fixture_games()).with_current_prices(TEAM, current_prices());
    let service = service(store.clone());

    let first = service.reconcile(TEAM, PAGE).await;
    let state_after_first = store.records().await;

    let second = service.reconcile(TEAM, PAGE).await;
    let state_after_second = store.records().await;

    assert_eq!(first, second);
    assert_eq!(state_after_first, state_after_second);
}

#[tokio::test]
async fn test_unknown_games_are_counted_not_raised() {
    let games: Vec<GameRecord> = fixture_games()
        .into_iter()
        .filter(|g| g.game_id != "135000009")
        .collect();
    let store = MemoryStore::with_games(games).with_current_prices(TEAM, current_prices());

    let report = service(store).reconcile(TEAM, PAGE).await;

    assert_eq!(report.status, ReportStatus::Completed);
    assert_eq!(report.games_not_found, 1);
    assert_eq!(report.games_updated, 4);
    assert_eq!(report.per_period_detail[0].unmatched_game_ids, vec!["135000009"]);
    assert_eq!(report.per_period_detail[0].matched_game_ids, vec!["135000010"]);
}

#[tokio::test]
async fn test_current_period_unpriced_without_current_prices() {
    let store = MemoryStore::with_games(fixture_games());
    let report = service(store.clone()).reconcile(TEAM, PAGE).await;

    assert_eq!(report.games_unpriced, 2);
    assert_eq!(report.games_updated, 3);
    assert_eq!(report.per_period_detail[0].unpriced_game_ids, vec!["135000010", "135000009"]);
    assert_eq!(store.get("135000010").await.unwrap().prices, None);
}

#[tokio::test]
async fn test_write_failure_does_not_stop_other_writes() {
    let store = MemoryStore::with_games(fixture_games())
        .with_current_prices(TEAM, current_prices())
        .with_failing_write("135000008");

    let report = service(store.clone()).reconcile(TEAM, PAGE).await;

    assert_eq!(report.status, ReportStatus::CompletedWithErrors);
    assert_eq!(report.write_failures, 1);
    assert_eq!(report.games_updated, 4);
    assert_eq!(report.per_period_detail[1].failed_game_ids, vec!["135000008"]);
    assert!(store.get("135000007").await.unwrap().prices.is_some());
    assert!(report
        .diagnostics
        .iter()
        .any(|d| d.stage == DiagnosticStage::Store && d.message.contains("135000008")));
}

#[tokio::test]
async fn test_consecutive_price_changes_scenario() {
    let html = table(&format!(
        "{}{}{}{}",
        game_row("A1", "7/6/2025"),
        price_row("7/5/2025", 20),
        price_row("7/4/2025", 10),
        game_row("B1", "7/3/2025"),
    ));
    let store = MemoryStore::with_games(vec![GameRecord::new("A1", TEAM), GameRecord::new("B1", TEAM)])
        .with_current_prices(TEAM, current_prices());

    let report = service(store.clone()).reconcile(TEAM, &html).await;

    let details = &report.per_period_detail;
    assert_eq!(details.len(), 3);
    assert_eq!(details[0].matched_game_ids, vec!["A1"]);
    assert!(details[0].prices.is_current());
    assert!(details[1].matched_game_ids.is_empty());
    assert_eq!((details[1].boundary_start_index, details[1].boundary_end_index), (2, 2));
    assert_eq!(details[2].matched_game_ids, vec!["B1"]);

    let b = store.get("B1").await.unwrap().prices.unwrap();
    assert_eq!(b.bleachers, Some(dec!(10)));
    assert_eq!(store.get("A1").await.unwrap().prices, Some(current_prices()));
}

#[tokio::test]
async fn test_malformed_row_is_skipped() {
    let html = table(&format!(
        "{}{}{}{}",
        game_row("A1", "7/6/2025"),
        r#"<tr><td>7/5/2025</td><td>???</td><td></td><td></td><td></td><td></td><td></td><td></td></tr>"#,
        price_row("7/4/2025", 10),
        game_row("B1", "7/3/2025"),
    ));
    let store = MemoryStore::with_games(vec![GameRecord::new("A1", TEAM), GameRecord::new("B1", TEAM)])
        .with_current_prices(TEAM, current_prices());

    let report = service(store).reconcile(TEAM, &html).await;

    assert_eq!(report.status, ReportStatus::Completed);
    assert_eq!(report.games_updated, 2);
    assert_eq!(report.per_period_detail[0].boundary_end_index, 2);
    assert_eq!(report.per_period_detail[1].boundary_start_index, 3);
    assert!(report
        .diagnostics
        .iter()
        .any(|d| d.stage == DiagnosticStage::Row && d.row_index == Some(1)));
}

#[tokio::test]
async fn test_duplicate_row_fails_before_any_write() {
    let html = table(&format!(
        "{}{}{}",
        game_row("A1", "7/6/2025"),
        price_row("7/5/2025", 10),
        game_row("A1", "7/6/2025"),
    ));
    let store = MemoryStore::with_games(vec![GameRecord::new("A1", TEAM)]).with_current_prices(TEAM, current_prices());

    let report = service(store.clone()).reconcile(TEAM, &html).await;

    assert!(report.is_failed());
    assert!(report.failure_reason().unwrap().contains("A1"));
    assert_eq!(report.games_updated, 0);
    assert_eq!(store.get("A1").await.unwrap().prices, None);
}

#[tokio::test]
async fn test_missing_table_fails() {
    let store = MemoryStore::with_games(fixture_games());
    let report = service(store).reconcile(TEAM, "<html><body>maintenance</body></html>").await;

    assert!(report.is_failed());
    assert!(report.failure_reason().unwrap().contains("not found"));
    assert_eq!(report.games_updated, 0);
    assert_eq!(report.per_period_detail.len(), 0);
}

#[tokio::test]
async fn test_no_start_times_skips_unlisted_pricing() {
    let games = vec![
        GameRecord::new("135000010", TEAM),
        GameRecord::new("135000008", TEAM),
        GameRecord::new("135100001", TEAM),
    ];
    let store = MemoryStore::with_games(games).with_current_prices(TEAM, current_prices());

    let report = service(store.clone()).reconcile(TEAM, PAGE).await;

    assert_eq!(report.detected_timezone, TimezoneDetection::NoMatchedPairs);
    assert_eq!(report.games_updated, 2);
    assert_eq!(report.unlisted_games_updated, 0);
    assert_eq!(store.get("135100001").await.unwrap().prices, None);
    assert!(report.diagnostics.iter().any(|d| d.stage == DiagnosticStage::Unlisted));
}

#[tokio::test]
async fn test_underdetermined_offset_keeps_change_day_excluded() {
    let html = table(&format!(
        "{}{}{}",
        game_row("G1", "7/10/2025"),
        price_row("7/8/2025", 10),
        game_row("G2", "7/5/2025"),
    ));
    // Both listed games start at 00:30Z, so every offset from UTC-12 to
    // UTC-1 fits them.
    let games = vec![
        GameRecord::new("G1", TEAM).with_start_time(utc(7, 11, 0, 30)),
        GameRecord::new("G2", TEAM).with_start_time(utc(7, 6, 0, 30)),
        // 01:30 on 7/8 at UTC-5, the day of the update.
        GameRecord::new("F1", TEAM).with_start_time(utc(7, 8, 6, 30)),
    ];
    let store = MemoryStore::with_games(games).with_current_prices(TEAM, current_prices());

    let report = service(store.clone()).reconcile(TEAM, &html).await;

    assert_eq!(report.detected_timezone.offset_range(), Some((-720, -60)));
    assert_eq!(report.games_updated, 2);
    assert_eq!(report.unlisted_games_updated, 0);
    assert_eq!(store.get("F1").await.unwrap().prices, None);
}

#[tokio::test]
async fn test_rows_without_match_id_listed_per_period() {
    let html = table(&format!(
        "{}{}{}",
        game_row("A1", "7/6/2025"),
        price_row("7/5/2025", 10),
        r#"<tr><td><a href="/team/27795/overview.aspx">7/3/2025</a></td><td>Opp</td>
           <td>100</td><td>50</td><td>10</td><td>1</td><td>161</td><td>League</td></tr>"#,
    ));
    let store = MemoryStore::with_games(vec![GameRecord::new("A1", TEAM)]).with_current_prices(TEAM, current_prices());

    let report = service(store).reconcile(TEAM, &html).await;

    assert_eq!(report.games_not_found, 1);
    assert!(report.per_period_detail[0].unidentified_game_rows.is_empty());
    assert_eq!(report.per_period_detail[1].unidentified_game_rows, vec![2]);
    assert!(report.per_period_detail[1].unmatched_game_ids.is_empty());
}

#[tokio::test]
async fn test_unlisted_pricing_can_be_disabled() {
    let store = MemoryStore::with_games(fixture_games()).with_current_prices(TEAM, current_prices());
    let config = ReconcilerConfig::default().with_unlisted_pricing(false);
    let service = ReconciliationService::new(Arc::new(store.clone()), config).unwrap();

    let report = service.reconcile(TEAM, PAGE).await;

    assert_eq!(report.unlisted_games_updated, 0);
    assert_eq!(store.get("135100001").await.unwrap().prices, None);
}

/// Store whose reads always fail.
struct BrokenStore;

impl GameStore for BrokenStore {
    async fn games_for_team(&self, _team_id: &str) -> Result<Vec<GameRecord>, StoreError> {
        Err(StoreError::Backend("connection refused".to_string()))
    }

    async fn current_prices(&self, _team_id: &str) -> Result<Option<PriceSnapshot>, StoreError> {
        Ok(None)
    }

    async fn write_game_prices(&self, _game_id: &str, _prices: &PriceSnapshot) -> Result<(), StoreError> {
        panic!("no write may happen after a failed read");
    }
}

#[tokio::test]
async fn test_store_read_failure_fails_run() {
    let service = ReconciliationService::new(Arc::new(BrokenStore), ReconcilerConfig::default()).unwrap();
    let report = service.reconcile(TEAM, PAGE).await;

    assert!(report.is_failed());
    assert!(report.failure_reason().unwrap().contains("connection refused"));
    assert_eq!(report.games_updated, 0);
}

#[test]
fn test_analyze_reports_duplicate_error() {
    let html = table(&format!("{}{}", game_row("X", "7/6/2025"), game_row("X", "7/5/2025")));
    let err = service(MemoryStore::new()).analyze(&html).unwrap_err();
    assert!(matches!(
        err,
        IndexerError::DuplicateGameAssignment {
            first_row: 0,
            second_row: 1,
            ..
        }
    ));
}
