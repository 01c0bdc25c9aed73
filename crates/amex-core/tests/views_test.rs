//! View extraction scenarios against the scripted driver.

mod common;

use std::sync::Arc;
use std::time::Duration;

use amex_config::{RowErrorPolicy, ScraperConfig};
use amex_core::{derive_id, Session, SessionController, ViewExtractor};
use amex_protocols::{
    DriverError, ErrorKind, Overview, ScrapeError, SessionState, TransactionFilter, ViewKind,
};
use common::{test_config, with_summary, with_table, Call, FakeDriver, Row};
use serde_json::json;

async fn login(config: &Arc<ScraperConfig>, driver: FakeDriver) -> Session<FakeDriver> {
    SessionController::new("user", "secret", Arc::clone(config))
        .unwrap()
        .login(driver)
        .await
        .unwrap()
}

fn two_rows() -> Vec<Row<'static>> {
    vec![
        Row::new("01 JAN 20", "  CAFE NERO  ", "-£10.00", "Pending"),
        Row::new("31 DEC 19", "TESCO STORES", "£42.17", "Posted"),
    ]
}

#[tokio::test]
async fn test_overview() {
    let config = Arc::new(ScraperConfig::default());
    let summary = ["£150.50", "£200,000,000", "£650,100.00"];
    let driver = with_summary(FakeDriver::new(), &config, &summary);
    let mut session = login(&config, driver).await;

    let overview = ViewExtractor::new(Arc::clone(&config))
        .get_overview(&mut session)
        .await
        .unwrap();

    assert_eq!(
        overview,
        Overview {
            statement_balance: 15050,
            available_credit: 20000000000,
            total_balance: 65010000,
        }
    );
}

#[tokio::test]
async fn test_overview_rejects_junk_and_wrong_count() {
    let config = Arc::new(ScraperConfig::default());
    let views = ViewExtractor::new(Arc::clone(&config));

    for values in [&["some", "junk", "text"][..], &["£1.00", "£2.00"][..]] {
        let driver = with_summary(FakeDriver::new(), &config, values);
        let mut session = login(&config, driver).await;

        let err = views.get_overview(&mut session).await.err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(session.is_authenticated());
    }
}

#[tokio::test]
async fn test_overview_passes_driver_errors_through() {
    let config = Arc::new(ScraperConfig::default());
    let driver = FakeDriver::new().hide(&config.overview.summary_values);
    let mut session = login(&config, driver).await;

    let err = ViewExtractor::new(Arc::clone(&config))
        .get_overview(&mut session)
        .await
        .err()
        .unwrap();

    assert!(matches!(err, ScrapeError::Driver(ref e) if e.is_timeout()));
}

#[tokio::test]
async fn test_overview_navigates_when_url_configured() {
    let mut config = ScraperConfig::default();
    config.site.overview_url = Some("https://global.americanexpress.com/dashboard".to_string());
    let config = Arc::new(config);
    let driver = with_summary(FakeDriver::new(), &config, &["£1.00", "£2.00", "£3.00"]);
    let mut session = login(&config, driver.clone()).await;

    ViewExtractor::new(Arc::clone(&config))
        .get_overview(&mut session)
        .await
        .unwrap();

    assert!(driver
        .calls()
        .contains(&Call::Navigate("https://global.americanexpress.com/dashboard".to_string())));
}

#[tokio::test]
async fn test_pending_only_keeps_pending_row() {
    let config = Arc::new(test_config());
    let driver = with_table(FakeDriver::new(), &config, &two_rows());
    let mut session = login(&config, driver.clone()).await;

    let transactions = ViewExtractor::new(Arc::clone(&config))
        .get_pending_transactions(&mut session)
        .await
        .unwrap();

    assert_eq!(transactions.len(), 1);
    let tx = &transactions[0];
    assert_eq!(tx.description, "CAFE NERO");
    assert_eq!(tx.amount, -1000);
    assert_eq!(tx.date, "01-01-20");
    assert_eq!(tx.id, derive_id("01 JAN 20", "  CAFE NERO  ", "-£10.00"));

    let calls = driver.calls();
    let cfg = &config.transactions;
    assert!(calls.contains(&Call::Click(cfg.pending_tab.clone())));
    // The posted row is still visited.
    assert!(calls.contains(&Call::ExtractText(cfg.cell_selector(2, 4))));
}

#[tokio::test]
async fn test_pending_marker_is_case_insensitive() {
    let config = Arc::new(test_config());
    let rows = vec![Row::new("02 FEB 21", "AMAZON", "£9.99", " pending ")];
    let driver = with_table(FakeDriver::new(), &config, &rows);
    let mut session = login(&config, driver).await;

    let transactions = ViewExtractor::new(Arc::clone(&config))
        .get_transactions(&mut session, TransactionFilter::PendingOnly)
        .await
        .unwrap();

    assert_eq!(transactions.len(), 1);
}

#[tokio::test]
async fn test_recent_returns_all_rows_in_order() {
    let config = Arc::new(test_config());
    let driver = with_table(FakeDriver::new(), &config, &two_rows());
    let mut session = login(&config, driver.clone()).await;

    let transactions = ViewExtractor::new(Arc::clone(&config))
        .get_recent_transactions(&mut session)
        .await
        .unwrap();

    let descriptions: Vec<_> = transactions.iter().map(|t| t.description.as_str()).collect();
    assert_eq!(descriptions, ["CAFE NERO", "TESCO STORES"]);
    assert_eq!(transactions[1].amount, 4217);
    assert!(!driver.calls().contains(&Call::Click(config.transactions.pending_tab.clone())));
}

#[tokio::test]
async fn test_empty_table_is_not_an_error() {
    let config = Arc::new(test_config());
    let driver = with_table(FakeDriver::new(), &config, &[]);
    let mut session = login(&config, driver).await;

    let transactions = ViewExtractor::new(Arc::clone(&config))
        .get_recent_transactions(&mut session)
        .await
        .unwrap();

    assert!(transactions.is_empty());
}

#[tokio::test]
async fn test_invisible_table_is_extraction_error() {
    let config = Arc::new(test_config());
    let driver = FakeDriver::new().hide(&config.transactions.table);
    let mut session = login(&config, driver).await;

    let err = ViewExtractor::new(Arc::clone(&config))
        .get_recent_transactions(&mut session)
        .await
        .err()
        .unwrap();

    assert!(matches!(
        err,
        ScrapeError::Extraction {
            view: ViewKind::Transactions,
            ..
        }
    ));
}

#[tokio::test]
async fn test_failed_hidden_row_removal_is_extraction_error() {
    let config = Arc::new(test_config());
    let driver =
        with_table(FakeDriver::new(), &config, &two_rows()).with_script_result(json!(false));
    let mut session = login(&config, driver).await;

    let err = ViewExtractor::new(Arc::clone(&config))
        .get_pending_transactions(&mut session)
        .await
        .err()
        .unwrap();

    assert_eq!(err.kind(), ErrorKind::Extraction);
}

#[tokio::test]
async fn test_hidden_row_removal_can_be_disabled() {
    let mut config = test_config();
    config.transactions.hidden_rows = Some(String::new());
    let config = Arc::new(config);
    let driver =
        with_table(FakeDriver::new(), &config, &two_rows()).with_script_result(json!(false));
    let mut session = login(&config, driver.clone()).await;

    let transactions = ViewExtractor::new(Arc::clone(&config))
        .get_recent_transactions(&mut session)
        .await
        .unwrap();

    assert_eq!(transactions.len(), 2);
    assert!(!driver.calls().iter().any(|c| matches!(c, Call::Evaluate(_))));
}

#[tokio::test]
async fn test_native_ids_used_when_every_row_has_one() {
    let config = Arc::new(test_config());
    let rows = vec![
        Row::new("01 JAN 20", "CAFE NERO", "£3.20", "Posted").with_native_id("tx-1"),
        Row::new("02 JAN 20", "PRET", "£4.10", "Posted").with_native_id("tx-2"),
    ];
    let driver = with_table(FakeDriver::new(), &config, &rows);
    let mut session = login(&config, driver).await;

    let transactions = ViewExtractor::new(Arc::clone(&config))
        .get_recent_transactions(&mut session)
        .await
        .unwrap();

    let ids: Vec<_> = transactions.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["tx-1", "tx-2"]);
}

#[tokio::test]
async fn test_mixed_id_schemes_are_rejected() {
    let config = Arc::new(test_config());
    let rows = vec![
        Row::new("01 JAN 20", "CAFE NERO", "£3.20", "Posted").with_native_id("tx-1"),
        Row::new("02 JAN 20", "PRET", "£4.10", "Posted"),
    ];
    let driver = with_table(FakeDriver::new(), &config, &rows);
    let mut session = login(&config, driver).await;

    let err = ViewExtractor::new(Arc::clone(&config))
        .get_recent_transactions(&mut session)
        .await
        .err()
        .unwrap();

    assert_eq!(err.kind(), ErrorKind::Extraction);
}

fn rows_with_bad_amount() -> Vec<Row<'static>> {
    vec![
        Row::new("01 JAN 20", "CAFE NERO", "£3.20", "Posted"),
        Row::new("02 JAN 20", "PRET", "n/a", "Posted"),
        Row::new("03 JAN 20", "BOOTS", "£7.00", "Posted"),
    ]
}

#[tokio::test]
async fn test_bad_row_fails_whole_call_by_default() {
    let config = Arc::new(test_config());
    let driver = with_table(FakeDriver::new(), &config, &rows_with_bad_amount());
    let mut session = login(&config, driver).await;

    let err = ViewExtractor::new(Arc::clone(&config))
        .get_recent_transactions(&mut session)
        .await
        .err()
        .unwrap();

    assert_eq!(err.kind(), ErrorKind::Parse);
}

#[tokio::test]
async fn test_bad_row_skipped_when_opted_in() {
    let mut config = test_config();
    config.transactions.row_errors = RowErrorPolicy::Skip;
    let config = Arc::new(config);
    let driver = with_table(FakeDriver::new(), &config, &rows_with_bad_amount());
    let mut session = login(&config, driver).await;

    let transactions = ViewExtractor::new(Arc::clone(&config))
        .get_recent_transactions(&mut session)
        .await
        .unwrap();

    let descriptions: Vec<_> = transactions.iter().map(|t| t.description.as_str()).collect();
    assert_eq!(descriptions, ["CAFE NERO", "BOOTS"]);
}

#[tokio::test]
async fn test_pending_without_type_column_keeps_every_row() {
    let mut config = test_config();
    config.transactions.columns.kind = None;
    let config = Arc::new(config);
    let driver = with_table(FakeDriver::new(), &config, &two_rows());
    let mut session = login(&config, driver).await;

    let transactions = ViewExtractor::new(Arc::clone(&config))
        .get_pending_transactions(&mut session)
        .await
        .unwrap();

    assert_eq!(transactions.len(), 2);
}

#[tokio::test]
async fn test_cancel_during_row_listing_closes_session() {
    let config = Arc::new(test_config());
    let driver =
        with_table(FakeDriver::new(), &config, &two_rows()).hang_on(&config.transactions.rows);
    let mut session = login(&config, driver).await;

    let canceller = session.cancel_token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        canceller.cancel();
    });

    let err = ViewExtractor::new(Arc::clone(&config))
        .get_recent_transactions(&mut session)
        .await
        .err()
        .unwrap();

    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert_eq!(session.state(), SessionState::Closed);
}

#[tokio::test]
async fn test_row_listing_script_error_passes_through() {
    let config = Arc::new(test_config());
    let driver = with_table(FakeDriver::new(), &config, &two_rows())
        .fail_on(&config.transactions.rows, DriverError::Script("rows gone".to_string()));
    let mut session = login(&config, driver).await;

    let err = ViewExtractor::new(Arc::clone(&config))
        .get_recent_transactions(&mut session)
        .await
        .err()
        .unwrap();

    assert!(matches!(err, ScrapeError::Driver(DriverError::Script(_))));
    assert_eq!(session.state(), SessionState::Authenticated);
}

#[tokio::test(start_paused = true)]
async fn test_extraction_deadline_without_session_deadline() {
    let mut config = test_config();
    config.timeouts.session_secs = None;
    let config = Arc::new(config);
    let driver =
        with_table(FakeDriver::new(), &config, &two_rows()).hang_on(&config.transactions.rows);
    let mut session = login(&config, driver).await;

    let err = ViewExtractor::new(Arc::clone(&config))
        .get_recent_transactions(&mut session)
        .await
        .err()
        .unwrap();

    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert_eq!(session.state(), SessionState::Authenticated);
}
