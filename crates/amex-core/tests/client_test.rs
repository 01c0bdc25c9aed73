//! AmexClient end to end over the scripted driver.

mod common;

use amex_core::AmexClient;
use amex_protocols::{ErrorKind, SessionState};
use common::{test_config, with_summary, with_table, FakeDriver, Row};

#[tokio::test]
async fn test_client_round_trip() {
    let config = test_config();
    let rows = [
        Row::new("01 JAN 20", "CAFE NERO", "-£10.00", "Pending"),
        Row::new("31 DEC 19", "TESCO STORES", "£42.17", "Posted"),
    ];
    let driver = with_table(FakeDriver::new(), &config, &rows);
    let driver = with_summary(driver, &config, &["£150.50", "£200,000,000", "£650,100.00"]);

    let mut client = AmexClient::connect("user", "secret", config, driver.clone())
        .await
        .unwrap();
    assert_eq!(client.state(), SessionState::Authenticated);

    let overview = client.overview().await.unwrap();
    assert_eq!(overview.total_balance, 65010000);

    let pending = client.pending_transactions().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].amount, -1000);

    let recent = client.recent_transactions().await.unwrap();
    assert_eq!(recent.len(), 2);

    client.close().await;
    assert_eq!(client.state(), SessionState::Closed);
    assert!(driver.was_closed());

    let err = client.overview().await.err().unwrap();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
}

#[tokio::test]
async fn test_client_cancel_token_closes_session() {
    let config = test_config();
    let driver = with_summary(FakeDriver::new(), &config, &["£1.00", "£2.00", "£3.00"]);

    let mut client = AmexClient::connect("user", "secret", config, driver)
        .await
        .unwrap();
    client.cancel_token().cancel();

    let err = client.overview().await.err().unwrap();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert_eq!(client.state(), SessionState::Closed);
}
