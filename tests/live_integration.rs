//! Integration tests against a running game server.
//!
//! All tests are `#[ignore]` because they need the backend up. The base URL
//! comes from `CRYPTOTRADER_URL` (a `.env` file works), defaulting to
//! `http://localhost:8080`.
//!
//! Run with:
//! ```bash
//! cargo test --test live_integration -- --ignored --nocapture
//! ```

use std::env;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::time::timeout;

use cryptotrader_sdk::prelude::*;

const TEST_TIMEOUT: Duration = Duration::from_secs(15);

fn base_url() -> String {
    dotenvy::dotenv().ok();
    env::var("CRYPTOTRADER_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string())
}

fn client() -> CryptoTraderClient {
    CryptoTraderClient::builder()
        .base_url(&base_url())
        .stream_config(StreamConfig {
            reconnect: false,
            ..StreamConfig::default()
        })
        .build()
        .expect("client should build")
}

#[tokio::test]
#[ignore]
async fn test_open_account_and_query_balance() {
    let client = client();
    let opened = client.bank().open("rust-live").await.expect("open");
    println!("Opened {} with {}", opened.account_no, opened.balance);

    let account = client
        .bank()
        .balance(&opened.account_no, "rust-live")
        .await
        .expect("balance");
    assert_eq!(account.balance, opened.balance);
}

#[tokio::test]
#[ignore]
async fn test_market_stream_delivers_price() {
    let client = client();
    let mut sse = client.sse(&Channel::Market);
    sse.connect().await.expect("connect");

    let price = {
        let events = sse.events();
        tokio::pin!(events);
        timeout(TEST_TIMEOUT, async {
            while let Some(event) = events.next().await {
                if let StreamEvent::Message(frame) = event {
                    if let Ok(Some(PushEvent::Market(update))) = Channel::Market.decode(&frame) {
                        return update.price;
                    }
                }
            }
            panic!("stream ended before a market update");
        })
        .await
        .expect("timed out waiting for market data")
    };
    println!("Price: {}", price);
    sse.disconnect().await.expect("disconnect");
}

#[tokio::test]
#[ignore]
async fn test_session_round_trip() {
    let session = GameSession::new(client());
    session.start("rust-live-session").await.expect("start");

    let mut views = session.watch();
    let priced = timeout(TEST_TIMEOUT, async {
        loop {
            if views.borrow_and_update().price.is_some() {
                return;
            }
            views.changed().await.expect("session gone");
        }
    })
    .await;
    assert!(priced.is_ok(), "no price within {:?}", TEST_TIMEOUT);

    let outcome = session.trade(Decimal::ONE).await.expect("trade");
    println!("Trade outcome: {:?}", outcome);
    println!("View: {:?}", session.view());

    session.restart().await;
    assert!(!session.view().running);
    assert!(session.active_feeds().await.is_empty());
}
