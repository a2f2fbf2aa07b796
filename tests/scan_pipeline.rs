//! End-to-end scan cycles over a scripted provider
mod common;

use common::{DAY_MS, HOUR_MS, StubProvider, choppy, orchestrator, rising};
use coinscan::domain::market::{DetailedInfo, HistoryProfile};
use coinscan::domain::scan::{ScanOutcome, ScanStage};
use std::sync::atomic::Ordering;
use std::time::Duration;

#[tokio::test]
async fn test_end_to_end_single_valid_instrument() {
    let provider = StubProvider::new();
    provider
        .with_quote("A-USD", Some(10.0), Some(5e9))
        .with_quote("B-USD", Some(0.0), Some(3e9))
        .with_history("A-USD", HistoryProfile::Coarse, rising(20, DAY_MS));

    let report = orchestrator(provider.clone(), &["A-USD", "B-USD"]).run().await;

    assert_eq!(report.outcome, ScanOutcome::Completed);
    assert_eq!(report.results.len(), 1);
    let a = &report.results[0];
    assert_eq!(a.symbol, "A");
    assert_eq!(a.ticker, "A-USD");
    assert_eq!(a.price, 10.0);
    assert_eq!(a.market_cap, 5e9);
    assert_eq!(a.rsi_1d, 100.0);
    assert_eq!((a.rsi_15m, a.rsi_1h, a.rsi_4h), (0.0, 0.0, 0.0));

    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].ticker, "B-USD");
    assert_eq!(report.skipped[0].reason.label(), "invalid_metadata");
    assert_eq!(
        report.stages,
        vec![
            ScanStage::Idle,
            ScanStage::FetchingMetadata,
            ScanStage::FetchingHistory,
            ScanStage::Computing,
            ScanStage::Done
        ]
    );
}

#[tokio::test]
async fn test_valid_fast_quote_never_reaches_detailed_tier() {
    let provider = StubProvider::new();
    provider
        .with_quote("BTC-USD", Some(64000.0), Some(1.2e12))
        .with_history("BTC-USD", HistoryProfile::Coarse, rising(20, DAY_MS));

    let report = orchestrator(provider.clone(), &["BTC-USD"]).run().await;

    assert_eq!(report.results.len(), 1);
    assert_eq!(provider.detailed_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_zero_cap_falls_back_to_detailed_info() {
    let provider = StubProvider::new();
    provider
        .with_quote("ADA-USD", Some(0.0), Some(0.0))
        .with_detailed(
            "ADA-USD",
            DetailedInfo {
                market_cap: Some(1.6e10),
                current_price: None,
                regular_market_price: Some(0.4567),
            },
        )
        .with_history("ADA-USD", HistoryProfile::Medium, choppy(60, HOUR_MS));

    let report = orchestrator(provider.clone(), &["ADA-USD"]).run().await;

    assert_eq!(provider.detailed_calls.load(Ordering::SeqCst), 1);
    let ada = &report.results[0];
    assert_eq!(ada.market_cap, 1.6e10);
    assert_eq!(ada.price, 0.46);
    assert!(ada.rsi_1h > 0.0 && ada.rsi_1h < 100.0);
    assert!(ada.rsi_4h >= 0.0 && ada.rsi_4h <= 100.0);
}

#[tokio::test]
async fn test_invalid_instruments_never_appear() {
    let provider = StubProvider::new();
    provider
        .with_quote("OK-USD", Some(1.0), Some(2e9))
        .with_quote("NOPRICE-USD", Some(0.0), Some(2e9))
        .with_quote("NEG-USD", Some(-1.0), Some(2e9))
        .with_quote("NOCAP-USD", Some(3.0), None)
        .with_history("OK-USD", HistoryProfile::Coarse, rising(20, DAY_MS));

    let report = orchestrator(
        provider,
        &["OK-USD", "NOPRICE-USD", "NEG-USD", "NOCAP-USD", "MISSING-USD"],
    )
    .run()
    .await;

    let tickers: Vec<&str> = report.results.iter().map(|r| r.ticker.as_str()).collect();
    assert_eq!(tickers, vec!["OK-USD"]);
    assert_eq!(report.skipped.len(), 4);
    assert!(report.results.iter().all(|r| r.price > 0.0 && r.market_cap > 0.0));
}

#[tokio::test]
async fn test_results_sorted_by_market_cap_descending() {
    let provider = StubProvider::new();
    let caps = [("S-USD", 3e9), ("L-USD", 9e11), ("M-USD", 4e10), ("T-USD", 1e8)];
    for (ticker, cap) in caps {
        provider
            .with_quote(ticker, Some(1.5), Some(cap))
            .with_history(ticker, HistoryProfile::Coarse, rising(20, DAY_MS));
    }

    let report = orchestrator(provider, &["S-USD", "L-USD", "M-USD", "T-USD"])
        .run()
        .await;

    let order: Vec<&str> = report.results.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(order, vec!["L", "M", "S", "T"]);
    assert!(
        report
            .results
            .windows(2)
            .all(|w| w[0].market_cap >= w[1].market_cap)
    );
}

#[tokio::test]
async fn test_no_valid_instruments_skips_history() {
    let provider = StubProvider::new();
    provider.with_quote("Z-USD", Some(0.0), Some(0.0));

    let report = orchestrator(provider.clone(), &["Z-USD"]).run().await;

    assert_eq!(report.outcome, ScanOutcome::NoValidInstruments);
    assert!(report.results.is_empty());
    assert_eq!(provider.history_calls.load(Ordering::SeqCst), 0);
    assert_eq!(report.final_stage(), ScanStage::Done);
}

#[tokio::test]
async fn test_history_failure_ends_cycle_as_failed() {
    let provider = StubProvider::new();
    provider.with_quote("BTC-USD", Some(1.0), Some(1e12));
    provider.fail_history(true);

    let report = orchestrator(provider, &["BTC-USD"]).run().await;

    assert!(matches!(report.outcome, ScanOutcome::HistoryFailed { .. }));
    assert!(report.results.is_empty());
    assert_eq!(report.final_stage(), ScanStage::Failed);
}

#[tokio::test(start_paused = true)]
async fn test_metadata_concurrency_is_bounded_by_pool() {
    let provider = StubProvider::new();
    provider.set_quote_delay(Duration::from_millis(200));
    let tickers: Vec<String> = (0..23).map(|i| format!("C{}-USD", i)).collect();
    for t in &tickers {
        provider
            .with_quote(t, Some(2.0), Some(1e9))
            .with_history(t, HistoryProfile::Coarse, rising(20, DAY_MS));
    }
    let refs: Vec<&str> = tickers.iter().map(String::as_str).collect();

    let report = orchestrator(provider.clone(), &refs).run().await;

    assert_eq!(report.results.len(), 23);
    assert_eq!(provider.fast_calls.load(Ordering::SeqCst), 23);
    assert_eq!(provider.peak_in_flight.load(Ordering::SeqCst), 5);
}

#[tokio::test(start_paused = true)]
async fn test_slow_metadata_is_dropped_after_timeout() {
    let provider = StubProvider::new();
    provider.set_quote_delay(Duration::from_secs(20));
    provider.with_quote("SLOW-USD", Some(1.0), Some(1e9));

    let report = orchestrator(provider, &["SLOW-USD"]).run().await;

    assert_eq!(report.outcome, ScanOutcome::NoValidInstruments);
    assert_eq!(report.skipped[0].reason.label(), "metadata_timeout");
}

#[tokio::test]
async fn test_compute_failure_skips_only_that_instrument() {
    let provider = StubProvider::new();
    provider
        // Valid metadata, but the price is outside the decimal range
        .with_quote("HUGE-USD", Some(1e30), Some(8e11))
        .with_quote("ETH-USD", Some(3200.0), Some(3.8e11))
        .with_history("HUGE-USD", HistoryProfile::Coarse, rising(20, DAY_MS))
        .with_history("ETH-USD", HistoryProfile::Coarse, rising(20, DAY_MS));

    let report = orchestrator(provider, &["HUGE-USD", "ETH-USD"]).run().await;

    assert_eq!(report.outcome, ScanOutcome::Completed);
    assert_eq!(report.final_stage(), ScanStage::Done);
    let tickers: Vec<&str> = report.results.iter().map(|r| r.ticker.as_str()).collect();
    assert_eq!(tickers, vec!["ETH-USD"]);

    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].ticker, "HUGE-USD");
    assert_eq!(report.skipped[0].reason.label(), "compute_failed");
}
