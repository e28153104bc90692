//! Failure injection tests for the selection engine.

use semver::Version;
use service_selector::config::SelectorConfig;
use service_selector::selection::ServiceSelector;
use service_selector::source::{Candidate, StaticCandidateSource};
use std::sync::Arc;
use std::time::{Duration, Instant};

mod common;

fn source_for(endpoints: &[String]) -> StaticCandidateSource {
    let candidates = endpoints
        .iter()
        .map(|e| Candidate::parse(e).unwrap())
        .collect();
    StaticCandidateSource::new(candidates, Version::parse("1.2.3").unwrap())
}

#[tokio::test]
async fn probe_timeout_ends_in_exhaustion_not_a_hang() {
    let silent = common::start_black_hole_node().await;

    let mut config = SelectorConfig::default();
    config.probe.request_timeout_ms = 100;

    let source = source_for(&[format!("http://{silent}")]);
    let selector = ServiceSelector::new(config, Arc::new(source)).unwrap();

    let start = Instant::now();
    assert_eq!(selector.select().await.unwrap(), None);
    let elapsed = start.elapsed();

    assert!(elapsed >= Duration::from_millis(100), "timeout must be honored");
    assert!(elapsed < Duration::from_secs(2), "selection must not hang");
    // Exhaustion performs a full reset so the next call starts clean.
    assert_eq!(selector.unhealthy_size(), 0);
}

#[tokio::test]
async fn connection_refused_is_quarantined_not_fatal() {
    let refused = common::unreachable_endpoint().await;
    let healthy = common::start_slow_node(200, "1.2.3", 0, 50).await;

    let mut config = SelectorConfig::default();
    config.probe.request_timeout_ms = 1_000;

    let source = source_for(&[refused.clone(), healthy.endpoint()]);
    let selector = ServiceSelector::new(config, Arc::new(source)).unwrap();

    let selected = selector.select().await.unwrap();
    assert_eq!(selected, Some(Candidate::parse(&healthy.endpoint()).unwrap()));
    assert_eq!(selector.unhealthy_size(), 1);
}

#[tokio::test]
async fn quarantined_node_becomes_eligible_after_ttl() {
    let flaky = common::start_mock_node(400, "1.2.3", 0).await;
    let steady = common::start_slow_node(200, "1.2.3", 0, 50).await;

    let mut config = SelectorConfig::default();
    config.probe.request_timeout_ms = 1_000;
    config.selection.unhealthy_ttl_ms = 300;

    let source = source_for(&[flaky.endpoint(), steady.endpoint()]);
    let selector = ServiceSelector::new(config, Arc::new(source)).unwrap();

    assert_eq!(
        selector.select().await.unwrap(),
        Some(Candidate::parse(&steady.endpoint()).unwrap())
    );
    assert_eq!(selector.unhealthy_size(), 1);

    // Roles flip while the quarantine runs out.
    flaky.set_status(200);
    steady.set_status(400);
    tokio::time::sleep(Duration::from_millis(400)).await;

    assert_eq!(
        selector.select().await.unwrap(),
        Some(Candidate::parse(&flaky.endpoint()).unwrap())
    );
}

#[tokio::test]
async fn full_exhaustion_resets_state_and_reports_none() {
    let bad1 = common::start_mock_node(500, "1.2.3", 0).await;
    let bad2 = common::start_mock_node(400, "1.2.3", 0).await;

    let mut config = SelectorConfig::default();
    config.probe.request_timeout_ms = 1_000;

    let source = source_for(&[bad1.endpoint(), bad2.endpoint()]);
    let selector = ServiceSelector::new(config, Arc::new(source)).unwrap();

    assert_eq!(selector.select().await.unwrap(), None);
    assert_eq!(selector.unhealthy_size(), 0);
    assert_eq!(selector.backup_size(), 0);
    assert_eq!(selector.total_attempts(), 2);
}

#[tokio::test]
async fn malformed_health_body_is_treated_as_unhealthy() {
    let garbled = common::start_raw_node(200, "not json at all").await;

    let mut config = SelectorConfig::default();
    config.probe.request_timeout_ms = 1_000;

    let source = source_for(&[garbled.endpoint()]);
    let selector = ServiceSelector::new(config, Arc::new(source)).unwrap();

    assert_eq!(selector.select().await.unwrap(), None);
}

#[tokio::test]
async fn construction_fails_fast_on_bad_config() {
    let mut config = SelectorConfig::default();
    config.selection.max_concurrent_requests = 0;

    let source = source_for(&[]);
    assert!(ServiceSelector::new(config, Arc::new(source)).is_err());
}

#[tokio::test]
async fn construction_fails_fast_on_malformed_whitelist() {
    let mut config = SelectorConfig::default();
    config.whitelist = Some(vec!["definitely not a url".to_string()]);

    let source = source_for(&[]);
    assert!(ServiceSelector::new(config, Arc::new(source)).is_err());
}
