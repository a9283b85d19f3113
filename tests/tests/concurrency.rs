use std::{sync::Arc, time::Duration};

use futures::future::join_all;
use relink::Resolution;
use relink_test_utils::StubNet;
use rstest::rstest;

use crate::common::{cdn_url, config, stub_resolver, tokens};

#[rstest]
#[tokio::test]
#[timeout(Duration::from_secs(10))]
async fn concurrent_resolves_share_one_probe_budget() {
    let existing: Vec<String> = (0..12)
        .map(|i| cdn_url(&format!("imagens/{i}.png")).to_string())
        .collect();
    let net = StubNet::new()
        .with_existing(&existing)
        .with_delay(Duration::from_millis(10));
    let resolver = stub_resolver(config().with_max_parallel_probes(3), &net);

    let references: Vec<String> = (0..12).map(|i| format!("old/{i}.png")).collect();
    let results = resolver.resolve_many(&references).await;

    assert_eq!(net.max_in_flight(), 3);
    assert_eq!(net.call_count(), 24);
    for (i, result) in results.into_iter().enumerate() {
        assert_eq!(result, Resolution::Found(cdn_url(&format!("imagens/{i}.png"))));
    }
    assert_eq!(resolver.stats().in_flight, 0);
    assert_eq!(resolver.stats().queued, 0);
}

#[rstest]
#[tokio::test]
#[timeout(Duration::from_secs(10))]
async fn one_resolve_probes_in_priority_order() {
    let net = StubNet::new().with_delay(Duration::from_millis(2));
    let resolver = stub_resolver(config().with_seed_version_tokens(["1", "2", "3"]), &net);

    let expected = resolver.candidates("z.webp");
    assert_eq!(resolver.resolve("z.webp").await, Resolution::NotFound);

    assert_eq!(net.calls(), expected);
    assert_eq!(net.max_in_flight(), 1);
}

#[rstest]
#[tokio::test]
#[timeout(Duration::from_secs(10))]
async fn racing_learners_add_token_once() {
    let winner = cdn_url("v777/imagens/same.png");
    let net = StubNet::new()
        .with_existing([winner.as_str()])
        .with_delay(Duration::from_millis(5));
    let resolver = Arc::new(stub_resolver(config().with_max_ledger_size(4), &net));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let resolver = Arc::clone(&resolver);
            let reference = winner.to_string();
            tokio::spawn(async move { resolver.resolve(&reference).await })
        })
        .collect();
    for result in join_all(handles).await {
        assert_eq!(result.unwrap(), Resolution::Found(winner.clone()));
    }

    assert_eq!(tokens(&resolver), ["777"]);
}

#[rstest]
#[tokio::test]
#[timeout(Duration::from_secs(10))]
async fn ledger_stays_bounded_under_concurrent_learning() {
    let winners: Vec<String> = (100..130)
        .map(|v| cdn_url(&format!("v{v}/editor/p.png")).to_string())
        .collect();
    let net = StubNet::new().with_existing(&winners);
    let resolver = stub_resolver(config(), &net);

    let results = resolver.resolve_many(&winners).await;

    assert!(results.iter().all(Resolution::is_found));
    assert_eq!(resolver.ledger().len(), 8);
    assert_eq!(resolver.stats().ledger_tokens, 8);
}
