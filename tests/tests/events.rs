use std::time::Duration;

use relink::events::{Event, LedgerEvent, ProbeEvent, ResolveEvent};
use relink_test_utils::StubNet;
use rstest::rstest;

use crate::common::{cdn_url, config, stub_resolver};

fn drain(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[rstest]
#[tokio::test]
#[timeout(Duration::from_secs(5))]
async fn learning_publishes_token_and_resolution() {
    let winner = cdn_url("v999/imagens/foo.png");
    let net = StubNet::new().with_existing([winner.as_str()]);
    let resolver = stub_resolver(config(), &net);
    let mut rx = resolver.subscribe();

    resolver.resolve(winner.as_str()).await;
    let events = drain(&mut rx);

    assert!(events.contains(&Event::Ledger(LedgerEvent::TokenLearned {
        token: "999".into(),
        evicted: None,
    })));
    assert!(matches!(
        events.last(),
        Some(Event::Resolve(ResolveEvent::Resolved { probes: 1, .. }))
    ));
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, Event::Probe(ProbeEvent::Completed { ok: true, .. })))
            .count(),
        1
    );
}

#[rstest]
#[tokio::test]
#[timeout(Duration::from_secs(5))]
async fn cache_hits_and_not_found_are_published() {
    let net = StubNet::new();
    let resolver = stub_resolver(config(), &net);
    resolver.resolve("gone.png").await;
    let mut rx = resolver.subscribe();

    resolver.resolve("gone.png").await;
    let events = drain(&mut rx);

    assert_eq!(
        events,
        vec![
            Event::Resolve(ResolveEvent::CacheHit {
                url: cdn_url("editor/gone.png"),
                ok: false,
            }),
            Event::Resolve(ResolveEvent::CacheHit {
                url: cdn_url("imagens/gone.png"),
                ok: false,
            }),
            Event::Resolve(ResolveEvent::NotFound {
                reference: "gone.png".into(),
                candidates: 2,
            }),
        ]
    );
}
