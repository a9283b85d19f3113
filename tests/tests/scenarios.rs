use std::time::Duration;

use relink::{Resolution, prelude::VersionToken};
use relink_test_utils::StubNet;
use rstest::rstest;

use crate::common::{cdn_url, config, stub_resolver, tokens};

#[rstest]
#[tokio::test]
#[timeout(Duration::from_secs(5))]
async fn resolves_versionless_without_learning() {
    let net = StubNet::new().with_existing([cdn_url("imagens/foo.png").as_str()]);
    let resolver = stub_resolver(config(), &net);

    let resolution = resolver.resolve("uploads/editor/foo.png").await;

    assert_eq!(resolution, Resolution::Found(cdn_url("imagens/foo.png")));
    assert!(resolver.ledger().is_empty());
    assert_eq!(resolver.cache().get(&cdn_url("editor/foo.png")), Some(false));
    assert_eq!(resolver.cache().get(&cdn_url("imagens/foo.png")), Some(true));
    assert_eq!(
        net.calls(),
        vec![cdn_url("editor/foo.png"), cdn_url("imagens/foo.png")]
    );
}

#[rstest]
#[tokio::test]
#[timeout(Duration::from_secs(5))]
async fn learns_token_and_prefers_it_next_time() {
    let winner = cdn_url("v999/imagens/foo.png");
    let net = StubNet::new().with_existing([winner.as_str(), cdn_url("imagens/bar.jpg").as_str()]);
    let resolver = stub_resolver(config(), &net);

    let resolution = resolver.resolve(winner.as_str()).await;

    assert_eq!(resolution, Resolution::Found(winner.clone()));
    assert_eq!(tokens(&resolver), ["999"]);

    let resolution = resolver.resolve("uploads/bar.jpg").await;

    assert_eq!(resolution, Resolution::Found(cdn_url("imagens/bar.jpg")));
    assert_eq!(
        net.calls()[1..],
        [
            cdn_url("v999/editor/bar.jpg"),
            cdn_url("v999/imagens/bar.jpg"),
            cdn_url("editor/bar.jpg"),
            cdn_url("imagens/bar.jpg"),
        ]
    );
}

#[rstest]
#[tokio::test]
#[timeout(Duration::from_secs(5))]
async fn learned_token_wins_on_other_filename() {
    let net = StubNet::new().with_existing([
        cdn_url("v999/imagens/foo.png").as_str(),
        cdn_url("v999/editor/baz.png").as_str(),
    ]);
    let resolver = stub_resolver(config(), &net);
    resolver.resolve(cdn_url("v999/imagens/foo.png").as_str()).await;

    let resolution = resolver.resolve("legacy/imagens/baz.png").await;

    assert_eq!(resolution, Resolution::Found(cdn_url("v999/editor/baz.png")));
    assert_eq!(net.call_count(), 2);
}

#[rstest]
#[tokio::test]
#[timeout(Duration::from_secs(5))]
async fn seeded_token_is_tried_first_and_not_relearned() {
    let net = StubNet::new().with_existing([cdn_url("v111/imagens/x.png").as_str()]);
    let resolver = stub_resolver(config().with_seed_version_tokens(["111"]), &net);
    let mut events = resolver.subscribe();

    let resolution = resolver.resolve("x.png").await;

    assert_eq!(resolution, Resolution::Found(cdn_url("v111/imagens/x.png")));
    assert_eq!(tokens(&resolver), ["111"]);
    assert_eq!(net.call_count(), 2);
    while let Ok(event) = events.try_recv() {
        assert!(!matches!(event, relink::events::Event::Ledger(_)));
    }
}

#[rstest]
#[tokio::test]
#[timeout(Duration::from_secs(5))]
async fn ledger_evicts_oldest_learned_token() {
    let net = StubNet::new().with_existing(
        ["v1/editor/a.png", "v2/editor/a.png", "v3/editor/a.png"].map(|p| cdn_url(p).to_string()),
    );
    let resolver = stub_resolver(config().with_max_ledger_size(2), &net);

    for version in ["v1", "v2", "v3"] {
        let reference = cdn_url(&format!("{version}/editor/a.png"));
        assert!(resolver.resolve(reference.as_str()).await.is_found());
    }

    assert_eq!(tokens(&resolver), ["2", "3"]);
    assert!(!resolver.ledger().contains(&VersionToken::new("1").unwrap()));
}

#[rstest]
#[tokio::test]
#[timeout(Duration::from_secs(5))]
async fn negative_result_is_retried_after_ttl() {
    let net = StubNet::new();
    let resolver = stub_resolver(
        config()
            .with_content_kinds(["imagens"])
            .with_cache_ttl(Duration::from_millis(100)),
        &net,
    );

    assert_eq!(resolver.resolve("late.png").await, Resolution::NotFound);
    net.add_existing(&cdn_url("imagens/late.png"));
    assert_eq!(resolver.resolve("late.png").await, Resolution::NotFound);
    assert_eq!(net.call_count(), 1);

    tokio::time::sleep(Duration::from_millis(150)).await;

    assert!(resolver.resolve("late.png").await.is_found());
    assert_eq!(net.call_count(), 2);
}

#[rstest]
#[case::text("notes.txt")]
#[case::gif("anim.gif")]
#[case::blank("")]
#[tokio::test]
#[timeout(Duration::from_secs(5))]
async fn non_images_never_probe(#[case] reference: &str) {
    let net = StubNet::new();
    let resolver = stub_resolver(config(), &net);

    assert_eq!(resolver.resolve(reference).await, Resolution::NotFound);
    assert_eq!(resolver.best_guess(reference), None);
    assert_eq!(net.call_count(), 0);
}

#[test]
fn best_guess_and_dump_do_no_io() {
    let net = StubNet::new();
    let resolver = stub_resolver(config().with_seed_version_tokens(["111", "222"]), &net);

    assert_eq!(
        resolver.best_guess("x.jpg"),
        Some(cdn_url("v222/editor/x.jpg"))
    );

    let dump = resolver.debug_candidates(["x.jpg"], 10);
    let json = serde_json::to_value(&dump).unwrap();

    assert_eq!(json[0]["reference"], "x.jpg");
    assert_eq!(
        json[0]["candidates"],
        serde_json::json!([
            cdn_url("v222/editor/x.jpg").as_str(),
            cdn_url("v222/imagens/x.jpg").as_str(),
            cdn_url("v111/editor/x.jpg").as_str(),
            cdn_url("v111/imagens/x.jpg").as_str(),
            cdn_url("editor/x.jpg").as_str(),
            cdn_url("imagens/x.jpg").as_str(),
        ])
    );
    assert_eq!(net.call_count(), 0);
}
