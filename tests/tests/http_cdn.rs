use std::time::Duration;

use relink::{Resolution, Resolver, ResolverConfig, probe::ProbeMethod};
use relink_test_utils::TestCdn;
use rstest::rstest;

fn resolver(cdn: &TestCdn, method: ProbeMethod) -> Resolver {
    Resolver::new(
        ResolverConfig::new(cdn.base_url())
            .unwrap()
            .with_probe_method(method)
            .with_probe_timeout(Duration::from_secs(2)),
    )
    .unwrap()
}

#[rstest]
#[case::head(ProbeMethod::Head)]
#[case::range_get(ProbeMethod::RangeGet)]
#[tokio::test]
#[timeout(Duration::from_secs(10))]
async fn resolves_against_http_cdn(#[case] method: ProbeMethod) {
    let cdn = TestCdn::start(["imagens/foo.png"]).await;
    let resolver = resolver(&cdn, method);

    let resolution = resolver.resolve("uploads/editor/foo.png").await;

    assert_eq!(resolution, Resolution::Found(cdn.object_url("imagens/foo.png")));
    assert_eq!(cdn.request_count("editor/foo.png"), 1);
    assert_eq!(cdn.request_count("imagens/foo.png"), 1);

    // Both outcomes are cached now.
    resolver.resolve("uploads/editor/foo.png").await;
    assert_eq!(cdn.total_requests(), 2);
}

#[rstest]
#[tokio::test]
#[timeout(Duration::from_secs(10))]
async fn learned_version_shortens_next_lookup() {
    let cdn = TestCdn::start(["v42/imagens/cover.png", "v42/editor/bar.jpg"]).await;
    let resolver = resolver(&cdn, ProbeMethod::Head);

    let learned = resolver
        .resolve(cdn.object_url("v42/imagens/cover.png").as_str())
        .await;
    assert!(learned.is_found());
    assert_eq!(resolver.stats().ledger_tokens, 1);

    let resolution = resolver.resolve("C:\\old-site\\imagens\\bar.jpg").await;

    assert_eq!(resolution, Resolution::Found(cdn.object_url("v42/editor/bar.jpg")));
    assert_eq!(cdn.total_requests(), 2);
}

#[rstest]
#[tokio::test]
#[timeout(Duration::from_secs(10))]
async fn missing_everywhere_is_not_found() {
    let cdn = TestCdn::start(Vec::<String>::new()).await;
    let resolver = resolver(&cdn, ProbeMethod::Head);

    assert_eq!(resolver.resolve("a.png").await, Resolution::NotFound);
    assert_eq!(cdn.total_requests(), 2);
}
