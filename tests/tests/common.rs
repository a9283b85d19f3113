use relink::{Resolver, ResolverConfig};
use relink_test_utils::StubNet;
use url::Url;

pub const CDN: &str = "https://res.example.com/demo/image/upload";

pub fn cdn_url(path: &str) -> Url {
    Url::parse(&format!("{CDN}/{path}")).unwrap()
}

pub fn config() -> ResolverConfig {
    ResolverConfig::new(CDN)
        .unwrap()
        .with_content_kinds(["editor", "imagens"])
}

pub fn stub_resolver(config: ResolverConfig, net: &StubNet) -> Resolver<StubNet> {
    Resolver::with_net(config, net.clone()).unwrap()
}

pub fn tokens(resolver: &Resolver<StubNet>) -> Vec<String> {
    resolver
        .ledger()
        .snapshot()
        .iter()
        .map(ToString::to_string)
        .collect()
}
