use clusterdash::poller::{build_client, fetch_clusters, parse_endpoint, DEFAULT_TIMEOUT};

// Integration probe: only runs when CLUSTERDASH_URL points at a live clusters endpoint.
// Example: CLUSTERDASH_URL=http://127.0.0.1:5000/api/clusters cargo test -p clusterdash --test poll_probe -- --nocapture
#[tokio::test]
async fn probe_clusters_endpoint() {
    let raw = match std::env::var("CLUSTERDASH_URL") {
        Ok(v) if !v.is_empty() => v,
        _ => {
            eprintln!(
                "skipping poll_probe: set CLUSTERDASH_URL=http://host:port/api/clusters to run this integration test"
            );
            return;
        }
    };

    let url = parse_endpoint(&raw).expect("valid endpoint");
    let client = build_client(DEFAULT_TIMEOUT, None).expect("http client");
    let clusters = fetch_clusters(&client, &url).await.expect("clusters response");
    for c in clusters.iter() {
        eprintln!("{} ({}) {:?}", c.cluster_id, c.title(), c.health);
    }
}
