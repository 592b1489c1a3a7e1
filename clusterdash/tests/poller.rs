//! Poller against a throwaway local HTTP endpoint.
use std::time::Duration;

use clusterdash::poller::{build_client, fetch_clusters, spawn_poller, PollError, PollEvent};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;

/// Serve `status` + `body` to every connection until the test ends.
async fn serve(status: &'static str, body: &'static str) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut sock, _)) = listener.accept().await else {
                return;
            };
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = sock.read(&mut buf).await;
                let resp = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = sock.write_all(resp.as_bytes()).await;
                let _ = sock.shutdown().await;
            });
        }
    });
    Url::parse(&format!("http://{addr}/api/clusters")).unwrap()
}

fn client() -> reqwest::Client {
    build_client(Duration::from_secs(5), None).unwrap()
}

const TWO_CLUSTERS: &str = r#"[
  {"clusterId": "c1", "displayIndex": 1, "clusterName": "one", "health": "healthy"},
  {"clusterName": "no id"},
  {"clusterId": "c2", "displayIndex": 0, "health": "unhealthy"}
]"#;

#[tokio::test]
async fn fetch_decodes_and_drops_malformed_entries() {
    let url = serve("200 OK", TWO_CLUSTERS).await;
    let clusters = fetch_clusters(&client(), &url).await.unwrap();
    let ids: Vec<&str> = clusters.iter().map(|c| c.cluster_id.as_str()).collect();
    assert_eq!(ids, vec!["c1", "c2"]);
}

#[tokio::test]
async fn server_error_is_a_status_error() {
    let url = serve("503 Service Unavailable", "[]").await;
    let err = fetch_clusters(&client(), &url).await.unwrap_err();
    assert!(matches!(err, PollError::Status(s) if s.as_u16() == 503), "{err}");
}

#[tokio::test]
async fn non_array_body_is_a_decode_error() {
    let url = serve("200 OK", r#"{"error": "nope"}"#).await;
    let err = fetch_clusters(&client(), &url).await.unwrap_err();
    assert!(matches!(err, PollError::Decode(_)), "{err}");
}

#[tokio::test]
async fn refused_connection_is_a_transport_error() {
    // bind then drop to get a port nobody listens on
    let addr = TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap()
        .local_addr()
        .unwrap();
    let url = Url::parse(&format!("http://{addr}/api/clusters")).unwrap();
    let err = fetch_clusters(&client(), &url).await.unwrap_err();
    assert!(matches!(err, PollError::Transport(_)), "{err}");
}

#[tokio::test]
async fn poller_numbers_each_tick() {
    let url = serve("200 OK", TWO_CLUSTERS).await;
    let (mut rx, handle) = spawn_poller(client(), url, Duration::from_millis(50));
    let mut seqs = Vec::new();
    while seqs.len() < 3 {
        let ev = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("poll result in time")
            .expect("channel open");
        assert!(matches!(ev, PollEvent::Snapshots { .. }), "{ev:?}");
        seqs.push(ev.seq());
    }
    handle.abort();
    seqs.sort_unstable();
    seqs.dedup();
    assert_eq!(seqs.len(), 3);
    assert!(seqs.iter().all(|s| *s >= 1));
}
