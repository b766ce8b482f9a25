#![cfg(feature = "network")]

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use quizdrill::LoadError;
use quizdrill::error::FetchError;
use quizdrill::fetch::HttpFetcher;
use quizdrill::quiz::loader::QuestionLoader;

fn question(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "stem": "?",
        "options": [{"key": "a", "text": "x"}, {"key": "b", "text": "y"}],
        "answer": "a"
    })
}

async fn mount_manifest(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/quiz/manifest.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sources": [{"id": "net", "path": "./data/net.json", "enabled": true}]
        })))
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_every_load_bypasses_caches() {
    let server = MockServer::start().await;
    mount_manifest(&server).await;

    // First request sees the old file, every later one the new file.
    Mock::given(method("GET"))
        .and(path("/quiz/data/net.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([question("A")])))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/quiz/data/net.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([question("A"), question("B")])),
        )
        .mount(&server)
        .await;

    let manifest = format!("{}/quiz/manifest.json", server.uri());
    let (first, second) = tokio::task::spawn_blocking(move || {
        let loader = QuestionLoader::new(HttpFetcher::new(None).unwrap());
        let first = loader.load(&manifest).unwrap();
        let second = loader.load(&manifest).unwrap();
        (first, second)
    })
    .await
    .unwrap();

    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 2);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 4);
    for request in &requests {
        let cache_control = request
            .headers
            .get("cache-control")
            .and_then(|v| v.to_str().ok());
        assert_eq!(cache_control, Some("no-cache"));
    }

    let stamps: Vec<String> = requests
        .iter()
        .filter(|r| r.url.path() == "/quiz/data/net.json")
        .map(|r| {
            r.url
                .query_pairs()
                .find(|(k, _)| k == "_ts")
                .map(|(_, v)| v.into_owned())
                .expect("cache-bust parameter")
        })
        .collect();
    assert_eq!(stamps.len(), 2);
    assert_ne!(stamps[0], stamps[1]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_http_error_status_is_source_fetch_error() {
    let server = MockServer::start().await;
    mount_manifest(&server).await;
    Mock::given(method("GET"))
        .and(path("/quiz/data/net.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let manifest = format!("{}/quiz/manifest.json", server.uri());
    let err = tokio::task::spawn_blocking(move || {
        QuestionLoader::new(HttpFetcher::new(None).unwrap())
            .load(&manifest)
            .unwrap_err()
    })
    .await
    .unwrap();

    match err {
        LoadError::SourceFetch { id, path, source } => {
            assert_eq!(id, "net");
            assert_eq!(path, "./data/net.json");
            assert!(matches!(source, FetchError::Status(500)));
        }
        other => panic!("expected source fetch error, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_manifest_is_manifest_error() {
    let server = MockServer::start().await;
    let manifest = format!("{}/nowhere/manifest.json", server.uri());
    let err = tokio::task::spawn_blocking(move || {
        QuestionLoader::new(HttpFetcher::new(None).unwrap())
            .load(&manifest)
            .unwrap_err()
    })
    .await
    .unwrap();
    assert!(matches!(err, LoadError::Manifest { .. }));
    assert!(err.to_string().contains("404"));
}
