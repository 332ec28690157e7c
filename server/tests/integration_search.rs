use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use search_core::{EngineConfig, SearchEngine};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;
use tower::ServiceExt;

fn write_tiny_corpus(dir: &Path) -> EngineConfig {
    let htmls = dir.join("htmls");
    fs::create_dir_all(&htmls).unwrap();
    let pages = [
        (1, "Apple", "<p>Apple</p><p>the pie</p>"),
        (2, "Banana", "<p>Banana bread</p>"),
        (3, "Apple pie", "<p>Banana</p>"),
    ];
    for (id, title, body) in pages {
        let html = format!("<html><head><title>{title}</title></head><body>{body}</body></html>");
        fs::write(htmls.join(format!("{id}.html")), html).unwrap();
    }
    fs::write(dir.join("stopwords.txt"), "the\n").unwrap();
    EngineConfig {
        corpus_dir: htmls,
        stopwords_path: dir.join("stopwords.txt"),
        index_path: dir.join("bm25_index.bin"),
        first_doc: 1,
        last_doc: 3,
        ..EngineConfig::default()
    }
}

fn build_tiny_index(dir: &Path) -> EngineConfig {
    let config = write_tiny_corpus(dir);
    SearchEngine::new(config.clone()).build_and_save().unwrap();
    config
}

async fn call(app: Router, uri: &str) -> (StatusCode, Bytes) {
    let req = Request::get(uri).body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, body)
}

#[tokio::test]
async fn search_returns_ranked_results() {
    let dir = tempdir().unwrap();
    let app = server::build_app(build_tiny_index(dir.path())).unwrap();

    let (status, body) = call(app, "/search?q=apple&k=2").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    let arr = json["results"].as_array().unwrap();
    assert_eq!(arr.len(), 2);
    assert_eq!(arr[0]["doc_id"].as_u64().unwrap(), 1);
    assert_eq!(arr[1]["doc_id"].as_u64().unwrap(), 3);
    assert_eq!(arr[0]["title"], "Apple");
    assert!(arr[0]["score"].as_f64().unwrap() > arr[1]["score"].as_f64().unwrap());
}

#[tokio::test]
async fn stopword_query_is_an_empty_success() {
    let dir = tempdir().unwrap();
    let app = server::build_app(build_tiny_index(dir.path())).unwrap();

    let (status, body) = call(app, "/search?q=the").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["total_hits"], 0);
}

#[tokio::test]
async fn blank_query_is_rejected() {
    let dir = tempdir().unwrap();
    let app = server::build_app(build_tiny_index(dir.path())).unwrap();

    let (status, body) = call(app, "/search?q=%20%20").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].as_str().unwrap().contains("empty"));
}

#[tokio::test]
async fn missing_index_reports_unavailable() {
    let dir = tempdir().unwrap();
    let app = server::build_app(write_tiny_corpus(dir.path())).unwrap();

    let (status, body) = call(app, "/search?q=apple").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].as_str().unwrap().contains("no index available"));
}

#[tokio::test]
async fn related_documents_exclude_self() {
    let dir = tempdir().unwrap();
    let app = server::build_app(build_tiny_index(dir.path())).unwrap();

    let (status, body) = call(app.clone(), "/doc/3/related").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    let ids: Vec<u64> = json["related"].as_array().unwrap().iter().map(|r| r["doc_id"].as_u64().unwrap()).collect();
    assert_eq!(ids, vec![1]);

    let (status, _) = call(app, "/doc/42/related").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
