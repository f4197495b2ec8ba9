use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use polysearch_core::builder::{IndexBuilder, RawDocument};
use polysearch_core::engine::Resources;
use polysearch_core::persist::save_snapshot;
use polysearch_core::segment::SegmenterKind;
use polysearch_core::{SearchConfig, SearchEngine};
use serde_json::Value;
use server::{router, AppState};
use std::fs;
use std::path::Path;
use tempfile::tempdir;
use tower::ServiceExt;

fn tiny_config(dir: &Path) -> SearchConfig {
    fs::write(dir.join("en_dict.txt"), "rust\nsystems\nprogramming\nlearning\nnotes\n").unwrap();
    fs::write(dir.join("en_thesaurus.txt"), "rust:ferrous,oxide\n").unwrap();
    let mut config = SearchConfig::default();
    config.index.dir = dir.join("index");
    config.resources.en_stopwords = None;
    config.resources.zh_stopwords = None;
    config.resources.en_dictionary = dir.join("en_dict.txt");
    config.resources.zh_dictionary = dir.join("zh_dict.txt");
    config.resources.en_thesaurus = dir.join("en_thesaurus.txt");
    config.resources.zh_thesaurus = dir.join("zh_thesaurus.txt");
    config.resources.segmenter = SegmenterKind::MaxMatch;
    config
}

fn build_tiny_index(config: &SearchConfig, docs: &[(&str, &str)]) {
    let resources = Resources::load(config).unwrap();
    let mut builder = IndexBuilder::new(resources.tokenizer);
    for (id, (title, content)) in docs.iter().enumerate() {
        let raw = RawDocument {
            url: Some(format!("https://example.com/{id}")),
            title: Some(title.to_string()),
            content: Some(content.to_string()),
            ..Default::default()
        };
        builder.add(id as u32, &format!("{id}.json"), raw).unwrap();
    }
    save_snapshot(&config.index.paths(), &builder.finish()).unwrap();
}

const DOCS: &[(&str, &str)] = &[
    ("Systems", "Rust is great. rust systems programming. rust"),
    ("Notes", "Learning rust."),
    ("Garden", "Gardening tips for tomatoes."),
];

fn app_with_token(config: &SearchConfig, token: Option<&str>) -> Router {
    let engine = SearchEngine::open(config).unwrap();
    router(AppState::new(engine, config.clone(), token.map(str::to_string)))
}

async fn call(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let body: Bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    call(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

#[tokio::test]
async fn search_returns_ranked_results() {
    let dir = tempdir().unwrap();
    let config = tiny_config(dir.path());
    build_tiny_index(&config, DOCS);
    let app = app_with_token(&config, None);

    let (status, json) = get(&app, "/search?q=rust&k=2").await;
    assert_eq!(status, StatusCode::OK);
    let arr = json["results"].as_array().unwrap();
    assert_eq!(arr.len(), 2);
    assert_eq!(arr[0]["doc_id"].as_u64().unwrap(), 0);
    assert_eq!(arr[1]["doc_id"].as_u64().unwrap(), 1);
    assert!(arr[0]["score"].as_f64().unwrap() > arr[1]["score"].as_f64().unwrap());
    assert_eq!(arr[0]["category"], "uncategorized");
    assert_eq!(arr[0]["language"], "en");

    let (_, json) = get(&app, "/search?q=rust%20NOT%20learning").await;
    let ids: Vec<u64> = json["results"].as_array().unwrap().iter().map(|r| r["doc_id"].as_u64().unwrap()).collect();
    assert_eq!(ids, vec![0]);
}

#[tokio::test]
async fn leading_operator_is_a_bad_request() {
    let dir = tempdir().unwrap();
    let config = tiny_config(dir.path());
    build_tiny_index(&config, DOCS);
    let app = app_with_token(&config, None);

    let (status, json) = get(&app, "/search?q=AND%20rust").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["kind"], "LeadingOperatorError");
}

#[tokio::test]
async fn preprocessing_endpoints_report_changes() {
    let dir = tempdir().unwrap();
    let config = tiny_config(dir.path());
    build_tiny_index(&config, DOCS);
    let app = app_with_token(&config, None);

    let (status, json) = get(&app, "/query/processed?q=rust%20AND%20systms").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["corrected"], "rust AND systems");
    assert!(json["expanded"].as_str().unwrap().contains("ferrous"));

    let (_, json) = get(&app, "/suggest/spelling?q=systms").await;
    assert!(json["suggestions"].as_array().unwrap().iter().any(|s| s == "systems"));

    let (_, json) = get(&app, "/suggest/synonyms?q=rust").await;
    assert_eq!(json["suggestions"], serde_json::json!(["ferrous", "oxide"]));
}

#[tokio::test]
async fn doc_lookup() {
    let dir = tempdir().unwrap();
    let config = tiny_config(dir.path());
    build_tiny_index(&config, DOCS);
    let app = app_with_token(&config, None);

    let (status, json) = get(&app, "/doc/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["title"], "Notes");
    assert_eq!(json["url"], "https://example.com/1");

    let (status, json) = get(&app, "/doc/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["kind"], "NotFound");
}

#[tokio::test]
async fn reload_requires_token_and_swaps_the_index() {
    let dir = tempdir().unwrap();
    let config = tiny_config(dir.path());
    build_tiny_index(&config, DOCS);
    let app = app_with_token(&config, Some("secret"));

    let (status, _) = call(&app, Request::post("/index/reload").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, json) = get(&app, "/search?q=tomatoes").await;
    assert_eq!(json["total_hits"], 1);

    build_tiny_index(&config, &[("Orchard", "Apples and pears.")]);
    let (_, json) = get(&app, "/search?q=tomatoes").await;
    assert_eq!(json["total_hits"], 1, "old snapshot keeps serving until reload");

    let req = Request::post("/index/reload").header("X-ADMIN-TOKEN", "secret").body(Body::empty()).unwrap();
    let (status, json) = call(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_docs"], 1);

    let (_, json) = get(&app, "/search?q=tomatoes").await;
    assert_eq!(json["total_hits"], 0);
    let (_, json) = get(&app, "/search?q=apples").await;
    assert_eq!(json["results"][0]["doc_id"], 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_queries_are_served_off_the_async_workers() {
    let dir = tempdir().unwrap();
    let config = tiny_config(dir.path());
    build_tiny_index(&config, DOCS);
    let app = app_with_token(&config, None);

    let mut handles = Vec::new();
    for i in 0..16 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            let uri = if i % 2 == 0 { "/search?q=rust" } else { "/query/processed?q=systms" };
            get(&app, uri).await
        }));
    }
    for (i, handle) in handles.into_iter().enumerate() {
        let (status, json) = handle.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        if i % 2 == 0 {
            assert_eq!(json["total_hits"], 2);
        } else {
            assert_eq!(json["corrected"], "systems");
        }
    }
}
