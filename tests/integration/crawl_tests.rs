//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use netr::config::{Config, ExportFormat, OutputConfig, Profile};
use netr::output::export;
use netr::{crawl, Crawler, PageRecord};
use std::collections::BTreeSet;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a fast test configuration: no delay, a few workers
fn create_test_config() -> Config {
    let mut config = Config::for_profile(Profile::Basic);
    config.crawler.max_threads = 4;
    config.crawler.delay_secs = 0.0;
    config.crawler.max_depth = 3;
    config.crawler.max_pages = 100;
    config.crawler.timeout_secs = 5;
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(&body))
        .mount(server)
        .await;
}

fn urls(records: &[PageRecord]) -> BTreeSet<String> {
    records.iter().map(|r| r.url.clone()).collect()
}

#[tokio::test]
async fn test_two_page_crawl() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        r#"<html><head><title>Home</title></head><body>
            <p>Contact us at team@example.com</p>
            <a href="/about">About</a>
        </body></html>"#
            .to_string(),
    )
    .await;
    mount_page(
        &server,
        "/about",
        r#"<html><head><title>About</title></head><body>
            <a href="/">Home</a>
        </body></html>"#
            .to_string(),
    )
    .await;

    let mut config = create_test_config();
    config.crawler.max_depth = 1;
    config.crawler.max_pages = 10;

    let (report, records) = crawl(config, &format!("{}/", base)).await.unwrap();

    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 0);
    assert_eq!(records.len(), 2);
    assert_eq!(
        urls(&records),
        BTreeSet::from([format!("{}/", base), format!("{}/about", base)])
    );

    let home = records.iter().find(|r| r.title == "Home").unwrap();
    let about_url = format!("{}/about", base);
    assert!(home.outbound_links().any(|link| link == about_url));
    assert!(home.secrets["emails"].contains("team@example.com"));
}

#[tokio::test]
async fn test_robots_disallowed_path_is_never_fetched() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private/\n"),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/",
        r#"<a href="/private/secret">Secret</a><a href="/public">Public</a>"#.to_string(),
    )
    .await;
    mount_page(&server, "/public", "<p>public</p>".to_string()).await;
    Mock::given(method("GET"))
        .and(path("/private/secret"))
        .respond_with(html("<p>secret</p>"))
        .expect(0)
        .mount(&server)
        .await;

    let (report, records) = crawl(create_test_config(), &server.uri()).await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(report.skipped, 1);
    assert!(records.iter().all(|r| !r.url.contains("/private/")));
}

#[tokio::test]
async fn test_ignore_robots_fetches_everything() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /\n"))
        .expect(0)
        .mount(&server)
        .await;
    mount_page(&server, "/", "<p>home</p>".to_string()).await;

    let mut config = create_test_config();
    config.politeness.respect_robots = false;

    let (_, records) = crawl(config, &server.uri()).await.unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn test_slow_page_times_out_without_stalling_the_run() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<a href="/slow">Slow</a><a href="/fast">Fast</a>"#.to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html("<p>late</p>").set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;
    mount_page(&server, "/fast", "<p>fast</p>".to_string()).await;

    let mut config = create_test_config();
    config.crawler.timeout_secs = 1;

    let (report, records) = crawl(config, &server.uri()).await.unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| !r.url.ends_with("/slow")));
    assert!(report.elapsed < Duration::from_secs(5));
}

#[tokio::test]
async fn test_non_200_status_is_a_failure() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<a href="/gone">Gone</a>"#.to_string()).await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let (report, records) = crawl(create_test_config(), &server.uri()).await.unwrap();

    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn test_max_pages_one_fetches_only_the_seed() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<a href="/a">A</a><a href="/b">B</a>"#.to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html("<p>a</p>"))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config();
    config.crawler.max_pages = 1;

    let (report, records) = crawl(config, &server.uri()).await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(report.visited, 1);
}

#[tokio::test]
async fn test_max_depth_zero_does_not_follow_links() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<a href="/child">Child</a>"#.to_string()).await;
    Mock::given(method("GET"))
        .and(path("/child"))
        .respond_with(html("<p>child</p>"))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config();
    config.crawler.max_depth = 0;

    let (report, records) = crawl(config, &server.uri()).await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].links.len(), 1);
    assert_eq!(report.visited, 1);
}

#[tokio::test]
async fn test_shared_links_are_fetched_once() {
    let server = MockServer::start().await;

    let hub: String = (0..8)
        .map(|i| format!(r#"<a href="/p{}">P{}</a>"#, i, i))
        .collect();
    mount_page(&server, "/", hub).await;

    for i in 0..8 {
        // Every page links to every other page and to variants of the shared target
        let body: String = (0..8)
            .map(|j| format!(r#"<a href="/p{}">P{}</a>"#, j, j))
            .chain([
                r#"<a href="/shared">S</a>"#.to_string(),
                r#"<a href="/shared#top">S</a>"#.to_string(),
                r#"<a href="/shared?utm_source=x">S</a>"#.to_string(),
            ])
            .collect();
        mount_page(&server, &format!("/p{}", i), body).await;
    }

    Mock::given(method("GET"))
        .and(path("/shared"))
        .respond_with(html("<p>shared</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = create_test_config();
    config.crawler.max_threads = 16;

    let (report, records) = crawl(config, &server.uri()).await.unwrap();

    assert_eq!(records.len(), 10);
    assert_eq!(urls(&records).len(), 10);
    assert_eq!(report.visited, 10);
}

#[tokio::test]
async fn test_json_export_round_trip() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_page(
        &server,
        "/",
        r#"<title>Café</title><a href="/next">Next</a>"#.to_string(),
    )
    .await;
    mount_page(&server, "/next", "<p>next</p>".to_string()).await;

    let crawler = Crawler::new(create_test_config()).unwrap();
    crawler.run(&server.uri()).await.unwrap();
    let records = crawler.results().all();

    let output = OutputConfig {
        format: ExportFormat::Json,
        stem: dir.path().join("run").to_string_lossy().into_owned(),
    };
    let path = export(&records, &output, Profile::Basic).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("Café"));

    let parsed: Vec<PageRecord> = serde_json::from_str(&content).unwrap();
    assert_eq!(parsed.len(), records.len());
    assert_eq!(urls(&parsed), urls(&records));
}

#[tokio::test]
async fn test_failed_run_still_exports_empty_corpus() {
    let dir = tempfile::tempdir().unwrap();

    let mut config = create_test_config();
    config.politeness.respect_robots = false;
    let crawler = Crawler::new(config).unwrap();
    let report = crawler.run("http://127.0.0.1:9/").await.unwrap();
    assert_eq!(report.pages_stored, 0);

    for format in [ExportFormat::Json, ExportFormat::Csv, ExportFormat::Sqlite] {
        let output = OutputConfig {
            format,
            stem: dir.path().join("empty").to_string_lossy().into_owned(),
        };
        let path = export(&crawler.results().all(), &output, Profile::Basic).unwrap();
        assert!(path.exists());
    }

    let json = std::fs::read_to_string(dir.path().join("empty.json")).unwrap();
    let parsed: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();
    assert!(parsed.is_empty());
}

#[tokio::test]
async fn test_shutdown_stops_paced_workers_promptly() {
    let server = MockServer::start().await;

    let links: String = (0..10)
        .map(|i| format!(r#"<a href="/p{}">P</a>"#, i))
        .collect();
    mount_page(&server, "/", links).await;
    Mock::given(method("GET"))
        .respond_with(html("<p>page</p>"))
        .mount(&server)
        .await;

    // Slots land at 0s, 1s, 2s, ... so only the seed and one link are due
    // before the shutdown at 1.5s
    let mut config = create_test_config();
    config.crawler.max_threads = 10;
    config.crawler.delay_secs = 1.0;
    let crawler = Crawler::new(config).unwrap();
    let handle = crawler.shutdown_handle();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(1500)).await;
        handle.shutdown();
    });

    let started = std::time::Instant::now();
    let report = crawler.run(&server.uri()).await.unwrap();

    assert!(report.interrupted);
    assert!(started.elapsed() < Duration::from_millis(2500));
    assert!(report.pages_stored <= 2);
    assert_eq!(report.pages_stored, report.succeeded);
}

#[tokio::test]
async fn test_redirect_onto_visited_url_is_stored_once() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<a href="/a">A</a><a href="/b">B</a>"#.to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/b"))
        .mount(&server)
        .await;
    mount_page(&server, "/b", "<title>Target</title>".to_string()).await;

    let (report, records) = crawl(create_test_config(), &server.uri()).await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records.iter().filter(|r| r.title == "Target").count(), 1);
    assert_eq!(report.skipped, 1);
}
