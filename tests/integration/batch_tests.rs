//! Integration tests for batch link extraction
//!
//! These tests use wiremock to create mock HTTP servers and run the
//! fetch, extract and merge cycle end-to-end over real HTTP.

use link_sieve::config::{load_config, Config, DefaultScheme, FetchConfig};
use link_sieve::crawler::{
    crawl, run_batch, BatchOptions, ErrorKind, ExtractMode, HttpFetcher, LinkExtractor,
    NoopObserver,
};
use link_sieve::output::{save_report, ReportSource, SaveMetadata};
use link_sieve::url::MatchPattern;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Fetch configuration with a short timeout for the slow-page tests
fn create_test_fetch_config() -> FetchConfig {
    FetchConfig {
        timeout_secs: 1,
        connect_timeout_secs: 1,
        user_agent: "TestBot/1.0".to_string(),
        ..FetchConfig::default()
    }
}

fn html_page(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!(
            "<html><head><title>Test</title></head><body>{}</body></html>",
            body
        ))
        .insert_header("content-type", "text/html")
}

async fn mount_page(server: &MockServer, page_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(html_page(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_batch_continues_past_failures() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/first",
        r##"<a href="/docs/a.pdf">A</a>
            <a href="b.html">B</a>
            <a href="#top">Top</a>
            <a href="mailto:someone@example.com">Mail</a>"##,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html_page("<a href='/never'>x</a>").set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    mount_page(
        &mock_server,
        "/last",
        r#"<a href="/docs/a.pdf">dup</a><a href="https://other.example/x">ext</a>"#,
    )
    .await;

    let targets = vec![
        format!("{}/first", base_url),
        format!("{}/slow", base_url),
        "ftp://files.example/".to_string(),
        format!("{}/missing", base_url),
        format!("{}/last", base_url),
    ];

    let fetcher = HttpFetcher::new(&create_test_fetch_config()).expect("Failed to build fetcher");
    let options = BatchOptions::new(LinkExtractor::new(ExtractMode::Links));
    let report = run_batch(&targets, &fetcher, &options, &NoopObserver).await;

    assert_eq!(report.processed_count, 4);
    assert_eq!(report.skipped_count, 1);
    assert_eq!(report.total_urls(), targets.len());

    let kinds: Vec<ErrorKind> = report.errors.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ErrorKind::FetchTimeout,
            ErrorKind::InvalidUrlFormat,
            ErrorKind::HttpStatusError
        ]
    );
    assert!(report.errors[2].message.contains("404"));

    assert_eq!(
        report.links.into_vec(),
        vec![
            format!("{}/b.html", base_url),
            format!("{}/docs/a.pdf", base_url),
            "https://other.example/x".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_connection_refused_does_not_stop_batch() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/after", r#"<a href="/still-here">ok</a>"#).await;

    // Bind and immediately release a port so nothing is listening on it
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
        listener.local_addr().expect("No local addr").port()
    };

    let targets = vec![
        format!("http://127.0.0.1:{}/page", port),
        format!("{}/after", base_url),
    ];

    let fetcher = HttpFetcher::new(&create_test_fetch_config()).expect("Failed to build fetcher");
    let options = BatchOptions::new(LinkExtractor::new(ExtractMode::Links));
    let report = run_batch(&targets, &fetcher, &options, &NoopObserver).await;

    assert_eq!(report.processed_count, 2);
    assert_eq!(report.skipped_count, 0);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].kind, ErrorKind::ConnectionError);
    assert!(report.errors[0].message.starts_with("Could not connect"));
    assert_eq!(
        report.links.into_vec(),
        vec![format!("{}/still-here", base_url)]
    );
}

#[tokio::test]
async fn test_redirect_sets_resolution_base() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new/dir/page"))
        .mount(&mock_server)
        .await;

    mount_page(&mock_server, "/new/dir/page", r#"<a href="img/x.png">x</a>"#).await;

    let fetcher = HttpFetcher::new(&create_test_fetch_config()).expect("Failed to build fetcher");
    let options = BatchOptions::new(LinkExtractor::new(ExtractMode::Links));
    let report = run_batch(
        &[format!("{}/old", base_url)],
        &fetcher,
        &options,
        &NoopObserver,
    )
    .await;

    assert!(report.errors.is_empty());
    assert_eq!(
        report.links.into_vec(),
        vec![format!("{}/new/dir/img/x.png", base_url)]
    );
}

#[tokio::test]
async fn test_image_mode_with_regex() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/gallery",
        r#"<img src="/img/cat.PNG"><img src="/img/dog.jpg">
           <img src="data:image/png;base64,AAAA"><a href="/img/link.png">not an image tag</a>"#,
    )
    .await;

    let fetcher = HttpFetcher::new(&create_test_fetch_config()).expect("Failed to build fetcher");
    let options = BatchOptions::new(
        LinkExtractor::new(ExtractMode::Images).with_pattern(MatchPattern::parse(r"\.png$", true)),
    );
    let report = run_batch(
        &[format!("{}/gallery", base_url)],
        &fetcher,
        &options,
        &NoopObserver,
    )
    .await;

    assert_eq!(
        report.links.into_vec(),
        vec![format!("{}/img/cat.PNG", base_url)]
    );
}

#[tokio::test]
async fn test_directory_listing() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/pub/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(
                    r#"<html><head><title>Index of /pub</title></head><body>
                    <h1>Index of /pub</h1>
                    <pre><a href="?C=N;O=D">Name</a> <a href="?C=M;O=A">Last modified</a>
                    <a href="/">Parent Directory</a>
                    <a href="release-1.0.iso">release-1.0.iso</a>
                    <a href="release-1.1.iso">release-1.1.iso</a>
                    <a href="notes/">notes/</a>
                    <a href="./">.</a></pre></body></html>"#,
                )
                .insert_header("content-type", "text/html"),
        )
        .mount(&mock_server)
        .await;

    mount_page(&mock_server, "/blog/", r#"<a href="post.html">post</a>"#).await;

    let fetcher = HttpFetcher::new(&create_test_fetch_config()).expect("Failed to build fetcher");
    let options = BatchOptions::new(
        LinkExtractor::new(ExtractMode::DirectoryListing)
            .with_pattern(MatchPattern::parse("ISO", false)),
    );

    // Extension-less targets are fetched as directories
    let report = run_batch(
        &[format!("{}/pub", base_url), format!("{}/blog", base_url)],
        &fetcher,
        &options,
        &NoopObserver,
    )
    .await;

    assert_eq!(report.processed_count, 2);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].kind, ErrorKind::ClassificationMismatch);
    assert_eq!(
        report.links.into_vec(),
        vec![
            format!("{}/pub/release-1.0.iso", base_url),
            format!("{}/pub/release-1.1.iso", base_url),
        ]
    );
}

#[tokio::test]
async fn test_crawl_from_config_file_and_save() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let host_and_port = base_url.trim_start_matches("http://").to_string();

    mount_page(&mock_server, "/", r#"<a href="/one">1</a><a href="/two">2</a>"#).await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("link-sieve.toml");
    std::fs::write(
        &config_path,
        r#"
[fetch]
timeout-secs = 5
user-agent = "IntegrationTest/1.0"

[filter]
default-scheme = "http"
"#,
    )
    .expect("Failed to write config");

    let config: Config = load_config(&config_path).expect("Failed to load config");
    assert_eq!(config.filter.default_scheme, DefaultScheme::Http);

    let list_path = temp_dir.path().join("sites.txt");
    std::fs::write(&list_path, format!("# local server\n{}\n\n", host_and_port))
        .expect("Failed to write list");
    let targets = link_sieve::input::read_url_list(&list_path).expect("Failed to read list");

    let pattern = MatchPattern::parse("two", false);
    let report = crawl(&config, &targets, ExtractMode::Links, pattern.clone(), &NoopObserver)
        .await
        .expect("Crawl failed");

    assert_eq!(report.processed_count, 1);
    assert_eq!(report.links.len(), 1);

    let output_path: PathBuf = temp_dir.path().join("out").join("links.txt");
    let metadata = SaveMetadata::new(
        ReportSource::UrlList(list_path.clone()),
        ExtractMode::Links,
        pattern,
    );
    save_report(&output_path, &report, &metadata).expect("Failed to save");

    let saved = std::fs::read_to_string(&output_path).expect("Failed to read output");
    let lines: Vec<&str> = saved.lines().collect();
    assert_eq!(
        lines[0],
        format!("# Links fetched by link-sieve from: {}", list_path.display())
    );
    assert_eq!(lines[2], "# Pattern: two");
    assert_eq!(lines[4], "# URLs processed: 1, skipped: 0, errors: 0");
    assert_eq!(lines.last().copied(), Some(format!("{}/two", base_url).as_str()));
}
