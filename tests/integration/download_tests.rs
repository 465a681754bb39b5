//! Integration tests for the bulk downloader
//!
//! These tests use wiremock to serve files and check what lands on disk.

use link_sieve::config::{DefaultScheme, FetchConfig, NamingScheme};
use link_sieve::crawler::NoopObserver;
use link_sieve::download::{build_download_client, download_all, DownloadOptions};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_options(dir: &Path, naming: NamingScheme) -> DownloadOptions {
    DownloadOptions {
        directory: dir.to_path_buf(),
        naming,
        default_scheme: DefaultScheme::Http,
        connect_timeout: Duration::from_secs(2),
    }
}

async fn mount_file(server: &MockServer, file_path: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(file_path))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_numbered_downloads_skip_failures() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_file(&mock_server, "/img/cat.jpg", b"cat-bytes").await;
    mount_file(&mock_server, "/docs/manual.pdf", b"%PDF-1.4").await;
    mount_file(&mock_server, "/plain", b"no extension").await;

    Mock::given(method("GET"))
        .and(path("/gone.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let target_dir = temp_dir.path().join("bulk_downloads");
    let client = build_download_client(&FetchConfig::default()).expect("Failed to build client");

    let urls = vec![
        format!("{}/img/cat.jpg", base_url),
        format!("{}/gone.png", base_url),
        format!("{}/docs/manual.pdf", base_url),
        // No scheme: the default (http) is added
        format!("{}/plain", base_url.trim_start_matches("http://")),
    ];

    let report = download_all(
        &urls,
        &client,
        &create_test_options(&target_dir, NamingScheme::Numbered),
        &NoopObserver,
    )
    .await
    .expect("Download run failed");

    assert_eq!(report.attempted, 4);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].message.contains("404"));
    assert_eq!(
        report.saved,
        vec![
            target_dir.join("1.jpg"),
            target_dir.join("2.pdf"),
            target_dir.join("3"),
        ]
    );

    assert_eq!(std::fs::read(target_dir.join("1.jpg")).unwrap(), b"cat-bytes");
    assert_eq!(std::fs::read(target_dir.join("2.pdf")).unwrap(), b"%PDF-1.4");
    assert_eq!(std::fs::read(target_dir.join("3")).unwrap(), b"no extension");
    assert!(!target_dir.join("2.png").exists());
}

#[tokio::test]
async fn test_original_names() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_file(&mock_server, "/files/report.pdf", b"report").await;
    mount_file(&mock_server, "/", b"index").await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let client = build_download_client(&FetchConfig::default()).expect("Failed to build client");

    let urls = vec![
        format!("{}/files/report.pdf", base_url),
        format!("{}/", base_url),
    ];

    let report = download_all(
        &urls,
        &client,
        &create_test_options(temp_dir.path(), NamingScheme::Original),
        &NoopObserver,
    )
    .await
    .expect("Download run failed");

    assert!(report.failures.is_empty());
    assert_eq!(
        report.saved,
        vec![
            temp_dir.path().join("report.pdf"),
            temp_dir.path().join("download"),
        ]
    );
    assert_eq!(
        std::fs::read_to_string(temp_dir.path().join("report.pdf")).unwrap(),
        "report"
    );
}

#[tokio::test]
async fn test_connection_failure_is_recorded() {
    // Bind and immediately release a port so nothing is listening on it
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
        listener.local_addr().expect("No local addr").port()
    };

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let client = build_download_client(&FetchConfig::default()).expect("Failed to build client");

    let report = download_all(
        &[format!("http://127.0.0.1:{}/file.bin", port)],
        &client,
        &create_test_options(temp_dir.path(), NamingScheme::Numbered),
        &NoopObserver,
    )
    .await
    .expect("Download run failed");

    assert_eq!(report.attempted, 1);
    assert!(report.saved.is_empty());
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].message.starts_with("Could not connect"));
    assert!(!temp_dir.path().join("1.bin").exists());
}
