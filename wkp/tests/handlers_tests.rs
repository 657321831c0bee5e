use serde_json::{Value, json};
use std::path::PathBuf;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wkp::handlers::*;
use wkp_client::{ApiClient, CompanyResult, Contacts, Stats};
use wkp_core::console::{INITIALIZING_MESSAGE, NO_RESULTS_MESSAGE};

async fn query_server(template: ResponseTemplate) -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(template)
        .mount(&mock_server)
        .await;
    mock_server
}

#[test]
fn test_query_text_joins_words() {
    let words = vec!["steel".to_string(), "companies".to_string(), "contact".to_string()];
    assert_eq!(query_text(&words), Some("steel companies contact".to_string()));
}

#[test]
fn test_query_text_blank() {
    assert_eq!(query_text(&[]), None);
    assert_eq!(query_text(&["  ".to_string(), "\t".to_string()]), None);
}

#[test]
fn test_log_file_path_default() {
    assert_eq!(log_file_path(None), std::env::temp_dir().join("wkp.log"));
    assert_eq!(log_file_path(Some("  ")), std::env::temp_dir().join("wkp.log"));
}

#[test]
fn test_log_file_path_explicit() {
    assert_eq!(
        log_file_path(Some("/var/log/wkp/console.log")),
        PathBuf::from("/var/log/wkp/console.log")
    );
    assert!(!log_file_path(Some("~/wkp.log")).starts_with("~"));
}

#[test]
fn test_open_log_file_creates_parents() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("nested").join("logs").join("wkp.log");

    open_log_file(&path)?;

    assert!(path.exists());
    Ok(())
}

#[test]
fn test_format_results_report() {
    let results = vec![
        CompanyResult::new("Acme Steel", "acme.co.in")
            .with_confidence(0.873)
            .with_url_count(5)
            .with_contacts(Contacts {
                emails: Some(vec!["info@acme.co.in".to_string()]),
                phones: Some(vec!["+91 80 1234 5678".to_string()]),
            }),
        CompanyResult::new("Bharat Tech", "bharattech.in").with_confidence(0.5),
    ];

    let report = format_results_report(&results);

    assert!(report.contains("Found 2 companies"));
    assert!(report.contains("Acme Steel"));
    assert!(report.contains("Confidence: 87%"));
    assert!(report.contains("5 pages"));
    assert!(report.contains("<mailto:info@acme.co.in>"));
    assert!(report.contains("+91 80 1234 5678"));
    assert!(report.contains("Bharat Tech"));
    assert_eq!(report.matches("Contact Information:").count(), 1);
}

#[test]
fn test_format_stats_report() {
    let stats = Stats {
        domains_processed: Some(14),
        status: Some("active".to_string()),
        last_updated: Some("2024-05-01T10:00:00.5".to_string()),
        ..Stats::new(1500, 380)
    };

    let report = format_stats_report(&stats);

    assert!(report.contains("Websites Crawled:"));
    assert!(report.contains("1500"));
    assert!(report.contains("380"));
    assert!(report.contains("14"));
    assert!(!report.contains("Relationships:"));
    assert!(report.contains("2024-05-01 10:00:00"));
}

#[tokio::test]
async fn test_run_query_renders_cards() {
    let mock_server = query_server(ResponseTemplate::new(200).set_body_json(json!({
        "results": [{
            "company_name": "Acme Steel",
            "domain": "acme.co.in",
            "confidence": 0.92,
            "url_count": 5,
            "contacts": {"emails": ["info@acme.co.in"]}
        }]
    })))
    .await;
    let client = ApiClient::new(&mock_server.uri()).unwrap();

    let output = run_query(&client, "steel companies contact", false, false).await;

    assert_eq!(output.exit_code, 0);
    assert!(output.text.contains("Found 1 company"));
    assert!(output.text.contains("92%"));
    assert!(output.text.contains("mailto:info@acme.co.in"));
}

#[tokio::test]
async fn test_run_query_no_results() {
    let mock_server = query_server(ResponseTemplate::new(200).set_body_json(json!({}))).await;
    let client = ApiClient::new(&mock_server.uri()).unwrap();

    let output = run_query(&client, "nothing", false, false).await;

    assert_eq!(output.exit_code, 0);
    assert!(output.text.contains(NO_RESULTS_MESSAGE));
}

#[tokio::test]
async fn test_run_query_backend_error() {
    let mock_server = query_server(ResponseTemplate::new(500)).await;
    let client = ApiClient::new(&mock_server.uri()).unwrap();

    let output = run_query(&client, "steel", false, false).await;

    assert_eq!(output.exit_code, 1);
    assert!(output.text.contains(INITIALIZING_MESSAGE));
    assert!(!output.text.contains("500"));
}

#[tokio::test]
async fn test_run_query_json() {
    let mock_server = query_server(ResponseTemplate::new(200).set_body_json(json!({
        "results": [
            {"company_name": "B", "domain": "b.in", "confidence": 0.4, "url_count": 1},
            {"company_name": "A", "domain": "a.in", "confidence": 0.9, "url_count": 2}
        ]
    })))
    .await;
    let client = ApiClient::new(&mock_server.uri()).unwrap();

    let output = run_query(&client, "tech", true, false).await;
    let body: Value = serde_json::from_str(&output.text).unwrap();

    assert_eq!(body["query"], "tech");
    assert_eq!(body["results"][0]["company_name"], "B");
    assert_eq!(body["results"][1]["company_name"], "A");
    assert_eq!(body["message"], Value::Null);
}

#[tokio::test]
async fn test_run_query_blank_sends_nothing() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;
    let client = ApiClient::new(&mock_server.uri()).unwrap();

    let output = run_query(&client, "   ", false, false).await;

    assert_eq!(output.exit_code, 0);
    assert!(output.text.contains("Nothing to search for"));
}

#[tokio::test]
async fn test_run_stats() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stats"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"urls_crawled": 42, "entities_in_graph": 7})),
        )
        .mount(&mock_server)
        .await;
    let client = ApiClient::new(&mock_server.uri()).unwrap();

    let output = run_stats(&client, true).await;
    let body: Value = serde_json::from_str(&output.text).unwrap();

    assert_eq!(output.exit_code, 0);
    assert_eq!(body, json!({"urls_crawled": 42, "entities_in_graph": 7}));
}

#[tokio::test]
async fn test_run_stats_unavailable() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stats"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;
    let client = ApiClient::new(&mock_server.uri()).unwrap();

    let output = run_stats(&client, false).await;

    assert_eq!(output.exit_code, 1);
    assert!(output.text.contains("Stats not yet available"));
}
