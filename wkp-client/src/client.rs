use crate::error::{ClientError, Result};
use crate::model::{QueryRequest, QueryResponse, Stats};
use reqwest::{Client, Response};
use std::future::Future;
use tracing::{debug, warn};
use url::Url;

/// Something that can produce a stats snapshot.
pub trait StatsSource {
    fn fetch_stats(&self) -> impl Future<Output = Result<Stats>> + Send;
}

/// Something that can answer a company search.
pub trait SearchBackend {
    fn search(&self, request: &QueryRequest) -> impl Future<Output = Result<QueryResponse>> + Send;
}

/// Client for the two knowledge platform endpoints.
///
/// No timeout and no retries: a request that fails is reported once.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("wkp/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Self::with_client(base_url, client)
    }

    pub fn with_client(base_url: &str, client: Client) -> Result<Self> {
        Ok(Self {
            client,
            base_url: parse_base_url(base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidUrl(format!("{}{}: {}", self.base_url, path, e)))
    }

    fn check_status(endpoint: &'static str, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            warn!("{} answered with HTTP {}", endpoint, status.as_u16());
            Err(ClientError::StatusError {
                endpoint,
                status: status.as_u16(),
            })
        }
    }
}

impl StatsSource for ApiClient {
    async fn fetch_stats(&self) -> Result<Stats> {
        let url = self.endpoint("stats")?;
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let stats = Self::check_status("/stats", response)?.json::<Stats>().await?;
        Ok(stats)
    }
}

impl SearchBackend for ApiClient {
    async fn search(&self, request: &QueryRequest) -> Result<QueryResponse> {
        let url = self.endpoint("query")?;
        debug!("POST {} query={:?}", url, request.query);

        let response = self.client.post(url).json(request).send().await?;
        let body = Self::check_status("/query", response)?
            .json::<QueryResponse>()
            .await?;

        if let Some(ref error) = body.error {
            warn!("/query reported a backend error: {}", error);
        }
        Ok(body)
    }
}

/// Parses a backend base URL, keeping any path prefix so endpoints resolve
/// underneath it.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", raw, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ClientError::InvalidUrl(format!(
            "{}: only http and https are supported",
            raw
        )));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CompanyResult, Contacts};
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_parse_base_url_adds_trailing_slash() {
        let url = parse_base_url("http://localhost:8000").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/");

        let url = parse_base_url("https://kg.example.in/api").unwrap();
        assert_eq!(url.join("stats").unwrap().as_str(), "https://kg.example.in/api/stats");
    }

    #[test]
    fn test_parse_base_url_rejects_bad_input() {
        assert!(matches!(parse_base_url("not a url"), Err(ClientError::InvalidUrl(_))));
        assert!(matches!(
            parse_base_url("ftp://example.com"),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_stats() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/stats"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "urls_crawled": 1500,
                "domains_processed": 42,
                "entities_in_graph": 380,
                "relationships_in_graph": 77,
                "status": "active",
                "last_updated": "2024-05-01T10:00:00"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = ApiClient::new(&mock_server.uri()).unwrap();
        let stats = client.fetch_stats().await.unwrap();

        assert_eq!(stats.urls_crawled, 1500);
        assert_eq!(stats.entities_in_graph, 380);
        assert_eq!(stats.relationships_in_graph, Some(77));
    }

    #[tokio::test]
    async fn test_fetch_stats_server_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/stats"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let client = ApiClient::new(&mock_server.uri()).unwrap();
        let err = client.fetch_stats().await.unwrap_err();

        assert!(matches!(
            err,
            ClientError::StatusError { endpoint: "/stats", status: 503 }
        ));
    }

    #[tokio::test]
    async fn test_fetch_stats_partial_body_is_an_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/stats"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"error": "db down", "urls_crawled": 0})),
            )
            .mount(&mock_server)
            .await;

        let client = ApiClient::new(&mock_server.uri()).unwrap();
        assert!(matches!(
            client.fetch_stats().await,
            Err(ClientError::HttpError(_))
        ));
    }

    #[tokio::test]
    async fn test_search_posts_query_and_decodes_results() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/query"))
            .and(body_json(json!({
                "query": "steel companies contact",
                "max_results": 10
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{
                    "domain": "acme.co.in",
                    "company_name": "Acme Steel",
                    "contacts": {"emails": ["info@acme.co.in"], "phones": []},
                    "confidence": 0.92,
                    "url_count": 5
                }],
                "total": 1
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = ApiClient::new(&mock_server.uri()).unwrap();
        let response = client
            .search(&QueryRequest::new("steel companies contact"))
            .await
            .unwrap();

        let expected = CompanyResult::new("Acme Steel", "acme.co.in")
            .with_confidence(0.92)
            .with_url_count(5)
            .with_contacts(Contacts {
                emails: Some(vec!["info@acme.co.in".to_string()]),
                phones: Some(vec![]),
            });
        assert_eq!(response.total, Some(1));
        assert_eq!(response.into_results(), Some(vec![expected]));
    }

    #[tokio::test]
    async fn test_search_under_path_prefix() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = ApiClient::new(&format!("{}/api", mock_server.uri())).unwrap();
        let response = client.search(&QueryRequest::new("tech")).await.unwrap();
        assert_eq!(response.into_results(), None);
    }

    #[tokio::test]
    async fn test_search_server_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let client = ApiClient::new(&mock_server.uri()).unwrap();
        let err = client.search(&QueryRequest::new("tech")).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::StatusError { endpoint: "/query", status: 500 }
        ));
    }

    #[tokio::test]
    async fn test_search_connection_refused() {
        // Nothing listens on the discard port
        let client = ApiClient::new("http://127.0.0.1:9").unwrap();
        let err = client.search(&QueryRequest::new("tech")).await.unwrap_err();
        assert!(matches!(err, ClientError::HttpError(_)));
    }
}
