use serde::{Deserialize, Deserializer, Serialize};

/// Number of companies requested per query.
pub const MAX_RESULTS: u32 = 10;

/// Crawl/graph counters reported by `GET /stats`.
///
/// Only the two counters are required; a body missing either one fails to
/// decode, so a snapshot is never half-applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub urls_crawled: u64,
    pub entities_in_graph: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domains_processed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships_in_graph: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl Stats {
    pub fn new(urls_crawled: u64, entities_in_graph: u64) -> Self {
        Self {
            urls_crawled,
            entities_in_graph,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contacts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emails: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phones: Option<Vec<String>>,
}

impl Contacts {
    /// Emails, or an empty slice when the backend sent none.
    pub fn emails(&self) -> &[String] {
        self.emails.as_deref().unwrap_or_default()
    }

    pub fn phones(&self) -> &[String] {
        self.phones.as_deref().unwrap_or_default()
    }
}

/// Treats an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One company record returned by `POST /query`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyResult {
    pub company_name: String,
    pub domain: String,
    /// Fraction in `[0, 1]`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub confidence: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contacts: Option<Contacts>,
}

impl CompanyResult {
    pub fn new(company_name: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            domain: domain.into(),
            confidence: 0.0,
            url_count: 0,
            contacts: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_url_count(mut self, url_count: u64) -> Self {
        self.url_count = url_count;
        self
    }

    pub fn with_contacts(mut self, contacts: Contacts) -> Self {
        self.contacts = Some(contacts);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    pub max_results: u32,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            max_results: MAX_RESULTS,
        }
    }
}

/// Body of a successful `POST /query`.
///
/// The backend answers some internal failures with a 200 and an `error`
/// field next to an empty `results`; that still counts as "no matches".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub results: Option<Vec<CompanyResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryResponse {
    pub fn with_results(results: Vec<CompanyResult>) -> Self {
        Self {
            total: Some(results.len() as u64),
            results: Some(results),
            error: None,
        }
    }

    /// Consumes the response, yielding its results only when there is at
    /// least one.
    pub fn into_results(self) -> Option<Vec<CompanyResult>> {
        self.results.filter(|results| !results.is_empty())
    }
}
