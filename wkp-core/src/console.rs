use chrono::{DateTime, Local};
use tracing::{debug, info, warn};
use wkp_client::{
    ClientError, CompanyResult, QueryRequest, QueryResponse, SearchBackend, Stats, StatsSource,
};

pub const NO_RESULTS_MESSAGE: &str = "No results found. Try a different query.";
pub const INITIALIZING_MESSAGE: &str = "System is initializing. Please wait a moment...";

/// Preset queries offered under the search box: (label, query).
pub const EXAMPLE_QUERIES: [(&str, &str); 3] = [
    ("Steel Companies", "steel companies contact"),
    ("Tech Companies", "tech companies email"),
    ("Manufacturing", "manufacturing phone"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    Loading,
}

/// How a finished search was classified.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Success(Vec<CompanyResult>),
    /// The backend answered but had nothing to offer.
    Empty,
    /// Transport failure, non-2xx status or an undecodable body.
    Failed,
}

impl SearchOutcome {
    pub fn classify(response: Result<QueryResponse, ClientError>) -> Self {
        match response {
            Ok(body) => match body.into_results() {
                Some(results) => SearchOutcome::Success(results),
                None => SearchOutcome::Empty,
            },
            Err(e) => {
                warn!("Search failed: {}", e);
                SearchOutcome::Failed
            }
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, SearchOutcome::Failed)
    }
}

/// Results of background work, delivered to whoever owns the console state.
#[derive(Debug)]
pub enum ConsoleEvent {
    StatsFetched(Result<Stats, ClientError>),
    SearchFinished(Result<QueryResponse, ClientError>),
}

/// All transient state of one query console. Lives as long as the console
/// is mounted and is only changed through the transitions below.
#[derive(Debug, Clone, Default)]
pub struct ConsoleState {
    query: String,
    loading: bool,
    results: Vec<CompanyResult>,
    message: Option<String>,
    stats: Stats,
    last_submitted: Option<String>,
    stats_refreshed_at: Option<DateTime<Local>>,
}

impl ConsoleState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Mutable access for line editing. Ignored by callers while loading.
    pub fn query_mut(&mut self) -> &mut String {
        &mut self.query
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn phase(&self) -> SearchPhase {
        if self.loading {
            SearchPhase::Loading
        } else {
            SearchPhase::Idle
        }
    }

    pub fn results(&self) -> &[CompanyResult] {
        &self.results
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn last_submitted(&self) -> Option<&str> {
        self.last_submitted.as_deref()
    }

    pub fn stats_refreshed_at(&self) -> Option<DateTime<Local>> {
        self.stats_refreshed_at
    }

    /// True when the current query would be accepted by `begin_search`.
    pub fn can_submit(&self) -> bool {
        !self.loading && !self.query.trim().is_empty()
    }

    /// Loads one of the preset example queries into the query box.
    pub fn use_example(&mut self, index: usize) -> bool {
        if self.loading {
            return false;
        }
        match EXAMPLE_QUERIES.get(index) {
            Some((_, query)) => {
                self.query = query.to_string();
                true
            }
            None => false,
        }
    }

    /// Idle -> Loading.
    ///
    /// Returns the request to send, or `None` when the query is blank or a
    /// search is already in flight. A rejected submission leaves the state
    /// untouched.
    pub fn begin_search(&mut self) -> Option<QueryRequest> {
        if self.query.trim().is_empty() {
            return None;
        }
        if self.loading {
            debug!("Ignoring submission while a search is in flight");
            return None;
        }

        self.loading = true;
        self.message = None;
        self.last_submitted = Some(self.query.clone());
        info!("Searching for {:?}", self.query);

        Some(QueryRequest::new(self.query.clone()))
    }

    /// Loading -> Idle, applying the response.
    pub fn finish_search(&mut self, response: Result<QueryResponse, ClientError>) -> SearchOutcome {
        let outcome = SearchOutcome::classify(response);

        match outcome {
            SearchOutcome::Success(ref results) => {
                debug!("Search returned {} results", results.len());
                self.results = results.clone();
            }
            SearchOutcome::Empty => {
                self.results.clear();
                self.message = Some(NO_RESULTS_MESSAGE.to_string());
            }
            SearchOutcome::Failed => {
                self.results.clear();
                self.message = Some(INITIALIZING_MESSAGE.to_string());
            }
        }

        self.loading = false;
        outcome
    }

    /// Runs a whole search against `backend`. `None` when nothing was sent.
    pub async fn submit_query<B: SearchBackend>(
        &mut self,
        backend: &B,
        text: &str,
    ) -> Option<SearchOutcome> {
        if text.trim().is_empty() {
            return None;
        }
        if self.loading {
            debug!("Ignoring submission while a search is in flight");
            return None;
        }

        self.query = text.to_string();
        let request = self.begin_search()?;
        let response = backend.search(&request).await;
        Some(self.finish_search(response))
    }

    /// Replaces the stats snapshot on success; keeps the previous one
    /// otherwise. Returns whether the snapshot changed hands.
    pub fn apply_stats(&mut self, fetched: Result<Stats, ClientError>) -> bool {
        match fetched {
            Ok(stats) => {
                debug!(
                    "Stats refreshed: {} URLs, {} entities",
                    stats.urls_crawled, stats.entities_in_graph
                );
                self.stats = stats;
                self.stats_refreshed_at = Some(Local::now());
                true
            }
            Err(e) => {
                warn!("Stats not available yet: {}", e);
                false
            }
        }
    }

    pub async fn refresh_stats<S: StatsSource>(&mut self, source: &S) -> bool {
        let fetched = source.fetch_stats().await;
        self.apply_stats(fetched)
    }

    pub fn apply(&mut self, event: ConsoleEvent) {
        match event {
            ConsoleEvent::StatsFetched(fetched) => {
                self.apply_stats(fetched);
            }
            ConsoleEvent::SearchFinished(response) => {
                if !self.loading {
                    debug!("Dropping search response with no search in flight");
                    return;
                }
                self.finish_search(response);
            }
        }
    }

    pub fn dismiss_message(&mut self) {
        self.message = None;
    }

    /// Whether the "no results" empty-state notice should be shown.
    pub fn show_empty_state(&self) -> bool {
        self.last_submitted.is_some()
            && self.results.is_empty()
            && !self.loading
            && self.message.is_none()
    }
}
