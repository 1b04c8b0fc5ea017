use crate::domain::model::RawRecord;
use crate::domain::ports::VacancySource;
use crate::utils::error::Result;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{Instrument, Span};

pub const DEFAULT_ENDPOINT: &str = "https://api.hh.ru/vacancies";
pub const DEFAULT_USER_AGENT: &str = "HH-User-Agent";
pub const DEFAULT_PER_PAGE: usize = 100;
pub const DEFAULT_MAX_PAGES: usize = 20;
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    pub endpoint: String,
    pub user_agent: String,
    pub per_page: usize,
    pub max_pages: usize,
    /// Fixed pause between two page requests.
    pub page_delay: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            per_page: DEFAULT_PER_PAGE,
            max_pages: DEFAULT_MAX_PAGES,
            page_delay: DEFAULT_PAGE_DELAY,
        }
    }
}

/// Why the page loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    PageLimit,
    EmptyPage,
    HttpStatus(u16),
    Transport(String),
}

impl StopReason {
    /// True when the walk ended on an HTTP or transport error.
    pub fn is_failure(&self) -> bool {
        matches!(self, StopReason::HttpStatus(_) | StopReason::Transport(_))
    }
}

#[derive(Debug, Clone)]
pub struct FetchReport {
    pub records: Vec<RawRecord>,
    /// Successful non-empty pages.
    pub pages_fetched: usize,
    pub stop_reason: StopReason,
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    items: Option<Vec<Value>>,
}

/// Client for the HeadHunter vacancies listing.
pub struct HhClient {
    client: Client,
    config: FetchConfig,
    span: Span,
}

impl HhClient {
    /// Builds the HTTP client with the configured user agent.
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder().user_agent(&config.user_agent).build()?;

        Ok(Self {
            client,
            config,
            span: tracing::info_span!("hh_fetch"),
        })
    }

    /// Events from this client are recorded inside `span`.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Settings the client was built with.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Walks pages from 0 until the ceiling, an empty page or the first failure.
    /// Failures end the walk and keep whatever was already collected.
    pub async fn fetch_report(&self, keyword: &str) -> FetchReport {
        self.walk_pages(keyword)
            .instrument(self.span.clone())
            .await
    }

    async fn walk_pages(&self, keyword: &str) -> FetchReport {
        let mut records = Vec::new();
        let mut page = 0;

        let stop_reason = loop {
            if page >= self.config.max_pages {
                break StopReason::PageLimit;
            }
            if page > 0 && !self.config.page_delay.is_zero() {
                tokio::time::sleep(self.config.page_delay).await;
            }

            match self.fetch_page(keyword, page).await {
                Ok(items) if items.is_empty() => {
                    tracing::debug!("Page {} is empty, stopping", page);
                    break StopReason::EmptyPage;
                }
                Ok(items) => {
                    tracing::info!("Loaded page {} ({} vacancies)", page, items.len());
                    for item in items {
                        match item {
                            Value::Object(data) => records.push(RawRecord::new(data)),
                            other => tracing::warn!("Skipping non-object item: {}", other),
                        }
                    }
                    page += 1;
                }
                Err(reason) => break reason,
            }
        };

        tracing::debug!(
            "Fetch for '{}' finished after {} pages: {:?}",
            keyword,
            page,
            stop_reason
        );

        FetchReport {
            records,
            pages_fetched: page,
            stop_reason,
        }
    }

    async fn fetch_page(
        &self,
        keyword: &str,
        page: usize,
    ) -> std::result::Result<Vec<Value>, StopReason> {
        tracing::debug!("Requesting page {} from {}", page, self.config.endpoint);

        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&[
                ("text", keyword.to_string()),
                ("page", page.to_string()),
                ("per_page", self.config.per_page.to_string()),
            ])
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Request failed: {}", e);
                StopReason::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Error {}: {}", status.as_u16(), body);
            return Err(StopReason::HttpStatus(status.as_u16()));
        }

        let body: Page = response.json().await.map_err(|e| {
            tracing::error!("Could not decode page {}: {}", page, e);
            StopReason::Transport(e.to_string())
        })?;

        Ok(body.items.unwrap_or_default())
    }
}

#[async_trait::async_trait]
impl VacancySource for HhClient {
    async fn fetch(&self, keyword: &str) -> Vec<RawRecord> {
        self.fetch_report(keyword).await.records
    }
}
