//! Fetching every page behind a paged endpoint.
//!
//! Paged calls append `/{page_size}/{page}` to the path and resend the same
//! body for each page. The response reports `maxpages`, which is `0` for
//! some single-page results, so the loop treats the declared total as
//! `max(maxpages, 1)` and also stops at an optional page cap.

use std::pin::pin;

use futures_util::stream::{self, Stream, TryStreamExt};
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};

use crate::client::Jetnet;
use crate::error::{JetnetError, Result};
use crate::rest::endpoints::PagedEndpoint;
use crate::session::API_TOKEN_PLACEHOLDER;

/// Response fields that hold a page's records.
pub const RECORD_LIST_KEYS: &[&str] = &[
    "history",
    "flightdata",
    "events",
    "aircraft",
    "aircraftowneroperators",
    "companylist",
    "contactlist",
    "relationships",
    "aircraftcompfractionalrefs",
    "pictures",
];

/// Field carrying the declared page count.
pub const MAX_PAGES_FIELD: &str = "maxpages";

pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const DEFAULT_MAX_PAGES: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageOptions {
    /// Records per page, constant for the run.
    pub page_size: u32,
    /// Hard stop regardless of what the server declares.
    pub max_pages: Option<u32>,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: Some(DEFAULT_MAX_PAGES),
        }
    }
}

impl PageOptions {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size,
            ..Default::default()
        }
    }

    pub fn with_max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(JetnetError::Validation("page size must be positive".into()));
        }
        if self.max_pages == Some(0) {
            return Err(JetnetError::Validation("page cap must be positive".into()));
        }
        Ok(())
    }
}

/// One page to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based.
    pub page_number: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// `{endpoint}/{page_size}/{page_number}`, with `/{apiToken}` inserted
    /// first when the endpoint has no placeholder of its own.
    pub fn path(&self, endpoint: &str) -> String {
        let endpoint = endpoint.trim_end_matches('/');
        if endpoint.contains(API_TOKEN_PLACEHOLDER) {
            format!("{endpoint}/{}/{}", self.page_size, self.page_number)
        } else {
            format!(
                "{endpoint}/{API_TOKEN_PLACEHOLDER}/{}/{}",
                self.page_size, self.page_number
            )
        }
    }
}

/// Records and page count from one page response.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult {
    pub page_number: u32,
    pub declared_total_pages: u64,
    pub records: Vec<Value>,
}

impl PageResult {
    pub fn from_response(page_number: u32, body: &Value) -> Self {
        Self {
            page_number,
            declared_total_pages: declared_total_pages(body),
            records: extract_records(body),
        }
    }

    /// Declared total with `0` read as a single page.
    pub fn effective_total_pages(&self) -> u64 {
        self.declared_total_pages.max(1)
    }

    pub fn is_last(&self) -> bool {
        u64::from(self.page_number) >= self.effective_total_pages()
    }
}

/// Outcome of a complete run.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchSummary {
    pub records: Vec<Value>,
    pub pages_fetched: u32,
    /// As reported by the last page fetched.
    pub declared_total_pages: u64,
    pub page_size: u32,
}

/// Records from the first list-valued field whose name is in
/// [`RECORD_LIST_KEYS`], in response order. No such field means no records.
pub fn extract_records(body: &Value) -> Vec<Value> {
    body.as_object()
        .and_then(|obj| {
            obj.iter().find_map(|(key, value)| match value {
                Value::Array(items) if RECORD_LIST_KEYS.contains(&key.as_str()) => {
                    Some(items.clone())
                }
                _ => None,
            })
        })
        .unwrap_or_default()
}

/// `maxpages` as an integer; absent, negative or unreadable reads as 0.
pub fn declared_total_pages(body: &Value) -> u64 {
    match body.get(MAX_PAGES_FIELD) {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

impl Jetnet {
    /// Lazily fetch pages of `endpoint`, starting at page 1.
    ///
    /// Each page goes through [`Jetnet::request`], so an invalid token on
    /// any page is refreshed and that page retried once. The stream ends
    /// after the last declared page or the page cap, and ends early with
    /// the first error.
    pub fn pages<'a>(
        &'a self,
        endpoint: &'a str,
        body: &'a Value,
        options: PageOptions,
    ) -> impl Stream<Item = Result<PageResult>> + 'a {
        stream::try_unfold(Some(1u32), move |next| async move {
            match next {
                Some(page_number) => self
                    .fetch_page(endpoint, body, options, page_number)
                    .await
                    .map(Some),
                None => Ok(None),
            }
        })
    }

    /// Fetch one page; the second value is the next page number, if any.
    async fn fetch_page(
        &self,
        endpoint: &str,
        body: &Value,
        options: PageOptions,
        page_number: u32,
    ) -> Result<(PageResult, Option<u32>)> {
        options.validate()?;

        let request = PageRequest {
            page_number,
            page_size: options.page_size,
        };
        let response = self
            .request(Method::POST, &request.path(endpoint), Some(body))
            .await?;
        let page = PageResult::from_response(page_number, &response);

        debug!(
            endpoint,
            page = page_number,
            declared = page.declared_total_pages,
            records = page.records.len(),
            "page fetched"
        );

        let capped = options.max_pages.is_some_and(|cap| page_number >= cap);
        if capped && !page.is_last() {
            warn!(
                endpoint,
                page = page_number,
                declared = page.declared_total_pages,
                "page cap reached before last declared page"
            );
        }

        let next = if page.is_last() || capped {
            None
        } else {
            Some(page_number + 1)
        };
        Ok((page, next))
    }

    /// Fetch every page and concatenate the records in page order.
    pub async fn fetch_all_pages(
        &self,
        endpoint: &str,
        body: &Value,
        options: PageOptions,
    ) -> Result<Vec<Value>> {
        let summary = self
            .fetch_all_pages_with(endpoint, body, options, |_| {})
            .await?;
        Ok(summary.records)
    }

    /// Like [`fetch_all_pages`](Self::fetch_all_pages), calling `on_page`
    /// with each page before its records are appended. A failing page
    /// aborts the run; records seen by `on_page` up to then are the only
    /// partial results.
    pub async fn fetch_all_pages_with<F>(
        &self,
        endpoint: &str,
        body: &Value,
        options: PageOptions,
        mut on_page: F,
    ) -> Result<FetchSummary>
    where
        F: FnMut(&PageResult),
    {
        options.validate()?;

        let mut summary = FetchSummary {
            records: Vec::new(),
            pages_fetched: 0,
            declared_total_pages: 0,
            page_size: options.page_size,
        };

        let mut pages = pin!(self.pages(endpoint, body, options));
        while let Some(page) = pages.try_next().await? {
            on_page(&page);
            summary.pages_fetched += 1;
            summary.declared_total_pages = page.declared_total_pages;
            summary.records.extend(page.records);
        }

        Ok(summary)
    }

    /// Fetch every page of one of the provider's named paged endpoints.
    pub async fn fetch_paged(
        &self,
        endpoint: PagedEndpoint,
        body: &Value,
        options: PageOptions,
    ) -> Result<Vec<Value>> {
        self.fetch_all_pages(endpoint.path(), body, options).await
    }
}
