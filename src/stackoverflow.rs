//! Stack Exchange search client.
//!
//! Pages `/2.2/search/advanced` from page 1, incrementing until the API
//! reports `has_more == false` or the configured safety bound is hit.
//! Items are accumulated in arrival order; nothing is re-sorted.

use crate::config::{Credentials, MinerOptions};
use crate::fetch::{http_client, FetchError, DEFAULT_USER_AGENT};
use indicatif::ProgressBar;
use serde::Deserialize;
use serde_json::Value;

const FILTER_TOTAL: &str = "total";
const FILTER_WITHBODY: &str = "withbody";

/// One page of the search wrapper. Unknown fields are ignored; the error
/// fields are populated instead of `items` when the API rejects a request.
#[derive(Debug, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub items: Vec<Value>,
    #[serde(default)]
    pub has_more: bool,
    pub total: Option<u64>,
    pub quota_remaining: Option<i64>,
    pub error_id: Option<i64>,
    pub error_message: Option<String>,
}

pub struct StackOverflowClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: Option<String>,
    page_size: usize,
    max_pages: usize,
}

impl StackOverflowClient {
    pub fn new(creds: &Credentials, opts: &MinerOptions) -> Result<Self, FetchError> {
        Ok(Self {
            client: http_client(DEFAULT_USER_AGENT)?,
            base_url: "https://api.stackexchange.com/2.2".to_string(),
            api_key: creds.stackoverflow_api_key.clone(),
            page_size: opts.page_size,
            max_pages: opts.max_pages,
        })
    }

    /// Point the client at a different endpoint (tests use a local stub).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn get_page(&self, query: &str, filter: &str, page: usize) -> Result<SearchPage, FetchError> {
        let url = format!("{}/search/advanced", self.base_url);
        let page_str = page.to_string();
        let size_str = self.page_size.to_string();
        let mut params = vec![
            ("order", "desc"),
            ("sort", "activity"),
            ("q", query),
            ("filter", filter),
            ("site", "stackoverflow"),
            ("page", page_str.as_str()),
            ("pagesize", size_str.as_str()),
        ];
        if let Some(key) = self.api_key.as_deref() {
            params.push(("key", key));
        }

        let page: SearchPage = self.client.get(&url).query(&params).send()?.json()?;
        if let Some(id) = page.error_id {
            return Err(FetchError::Api {
                id,
                message: page.error_message.unwrap_or_else(|| "unknown error".to_string()),
            });
        }
        Ok(page)
    }

    /// Total match count for a query (the cheap `total` filter).
    pub fn total(&self, query: &str) -> Result<u64, FetchError> {
        let page = self.get_page(query, FILTER_TOTAL, 1)?;
        Ok(page.total.unwrap_or(0))
    }

    /// Fetch all pages for a query, returning raw items in arrival order.
    /// If the first page already reports no more pages, exactly that page's
    /// items are returned.
    pub fn search(&self, query: &str, pb: Option<&ProgressBar>) -> Result<Vec<Value>, FetchError> {
        let mut items = Vec::new();
        let mut page_number = 1;
        loop {
            let page = self.get_page(query, FILTER_WITHBODY, page_number)?;
            items.extend(page.items);
            if let Some(pb) = pb {
                pb.inc(1);
            }
            if let Some(quota) = page.quota_remaining {
                if quota <= 0 {
                    tracing::warn!("Stack Exchange quota exhausted; stopping at page {}", page_number);
                    break;
                }
            }
            if !page.has_more {
                break;
            }
            if page_number >= self.max_pages {
                tracing::warn!("Hit max_pages={} safety bound; stopping", self.max_pages);
                break;
            }
            page_number += 1;
        }
        tracing::info!("Data fetch completed with {} records", items.len());
        Ok(items)
    }
}
