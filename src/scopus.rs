//! Scopus bibliographic search client.
//!
//! Pages the search endpoint by `start` offset until the reported
//! `totalResults` is covered or the safety bound is hit.

use crate::config::{Credentials, MinerOptions};
use crate::fetch::{http_client, FetchError, DEFAULT_USER_AGENT};
use indicatif::ProgressBar;
use serde_json::Value;

pub struct ScopusClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    page_size: usize,
    max_pages: usize,
}

impl ScopusClient {
    pub fn new(creds: &Credentials, opts: &MinerOptions) -> Result<Self, FetchError> {
        let api_key = creds
            .scopus_api_key
            .clone()
            .ok_or(FetchError::MissingCredential("SCOPUS_API_KEY"))?;
        Ok(Self {
            client: http_client(DEFAULT_USER_AGENT)?,
            base_url: "https://api.elsevier.com".to_string(),
            api_key,
            page_size: opts.page_size,
            max_pages: opts.max_pages,
        })
    }

    /// Point the client at a different endpoint (tests use a local stub).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn get_page(&self, query: &str, start: usize) -> Result<Value, FetchError> {
        let url = format!("{}/content/search/scopus", self.base_url);
        let start_str = start.to_string();
        let count_str = self.page_size.to_string();
        let body: Value = self
            .client
            .get(&url)
            .header("X-ELS-APIKey", &self.api_key)
            .header("Accept", "application/json")
            .query(&[
                ("query", query),
                ("view", "COMPLETE"),
                ("start", start_str.as_str()),
                ("count", count_str.as_str()),
            ])
            .send()?
            .error_for_status()?
            .json()?;
        Ok(body)
    }

    /// Run a search to completion, returning entries in arrival order and
    /// the total result count the service reported.
    pub fn search(&self, query: &str, pb: Option<&ProgressBar>) -> Result<(Vec<Value>, u64), FetchError> {
        let mut entries = Vec::new();
        let mut total: u64 = 0;
        let mut start = 0usize;
        let mut pages = 0usize;
        loop {
            let body = self.get_page(query, start)?;
            let results = body.get("search-results").cloned().unwrap_or(Value::Null);
            total = results
                .get("opensearch:totalResults")
                .map(|t| match t {
                    Value::String(s) => s.parse().unwrap_or(0),
                    Value::Number(n) => n.as_u64().unwrap_or(0),
                    _ => 0,
                })
                .unwrap_or(0);

            let page_entries: Vec<Value> = results
                .get("entry")
                .and_then(|e| e.as_array())
                .cloned()
                .unwrap_or_default();
            // an empty result set is signalled with a single error entry
            let page_entries: Vec<Value> = page_entries
                .into_iter()
                .filter(|e| e.get("error").is_none())
                .collect();

            let got = page_entries.len();
            entries.extend(page_entries);
            if let Some(pb) = pb {
                pb.inc(1);
            }
            pages += 1;
            start += self.page_size;
            if got == 0 || start as u64 >= total {
                break;
            }
            if pages >= self.max_pages {
                tracing::warn!("Hit max_pages={} safety bound; stopping", self.max_pages);
                break;
            }
        }
        tracing::info!("Total entries {}", total);
        tracing::info!("Data fetch completed with {} records", entries.len());
        Ok((entries, total))
    }
}
