//! Reddit listing client.
//!
//! Authenticates with the OAuth2 client-credentials grant, then walks a
//! subreddit's hot listing through the `after` cursor until the cursor is
//! exhausted or the safety bound is hit.

use crate::config::{Credentials, MinerOptions};
use crate::fetch::{http_client, FetchError};
use indicatif::ProgressBar;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
    after: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: Value,
}

#[derive(Debug)]
pub struct RedditClient {
    client: reqwest::blocking::Client,
    auth_url: String,
    api_url: String,
    client_id: String,
    client_secret: String,
    page_size: usize,
    max_pages: usize,
}

impl RedditClient {
    pub fn new(creds: &Credentials, opts: &MinerOptions) -> Result<Self, FetchError> {
        let client_id = creds
            .reddit_client_id
            .clone()
            .ok_or(FetchError::MissingCredential("REDDIT_CLIENT_ID"))?;
        let client_secret = creds
            .reddit_client_secret
            .clone()
            .ok_or(FetchError::MissingCredential("REDDIT_CLIENT_SECRET"))?;
        let user_agent = creds
            .reddit_user_agent
            .clone()
            .ok_or(FetchError::MissingCredential("REDDIT_USER_AGENT"))?;

        Ok(Self {
            client: http_client(&user_agent)?,
            auth_url: "https://www.reddit.com".to_string(),
            api_url: "https://oauth.reddit.com".to_string(),
            client_id,
            client_secret,
            // the listing endpoint caps a page at 100 posts
            page_size: 100,
            max_pages: opts.max_pages,
        })
    }

    /// Point the client at different endpoints (tests use a local stub).
    pub fn with_endpoints(mut self, auth_url: impl Into<String>, api_url: impl Into<String>) -> Self {
        self.auth_url = auth_url.into();
        self.api_url = api_url.into();
        self
    }

    fn access_token(&self) -> Result<String, FetchError> {
        let url = format!("{}/api/v1/access_token", self.auth_url);
        let resp: TokenResponse = self
            .client
            .post(&url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()?
            .error_for_status()?
            .json()?;
        Ok(resp.access_token)
    }

    /// Walk the hot listing of a subreddit, returning raw post objects in
    /// arrival order (page order, then within-page order).
    pub fn hot(&self, subreddit: &str, pb: Option<&ProgressBar>) -> Result<Vec<Value>, FetchError> {
        let subreddit = subreddit.trim().trim_start_matches("r/");
        tracing::info!("Subreddit: {}", subreddit);
        let token = self.access_token()?;

        let url = format!("{}/r/{}/hot", self.api_url, subreddit);
        let mut posts = Vec::new();
        let mut after: Option<String> = None;
        let mut pages = 0;
        loop {
            let limit = self.page_size.to_string();
            let mut params = vec![("limit", limit.as_str())];
            if let Some(cursor) = after.as_deref() {
                params.push(("after", cursor));
            }
            let listing: Listing = self
                .client
                .get(&url)
                .bearer_auth(&token)
                .query(&params)
                .send()?
                .error_for_status()?
                .json()?;

            let got = listing.data.children.len();
            posts.extend(listing.data.children.into_iter().map(|c| c.data));
            if let Some(pb) = pb {
                pb.inc(1);
            }
            pages += 1;
            after = listing.data.after;
            if after.is_none() || got == 0 {
                break;
            }
            if pages >= self.max_pages {
                tracing::warn!("Hit max_pages={} safety bound; stopping", self.max_pages);
                break;
            }
        }
        tracing::info!("Data fetch completed with {} records", posts.len());
        Ok(posts)
    }
}
