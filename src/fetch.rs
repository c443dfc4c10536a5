//! Shared plumbing for the source API clients.

use thiserror::Error;

pub const DEFAULT_USER_AGENT: &str = concat!("scimine/", env!("CARGO_PKG_VERSION"));

/// Errors surfaced by the fetch layer. No retry policy: the first failure
/// aborts the mining run with nothing partially saved.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API returned error {id}: {message}")]
    Api { id: i64, message: String },

    #[error("missing credential: {0} (set it in the environment)")]
    MissingCredential(&'static str),
}

pub(crate) fn http_client(user_agent: &str) -> Result<reqwest::blocking::Client, FetchError> {
    Ok(reqwest::blocking::Client::builder()
        .user_agent(user_agent.to_string())
        .build()?)
}
