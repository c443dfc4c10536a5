#[path = "common/mod.rs"]
mod common;

use common::*;
use scimine::{Credentials, Miner, MinerOptions, RedditClient, ScopusClient, Source};
use serde_json::json;
use std::sync::atomic::Ordering;

fn reddit_creds() -> Credentials {
    Credentials {
        reddit_client_id: Some("id".to_string()),
        reddit_client_secret: Some("secret".to_string()),
        reddit_user_agent: Some("scimine tests".to_string()),
        ..Default::default()
    }
}

fn reddit_listing(ids: &[&str], after: Option<&str>) -> String {
    let children: Vec<_> = ids
        .iter()
        .map(|id| {
            json!({
                "kind": "t3",
                "data": {
                    "id": id,
                    "title": format!("Post {}", id),
                    "selftext": "Discussion body text",
                    "author": "alice",
                    "num_comments": 4,
                    "score": 12,
                    "created_utc": 1_650_000_000.0
                }
            })
        })
        .collect();
    json!({"kind": "Listing", "data": {"children": children, "after": after}}).to_string()
}

#[test]
fn reddit_walks_after_cursor_until_exhausted() {
    let bodies = vec![
        json!({"access_token": "tok", "token_type": "bearer", "expires_in": 3600}).to_string(),
        reddit_listing(&["a1", "a2"], Some("t3_a2")),
        reddit_listing(&["a3"], None),
    ];
    let (url, hits) = spawn_json_stub(bodies);

    let opts = MinerOptions::default().with_progress(false);
    let client = RedditClient::new(&reddit_creds(), &opts)
        .unwrap()
        .with_endpoints(url.clone(), url);
    let posts = client.hot("r/rust", None).unwrap();

    // one token request + two listing pages
    assert_eq!(hits.load(Ordering::SeqCst), 3);
    assert_eq!(posts.len(), 3);
    assert_eq!(posts[0]["id"], "a1");
    assert_eq!(posts[2]["id"], "a3");
}

#[test]
fn reddit_requires_credentials() {
    let opts = MinerOptions::default();
    let err = RedditClient::new(&Credentials::default(), &opts).unwrap_err();
    assert!(err.to_string().contains("REDDIT_CLIENT_ID"));
}

fn scopus_page(total: u64, n: usize, offset: usize) -> String {
    let entries: Vec<_> = (0..n)
        .map(|i| {
            json!({
                "eid": format!("2-s2.0-{}", offset + i),
                "dc:title": format!("Paper {}", offset + i),
                "dc:description": "An abstract about topic modeling methods",
                "dc:creator": "Doe J.",
                "citedby-count": format!("{}", (offset + i) * 3),
                "prism:coverDate": "2022-04-01",
                "authkeywords": "lda | text mining"
            })
        })
        .collect();
    json!({"search-results": {
        "opensearch:totalResults": total.to_string(),
        "entry": entries
    }})
    .to_string()
}

#[test]
fn scopus_pages_by_offset_until_total_covered() {
    let bodies = vec![scopus_page(3, 2, 0), scopus_page(3, 1, 2)];
    let (url, hits) = spawn_json_stub(bodies);

    let opts = MinerOptions::default().with_progress(false).with_page_size(2);
    let creds = Credentials { scopus_api_key: Some("key".to_string()), ..Default::default() };
    let client = ScopusClient::new(&creds, &opts).unwrap().with_base_url(url);
    let (entries, total) = client.search("TITLE(lda)", None).unwrap();

    assert_eq!(hits.load(Ordering::SeqCst), 2);
    assert_eq!(total, 3);
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["eid"], "2-s2.0-0");
}

#[test]
fn scopus_empty_result_set_is_not_an_error() {
    let body = json!({"search-results": {
        "opensearch:totalResults": "0",
        "entry": [{"error": "Result set was empty"}]
    }})
    .to_string();
    let (url, hits) = spawn_json_stub(vec![body]);

    let opts = MinerOptions::default().with_progress(false);
    let creds = Credentials { scopus_api_key: Some("key".to_string()), ..Default::default() };
    let client = ScopusClient::new(&creds, &opts).unwrap().with_base_url(url);
    let (entries, total) = client.search("TITLE(nothing)", None).unwrap();

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(total, 0);
    assert!(entries.is_empty());
}

#[test]
fn reddit_mining_end_to_end() {
    let bodies = vec![
        json!({"access_token": "tok", "token_type": "bearer", "expires_in": 3600}).to_string(),
        reddit_listing(&["a1", "a2"], None),
    ];
    let (url, _hits) = spawn_json_stub(bodies);

    let dir = tempfile::tempdir().unwrap();
    let miner = Miner::new().data_dir(dir.path()).progress(false);
    let opts = MinerOptions::default().with_progress(false);
    let client = RedditClient::new(&reddit_creds(), &opts)
        .unwrap()
        .with_endpoints(url.clone(), url);

    let summary = miner.mine_reddit_with(&client, "rust").unwrap();
    assert_eq!(summary.fetched, 2);
    assert_eq!(summary.kept, 2);

    let rows = scimine::load_table(&dir.path().join(Source::Reddit.table_file())).unwrap();
    assert_eq!(rows[0].author_id, "alice");
    assert_eq!(rows[0].cites, 12);
    assert_eq!(rows[0].abstract_clean, "discussion body text");
}
