#[path = "common/mod.rs"]
mod common;

use common::*;
use scimine::{Credentials, Miner, MinerOptions, Source, StackOverflowClient};
use serde_json::json;
use std::sync::atomic::Ordering;

fn so_page(ids: &[u64], has_more: bool) -> String {
    let items: Vec<_> = ids
        .iter()
        .map(|id| {
            json!({
                "question_id": id,
                "title": format!("Question {}", id),
                "body": "<p>Some body text here</p>",
                "owner": {"user_id": id * 10},
                "answer_count": 1,
                "score": 2,
                "view_count": 30,
                "tags": ["rust"],
                "creation_date": 1_650_000_000u64 + id,
                "last_activity_date": 1_650_001_000u64 + id
            })
        })
        .collect();
    json!({
        "items": items,
        "has_more": has_more,
        "quota_max": 300,
        "quota_remaining": 250,
        "total": 5
    })
    .to_string()
}

#[test]
fn stops_exactly_when_has_more_goes_false() {
    let bodies = vec![
        so_page(&[1, 2], true),
        so_page(&[3, 4], true),
        so_page(&[5], false),
    ];
    let (url, hits) = spawn_json_stub(bodies);

    let opts = MinerOptions::default().with_progress(false);
    let client = StackOverflowClient::new(&Credentials::default(), &opts)
        .unwrap()
        .with_base_url(url);
    let items = client.search("rust", None).unwrap();

    // has_more flipped on page 3 -> exactly 3 requests, all items kept in order
    assert_eq!(hits.load(Ordering::SeqCst), 3);
    assert_eq!(items.len(), 5);
    let ids: Vec<u64> = items.iter().map(|i| i["question_id"].as_u64().unwrap()).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
}

#[test]
fn single_page_when_first_page_is_last() {
    let (url, hits) = spawn_json_stub(vec![so_page(&[9], false)]);
    let opts = MinerOptions::default().with_progress(false);
    let client = StackOverflowClient::new(&Credentials::default(), &opts)
        .unwrap()
        .with_base_url(url);
    let items = client.search("rust", None).unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(items.len(), 1);
}

#[test]
fn safety_bound_stops_runaway_pagination() {
    // the stub always reports more pages; the bound must cut the loop
    let (url, hits) = spawn_json_stub(vec![so_page(&[1], true)]);
    let opts = MinerOptions::default().with_progress(false).with_max_pages(4);
    let client = StackOverflowClient::new(&Credentials::default(), &opts)
        .unwrap()
        .with_base_url(url);
    let items = client.search("rust", None).unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 4);
    assert_eq!(items.len(), 4);
}

#[test]
fn api_error_payload_aborts_the_fetch() {
    let body = json!({
        "error_id": 502,
        "error_message": "too many requests from this IP",
        "error_name": "throttle_violation"
    })
    .to_string();
    let (url, _hits) = spawn_json_stub(vec![body]);
    let opts = MinerOptions::default().with_progress(false);
    let client = StackOverflowClient::new(&Credentials::default(), &opts)
        .unwrap()
        .with_base_url(url);
    let err = client.search("rust", None).unwrap_err();
    assert!(err.to_string().contains("502"));
}

#[test]
fn mining_end_to_end_writes_scrubbed_table() {
    // total probe (1 request) + two search pages
    let bodies = vec![
        so_page(&[], false), // total filter response reuses the page shape
        so_page(&[1, 2], true),
        so_page(&[3], false),
    ];
    let (url, hits) = spawn_json_stub(bodies);

    let dir = tempfile::tempdir().unwrap();
    let miner = Miner::new().data_dir(dir.path()).progress(false);
    let opts = MinerOptions::default().with_progress(false);
    let client = StackOverflowClient::new(&Credentials::default(), &opts)
        .unwrap()
        .with_base_url(url);

    let summary = miner.mine_stackoverflow_with(&client, "rust").unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 3);
    assert_eq!(summary.fetched, 3);
    assert_eq!(summary.kept, 3); // every stub record has body and date
    assert_eq!(summary.reported_total, Some(5));

    let rows = scimine::load_table(&dir.path().join(Source::StackOverflow.table_file())).unwrap();
    assert_eq!(rows.len(), 3);
    // scrub stage has filled the derived fields
    assert!(rows.iter().all(|r| !r.abstract_clean.is_empty()));
    assert_eq!(rows[0].title_clean, "question");
}
