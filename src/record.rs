//! Common record schema and per-source normalizers.
//!
//! Each normalizer is pure and total: missing fields fall back to `0`, the
//! empty string, or `None`. No source payload can make it fail, and input
//! order is preserved by the callers.

use serde_json::Value;
use time::{Date, OffsetDateTime};

/// One mined item (question, post, or paper) in the common schema.
/// `title_clean`/`abstract_clean` are derived fields, empty until the scrub
/// stage fills them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    pub author_id: String,
    pub item_id: String,
    pub title: String,
    pub abstract_text: String,
    pub views: i64,
    pub answers: i64,
    pub cites: i64,
    pub tags: Vec<String>,
    pub created: Option<OffsetDateTime>,
    pub last_activity: Option<OffsetDateTime>,

    pub title_clean: String,
    pub abstract_clean: String,
}

impl Record {
    pub fn year(&self) -> Option<i32> {
        self.created.map(|d| d.year())
    }
}

fn str_at(v: &Value, key: &str) -> String {
    match v.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn i64_at(v: &Value, key: &str) -> i64 {
    match v.get(key) {
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0),
        // Scopus serves counts as strings.
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn epoch_at(v: &Value, key: &str) -> Option<OffsetDateTime> {
    let secs = match v.get(key) {
        Some(Value::Number(n)) => n.as_f64()? as i64,
        _ => return None,
    };
    OffsetDateTime::from_unix_timestamp(secs).ok()
}

/// Map a Stack Exchange `/search/advanced` item onto the common schema.
pub fn from_stackexchange_item(item: &Value) -> Record {
    let owner = item.get("owner").cloned().unwrap_or(Value::Null);
    let tags = item
        .get("tags")
        .and_then(|t| t.as_array())
        .map(|a| a.iter().filter_map(|x| x.as_str().map(str::to_string)).collect())
        .unwrap_or_default();

    Record {
        author_id: str_at(&owner, "user_id"),
        item_id: str_at(item, "question_id"),
        title: str_at(item, "title"),
        abstract_text: str_at(item, "body"),
        views: i64_at(item, "view_count"),
        answers: i64_at(item, "answer_count"),
        cites: i64_at(item, "score"),
        tags,
        created: epoch_at(item, "creation_date"),
        last_activity: epoch_at(item, "last_activity_date"),
        ..Default::default()
    }
}

/// Map a Reddit listing child's `data` object onto the common schema.
pub fn from_reddit_post(post: &Value) -> Record {
    Record {
        author_id: str_at(post, "author"),
        item_id: str_at(post, "id"),
        title: str_at(post, "title"),
        abstract_text: str_at(post, "selftext"),
        views: 0,
        answers: i64_at(post, "num_comments"),
        cites: i64_at(post, "score"),
        tags: Vec::new(),
        created: epoch_at(post, "created_utc"),
        last_activity: None,
        ..Default::default()
    }
}

/// Map a Scopus search entry onto the common schema.
/// Cover dates come as `YYYY-MM-DD`; keywords as a ` | `-separated string.
pub fn from_scopus_entry(entry: &Value) -> Record {
    let cover_date = entry
        .get("prism:coverDate")
        .and_then(|d| d.as_str())
        .and_then(parse_cover_date);
    let tags = entry
        .get("authkeywords")
        .and_then(|k| k.as_str())
        .map(|s| {
            s.split('|')
                .map(|w| w.trim().to_string())
                .filter(|w| !w.is_empty())
                .collect()
        })
        .unwrap_or_default();

    Record {
        author_id: str_at(entry, "dc:creator"),
        item_id: str_at(entry, "eid"),
        title: str_at(entry, "dc:title"),
        abstract_text: str_at(entry, "dc:description"),
        views: 0,
        answers: 0,
        cites: i64_at(entry, "citedby-count"),
        tags,
        created: cover_date,
        last_activity: None,
        ..Default::default()
    }
}

fn parse_cover_date(s: &str) -> Option<OffsetDateTime> {
    let fmt = time::macros::format_description!("[year]-[month]-[day]");
    Date::parse(s.trim(), &fmt).ok().map(|d| d.midnight().assume_utc())
}
