//! CSV persistence for the normalized table.
//!
//! One flat file per source under the data dir, re-created on every mining
//! run. Timestamps are stored as RFC 3339; tags joined with `;`.

use crate::record::Record;
use anyhow::{bail, Context, Result};
use csv::{Reader, Writer};
use std::fs::File;
use std::io;
use std::path::Path;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

const HEADER: [&str; 12] = [
    "AuthorId",
    "ItemId",
    "Title",
    "Abstract",
    "Views",
    "Answers",
    "Cites",
    "Tags",
    "Date",
    "LastActivity",
    "TitleClean",
    "AbstractClean",
];

fn fmt_date(d: &Option<OffsetDateTime>) -> String {
    d.and_then(|d| d.format(&Rfc3339).ok()).unwrap_or_default()
}

fn parse_date(s: &str) -> Option<OffsetDateTime> {
    if s.is_empty() {
        return None;
    }
    OffsetDateTime::parse(s, &Rfc3339).ok()
}

/// Write the full table, overwriting `path`.
pub fn save(path: &Path, records: &[Record]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut writer = Writer::from_writer(file);
    writer.write_record(HEADER)?;
    for r in records {
        writer.write_record([
            r.author_id.clone(),
            r.item_id.clone(),
            r.title.clone(),
            r.abstract_text.clone(),
            r.views.to_string(),
            r.answers.to_string(),
            r.cites.to_string(),
            r.tags.join(";"),
            fmt_date(&r.created),
            fmt_date(&r.last_activity),
            r.title_clean.clone(),
            r.abstract_clean.clone(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Load a previously mined table. A missing file means the mining step has
/// not run yet and is reported distinctly from any other read failure.
pub fn load(path: &Path) -> Result<Vec<Record>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::error!("Table {} not found", path.display());
            bail!(
                "table {} not found: make sure you have mined the data first",
                path.display()
            );
        }
        Err(e) => {
            return Err(e).with_context(|| format!("read {}", path.display()));
        }
    };

    let mut reader = Reader::from_reader(file);
    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.with_context(|| format!("parse {}", path.display()))?;
        let at = |i: usize| row.get(i).unwrap_or("").to_string();
        let int_at = |i: usize| row.get(i).and_then(|s| s.trim().parse().ok()).unwrap_or(0i64);
        let tags: Vec<String> = row
            .get(7)
            .unwrap_or("")
            .split(';')
            .map(str::to_string)
            .filter(|t| !t.is_empty())
            .collect();
        records.push(Record {
            author_id: at(0),
            item_id: at(1),
            title: at(2),
            abstract_text: at(3),
            views: int_at(4),
            answers: int_at(5),
            cites: int_at(6),
            tags,
            created: parse_date(row.get(8).unwrap_or("")),
            last_activity: parse_date(row.get(9).unwrap_or("")),
            title_clean: at(10),
            abstract_clean: at(11),
        });
    }
    Ok(records)
}
