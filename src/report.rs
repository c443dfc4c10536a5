//! Self-contained interactive HTML topic report: the fitted model's topics,
//! their document shares and top terms, explorable without a server.

use anyhow::{Context, Result};
use serde_json::json;
use std::fs;
use std::path::Path;

pub struct TopicReport<'a> {
    pub source: &'a str,
    pub n_docs: usize,
    pub n_topics: usize,
    pub learning_decay: f64,
    /// per topic: (term, probability), already truncated to the top words
    pub keywords: &'a [Vec<(String, f64)>],
    /// per topic: number of documents with this dominant topic
    pub distribution: &'a [u64],
}

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>__TITLE__</title>
<style>
  body { font-family: sans-serif; margin: 0; display: flex; height: 100vh; }
  #topics { width: 260px; overflow-y: auto; border-right: 1px solid #ddd; padding: 12px; }
  #topics h2, #detail h2 { font-size: 16px; }
  .topic { cursor: pointer; padding: 6px 8px; border-radius: 4px; margin-bottom: 4px; }
  .topic:hover { background: #eef3fc; }
  .topic.active { background: #dbe7fb; font-weight: bold; }
  #detail { flex: 1; padding: 16px 24px; overflow-y: auto; }
  .bar-row { display: flex; align-items: center; margin: 3px 0; }
  .bar-label { width: 140px; font-size: 13px; text-align: right; padding-right: 8px; }
  .bar { height: 14px; background: #4285f4; border-radius: 2px; }
  .bar-value { font-size: 11px; color: #666; padding-left: 6px; }
  .meta { color: #666; font-size: 13px; }
</style>
</head>
<body>
<div id="topics"><h2>Topics</h2></div>
<div id="detail"><h2 id="detail-title"></h2><p class="meta" id="detail-meta"></p><div id="bars"></div></div>
<script>
const DATA = __DATA__;
const topicsEl = document.getElementById("topics");
const barsEl = document.getElementById("bars");
function show(i) {
  document.querySelectorAll(".topic").forEach((el, j) =>
    el.classList.toggle("active", j === i));
  const t = DATA.topics[i];
  document.getElementById("detail-title").textContent = "Topic " + t.index;
  document.getElementById("detail-meta").textContent =
    t.documents + " of " + DATA.n_docs + " documents have this dominant topic";
  barsEl.innerHTML = "";
  const max = Math.max(...t.words.map(w => w.p));
  for (const w of t.words) {
    const row = document.createElement("div");
    row.className = "bar-row";
    row.innerHTML = '<div class="bar-label">' + w.term + '</div>' +
      '<div class="bar" style="width:' + (w.p / max * 420) + 'px"></div>' +
      '<div class="bar-value">' + w.p.toFixed(4) + '</div>';
    barsEl.appendChild(row);
  }
}
DATA.topics.forEach((t, i) => {
  const el = document.createElement("div");
  el.className = "topic";
  el.textContent = "Topic " + t.index + " (" + t.documents + " docs)";
  el.onclick = () => show(i);
  topicsEl.appendChild(el);
});
if (DATA.topics.length) show(0);
</script>
</body>
</html>
"#;

/// Write the interactive topic report to `path`.
pub fn write_topic_report(path: &Path, report: &TopicReport) -> Result<()> {
    let topics: Vec<serde_json::Value> = report
        .keywords
        .iter()
        .enumerate()
        .map(|(i, words)| {
            json!({
                "index": i,
                "documents": report.distribution.get(i).copied().unwrap_or(0),
                "words": words
                    .iter()
                    .map(|(term, p)| json!({ "term": term, "p": p }))
                    .collect::<Vec<_>>(),
            })
        })
        .collect();
    let data = json!({
        "source": report.source,
        "n_docs": report.n_docs,
        "n_topics": report.n_topics,
        "learning_decay": report.learning_decay,
        "topics": topics,
    });

    let title = format!("{} topic model", report.source);
    let html = TEMPLATE
        .replace("__TITLE__", &title)
        .replace("__DATA__", &data.to_string());
    fs::write(path, html).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
