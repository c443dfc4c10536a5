//! Descriptive statistics over the normalized table joined with the
//! dominant-topic assignment. Every function here is a pure stage: it takes
//! immutable inputs and returns a new value.

use crate::record::Record;
use time::OffsetDateTime;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interpolation {
    Linear,
    Midpoint,
}

/// Quantile of an unsorted sample. Returns `None` on an empty slice.
pub fn quantile(values: &[f64], p: f64, interpolation: Interpolation) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let pos = p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    Some(match interpolation {
        Interpolation::Linear => {
            let frac = pos - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
        Interpolation::Midpoint => (sorted[lo] + sorted[hi]) / 2.0,
    })
}

/// `describe`-style five-number-plus summary of a sample.
#[derive(Clone, Copy, Debug, Default)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl Summary {
    pub fn describe(values: &[f64]) -> Self {
        let count = values.len();
        if count == 0 {
            return Self::default();
        }
        let mean = values.iter().sum::<f64>() / count as f64;
        let std = if count > 1 {
            let ss: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
            (ss / (count - 1) as f64).sqrt()
        } else {
            0.0
        };
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let q = |p| quantile(values, p, Interpolation::Linear).unwrap_or(0.0);
        Self { count, mean, std, min, q1: q(0.25), median: q(0.5), q3: q(0.75), max }
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "count={} mean={:.2} std={:.2} min={:.0} 25%={:.1} 50%={:.1} 75%={:.1} max={:.0}",
            self.count, self.mean, self.std, self.min, self.q1, self.median, self.q3, self.max
        )
    }
}

pub fn cites_of(records: &[Record]) -> Vec<f64> {
    records.iter().map(|r| r.cites as f64).collect()
}

/// Median creation date with midpoint interpolation over unix timestamps.
pub fn median_date(records: &[Record]) -> Option<OffsetDateTime> {
    let stamps: Vec<f64> = records
        .iter()
        .filter_map(|r| r.created.map(|d| d.unix_timestamp() as f64))
        .collect();
    let mid = quantile(&stamps, 0.5, Interpolation::Midpoint)?;
    OffsetDateTime::from_unix_timestamp(mid as i64).ok()
}

/// Split at the median date: (`old`: strictly before, `new`: at or after).
pub fn split_old_new<'a>(records: &'a [Record], mid: OffsetDateTime) -> (Vec<&'a Record>, Vec<&'a Record>) {
    let mut old = Vec::new();
    let mut new = Vec::new();
    for r in records {
        match r.created {
            Some(d) if d < mid => old.push(r),
            Some(_) => new.push(r),
            None => {}
        }
    }
    (old, new)
}

fn title_len(r: &Record) -> f64 {
    r.title.chars().count() as f64
}

/// Median split by title length: (`longer`: at or above, `shorter`: below).
pub fn split_title_length<'a>(records: &'a [Record]) -> (Vec<&'a Record>, Vec<&'a Record>, f64) {
    let lens: Vec<f64> = records.iter().map(title_len).collect();
    let median = quantile(&lens, 0.5, Interpolation::Linear).unwrap_or(0.0);
    let (longer, shorter) = records.iter().partition(|r| title_len(r) >= median);
    (longer, shorter, median)
}

/// Disjoint quartile buckets by title length:
/// q1 ≤ p25 < q2 ≤ p50 < q3 ≤ p75 < q4.
pub fn four_way_title_split<'a>(records: &'a [Record]) -> [Vec<&'a Record>; 4] {
    let lens: Vec<f64> = records.iter().map(title_len).collect();
    let p25 = quantile(&lens, 0.25, Interpolation::Midpoint).unwrap_or(0.0);
    let p50 = quantile(&lens, 0.50, Interpolation::Midpoint).unwrap_or(0.0);
    let p75 = quantile(&lens, 0.75, Interpolation::Midpoint).unwrap_or(0.0);

    let mut out: [Vec<&Record>; 4] = [Vec::new(), Vec::new(), Vec::new(), Vec::new()];
    for r in records {
        let len = title_len(r);
        let bucket = if len <= p25 {
            0
        } else if len <= p50 {
            1
        } else if len <= p75 {
            2
        } else {
            3
        };
        out[bucket].push(r);
    }
    out
}

/// Most-cited articles: (clean title, cites), descending.
pub fn top_articles(records: &[Record], n: usize) -> Vec<(String, i64)> {
    let mut rows: Vec<(String, i64)> = records
        .iter()
        .map(|r| (r.title_clean.clone(), r.cites))
        .collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1));
    rows.truncate(n);
    rows
}

/// Abstracts of every document whose dominant topic is `topic`.
pub fn abstracts_for_topic<'a>(records: &'a [Record], dominant: &[usize], topic: usize) -> Vec<&'a str> {
    records
        .iter()
        .zip(dominant.iter())
        .filter(|(_, &t)| t == topic)
        .map(|(r, _)| r.abstract_text.as_str())
        .collect()
}

/// Per-topic aggregates over the table joined with the dominant-topic
/// assignment.
#[derive(Clone, Debug)]
pub struct TopicRow {
    pub topic: usize,
    pub num_documents: u64,
    pub cite_sum: i64,
    /// Σ (reference_year − publication year) over the topic's documents.
    pub topic_age: i64,
    pub cites_per_year: f64,
    pub cites_per_doc: f64,
}

#[derive(Clone, Debug, Default)]
pub struct TopicStats {
    pub rows: Vec<TopicRow>,
}

impl TopicStats {
    pub fn compute(records: &[Record], dominant: &[usize], n_topics: usize, reference_year: i32) -> Self {
        let mut rows = Vec::with_capacity(n_topics);
        for topic in 0..n_topics {
            let mut num_documents = 0u64;
            let mut cite_sum = 0i64;
            let mut topic_age = 0i64;
            for (r, &t) in records.iter().zip(dominant.iter()) {
                if t != topic {
                    continue;
                }
                num_documents += 1;
                cite_sum += r.cites;
                if let Some(year) = r.year() {
                    topic_age += (reference_year - year) as i64;
                }
            }
            let cites_per_year = if topic_age > 0 { cite_sum as f64 / topic_age as f64 } else { 0.0 };
            let cites_per_doc =
                if num_documents > 0 { cite_sum as f64 / num_documents as f64 } else { 0.0 };
            rows.push(TopicRow {
                topic,
                num_documents,
                cite_sum,
                topic_age,
                cites_per_year,
                cites_per_doc,
            });
        }
        Self { rows }
    }

    fn top_by<F: Fn(&TopicRow) -> f64>(&self, n: usize, key: F) -> Vec<&TopicRow> {
        let mut rows: Vec<&TopicRow> = self.rows.iter().collect();
        rows.sort_by(|a, b| key(b).partial_cmp(&key(a)).unwrap_or(std::cmp::Ordering::Equal));
        rows.truncate(n);
        rows
    }

    pub fn top_cited_per_year(&self, n: usize) -> Vec<&TopicRow> {
        self.top_by(n, |r| r.cites_per_year)
    }
    pub fn most_cited(&self, n: usize) -> Vec<&TopicRow> {
        self.top_by(n, |r| r.cite_sum as f64)
    }
    pub fn oldest(&self, n: usize) -> Vec<&TopicRow> {
        self.top_by(n, |r| r.topic_age as f64)
    }
    pub fn most_popular(&self, n: usize) -> Vec<&TopicRow> {
        self.top_by(n, |r| r.num_documents as f64)
    }
}

fn erf(x: f64) -> f64 {
    // Abramowitz & Stegun 7.1.26, |error| < 1.5e-7
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + 0.3275911 * x);
    let y = 1.0
        - (((((1.061405429 * t - 1.453152027) * t) + 1.421413741) * t - 0.284496736) * t
            + 0.254829592)
            * t
            * (-x * x).exp();
    sign * y
}

fn normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))
}

/// One-sample Wilcoxon signed-rank test against a zero median, with the
/// normal approximation (two-sided, tie-corrected). Returns `(W, p)`;
/// `None` when every value is zero.
pub fn wilcoxon_signed_rank(values: &[f64]) -> Option<(f64, f64)> {
    let nonzero: Vec<f64> = values.iter().cloned().filter(|v| *v != 0.0).collect();
    let n = nonzero.len();
    if n == 0 {
        return None;
    }

    // average ranks of |x|, ties share the mean rank
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        nonzero[a]
            .abs()
            .partial_cmp(&nonzero[b].abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let mut ranks = vec![0.0f64; n];
    let mut tie_term = 0.0f64;
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && nonzero[order[j + 1]].abs() == nonzero[order[i]].abs() {
            j += 1;
        }
        let avg_rank = (i + j + 2) as f64 / 2.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg_rank;
        }
        let t = (j - i + 1) as f64;
        tie_term += t * t * t - t;
        i = j + 1;
    }

    let w_plus: f64 = nonzero
        .iter()
        .zip(ranks.iter())
        .filter(|(v, _)| **v > 0.0)
        .map(|(_, r)| r)
        .sum();
    let w_minus: f64 = nonzero
        .iter()
        .zip(ranks.iter())
        .filter(|(v, _)| **v < 0.0)
        .map(|(_, r)| r)
        .sum();
    let w = w_plus.min(w_minus);

    let nf = n as f64;
    let mean = nf * (nf + 1.0) / 4.0;
    let var = nf * (nf + 1.0) * (2.0 * nf + 1.0) / 24.0 - tie_term / 48.0;
    if var <= 0.0 {
        return Some((w, 1.0));
    }
    let z = (w - mean) / var.sqrt();
    let p = (2.0 * normal_cdf(-z.abs())).min(1.0);
    Some((w, p))
}
