use crate::clean::scrub;
use crate::cluster::ward_linkage;
use crate::config::{Credentials, MinerOptions, Source};
use crate::corpus::{build_corpus, StopWords};
use crate::dtm::{CountVectorizer, DocTermMatrix};
use crate::lda::{grid_search, topic_distribution, LdaConfig};
use crate::progress::{make_count_progress, make_spinner};
use crate::record::{from_reddit_post, from_scopus_entry, from_stackexchange_item, Record};
use crate::reddit::RedditClient;
use crate::report::{write_topic_report, TopicReport};
use crate::scopus::ScopusClient;
use crate::stackoverflow::StackOverflowClient;
use crate::stats::{
    cites_of, four_way_title_split, median_date, split_old_new, split_title_length, top_articles,
    Summary, TopicStats,
};
use crate::table;
use crate::timeline::{daily_counts, yearly_counts};
use crate::util::{ensure_output_dir, init_tracing_once, recreate_data_file};
use crate::wordcloud::{render_comparison_cloud, render_word_cloud, word_frequencies};
use crate::{plot, stats};
use anyhow::{Context, Result};
use indicatif::ProgressBar;
use std::path::PathBuf;

/// Outcome of one mining run.
#[derive(Debug)]
pub struct MineSummary {
    pub fetched: usize,
    pub kept: usize,
    pub reported_total: Option<u64>,
    pub table_path: PathBuf,
}

/// Outcome of one analysis run: the key tables plus every file written.
pub struct AnalysisOutputs {
    pub output_dir: PathBuf,
    pub n_documents: usize,
    pub term_frequencies: Vec<(String, u64)>,
    pub top_terms: Vec<(String, u64)>,
    pub best_n_topics: usize,
    pub best_decay: f64,
    pub best_score: f64,
    pub perplexity: f64,
    pub dominant_topics: Vec<usize>,
    pub topic_stats: TopicStats,
    pub files: Vec<PathBuf>,
}

/// Top-level entry point: mine a source into its CSV table, then analyze it
/// into plots, clouds and the topic report.
#[derive(Clone)]
pub struct Miner {
    pub(crate) opts: MinerOptions,
    pub(crate) creds: Credentials,
}

impl Default for Miner {
    fn default() -> Self {
        Self::new()
    }
}

impl Miner {
    pub fn new() -> Self {
        Self { opts: MinerOptions::default(), creds: Credentials::from_env() }
    }

    // -------- Builder methods --------
    pub fn data_dir(mut self, dir: impl AsRef<std::path::Path>) -> Self {
        self.opts = self.opts.with_data_dir(dir);
        self
    }
    pub fn output_dir(mut self, dir: impl AsRef<std::path::Path>) -> Self {
        self.opts = self.opts.with_output_dir(dir);
        self
    }
    pub fn max_pages(mut self, n: usize) -> Self {
        self.opts = self.opts.with_max_pages(n);
        self
    }
    pub fn page_size(mut self, n: usize) -> Self {
        self.opts = self.opts.with_page_size(n);
        self
    }
    pub fn progress(mut self, yes: bool) -> Self {
        self.opts = self.opts.with_progress(yes);
        self
    }
    pub fn top_term_threshold(mut self, min_count: u64) -> Self {
        self.opts = self.opts.with_top_term_threshold(min_count);
        self
    }
    pub fn topic_grid<I: IntoIterator<Item = usize>>(mut self, grid: I) -> Self {
        self.opts = self.opts.with_topic_grid(grid);
        self
    }
    pub fn decay_grid<I: IntoIterator<Item = f64>>(mut self, grid: I) -> Self {
        self.opts = self.opts.with_decay_grid(grid);
        self
    }
    pub fn reference_year(mut self, year: i32) -> Self {
        self.opts = self.opts.with_reference_year(year);
        self
    }
    pub fn credentials(mut self, creds: Credentials) -> Self {
        self.creds = creds;
        self
    }

    fn spinner(&self, label: &str) -> Option<ProgressBar> {
        if self.opts.progress {
            Some(make_spinner(label))
        } else {
            None
        }
    }

    /// Persist raw records, then run the scrub stage through the table file
    /// (read back, clean, fully rewrite) so on-disk and in-memory views agree.
    fn save_and_scrub(&self, source: Source, records: Vec<Record>) -> Result<MineSummary> {
        let path = self.opts.data_dir.join(source.table_file());
        let fetched = records.len();
        table::save(&path, &records).context("save raw table")?;
        tracing::info!("Data saved");

        let rows = table::load(&path)?;
        let cleaned = scrub(rows);
        table::save(&path, &cleaned).context("save cleaned table")?;
        tracing::info!("Data cleaned and saved");
        Ok(MineSummary { fetched, kept: cleaned.len(), reported_total: None, table_path: path })
    }

    /// Mine Stack Overflow for a search query.
    pub fn mine_stackoverflow(&self, query: &str) -> Result<MineSummary> {
        let client = StackOverflowClient::new(&self.creds, &self.opts)?;
        self.mine_stackoverflow_with(&client, query)
    }

    /// Same, against a caller-supplied client (tests point one at a stub).
    pub fn mine_stackoverflow_with(&self, client: &StackOverflowClient, query: &str) -> Result<MineSummary> {
        init_tracing_once();
        recreate_data_file(&self.opts.data_dir, Source::StackOverflow.table_file())?;

        let total = client.total(query)?;
        tracing::info!("total: {}", total);

        let pb = self.spinner("Stackoverflow mining in progress");
        let items = client.search(query, pb.as_ref())?;
        if let Some(pb) = pb {
            pb.finish_with_message("done");
        }

        let records: Vec<Record> = items.iter().map(from_stackexchange_item).collect();
        let mut summary = self.save_and_scrub(Source::StackOverflow, records)?;
        summary.reported_total = Some(total);
        Ok(summary)
    }

    /// Mine a subreddit's hot listing.
    pub fn mine_reddit(&self, subreddit: &str) -> Result<MineSummary> {
        let client = RedditClient::new(&self.creds, &self.opts)?;
        self.mine_reddit_with(&client, subreddit)
    }

    pub fn mine_reddit_with(&self, client: &RedditClient, subreddit: &str) -> Result<MineSummary> {
        init_tracing_once();
        recreate_data_file(&self.opts.data_dir, Source::Reddit.table_file())?;

        let pb = self.spinner("Reddit mining in progress");
        let posts = client.hot(subreddit, pb.as_ref())?;
        if let Some(pb) = pb {
            pb.finish_with_message("done");
        }

        let records: Vec<Record> = posts.iter().map(from_reddit_post).collect();
        self.save_and_scrub(Source::Reddit, records)
    }

    /// Mine the Scopus citation database for a query.
    pub fn mine_scopus(&self, query: &str) -> Result<MineSummary> {
        let client = ScopusClient::new(&self.creds, &self.opts)?;
        self.mine_scopus_with(&client, query)
    }

    pub fn mine_scopus_with(&self, client: &ScopusClient, query: &str) -> Result<MineSummary> {
        init_tracing_once();
        recreate_data_file(&self.opts.data_dir, Source::Scopus.table_file())?;

        let pb = self.spinner("Scopus mining in progress");
        let (entries, total) = client.search(query, pb.as_ref())?;
        if let Some(pb) = pb {
            pb.finish_with_message("done");
        }

        let records: Vec<Record> = entries.iter().map(from_scopus_entry).collect();
        let mut summary = self.save_and_scrub(Source::Scopus, records)?;
        summary.reported_total = Some(total);
        Ok(summary)
    }

    /// Full analysis over a previously mined table: corpus, frequencies,
    /// clustering, topic model grid, derived statistics and every plot.
    pub fn analyze(&self, source: Source, extra_stop_words: &[&str]) -> Result<AnalysisOutputs> {
        init_tracing_once();

        let table_path = self.opts.data_dir.join(source.table_file());
        let records = table::load(&table_path)?;
        tracing::info!("Data has {} rows", records.len());
        let out_dir = ensure_output_dir(&self.opts.output_dir, source.dir_name())?;
        let mut files = Vec::new();

        // ---- corpus ----
        let stops = StopWords::english().with_extra(extra_stop_words.iter().copied());
        tracing::info!("total stop words: {}", stops.len());
        let (docs, batch_report) = build_corpus(&records, &stops);
        batch_report.log();
        let tokens: Vec<Vec<String>> = docs.iter().map(|d| d.tokens.clone()).collect();

        // ---- document-term matrix and frequency views ----
        let dtm = CountVectorizer::new().fit_transform(&tokens);
        tracing::info!("Sparsity: {:.2}%", dtm.sparsity());
        let term_frequencies = dtm.term_frequencies();
        let top_terms = dtm.top_terms(self.opts.top_term_threshold);

        let bar_terms: Vec<(String, u64)> = if top_terms.is_empty() {
            term_frequencies.iter().take(40).cloned().collect()
        } else {
            top_terms.clone()
        };
        let p = out_dir.join(format!("{}_frequent_terms.png", source.dir_name()));
        plot::plot_top_terms(&p, &bar_terms)?;
        files.push(p);

        // ---- hierarchical clustering ----
        let merges = ward_linkage(&dtm.matrix);
        let labels: Vec<String> = docs.iter().map(|d| d.title_terms.clone()).collect();
        let p = out_dir.join(format!("{}_dendrogram.png", source.dir_name()));
        plot::plot_dendrogram(&p, &merges, &labels)?;
        files.push(p);

        // ---- topic model grid search ----
        let lda_dtm = self.lda_matrix(&tokens, &dtm);
        let base = LdaConfig::default();
        let trials = (self.opts.topic_grid.len() * self.opts.decay_grid.len()) as u64;
        let grid_pb = if self.opts.progress {
            Some(make_count_progress(trials, "Topic model grid search"))
        } else {
            None
        };
        let search = grid_search(
            &lda_dtm.matrix,
            &self.opts.topic_grid,
            &self.opts.decay_grid,
            &base,
            grid_pb.as_ref(),
        )?;
        if let Some(pb) = grid_pb {
            pb.finish_with_message("grid search done");
        }
        let perplexity = search.best.perplexity(&lda_dtm.matrix)?;
        tracing::info!("Model perplexity: {:.2}", perplexity);

        let dominant = search.best.dominant_topics(&lda_dtm.matrix)?;
        let distribution = topic_distribution(&dominant, search.best_n_topics);
        let keywords = search.best.top_keywords(&lda_dtm.terms, self.opts.top_words_per_topic)?;
        for (i, words) in keywords.iter().enumerate() {
            let joined: Vec<&str> = words.iter().take(10).map(|(w, _)| w.as_str()).collect();
            tracing::info!("Topic {}: {}", i, joined.join(" "));
        }

        let p = out_dir.join(format!("{}_lda.html", source.dir_name()));
        write_topic_report(
            &p,
            &TopicReport {
                source: source.dir_name(),
                n_docs: lda_dtm.n_docs(),
                n_topics: search.best_n_topics,
                learning_decay: search.best_decay,
                keywords: &keywords,
                distribution: &distribution,
            },
        )?;
        files.push(p);

        // ---- per-topic aggregates ----
        let topic_stats =
            TopicStats::compute(&records, &dominant, search.best_n_topics, self.opts.reference_year);
        for row in topic_stats.top_cited_per_year(5) {
            tracing::info!(
                "top cited/year: topic {} ({:.2} cites/year, {} docs)",
                row.topic,
                row.cites_per_year,
                row.num_documents
            );
        }
        for row in topic_stats.most_cited(5) {
            tracing::info!("most cited: topic {} ({} cites)", row.topic, row.cite_sum);
        }
        for row in topic_stats.oldest(5) {
            tracing::info!("oldest: topic {} (age {})", row.topic, row.topic_age);
        }
        for row in topic_stats.most_popular(5) {
            tracing::info!("most popular: topic {} ({} docs)", row.topic, row.num_documents);
        }

        // ---- timeline ----
        let years = yearly_counts(&records);
        tracing::info!("Yearly distributions: {:?}", years);
        let p = out_dir.join(format!("{}_yearly_popularity.png", source.dir_name()));
        plot::plot_yearly_counts(&p, &format!("{} yearly popularity", source.dir_name()), &years)?;
        files.push(p);

        let days = daily_counts(&records);
        let p = out_dir.join(format!("{}_daily_trend.png", source.dir_name()));
        plot::plot_daily_trend(&p, &format!("{} daily trend", source.dir_name()), &days)?;
        files.push(p);

        // ---- citation analytics ----
        let cites = cites_of(&records);
        tracing::info!("Citation summary: {}", Summary::describe(&cites));
        let p = out_dir.join(format!("{}_citation_boxPlot.png", source.dir_name()));
        plot::plot_box_groups(
            &p,
            &format!("{} citation boxPlot", source.dir_name()),
            &[("all".to_string(), cites.clone())],
        )?;
        files.push(p);
        let p = out_dir.join(format!("{}_citation_violinPlot.png", source.dir_name()));
        plot::plot_violin_groups(
            &p,
            &format!("{} citation violinPlot", source.dir_name()),
            &[("all".to_string(), cites.clone())],
        )?;
        files.push(p);

        // ---- old vs new at the median date ----
        if let Some(mid) = median_date(&records) {
            tracing::info!("Median date is: {}", mid);
            let (old, new) = split_old_new(&records, mid);
            let groups = vec![
                ("old".to_string(), old.iter().map(|r| r.cites as f64).collect::<Vec<_>>()),
                ("new".to_string(), new.iter().map(|r| r.cites as f64).collect::<Vec<_>>()),
            ];
            let p = out_dir.join(format!("{}_oldVSnew_boxPlot.png", source.dir_name()));
            plot::plot_box_groups(&p, &format!("{} old vs new cites", source.dir_name()), &groups)?;
            files.push(p);
            let p = out_dir.join(format!("{}_oldVSnew_violinPlot.png", source.dir_name()));
            plot::plot_violin_groups(&p, &format!("{} old vs new cites", source.dir_name()), &groups)?;
            files.push(p);
            tracing::info!("Old data summary: {}", Summary::describe(&groups[0].1));
            tracing::info!("New data summary: {}", Summary::describe(&groups[1].1));

            // comparison cloud over title terms, split at the same boundary
            let old_freqs = word_frequencies(
                records
                    .iter()
                    .zip(docs.iter())
                    .filter(|(r, _)| matches!(r.created, Some(d) if d < mid))
                    .map(|(_, d)| d.title_terms.as_str()),
            );
            let new_freqs = word_frequencies(
                records
                    .iter()
                    .zip(docs.iter())
                    .filter(|(r, _)| matches!(r.created, Some(d) if d >= mid))
                    .map(|(_, d)| d.title_terms.as_str()),
            );
            let p = out_dir.join(format!("{}_comparison_cloud.png", source.dir_name()));
            render_comparison_cloud(&p, &old_freqs, &new_freqs, &mid.date().to_string())?;
            files.push(p);
        }

        // ---- overall word cloud ----
        let cloud_freqs = word_frequencies(docs.iter().map(|d| d.title_terms.as_str()));
        let p = out_dir.join(format!("{}_word_cloud.png", source.dir_name()));
        render_word_cloud(&p, &cloud_freqs)?;
        files.push(p);

        // ---- title-length analytics ----
        let (longer, shorter, median_len) = split_title_length(&records);
        tracing::info!(
            "Title length split at {}: {} longer, {} shorter",
            median_len,
            longer.len(),
            shorter.len()
        );
        let length_groups = vec![
            ("longer".to_string(), longer.iter().map(|r| r.cites as f64).collect::<Vec<_>>()),
            ("shorter".to_string(), shorter.iter().map(|r| r.cites as f64).collect::<Vec<_>>()),
        ];
        let p = out_dir.join(format!("{}_titleLength_boxPlot.png", source.dir_name()));
        plot::plot_box_groups(&p, &format!("{} title length cites", source.dir_name()), &length_groups)?;
        files.push(p);
        let p = out_dir.join(format!("{}_titleLength_violinPlot.png", source.dir_name()));
        plot::plot_violin_groups(
            &p,
            &format!("{} title length cites", source.dir_name()),
            &length_groups,
        )?;
        files.push(p);
        for (name, values) in &length_groups {
            tracing::info!("{} data summary: {}", name, Summary::describe(values));
            if let Some((w, pval)) = stats::wilcoxon_signed_rank(values) {
                tracing::info!("Wilcoxon for {}: W={} p={:.4}", name, w, pval);
            }
        }

        let quartiles = four_way_title_split(&records);
        let quartile_groups: Vec<(String, Vec<f64>)> = quartiles
            .iter()
            .enumerate()
            .map(|(i, bucket)| {
                (format!("Q{}", i + 1), bucket.iter().map(|r| r.cites as f64).collect())
            })
            .collect();
        for (name, values) in &quartile_groups {
            tracing::info!("{} cites summary: {}", name, Summary::describe(values));
        }
        let p = out_dir.join(format!("{}_FourwaySplit_boxPlot.png", source.dir_name()));
        plot::plot_box_groups(
            &p,
            &format!("{} title length quartiles", source.dir_name()),
            &quartile_groups,
        )?;
        files.push(p);

        // ---- top articles ----
        for (title, cites) in top_articles(&records, 5) {
            tracing::info!("top article ({} cites): {}", cites, title);
        }

        Ok(AnalysisOutputs {
            output_dir: out_dir,
            n_documents: records.len(),
            term_frequencies,
            top_terms,
            best_n_topics: search.best_n_topics,
            best_decay: search.best_decay,
            best_score: search.best_score,
            perplexity,
            dominant_topics: dominant,
            topic_stats,
            files,
        })
    }

    /// Vectorize for the topic model with the stricter vocabulary settings,
    /// falling back to looser ones when the corpus is too small for them.
    fn lda_matrix(&self, tokens: &[Vec<String>], full: &DocTermMatrix) -> DocTermMatrix {
        let strict = CountVectorizer::new().min_df(10).min_token_len(3).fit_transform(tokens);
        if strict.n_terms() > 0 {
            return strict;
        }
        let loose = CountVectorizer::new().min_token_len(3).fit_transform(tokens);
        if loose.n_terms() > 0 {
            tracing::warn!("Corpus too small for min_df=10; using the full vocabulary");
            return loose;
        }
        full.clone()
    }
}
