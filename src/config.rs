use std::path::{Path, PathBuf};
use time::OffsetDateTime;

/// The three mined sources. Each owns a fixed table file name and an output
/// subdirectory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    StackOverflow,
    Reddit,
    Scopus,
}

impl Source {
    pub fn table_file(self) -> &'static str {
        match self {
            Source::StackOverflow => "stackoverflow_data.csv",
            Source::Reddit => "reddit_data.csv",
            Source::Scopus => "scopus_data.csv",
        }
    }

    pub fn dir_name(self) -> &'static str {
        match self {
            Source::StackOverflow => "Stackoverflow",
            Source::Reddit => "Reddit",
            Source::Scopus => "Scopus",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "stackoverflow" | "so" => Some(Source::StackOverflow),
            "reddit" => Some(Source::Reddit),
            "scopus" => Some(Source::Scopus),
            _ => None,
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Per-source API credentials, read from the environment once per run and
/// passed explicitly to each fetcher at construction.
#[derive(Clone, Debug, Default)]
pub struct Credentials {
    pub stackoverflow_api_key: Option<String>,
    pub reddit_client_id: Option<String>,
    pub reddit_client_secret: Option<String>,
    pub reddit_user_agent: Option<String>,
    pub scopus_api_key: Option<String>,
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl Credentials {
    pub fn from_env() -> Self {
        Self {
            stackoverflow_api_key: env_nonempty("STACKOVERFLOW_API_KEY"),
            reddit_client_id: env_nonempty("REDDIT_CLIENT_ID"),
            reddit_client_secret: env_nonempty("REDDIT_CLIENT_SECRET"),
            reddit_user_agent: env_nonempty("REDDIT_USER_AGENT"),
            scopus_api_key: env_nonempty("SCOPUS_API_KEY"),
        }
    }
}

/// User-facing options with sensible defaults and builder chaining.
#[derive(Clone, Debug)]
pub struct MinerOptions {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub max_pages: usize,          // safety bound on pagination loops
    pub page_size: usize,          // honored where the API accepts it
    pub progress: bool,            // show progress spinners/bars
    pub top_term_threshold: u64,   // minimum frequency for the top-terms view
    pub topic_grid: Vec<usize>,    // LDA grid: candidate topic counts
    pub decay_grid: Vec<f64>,      // LDA grid: candidate learning decays
    pub top_words_per_topic: usize,
    pub reference_year: i32,       // year used for topic-age aggregates
}

impl Default for MinerOptions {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            output_dir: PathBuf::from("./output"),
            max_pages: 100,
            page_size: 25,
            progress: true,
            top_term_threshold: 100,
            topic_grid: vec![10, 15, 20, 25, 30],
            decay_grid: vec![0.5, 0.7, 0.9],
            top_words_per_topic: 20,
            reference_year: OffsetDateTime::now_utc().year(),
        }
    }
}

impl MinerOptions {
    pub fn with_data_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.data_dir = dir.as_ref().to_path_buf();
        self
    }
    pub fn with_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }
    pub fn with_max_pages(mut self, pages: usize) -> Self {
        self.max_pages = pages.max(1);
        self
    }
    pub fn with_page_size(mut self, n: usize) -> Self {
        self.page_size = n.clamp(1, 100);
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
    pub fn with_top_term_threshold(mut self, min_count: u64) -> Self {
        self.top_term_threshold = min_count;
        self
    }
    pub fn with_topic_grid<I: IntoIterator<Item = usize>>(mut self, grid: I) -> Self {
        let g: Vec<usize> = grid.into_iter().filter(|n| *n > 0).collect();
        if !g.is_empty() {
            self.topic_grid = g;
        }
        self
    }
    pub fn with_decay_grid<I: IntoIterator<Item = f64>>(mut self, grid: I) -> Self {
        let g: Vec<f64> = grid.into_iter().filter(|d| (0.5..=1.0).contains(d)).collect();
        if !g.is_empty() {
            self.decay_grid = g;
        }
        self
    }
    pub fn with_top_words_per_topic(mut self, n: usize) -> Self {
        self.top_words_per_topic = n.max(1);
        self
    }
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = year;
        self
    }
}
