mod config;
mod record;
mod util;

mod fetch;
mod reddit;
mod scopus;
mod stackoverflow;

mod clean;
mod corpus;
mod table;

mod cluster;
mod dtm;
mod lda;
mod stats;
mod timeline;

mod plot;
mod progress;
mod report;
mod wordcloud;

mod pipeline;

pub use crate::config::{Credentials, MinerOptions, Source};
pub use crate::pipeline::{AnalysisOutputs, MineSummary, Miner};
pub use crate::record::{from_reddit_post, from_scopus_entry, from_stackexchange_item, Record};

// Fetch layer: per-source clients and the shared error type.
pub use crate::fetch::FetchError;
pub use crate::reddit::RedditClient;
pub use crate::scopus::ScopusClient;
pub use crate::stackoverflow::{SearchPage, StackOverflowClient};

// Cleaning and corpus building.
pub use crate::clean::{clean_text, scrub};
pub use crate::corpus::{build_corpus, tokenize, BatchReport, Document, StopWords};
pub use crate::table::{load as load_table, save as save_table};

// Analysis: vectorization, clustering, topic model, statistics.
pub use crate::cluster::{pdist_euclidean, ward_linkage, Merge};
pub use crate::dtm::{CountVectorizer, DocTermMatrix};
pub use crate::lda::{grid_search, topic_distribution, LdaConfig, LdaError, LdaSearch, OnlineLda};
pub use crate::stats::{
    abstracts_for_topic, cites_of, four_way_title_split, median_date, quantile, split_old_new,
    split_title_length, top_articles, wilcoxon_signed_rank, Interpolation, Summary, TopicRow,
    TopicStats,
};
pub use crate::timeline::{daily_counts, yearly_counts};

// Visualization sinks.
pub use crate::plot::{
    plot_box_groups, plot_daily_trend, plot_dendrogram, plot_top_terms, plot_violin_groups,
    plot_yearly_counts,
};
pub use crate::report::{write_topic_report, TopicReport};
pub use crate::wordcloud::{render_comparison_cloud, render_word_cloud, word_frequencies};

// Expose progress helpers and tracing init for binaries.
pub use crate::progress::{make_count_progress, make_spinner};
pub use crate::util::init_tracing_once;
