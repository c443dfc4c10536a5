//! Latent Dirichlet Allocation fitted with online variational Bayes, plus a
//! grid search over topic count and learning decay.
//!
//! The variational update follows the standard online scheme: per-batch
//! E-step on the document-topic variational parameters, then a global
//! topic-word update blended with step size `rho = (offset + t)^(-decay)`.

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LdaError {
    #[error("number of topics must be positive")]
    InvalidTopicCount,

    #[error("invalid hyperparameter: {0}")]
    InvalidParameter(String),

    #[error("model not fitted yet")]
    NotFitted,

    #[error("empty corpus")]
    EmptyCorpus,
}

/// Model configuration. Defaults mirror common online-LDA settings:
/// priors of 1/K, offset 10, decay 0.7, batches of 128.
#[derive(Clone, Debug)]
pub struct LdaConfig {
    pub n_topics: usize,
    pub learning_decay: f64,
    pub learning_offset: f64,
    pub max_iter: usize,
    pub batch_size: usize,
    pub doc_topic_prior: Option<f64>,
    pub topic_word_prior: Option<f64>,
    pub mean_change_tol: f64,
    pub max_doc_update_iter: usize,
    pub random_seed: u64,
}

impl Default for LdaConfig {
    fn default() -> Self {
        Self {
            n_topics: 20,
            learning_decay: 0.7,
            learning_offset: 10.0,
            max_iter: 10,
            batch_size: 128,
            doc_topic_prior: None,
            topic_word_prior: None,
            mean_change_tol: 1e-3,
            max_doc_update_iter: 100,
            random_seed: 100,
        }
    }
}

impl LdaConfig {
    pub fn new(n_topics: usize) -> Self {
        Self { n_topics, ..Default::default() }
    }
    pub fn learning_decay(mut self, decay: f64) -> Self {
        self.learning_decay = decay;
        self
    }
    pub fn max_iter(mut self, n: usize) -> Self {
        self.max_iter = n.max(1);
        self
    }
    pub fn batch_size(mut self, n: usize) -> Self {
        self.batch_size = n.max(1);
        self
    }
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }
}

fn digamma(x: f64) -> f64 {
    let mut x = x;
    let mut result = 0.0;
    while x < 6.0 {
        result -= 1.0 / x;
        x += 1.0;
    }
    let inv = 1.0 / x;
    let inv2 = inv * inv;
    result + x.ln() - 0.5 * inv
        - inv2 * (1.0 / 12.0 - inv2 * (1.0 / 120.0 - inv2 / 252.0))
}

/// exp(E[log X]) for each row of a Dirichlet-parameter matrix.
fn exp_dirichlet_rows(params: &Array2<f64>) -> Array2<f64> {
    let mut out = params.clone();
    for mut row in out.rows_mut() {
        let dg_sum = digamma(row.sum());
        for v in row.iter_mut() {
            *v = (digamma(*v) - dg_sum).exp();
        }
    }
    out
}

fn exp_dirichlet_vec(params: &Array1<f64>) -> Array1<f64> {
    let dg_sum = digamma(params.sum());
    params.mapv(|v| (digamma(v) - dg_sum).exp())
}

/// Sparse view of one document: term indices and their counts.
fn doc_entries(dtm: &Array2<f64>, d: usize) -> (Vec<usize>, Vec<f64>) {
    let mut ids = Vec::new();
    let mut cts = Vec::new();
    for (w, &c) in dtm.row(d).iter().enumerate() {
        if c > 0.0 {
            ids.push(w);
            cts.push(c);
        }
    }
    (ids, cts)
}

pub struct OnlineLda {
    config: LdaConfig,
    lambda: Option<Array2<f64>>,
    n_terms: usize,
    update_count: usize,
}

impl OnlineLda {
    pub fn new(config: LdaConfig) -> Result<Self, LdaError> {
        if config.n_topics == 0 {
            return Err(LdaError::InvalidTopicCount);
        }
        if !(0.5..=1.0).contains(&config.learning_decay) {
            return Err(LdaError::InvalidParameter(
                "learning_decay must be in [0.5, 1.0]".into(),
            ));
        }
        Ok(Self { config, lambda: None, n_terms: 0, update_count: 0 })
    }

    pub fn config(&self) -> &LdaConfig {
        &self.config
    }

    fn alpha(&self) -> f64 {
        self.config.doc_topic_prior.unwrap_or(1.0 / self.config.n_topics as f64)
    }

    fn eta(&self) -> f64 {
        self.config.topic_word_prior.unwrap_or(1.0 / self.config.n_topics as f64)
    }

    /// E-step for one document against fixed `exp_elog_beta`.
    /// Returns the converged gamma and the per-term phi normalizers.
    fn update_doc(
        &self,
        ids: &[usize],
        cts: &[f64],
        exp_elog_beta: &Array2<f64>,
    ) -> (Array1<f64>, Vec<f64>) {
        let k = self.config.n_topics;
        let alpha = self.alpha();
        let mut gamma = Array1::<f64>::ones(k);
        let mut exp_elog_theta = exp_dirichlet_vec(&gamma);
        let mut phinorm = vec![0.0f64; ids.len()];

        for _ in 0..self.config.max_doc_update_iter {
            for (pos, &w) in ids.iter().enumerate() {
                let mut s = 1e-100;
                for t in 0..k {
                    s += exp_elog_theta[t] * exp_elog_beta[[t, w]];
                }
                phinorm[pos] = s;
            }
            let last = gamma.clone();
            for t in 0..k {
                let mut acc = 0.0;
                for (pos, &w) in ids.iter().enumerate() {
                    acc += cts[pos] * exp_elog_beta[[t, w]] / phinorm[pos];
                }
                gamma[t] = alpha + exp_elog_theta[t] * acc;
            }
            exp_elog_theta = exp_dirichlet_vec(&gamma);
            let mean_change = (&gamma - &last).mapv(f64::abs).sum() / k as f64;
            if mean_change < self.config.mean_change_tol {
                break;
            }
        }
        (gamma, phinorm)
    }

    /// Fit the model on a document-term count matrix.
    pub fn fit(&mut self, dtm: &Array2<f64>) -> Result<(), LdaError> {
        let n_docs = dtm.nrows();
        let n_terms = dtm.ncols();
        if n_docs == 0 || n_terms == 0 {
            return Err(LdaError::EmptyCorpus);
        }
        let k = self.config.n_topics;
        let eta = self.eta();
        self.n_terms = n_terms;
        self.update_count = 0;

        let mut rng = StdRng::seed_from_u64(self.config.random_seed);
        let mut lambda = Array2::<f64>::zeros((k, n_terms));
        for v in lambda.iter_mut() {
            *v = eta + rng.gen::<f64>();
        }

        let docs: Vec<(Vec<usize>, Vec<f64>)> = (0..n_docs).map(|d| doc_entries(dtm, d)).collect();

        for _ in 0..self.config.max_iter {
            for batch in (0..n_docs).collect::<Vec<_>>().chunks(self.config.batch_size) {
                let exp_elog_beta = exp_dirichlet_rows(&lambda);
                let mut sstats = Array2::<f64>::zeros((k, n_terms));

                for &d in batch {
                    let (ids, cts) = &docs[d];
                    if ids.is_empty() {
                        continue;
                    }
                    let (gamma, phinorm) = self.update_doc(ids, cts, &exp_elog_beta);
                    let exp_elog_theta = exp_dirichlet_vec(&gamma);
                    for (pos, &w) in ids.iter().enumerate() {
                        let scale = cts[pos] / phinorm[pos];
                        for t in 0..k {
                            sstats[[t, w]] += exp_elog_theta[t] * scale;
                        }
                    }
                }

                // finish the expected sufficient statistics and blend
                let rho = (self.config.learning_offset + self.update_count as f64)
                    .powf(-self.config.learning_decay);
                let scale = n_docs as f64 / batch.len() as f64;
                for t in 0..k {
                    for w in 0..n_terms {
                        let hat = eta + scale * sstats[[t, w]] * exp_elog_beta[[t, w]];
                        lambda[[t, w]] = (1.0 - rho) * lambda[[t, w]] + rho * hat;
                    }
                }
                self.update_count += 1;
            }
        }

        self.lambda = Some(lambda);
        Ok(())
    }

    /// Document-topic distributions (rows sum to 1).
    pub fn transform(&self, dtm: &Array2<f64>) -> Result<Array2<f64>, LdaError> {
        let lambda = self.lambda.as_ref().ok_or(LdaError::NotFitted)?;
        let k = self.config.n_topics;
        let exp_elog_beta = exp_dirichlet_rows(lambda);

        let mut out = Array2::<f64>::zeros((dtm.nrows(), k));
        for d in 0..dtm.nrows() {
            let (mut ids, mut cts) = doc_entries(dtm, d);
            // terms the model never saw carry no signal
            while ids.last().is_some_and(|&w| w >= self.n_terms) {
                ids.pop();
                cts.pop();
            }
            if ids.is_empty() {
                // uniform over topics for empty documents
                for t in 0..k {
                    out[[d, t]] = 1.0 / k as f64;
                }
                continue;
            }
            let (gamma, _) = self.update_doc(&ids, &cts, &exp_elog_beta);
            let total = gamma.sum();
            for t in 0..k {
                out[[d, t]] = gamma[t] / total;
            }
        }
        Ok(out)
    }

    /// Topic-term distributions (rows sum to 1).
    pub fn components(&self) -> Result<Array2<f64>, LdaError> {
        let lambda = self.lambda.as_ref().ok_or(LdaError::NotFitted)?;
        let mut out = lambda.clone();
        for mut row in out.rows_mut() {
            let total = row.sum();
            for v in row.iter_mut() {
                *v /= total;
            }
        }
        Ok(out)
    }

    /// Approximate per-corpus log likelihood; higher is better.
    pub fn score(&self, dtm: &Array2<f64>) -> Result<f64, LdaError> {
        let theta = self.transform(dtm)?;
        let beta = self.components()?;
        let k = self.config.n_topics;

        let mut ll = 0.0;
        for d in 0..dtm.nrows() {
            for (w, &count) in dtm.row(d).iter().enumerate().take(self.n_terms) {
                if count > 0.0 {
                    let mut p = 0.0;
                    for t in 0..k {
                        p += theta[[d, t]] * beta[[t, w]];
                    }
                    ll += count * (p + 1e-12).ln();
                }
            }
        }
        Ok(ll)
    }

    /// Perplexity = exp(-log likelihood per word); lower is better.
    pub fn perplexity(&self, dtm: &Array2<f64>) -> Result<f64, LdaError> {
        let total: f64 = dtm.sum();
        if total == 0.0 {
            return Err(LdaError::EmptyCorpus);
        }
        Ok((-self.score(dtm)? / total).exp())
    }

    /// Per-document topic index with the highest probability.
    pub fn dominant_topics(&self, dtm: &Array2<f64>) -> Result<Vec<usize>, LdaError> {
        let theta = self.transform(dtm)?;
        let mut out = Vec::with_capacity(theta.nrows());
        for row in theta.rows() {
            let mut best = 0;
            let mut best_p = f64::MIN;
            for (t, &p) in row.iter().enumerate() {
                if p > best_p {
                    best_p = p;
                    best = t;
                }
            }
            out.push(best);
        }
        Ok(out)
    }

    /// Top `n_words` keywords per topic with their probabilities.
    pub fn top_keywords(&self, terms: &[String], n_words: usize) -> Result<Vec<Vec<(String, f64)>>, LdaError> {
        let beta = self.components()?;
        let mut topics = Vec::with_capacity(beta.nrows());
        for row in beta.rows() {
            let mut weighted: Vec<(usize, f64)> =
                row.iter().enumerate().map(|(w, &p)| (w, p)).collect();
            weighted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
            weighted.truncate(n_words);
            topics.push(
                weighted
                    .into_iter()
                    .filter_map(|(w, p)| terms.get(w).map(|t| (t.clone(), p)))
                    .collect(),
            );
        }
        Ok(topics)
    }
}

/// Document counts per dominant topic, indexed 0..n_topics.
pub fn topic_distribution(dominant: &[usize], n_topics: usize) -> Vec<u64> {
    let mut counts = vec![0u64; n_topics];
    for &t in dominant {
        if t < n_topics {
            counts[t] += 1;
        }
    }
    counts
}

/// Outcome of the hyperparameter grid search.
pub struct LdaSearch {
    pub best: OnlineLda,
    pub best_n_topics: usize,
    pub best_decay: f64,
    pub best_score: f64,
    /// every evaluated (n_topics, decay, held-out score)
    pub trials: Vec<(usize, f64, f64)>,
}

/// Grid search over topic count and learning decay, scored on a
/// deterministic held-out split (every fifth document). Small corpora fall
/// back to scoring in-sample. `pb` is advanced once per trial.
pub fn grid_search(
    dtm: &Array2<f64>,
    topic_grid: &[usize],
    decay_grid: &[f64],
    base: &LdaConfig,
    pb: Option<&indicatif::ProgressBar>,
) -> Result<LdaSearch, LdaError> {
    let n_docs = dtm.nrows();
    if n_docs == 0 {
        return Err(LdaError::EmptyCorpus);
    }

    let (train_rows, test_rows): (Vec<usize>, Vec<usize>) = if n_docs >= 5 {
        let train = (0..n_docs).filter(|d| d % 5 != 4).collect();
        let test = (0..n_docs).filter(|d| d % 5 == 4).collect();
        (train, test)
    } else {
        ((0..n_docs).collect(), (0..n_docs).collect())
    };
    let train = dtm.select(Axis(0), &train_rows);
    let test = dtm.select(Axis(0), &test_rows);

    let mut best: Option<(OnlineLda, usize, f64, f64)> = None;
    let mut trials = Vec::new();

    for &k in topic_grid {
        for &decay in decay_grid {
            let config = LdaConfig {
                n_topics: k,
                learning_decay: decay,
                ..base.clone()
            };
            let mut model = OnlineLda::new(config)?;
            model.fit(&train)?;
            let score = model.score(&test)?;
            tracing::debug!("grid trial: k={} decay={} score={:.2}", k, decay, score);
            trials.push((k, decay, score));
            if let Some(pb) = pb {
                pb.inc(1);
            }
            let better = best.as_ref().map(|(_, _, _, s)| score > *s).unwrap_or(true);
            if better {
                best = Some((model, k, decay, score));
            }
        }
    }

    let (model, k, decay, score) = best.ok_or(LdaError::EmptyCorpus)?;
    tracing::info!("Best model params: n_topics={} learning_decay={}", k, decay);
    tracing::info!("Best held-out score: {:.2}", score);
    Ok(LdaSearch {
        best: model,
        best_n_topics: k,
        best_decay: decay,
        best_score: score,
        trials,
    })
}
