//! Distributional baseline ("semclust").
//!
//! Candidates are linked when their combined similarity
//!
//! ```text
//! s(i, j) = (1 - β) · cos(v_i, v_j) + β · pp(i, j)
//! ```
//!
//! reaches the set's average pairwise similarity (plus an optional offset), and sense
//! clusters are the connected components of that graph. `pp` is the symmetrised
//! paraphrase score scaled to `[0, 1]` within the set. The average-similarity cut follows
//! the SemClust idea of letting each paraphrase set pick its own threshold.
//!
//! Candidates without a vector do not take part and come back as singletons.
//!
//! ## References
//!
//! Apidianaki, Verzeni & McCarthy (2014). "Semantic Clustering of Pivot Paraphrases." LREC.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::graph::paraphrase_matrix;
use super::traits::SenseClusterer;
use super::util::{cosine, UnionFind};
use crate::candidates::CandidateSet;
use crate::error::{Error, Result};
use crate::sense::SenseClustering;
use crate::signals::Signals;

/// Parameters of [`DistributionalBaseline`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SemClustParams {
    /// Weight β of the paraphrase score against cosine similarity, in `[0, 1]`.
    pub paraphrase_weight: f32,
    /// Added to the average pairwise similarity to form the linking threshold.
    pub threshold_offset: f32,
}

impl Default for SemClustParams {
    fn default() -> Self {
        Self {
            paraphrase_weight: 0.5,
            threshold_offset: 0.0,
        }
    }
}

impl SemClustParams {
    pub(crate) fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.paraphrase_weight) {
            return Err(Error::InvalidParameter {
                name: "paraphrase_weight",
                message: "must be in [0, 1]",
            });
        }
        if !self.threshold_offset.is_finite() {
            return Err(Error::InvalidParameter {
                name: "threshold_offset",
                message: "must be finite",
            });
        }
        Ok(())
    }
}

/// Vector-based clustering against which the vector-free strategies are compared.
#[derive(Debug, Clone, Default)]
pub struct DistributionalBaseline {
    params: SemClustParams,
}

impl DistributionalBaseline {
    /// Create with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from explicit parameters.
    pub fn from_params(params: SemClustParams) -> Self {
        Self { params }
    }

    /// Set the paraphrase weight β.
    pub fn with_paraphrase_weight(mut self, weight: f32) -> Self {
        self.params.paraphrase_weight = weight;
        self
    }

    /// Set the threshold offset.
    pub fn with_threshold_offset(mut self, offset: f32) -> Self {
        self.params.threshold_offset = offset;
        self
    }

    fn similarities(&self, words: &[String], rows: &[Vec<f32>], signals: Signals<'_>) -> Vec<f32> {
        let n = words.len();
        let beta = self.params.paraphrase_weight;
        let pp = paraphrase_matrix(words, signals.paraphrase);
        let mut s = vec![0.0f32; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                let v = (1.0 - beta) * cosine(&rows[i], &rows[j]) + beta * pp[i * n + j] as f32;
                s[i * n + j] = v;
                s[j * n + i] = v;
            }
        }
        s
    }
}

impl SenseClusterer for DistributionalBaseline {
    fn name(&self) -> &'static str {
        "semclust"
    }

    fn cluster(&self, set: &CandidateSet, signals: Signals<'_>) -> Result<SenseClustering> {
        self.params.validate()?;
        let (words, rows) = set.vector_matrix().map_err(|e| match e {
            Error::EmptyCandidateSet { target } => Error::InsufficientData {
                target,
                reason: "no candidate has a distributional vector".to_string(),
            },
            other => other,
        })?;

        let n = words.len();
        let s = self.similarities(&words, &rows, signals);

        let mut uf = UnionFind::new(n);
        if n >= 2 {
            let pairs = (n * (n - 1) / 2) as f32;
            let mut total = 0.0f32;
            for i in 0..n {
                for j in (i + 1)..n {
                    total += s[i * n + j];
                }
            }
            let threshold = total / pairs + self.params.threshold_offset;
            for i in 0..n {
                for j in (i + 1)..n {
                    let v = s[i * n + j];
                    if v > 0.0 && v >= threshold {
                        uf.union(i, j);
                    }
                }
            }
            debug!(target_word = %set.target(), threshold, "semclust linking threshold");
        }

        Ok(super::complete_partition(set, &words, &uf.labels()))
    }
}
