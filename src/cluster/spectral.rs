//! Spectral clustering with local scaling ("spectral").
//!
//! # The Algorithm (Zelnik-Manor & Perona, 2004)
//!
//! 1. **Similarity**: combine the paraphrase and entailment tables into
//!    `s(i, j) = α · pp(i, j) + (1 - α) · (1 - indep(i, j))` and use `d = 1 - s`.
//! 2. **Local scale**: `σ_i` is the distance from `i` to its K-th nearest neighbour,
//!    capped at 0.5.
//! 3. **Affinity**: `A_ij = exp(-d(i, j)² / (σ_i σ_j))`, unit diagonal.
//! 4. **Normalize**: `L = D^{-1/2} A D^{-1/2}`.
//! 5. **Cluster count**: eigen-decompose `L` and take k at the largest gap among the
//!    leading eigenvalues, with `λ_{n+1} = 0` so that k = n is reachable.
//! 6. **Discretize**: k-means on the row-normalized top-k eigenvectors.
//!
//! A single global σ over- or under-clusters depending on how dense a paraphrase set
//! is; the per-node σ adapts the kernel width to each candidate's neighbourhood.
//! K defaults to 3 since senses of two to five paraphrases are common. With the σ cap
//! and the unit diagonal, two candidates that share nothing end up in separate clusters.
//!
//! ## Complexity
//!
//! O(n³) for the Jacobi eigen-decomposition; paraphrase sets are small.
//!
//! ## References
//!
//! Zelnik-Manor, L. & Perona, P. (2004). "Self-Tuning Spectral Clustering." NIPS.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::graph::combined_similarity;
use super::kmeans::Kmeans;
use super::traits::{Clustering, SenseClusterer};
use super::util::{normalize_in_place, symmetric_eigen};
use crate::candidates::CandidateSet;
use crate::error::{Error, Result};
use crate::sense::SenseClustering;
use crate::signals::Signals;

/// Floor for σ so identical candidates do not divide by zero.
const MIN_SCALE: f64 = 1e-6;

/// Ceiling for σ. A candidate whose K-th neighbour is unrelated keeps a narrow kernel.
const MAX_SCALE: f64 = 0.5;

/// Parameters of [`SpectralLocalScaling`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectralParams {
    /// Weight α of the paraphrase score against entailment, in `[0, 1]`.
    pub paraphrase_weight: f64,
    /// K for the local scale (clamped to `n - 1`).
    pub neighbors: usize,
    /// Upper bound on the number of clusters; 0 means no bound.
    pub max_clusters: usize,
    /// Seed for the k-means step.
    pub seed: u64,
}

impl Default for SpectralParams {
    fn default() -> Self {
        Self {
            paraphrase_weight: 0.5,
            neighbors: 3,
            max_clusters: 0,
            seed: 0,
        }
    }
}

impl SpectralParams {
    pub(crate) fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.paraphrase_weight) {
            return Err(Error::InvalidParameter {
                name: "paraphrase_weight",
                message: "must be in [0, 1]",
            });
        }
        if self.neighbors == 0 {
            return Err(Error::InvalidParameter {
                name: "neighbors",
                message: "must be at least 1",
            });
        }
        Ok(())
    }
}

/// Self-tuning spectral clustering over the paraphrase/entailment graph.
#[derive(Debug, Clone, Default)]
pub struct SpectralLocalScaling {
    params: SpectralParams,
}

impl SpectralLocalScaling {
    /// Create with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from explicit parameters.
    pub fn from_params(params: SpectralParams) -> Self {
        Self { params }
    }

    /// Set K for the local scale.
    pub fn with_neighbors(mut self, neighbors: usize) -> Self {
        self.params.neighbors = neighbors;
        self
    }

    /// Set the maximum number of clusters (0 = unbounded).
    pub fn with_max_clusters(mut self, max_clusters: usize) -> Self {
        self.params.max_clusters = max_clusters;
        self
    }

    /// Set the paraphrase weight α.
    pub fn with_paraphrase_weight(mut self, weight: f64) -> Self {
        self.params.paraphrase_weight = weight;
        self
    }

    /// Set the k-means seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.params.seed = seed;
        self
    }

    /// Locally scaled, symmetrically normalized affinity matrix.
    fn normalized_affinity(&self, distances: &[f64], n: usize) -> Vec<f64> {
        let scales = local_scales(distances, n, self.params.neighbors);
        let mut a = vec![0.0f64; n * n];
        for i in 0..n {
            a[i * n + i] = 1.0;
            for j in (i + 1)..n {
                let d = distances[i * n + j];
                let v = (-(d * d) / (scales[i] * scales[j])).exp();
                a[i * n + j] = v;
                a[j * n + i] = v;
            }
        }

        let inv_sqrt_deg: Vec<f64> = (0..n)
            .map(|i| {
                let deg: f64 = a[i * n..(i + 1) * n].iter().sum();
                if deg > f64::MIN_POSITIVE {
                    1.0 / deg.sqrt()
                } else {
                    0.0
                }
            })
            .collect();
        for i in 0..n {
            for j in 0..n {
                a[i * n + j] *= inv_sqrt_deg[i] * inv_sqrt_deg[j];
            }
        }
        a
    }
}

impl SenseClusterer for SpectralLocalScaling {
    fn name(&self) -> &'static str {
        "spectral"
    }

    fn cluster(&self, set: &CandidateSet, signals: Signals<'_>) -> Result<SenseClustering> {
        self.params.validate()?;
        if set.is_empty() {
            return Err(Error::InsufficientData {
                target: set.target().to_string(),
                reason: "no candidates".to_string(),
            });
        }

        let words: Vec<String> = set.candidates().iter().cloned().collect();
        let n = words.len();
        if n == 1 {
            return Ok(super::complete_partition(set, &words, &[0]));
        }

        let sim = combined_similarity(&words, signals, self.params.paraphrase_weight);
        let distances: Vec<f64> = sim.iter().map(|s| (1.0 - s).max(0.0)).collect();
        let affinity = self.normalized_affinity(&distances, n);
        let eig = symmetric_eigen(&affinity, n);

        let bound = match self.params.max_clusters {
            0 => n,
            m => m.min(n),
        };
        let k = eigengap(&eig, bound);
        debug!(target_word = %set.target(), k, "spectral cluster count");

        let labels = if k <= 1 {
            vec![0; n]
        } else {
            let embedding: Vec<Vec<f32>> = (0..n)
                .map(|i| {
                    let mut row: Vec<f32> = eig[..k].iter().map(|(_, v)| v[i] as f32).collect();
                    normalize_in_place(&mut row);
                    row
                })
                .collect();
            Kmeans::new(k)
                .with_seed(self.params.seed)
                .fit_predict(&embedding)?
        };

        Ok(super::complete_partition(set, &words, &labels))
    }
}

/// Distance from each node to its K-th nearest neighbour (K clamped to `n - 1`), within
/// `[MIN_SCALE, MAX_SCALE]`.
fn local_scales(distances: &[f64], n: usize, neighbors: usize) -> Vec<f64> {
    let k = neighbors.min(n - 1).max(1);
    (0..n)
        .map(|i| {
            let mut row: Vec<f64> = (0..n)
                .filter(|&j| j != i)
                .map(|j| distances[i * n + j])
                .collect();
            row.sort_by(|a, b| a.total_cmp(b));
            row[k - 1].clamp(MIN_SCALE, MAX_SCALE)
        })
        .collect()
}

/// Number of leading eigenvalues before the largest gap, considering at most `bound`.
///
/// The eigenvalue after the last one counts as 0.
fn eigengap(eig: &[(f64, Vec<f64>)], bound: usize) -> usize {
    let mut best = (1usize, f64::NEG_INFINITY);
    for k in 1..=bound.min(eig.len()) {
        let next = eig.get(k).map_or(0.0, |(v, _)| *v);
        let gap = eig[k - 1].0 - next;
        if gap > best.1 + 1e-12 {
            best = (k, gap);
        }
    }
    best.0
}
