//! Hierarchical Graph Factorization Clustering ("hgfc").
//!
//! # The Algorithm (Yu, Yu & Tresp, 2006)
//!
//! A similarity graph `W` over candidates is approximated by a bipartite graph between
//! the candidates and `m < n` latent cluster vertices:
//!
//! ```text
//! W ≈ B Λ Bᵀ,   Σ_i b_ip = 1,   Λ = diag(λ_1 … λ_m)
//! ```
//!
//! fitted by multiplicative updates that decrease the divergence `D(W ‖ B Λ Bᵀ)`.
//! The cluster vertices then form the next, smaller graph `W' = Λ Bᵀ D⁻¹ B Λ`
//! (`D = diag(B Λ 1)`), which is factorized again. Soft memberships of the original
//! candidates are obtained by chaining the row-normalized `B Λ` of every level.
//!
//! ## Level selection
//!
//! Each level's argmax assignment (level 0 being all singletons) is scored by graph
//! modularity on the original `W`. Descending the hierarchy stops once a level's
//! modularity falls more than `min_gain` below the best level seen, or when a single
//! cluster remains; the best level wins.
//!
//! ## Refinement
//!
//! Halving the vertex count rarely lands on the true number of senses, so a level's
//! argmax can peel a member off a sense or split one in two. With `refine` set, every
//! level's labelling is polished on `W` before it is scored: each candidate moves to the
//! cluster it gains most modularity in, then the best positive-gain pair of clusters
//! merges, until neither step helps. Moves cannot split a cluster, so refining several
//! levels, the singleton level included, gives the ascent more than one starting point.
//!
//! ## Determinism
//!
//! `B` is initialized from the similarity columns of greedily chosen, mutually dissimilar
//! seed vertices, so no randomness is involved and identical inputs give identical output.
//!
//! ## References
//!
//! - Yu, K., Yu, S., Tresp, V. (2006). "Soft Clustering on Graphs." NIPS.
//! - Sun, L., Korhonen, A. (2011). "Hierarchical Verb Clustering Using Graph
//!   Factorization." EMNLP.
//! - Blondel, V. et al. (2008). "Fast unfolding of communities in large networks."
//!   J. Stat. Mech. (local moving, used by the refinement).

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::graph::combined_similarity;
use super::traits::SenseClusterer;
use super::util::{compact_labels, modularity};
use crate::candidates::CandidateSet;
use crate::error::{Error, Result};
use crate::sense::SenseClustering;
use crate::signals::Signals;

/// Keeps every entry of `W` and `B` strictly positive.
const EPS: f64 = 1e-9;

/// Parameters of [`GraphFactorizationClustering`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HgfcParams {
    /// Weight of the paraphrase score against entailment, in `[0, 1]`.
    pub paraphrase_weight: f64,
    /// Factor by which the vertex count shrinks per level, in `(0, 1)`.
    pub shrink: f64,
    /// Maximum number of levels.
    pub max_levels: usize,
    /// Maximum multiplicative-update iterations per level.
    pub max_iter: usize,
    /// Relative divergence change under which a level's factorization stops.
    pub tol: f64,
    /// Allowed modularity drop below the best level before descending stops.
    pub min_gain: f64,
    /// Polish each level's labelling with greedy modularity moves before scoring it.
    pub refine: bool,
}

impl Default for HgfcParams {
    fn default() -> Self {
        Self {
            paraphrase_weight: 0.5,
            shrink: 0.5,
            max_levels: 16,
            max_iter: 200,
            tol: 1e-6,
            min_gain: 0.0,
            refine: true,
        }
    }
}

impl HgfcParams {
    pub(crate) fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.paraphrase_weight) {
            return Err(Error::InvalidParameter {
                name: "paraphrase_weight",
                message: "must be in [0, 1]",
            });
        }
        if !(self.shrink > 0.0 && self.shrink < 1.0) {
            return Err(Error::InvalidParameter {
                name: "shrink",
                message: "must be in (0, 1)",
            });
        }
        if self.max_levels == 0 || self.max_iter == 0 {
            return Err(Error::InvalidParameter {
                name: "max_levels/max_iter",
                message: "must be at least 1",
            });
        }
        if self.min_gain < 0.0 {
            return Err(Error::InvalidParameter {
                name: "min_gain",
                message: "must be non-negative",
            });
        }
        Ok(())
    }
}

/// Graph-factorization clustering over the paraphrase/entailment graph.
#[derive(Debug, Clone, Default)]
pub struct GraphFactorizationClustering {
    params: HgfcParams,
}

/// One level of the factorization: `B` (`n x m`, row-major) and `Λ`.
#[derive(Debug, Clone)]
struct Factor {
    b: Vec<f64>,
    lambda: Vec<f64>,
    n: usize,
    m: usize,
}

impl GraphFactorizationClustering {
    /// Create with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from explicit parameters.
    pub fn from_params(params: HgfcParams) -> Self {
        Self { params }
    }

    /// Set the per-level shrink factor.
    pub fn with_shrink(mut self, shrink: f64) -> Self {
        self.params.shrink = shrink;
        self
    }

    /// Set the allowed modularity drop.
    pub fn with_min_gain(mut self, min_gain: f64) -> Self {
        self.params.min_gain = min_gain;
        self
    }

    /// Set the paraphrase weight.
    pub fn with_paraphrase_weight(mut self, weight: f64) -> Self {
        self.params.paraphrase_weight = weight;
        self
    }

    /// Enable or disable the modularity refinement of each level.
    pub fn with_refine(mut self, refine: bool) -> Self {
        self.params.refine = refine;
        self
    }

    fn next_size(&self, m: usize) -> usize {
        ((m as f64 * self.params.shrink).ceil() as usize)
            .min(m.saturating_sub(1))
            .max(1)
    }

    /// Fit `W ≈ B Λ Bᵀ` for an `n x n` graph with `m` cluster vertices.
    fn factorize(&self, w: &[f64], n: usize, m: usize) -> Factor {
        let total: f64 = w.iter().sum();
        let seeds = seed_vertices(w, n, m);

        let mut b = vec![0.0f64; n * m];
        for i in 0..n {
            for (p, &s) in seeds.iter().enumerate() {
                b[i * m + p] = w[i * n + s] + EPS;
            }
        }
        normalize_columns(&mut b, n, m);
        let mut f = Factor {
            b,
            lambda: vec![total / m as f64; m],
            n,
            m,
        };

        let mut prev = f64::INFINITY;
        for _ in 0..self.params.max_iter {
            let x = f.reconstruct();
            let div = divergence(w, &x);
            if prev.is_finite() && (prev - div).abs() <= self.params.tol * prev.max(EPS) {
                break;
            }
            prev = div;

            // s_ip = Σ_j (w_ij / x_ij) b_jp
            let mut s = vec![0.0f64; n * m];
            for i in 0..n {
                for j in 0..n {
                    let r = w[i * n + j] / x[i * n + j];
                    for p in 0..m {
                        s[i * m + p] += r * f.b[j * m + p];
                    }
                }
            }

            let mut lambda = vec![0.0f64; m];
            let mut b = vec![0.0f64; n * m];
            for i in 0..n {
                for p in 0..m {
                    lambda[p] += f.b[i * m + p] * s[i * m + p];
                    b[i * m + p] = f.b[i * m + p] * f.lambda[p] * s[i * m + p] + EPS;
                }
            }
            for (l, old) in lambda.iter_mut().zip(&f.lambda) {
                *l *= old;
            }
            let lsum: f64 = lambda.iter().sum();
            if lsum > 0.0 {
                for l in &mut lambda {
                    *l *= total / lsum;
                }
            }
            normalize_columns(&mut b, n, m);
            f.b = b;
            f.lambda = lambda;
        }
        f
    }
}

impl Factor {
    /// `B Λ Bᵀ`.
    fn reconstruct(&self) -> Vec<f64> {
        let (n, m) = (self.n, self.m);
        let mut x = vec![0.0f64; n * n];
        for i in 0..n {
            for j in i..n {
                let mut v = 0.0;
                for p in 0..m {
                    v += self.b[i * m + p] * self.lambda[p] * self.b[j * m + p];
                }
                x[i * n + j] = v;
                x[j * n + i] = v;
            }
        }
        x
    }

    /// Row-normalized `B Λ` (vertex → cluster transition) and the next-level graph.
    fn transition_and_graph(&self) -> (Vec<f64>, Vec<f64>) {
        let (n, m) = (self.n, self.m);
        let mut t = vec![0.0f64; n * m];
        let mut deg = vec![0.0f64; n];
        for i in 0..n {
            for p in 0..m {
                let k = self.b[i * m + p] * self.lambda[p];
                t[i * m + p] = k;
                deg[i] += k;
            }
        }

        let mut next = vec![0.0f64; m * m];
        for i in 0..n {
            if deg[i] <= 0.0 {
                continue;
            }
            for p in 0..m {
                for q in 0..m {
                    next[p * m + q] += t[i * m + p] * t[i * m + q] / deg[i];
                }
            }
        }
        for i in 0..n {
            if deg[i] > 0.0 {
                for p in 0..m {
                    t[i * m + p] /= deg[i];
                }
            }
        }
        (t, next)
    }
}

impl SenseClusterer for GraphFactorizationClustering {
    fn name(&self) -> &'static str {
        "hgfc"
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

        let w: Vec<f64> = combined_similarity(&words, signals, self.params.paraphrase_weight)
            .into_iter()
            .map(|v| v.max(0.0) + EPS)
            .collect();

        let polish = |labels: Vec<usize>| {
            if self.params.refine {
                refine(&w, n, &labels)
            } else {
                labels
            }
        };

        // Level 0: every candidate on its own.
        let mut best_labels = polish((0..n).collect());
        let mut best_q = modularity(&w, n, &best_labels);
        let mut best_level = 0;

        let mut membership = identity(n);
        let mut graph = w.clone();
        let mut size = n;
        let mut m = self.next_size(n);

        for level in 1..=self.params.max_levels {
            let factor = self.factorize(&graph, size, m);
            let (t, next_graph) = factor.transition_and_graph();
            membership = compose(&membership, n, size, &t, m);

            let labels = polish(argmax_labels(&membership, n, m));
            let q = modularity(&w, n, &labels);
            if q > best_q + 1e-12 {
                best_q = q;
                best_labels = labels;
                best_level = level;
            } else if q < best_q - self.params.min_gain {
                break;
            }

            if m == 1 {
                break;
            }
            graph = next_graph;
            size = m;
            m = self.next_size(m);
        }

        debug!(
            target_word = %set.target(),
            level = best_level,
            modularity = best_q,
            clusters = best_labels.iter().max().map_or(0, |&l| l + 1),
            "hgfc selected level"
        );
        Ok(super::complete_partition(set, &words, &best_labels))
    }
}

/// Greedy seeds: highest-degree vertex first, then repeatedly the vertex least similar to
/// any chosen seed. Ties go to the lowest index.
fn seed_vertices(w: &[f64], n: usize, m: usize) -> Vec<usize> {
    let m = m.min(n);
    let mut chosen: Vec<usize> = Vec::with_capacity(m);
    let mut first = (0usize, f64::NEG_INFINITY);
    for i in 0..n {
        let deg: f64 = w[i * n..(i + 1) * n].iter().sum();
        if deg > first.1 {
            first = (i, deg);
        }
    }
    chosen.push(first.0);

    let mut closeness: Vec<f64> = (0..n).map(|i| w[i * n + first.0]).collect();
    while chosen.len() < m {
        let mut next = (usize::MAX, f64::INFINITY);
        for i in 0..n {
            if !chosen.contains(&i) && closeness[i] < next.1 {
                next = (i, closeness[i]);
            }
        }
        if next.0 == usize::MAX {
            break;
        }
        chosen.push(next.0);
        for i in 0..n {
            closeness[i] = closeness[i].max(w[i * n + next.0]);
        }
    }
    chosen
}

/// Greedy modularity ascent from `labels` on the graph `w`.
fn refine(w: &[f64], n: usize, labels: &[usize]) -> Vec<usize> {
    let degree: Vec<f64> = (0..n)
        .map(|i| w[i * n..(i + 1) * n].iter().sum())
        .collect();
    let two_m: f64 = degree.iter().sum();
    let mut labels = compact_labels(labels);
    if two_m <= f64::EPSILON {
        return labels;
    }
    // Every accepted step raises modularity; the cap only guards float noise.
    for _ in 0..n * n {
        let moved = move_vertices(w, n, &degree, two_m, &mut labels);
        let merged = merge_best_pair(w, n, &degree, two_m, &mut labels);
        if !moved && !merged {
            break;
        }
    }
    compact_labels(&labels)
}

/// Sweep the vertices, moving each to the cluster (or a fresh one) with the highest
/// modularity gain. Returns whether any vertex moved.
fn move_vertices(
    w: &[f64],
    n: usize,
    degree: &[f64],
    two_m: f64,
    labels: &mut [usize],
) -> bool {
    let mut any = false;
    for _ in 0..n {
        let mut changed = false;
        for i in 0..n {
            // One spare slot always stays empty.
            let slots = labels.iter().max().map_or(0, |&l| l + 1) + 1;
            let mut link = vec![0.0f64; slots];
            let mut total = vec![0.0f64; slots];
            for j in (0..n).filter(|&j| j != i) {
                link[labels[j]] += w[i * n + j];
                total[labels[j]] += degree[j];
            }
            let gain = |c: usize| link[c] - degree[i] * total[c] / two_m;

            let own = labels[i];
            let mut best = (own, gain(own));
            for c in 0..slots {
                if c != own && gain(c) > best.1 + 1e-12 {
                    best = (c, gain(c));
                }
            }
            if best.0 != own {
                labels[i] = best.0;
                changed = true;
            }
        }
        if !changed {
            break;
        }
        any = true;
    }
    any
}

/// Merge the pair of clusters with the largest positive modularity gain, if any.
fn merge_best_pair(
    w: &[f64],
    n: usize,
    degree: &[f64],
    two_m: f64,
    labels: &mut [usize],
) -> bool {
    let c = labels.iter().max().map_or(0, |&l| l + 1);
    let mut total = vec![0.0f64; c];
    let mut between = vec![0.0f64; c * c];
    for i in 0..n {
        total[labels[i]] += degree[i];
        for j in 0..n {
            between[labels[i] * c + labels[j]] += w[i * n + j];
        }
    }

    let mut best: Option<(usize, usize, f64)> = None;
    for a in 0..c {
        for b in (a + 1)..c {
            if total[a] <= 0.0 || total[b] <= 0.0 {
                continue;
            }
            let gain = between[a * c + b] - total[a] * total[b] / two_m;
            if gain > best.map_or(1e-12, |x| x.2) {
                best = Some((a, b, gain));
            }
        }
    }
    match best {
        Some((a, b, _)) => {
            for l in labels.iter_mut().filter(|l| **l == b) {
                *l = a;
            }
            true
        }
        None => false,
    }
}

fn normalize_columns(b: &mut [f64], n: usize, m: usize) {
    for p in 0..m {
        let sum: f64 = (0..n).map(|i| b[i * m + p]).sum();
        if sum > 0.0 {
            for i in 0..n {
                b[i * m + p] /= sum;
            }
        }
    }
}

/// Generalized KL divergence `Σ w log(w/x) - w + x`.
fn divergence(w: &[f64], x: &[f64]) -> f64 {
    w.iter()
        .zip(x)
        .map(|(&a, &b)| {
            let b = b.max(EPS);
            if a > 0.0 {
                a * (a / b).ln() - a + b
            } else {
                b
            }
        })
        .sum()
}

fn identity(n: usize) -> Vec<f64> {
    let mut out = vec![0.0f64; n * n];
    for i in 0..n {
        out[i * n + i] = 1.0;
    }
    out
}

/// `(n x k) · (k x m)`.
fn compose(left: &[f64], n: usize, k: usize, right: &[f64], m: usize) -> Vec<f64> {
    let mut out = vec![0.0f64; n * m];
    for i in 0..n {
        for c in 0..k {
            let l = left[i * k + c];
            if l == 0.0 {
                continue;
            }
            for p in 0..m {
                out[i * m + p] += l * right[c * m + p];
            }
        }
    }
    out
}

fn argmax_labels(p: &[f64], n: usize, m: usize) -> Vec<usize> {
    let raw: Vec<usize> = (0..n)
        .map(|i| {
            let row = &p[i * m..(i + 1) * m];
            let mut best = 0;
            for (c, v) in row.iter().enumerate() {
                if *v > row[best] {
                    best = c;
                }
            }
            best
        })
        .collect();
    compact_labels(&raw)
}
