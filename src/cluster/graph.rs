//! Candidate-pair similarity matrices built from the directed score tables.
//!
//! All matrices are dense, symmetric, row-major `n x n` over the candidate order passed in.

use crate::signals::{ScoreTable, Signals};

/// Non-entailment probability assumed for pairs the entailment table does not cover.
pub(crate) const UNKNOWN_INDEPENDENCE: f64 = 0.5;

/// Symmetrised paraphrase scores scaled to `[0, 1]` by the largest pair score.
///
/// Missing pairs and the diagonal are 0. Negative scores are clamped to 0.
pub(crate) fn paraphrase_matrix(words: &[String], table: &ScoreTable) -> Vec<f64> {
    let n = words.len();
    let mut m = vec![0.0f64; n * n];
    let mut max = 0.0f64;
    for i in 0..n {
        for j in (i + 1)..n {
            let s = table
                .symmetric(&words[i], &words[j])
                .map_or(0.0, |s| f64::from(s).max(0.0));
            m[i * n + j] = s;
            m[j * n + i] = s;
            max = max.max(s);
        }
    }
    if max > 0.0 {
        for x in &mut m {
            *x /= max;
        }
    }
    m
}

/// Symmetrised non-entailment probabilities in `[0, 1]`; the diagonal is 0.
pub(crate) fn independence_matrix(words: &[String], table: &ScoreTable) -> Vec<f64> {
    let n = words.len();
    let mut m = vec![0.0f64; n * n];
    for i in 0..n {
        for j in (i + 1)..n {
            let p = table
                .symmetric(&words[i], &words[j])
                .map_or(UNKNOWN_INDEPENDENCE, |p| f64::from(p).clamp(0.0, 1.0));
            m[i * n + j] = p;
            m[j * n + i] = p;
        }
    }
    m
}

/// `weight * paraphrase + (1 - weight) * (1 - independence)`, with a unit diagonal.
pub(crate) fn combined_similarity(words: &[String], signals: Signals<'_>, weight: f64) -> Vec<f64> {
    let n = words.len();
    let pp = paraphrase_matrix(words, signals.paraphrase);
    let ind = independence_matrix(words, signals.entailment);
    let mut s = vec![0.0f64; n * n];
    for i in 0..n {
        for j in 0..n {
            s[i * n + j] = if i == j {
                1.0
            } else {
                weight * pp[i * n + j] + (1.0 - weight) * (1.0 - ind[i * n + j])
            };
        }
    }
    s
}
