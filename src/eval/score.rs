//! Cluster-quality scoring.
//!
//! The harness only relies on the [`Scorer`] contract: given a predicted and a gold
//! clustering over the same candidates, return six metrics in `[0, 1]`.
//! [`PairedScorer`] is the bundled implementation:
//!
//! - **Paired F-score**: precision and recall over candidate pairs placed in a common
//!   cluster (Manandhar et al., 2010).
//! - **V-measure**: harmonic mean of homogeneity and completeness, computed from the
//!   conditional entropies of the class/cluster contingency table (Rosenberg &
//!   Hirschberg, 2007).
//!
//! Gold annotations may put a candidate in several senses. Such a candidate shares its
//! unit mass evenly across its (class, cluster) cells, and a pair counts as co-clustered
//! when the two candidates share any cluster.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sense::SenseClustering;

/// The six quality metrics for one predicted/gold pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterScores {
    /// Harmonic mean of precision and recall.
    pub f_score: f64,
    /// Paired precision.
    pub precision: f64,
    /// Paired recall.
    pub recall: f64,
    /// Harmonic mean of homogeneity and completeness.
    pub v_measure: f64,
    /// Each cluster contains members of a single gold class.
    pub homogeneity: f64,
    /// Each gold class is contained in a single cluster.
    pub completeness: f64,
}

/// Computes cluster-quality metrics for a reconciled predicted/gold pair.
pub trait Scorer {
    /// Score `predicted` against `gold`. `name` identifies the target word (`word_pos`).
    fn score(
        &self,
        name: &str,
        predicted: &SenseClustering,
        gold: &SenseClustering,
    ) -> Result<ClusterScores>;
}

/// Paired F-score and V-measure.
///
/// Paired precision is taken over item pairs the prediction puts together, and recall
/// over pairs gold puts together. A side without any such pair scores 1 on the metric it
/// is the denominator of. One cluster per item therefore always has precision 1 and,
/// against any gold with a non-singleton cluster, recall and F-score 0. Scorers that
/// count each item as paired with itself instead report `1 / mean gold cluster size`
/// for the same clustering; plug one in through [`Scorer`] when that boundary is wanted.
#[derive(Debug, Clone, Copy, Default)]
pub struct PairedScorer;

impl PairedScorer {
    /// Create the scorer.
    pub fn new() -> Self {
        Self
    }
}

impl Scorer for PairedScorer {
    fn score(
        &self,
        name: &str,
        predicted: &SenseClustering,
        gold: &SenseClustering,
    ) -> Result<ClusterScores> {
        let fail = |reason: String| Error::Scoring {
            target: name.to_string(),
            reason,
        };

        let pred_members = predicted.memberships();
        let gold_members = gold.memberships();
        if pred_members.is_empty() || gold_members.is_empty() {
            return Err(fail("empty clustering".to_string()));
        }
        if pred_members.len() != gold_members.len()
            || pred_members.keys().zip(gold_members.keys()).any(|(a, b)| a != b)
        {
            return Err(fail(format!(
                "candidate universes differ ({} predicted vs {} gold)",
                pred_members.len(),
                gold_members.len()
            )));
        }

        let (precision, recall, f_score) = paired_f(&pred_members, &gold_members);
        let (homogeneity, completeness, v_measure) = v_measure(&pred_members, &gold_members);

        Ok(ClusterScores {
            f_score,
            precision,
            recall,
            v_measure,
            homogeneity,
            completeness,
        })
    }
}

type Memberships<'a> = BTreeMap<&'a str, Vec<usize>>;

fn shares_cluster(a: &[usize], b: &[usize]) -> bool {
    a.iter().any(|x| b.contains(x))
}

/// Pairwise precision, recall and F. A side without any co-clustered pair scores 1 on the
/// metric it is the denominator of.
fn paired_f(predicted: &Memberships<'_>, gold: &Memberships<'_>) -> (f64, f64, f64) {
    let items: Vec<&str> = predicted.keys().copied().collect();
    let (mut both, mut pred_pairs, mut gold_pairs) = (0usize, 0usize, 0usize);
    for i in 0..items.len() {
        for j in (i + 1)..items.len() {
            let p = shares_cluster(&predicted[items[i]], &predicted[items[j]]);
            let g = shares_cluster(&gold[items[i]], &gold[items[j]]);
            pred_pairs += usize::from(p);
            gold_pairs += usize::from(g);
            both += usize::from(p && g);
        }
    }

    let precision = if pred_pairs == 0 {
        1.0
    } else {
        both as f64 / pred_pairs as f64
    };
    let recall = if gold_pairs == 0 {
        1.0
    } else {
        both as f64 / gold_pairs as f64
    };
    (precision, recall, harmonic(precision, recall))
}

fn v_measure(predicted: &Memberships<'_>, gold: &Memberships<'_>) -> (f64, f64, f64) {
    // contingency[(class, cluster)]
    let mut table: BTreeMap<(usize, usize), f64> = BTreeMap::new();
    for (item, clusters) in predicted {
        let classes = &gold[item];
        let mass = 1.0 / (clusters.len() * classes.len()) as f64;
        for &c in classes {
            for &k in clusters {
                *table.entry((c, k)).or_insert(0.0) += mass;
            }
        }
    }

    let total: f64 = table.values().sum();
    let mut class_mass: BTreeMap<usize, f64> = BTreeMap::new();
    let mut cluster_mass: BTreeMap<usize, f64> = BTreeMap::new();
    for (&(c, k), &v) in &table {
        *class_mass.entry(c).or_insert(0.0) += v;
        *cluster_mass.entry(k).or_insert(0.0) += v;
    }

    let entropy = |masses: &BTreeMap<usize, f64>| -> f64 {
        masses
            .values()
            .filter(|&&v| v > 0.0)
            .map(|&v| {
                let p = v / total;
                -p * p.ln()
            })
            .sum()
    };
    let h_class = entropy(&class_mass);
    let h_cluster = entropy(&cluster_mass);

    let mut h_class_given_cluster = 0.0;
    let mut h_cluster_given_class = 0.0;
    for (&(c, k), &v) in &table {
        if v <= 0.0 {
            continue;
        }
        h_class_given_cluster -= v / total * (v / cluster_mass[&k]).ln();
        h_cluster_given_class -= v / total * (v / class_mass[&c]).ln();
    }

    let homogeneity = if h_class <= f64::EPSILON {
        1.0
    } else {
        (1.0 - h_class_given_cluster / h_class).clamp(0.0, 1.0)
    };
    let completeness = if h_cluster <= f64::EPSILON {
        1.0
    } else {
        (1.0 - h_cluster_given_class / h_cluster).clamp(0.0, 1.0)
    };
    (homogeneity, completeness, harmonic(homogeneity, completeness))
}

fn harmonic(a: f64, b: f64) -> f64 {
    if a + b <= 0.0 {
        0.0
    } else {
        2.0 * a * b / (a + b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clustering(clusters: &[(usize, &[&str])]) -> SenseClustering {
        SenseClustering::from_clusters(
            clusters
                .iter()
                .map(|(id, members)| (*id, members.iter().copied())),
        )
    }

    fn gold() -> SenseClustering {
        clustering(&[(1, &["a", "b"]), (2, &["c", "d"])])
    }

    #[test]
    fn perfect_match_scores_one() {
        let predicted = clustering(&[(7, &["a", "b"]), (9, &["c", "d"])]);
        let s = PairedScorer.score("bug_n", &predicted, &gold()).unwrap();
        assert_eq!(s.precision, 1.0);
        assert_eq!(s.recall, 1.0);
        assert!((s.v_measure - 1.0).abs() < 1e-12);
    }

    #[test]
    fn partial_agreement_is_strictly_between_bounds() {
        let predicted = clustering(&[(0, &["a", "b", "c"]), (1, &["d"])]);
        let s = PairedScorer.score("bug_n", &predicted, &gold()).unwrap();
        assert!((s.precision - 1.0 / 3.0).abs() < 1e-12);
        assert!((s.recall - 0.5).abs() < 1e-12);
        for v in [s.f_score, s.precision, s.recall, s.v_measure, s.homogeneity, s.completeness] {
            assert!(v > 0.0 && v < 1.0, "{v} not in (0, 1)");
        }
    }

    #[test]
    fn single_cluster_has_zero_homogeneity() {
        let predicted = clustering(&[(0, &["a", "b", "c", "d"])]);
        let s = PairedScorer.score("bug_n", &predicted, &gold()).unwrap();
        assert_eq!(s.homogeneity, 0.0);
        assert_eq!(s.completeness, 1.0);
        assert_eq!(s.v_measure, 0.0);
        assert_eq!(s.recall, 1.0);
        assert!((s.precision - 2.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn singletons_have_full_precision_and_no_recall() {
        let predicted = clustering(&[(0, &["a"]), (1, &["b"]), (2, &["c"]), (3, &["d"])]);
        let s = PairedScorer.score("bug_n", &predicted, &gold()).unwrap();
        assert_eq!(s.precision, 1.0);
        assert_eq!(s.recall, 0.0);
        assert_eq!(s.homogeneity, 1.0);
        assert!((s.completeness - 0.5).abs() < 1e-12);
    }

    #[test]
    fn one_cluster_per_item_has_vacuous_precision() {
        // Gold sizes 3 and 1: a self-pairing scorer would give precision 1 / 2.
        let gold = clustering(&[(1, &["a", "b", "c"]), (2, &["d"])]);
        let predicted =
            crate::eval::BaselineGenerator::new(0).one_cluster_per_item(&gold.universe());
        let s = PairedScorer.score("bug_n", &predicted, &gold).unwrap();
        assert_eq!(s.precision, 1.0);
        assert_eq!(s.recall, 0.0);
        assert_eq!(s.f_score, 0.0);
    }

    #[test]
    fn overlapping_gold_is_tolerated() {
        let gold = clustering(&[(1, &["a", "b"]), (2, &["b", "c"])]);
        let predicted = clustering(&[(0, &["a", "b"]), (1, &["c"])]);
        let s = PairedScorer.score("bug_n", &predicted, &gold).unwrap();
        assert_eq!(s.precision, 1.0);
        assert!((s.recall - 0.5).abs() < 1e-12);
        assert!(s.v_measure > 0.0 && s.v_measure <= 1.0);
    }

    #[test]
    fn mismatched_universes_fail() {
        let predicted = clustering(&[(0, &["a", "b", "c"])]);
        let err = PairedScorer.score("bug_n", &predicted, &gold()).unwrap_err();
        assert!(matches!(err, Error::Scoring { .. }));
    }

    #[test]
    fn empty_clustering_fails() {
        let err = PairedScorer
            .score("bug_n", &SenseClustering::new(), &gold())
            .unwrap_err();
        assert!(err.is_per_word());
    }
}
