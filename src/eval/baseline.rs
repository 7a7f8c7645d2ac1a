//! Reference clusterings that put a system's scores in context.
//!
//! - **Most frequent sense**: every candidate in one cluster.
//! - **One cluster per item**: every candidate on its own.
//! - **Random**: the candidate list is shuffled and cut into equal chunks, repeated
//!   `iterations` times from one seeded generator; scores are averaged.

use std::collections::BTreeSet;

use rand::prelude::*;
use serde::{Deserialize, Serialize};

use super::score::Scorer;
use crate::error::Result;
use crate::sense::SenseClustering;

/// Default number of random-baseline iterations (also the number of chunks).
pub const RAND_ITER: usize = 5;

/// V-measure and F-score of each baseline for one target word.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BaselineScores {
    /// Mean V-measure of the random baseline.
    pub random_v_measure: f64,
    /// Mean F-score of the random baseline.
    pub random_f_score: f64,
    /// V-measure of the most-frequent-sense baseline.
    pub mfs_v_measure: f64,
    /// F-score of the most-frequent-sense baseline.
    pub mfs_f_score: f64,
    /// V-measure of the one-cluster-per-item baseline.
    pub one_per_item_v_measure: f64,
    /// F-score of the one-cluster-per-item baseline.
    pub one_per_item_f_score: f64,
}

/// Generates baseline clusterings from a fixed seed.
#[derive(Debug, Clone)]
pub struct BaselineGenerator {
    seed: u64,
    iterations: usize,
}

impl Default for BaselineGenerator {
    fn default() -> Self {
        Self::new(0)
    }
}

impl BaselineGenerator {
    /// Create a generator with [`RAND_ITER`] iterations.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            iterations: RAND_ITER,
        }
    }

    /// Set the number of random iterations (and chunks). Values below 1 are treated as 1.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations.max(1);
        self
    }

    /// Configured iteration count.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// One cluster holding the whole universe.
    pub fn most_frequent_sense(&self, universe: &BTreeSet<String>) -> SenseClustering {
        SenseClustering::from_clusters([(0, universe.iter().cloned())])
    }

    /// One singleton cluster per candidate.
    pub fn one_cluster_per_item(&self, universe: &BTreeSet<String>) -> SenseClustering {
        universe
            .iter()
            .enumerate()
            .map(|(i, c)| (i, BTreeSet::from([c.clone()])))
            .collect()
    }

    /// `iterations` random partitions into `iterations` chunks.
    ///
    /// The generator is seeded once before the loop and the same list is reshuffled each
    /// iteration, so the sequence depends only on the seed, the count and the universe.
    pub fn random(&self, universe: &BTreeSet<String>) -> Vec<SenseClustering> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut items: Vec<String> = universe.iter().cloned().collect();
        (0..self.iterations)
            .map(|_| {
                items.shuffle(&mut rng);
                chunk(&items, self.iterations)
                    .into_iter()
                    .enumerate()
                    .map(|(i, part)| (i, part.into_iter().collect::<BTreeSet<String>>()))
                    .collect::<SenseClustering>()
                    .without_empty()
            })
            .collect()
    }

    /// Score all three baselines against `gold` over `universe`.
    pub fn score<S: Scorer + ?Sized>(
        &self,
        scorer: &S,
        name: &str,
        universe: &BTreeSet<String>,
        gold: &SenseClustering,
    ) -> Result<BaselineScores> {
        let mfs = scorer.score(name, &self.most_frequent_sense(universe), gold)?;
        let one = scorer.score(name, &self.one_cluster_per_item(universe), gold)?;

        let runs = self.random(universe);
        let mut v_sum = 0.0;
        let mut f_sum = 0.0;
        for run in &runs {
            let s = scorer.score(name, run, gold)?;
            v_sum += s.v_measure;
            f_sum += s.f_score;
        }
        let count = runs.len().max(1) as f64;

        Ok(BaselineScores {
            random_v_measure: v_sum / count,
            random_f_score: f_sum / count,
            mfs_v_measure: mfs.v_measure,
            mfs_f_score: mfs.f_score,
            one_per_item_v_measure: one.v_measure,
            one_per_item_f_score: one.f_score,
        })
    }
}

/// Split `seq` into `num` consecutive slices of (nearly) equal length.
///
/// Uses a floating stride `len / num`: slice `i` spans `[⌊i·s⌋, ⌊(i+1)·s⌋)` with the
/// offsets accumulated by repeated addition. When `len < num` some slices are empty.
pub fn chunk<T: Clone>(seq: &[T], num: usize) -> Vec<Vec<T>> {
    let len = seq.len();
    if num == 0 {
        return vec![seq.to_vec()];
    }
    let avg = len as f64 / num as f64;
    let mut out = Vec::with_capacity(num);
    let mut last = 0.0f64;
    while last < len as f64 {
        let start = (last as usize).min(len);
        let end = ((last + avg) as usize).min(len);
        out.push(seq[start..end].to_vec());
        last += avg;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::score::PairedScorer;

    fn universe(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn chunk_splits_evenly() {
        let seq: Vec<u32> = (0..10).collect();
        let parts = chunk(&seq, 5);
        assert_eq!(parts.len(), 5);
        assert!(parts.iter().all(|p| p.len() == 2));
        assert_eq!(parts.concat(), seq);
    }

    #[test]
    fn chunk_uneven_lengths() {
        let seq: Vec<u32> = (0..7).collect();
        let parts = chunk(&seq, 3);
        let lens: Vec<usize> = parts.iter().map(Vec::len).collect();
        assert_eq!(lens, vec![2, 2, 3]);
        assert_eq!(parts.concat(), seq);
    }

    #[test]
    fn chunk_shorter_than_count_has_empties() {
        let seq = vec!['a', 'b'];
        let parts = chunk(&seq, 5);
        assert_eq!(parts.len(), 5);
        assert_eq!(parts.concat(), seq);
        assert!(parts.iter().any(Vec::is_empty));
    }

    #[test]
    fn chunk_empty_sequence() {
        let seq: Vec<u8> = Vec::new();
        assert!(chunk(&seq, 5).is_empty());
    }

    #[test]
    fn mfs_and_singletons_cover_universe() {
        let u = universe(&["a", "b", "c"]);
        let g = BaselineGenerator::new(0);
        let mfs = g.most_frequent_sense(&u);
        assert_eq!(mfs.len(), 1);
        assert_eq!(mfs.universe(), u);
        let one = g.one_cluster_per_item(&u);
        assert_eq!(one.len(), 3);
        assert!(one.is_partition());
        assert_eq!(one.universe(), u);
    }

    #[test]
    fn random_is_deterministic() {
        let u = universe(&["a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k"]);
        let g = BaselineGenerator::new(0);
        let first = g.random(&u);
        let second = g.random(&u);
        assert_eq!(first, second);
        assert_eq!(first.len(), RAND_ITER);
        for run in &first {
            assert!(run.is_partition());
            assert_eq!(run.universe(), u);
            assert!(run.len() <= RAND_ITER);
        }
    }

    #[test]
    fn random_depends_on_seed() {
        let u = universe(&["a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k"]);
        let a = BaselineGenerator::new(0).random(&u);
        let b = BaselineGenerator::new(1).random(&u);
        assert_ne!(a, b);
    }

    #[test]
    fn baseline_scores_against_gold() {
        let u = universe(&["a", "b", "c", "d"]);
        let gold = SenseClustering::from_clusters([(1, vec!["a", "b"]), (2, vec!["c", "d"])]);
        let s = BaselineGenerator::new(0)
            .score(&PairedScorer, "bug_n", &u, &gold)
            .unwrap();
        assert_eq!(s.mfs_v_measure, 0.0);
        assert_eq!(s.one_per_item_f_score, 0.0);
        assert!(s.random_v_measure >= 0.0 && s.random_v_measure <= 1.0);
    }
}
