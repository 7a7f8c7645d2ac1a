use std::collections::BTreeSet;

use serde::Serialize;

use crate::sense::SenseClustering;

/// Predicted and gold clusterings restricted to their shared candidates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciledPair {
    /// Predicted clusters intersected with the gold universe, empties and duplicates removed.
    pub predicted: SenseClustering,
    /// Gold clusters intersected with the predicted universe, empties and duplicates removed.
    pub gold: SenseClustering,
}

impl ReconciledPair {
    /// Candidates both sides cover.
    pub fn universe(&self) -> BTreeSet<String> {
        self.predicted.universe()
    }
}

/// Align `predicted` with `gold` so the two can be scored over the same candidates.
///
/// Each gold cluster is intersected with the predicted universe and each predicted
/// cluster with the gold universe; clusters left empty are dropped, then clusters with
/// identical member sets are collapsed on each side independently. Inputs are untouched.
pub fn reconcile(predicted: &SenseClustering, gold: &SenseClustering) -> ReconciledPair {
    let predicted_universe = predicted.universe();
    let gold_universe = gold.universe();
    ReconciledPair {
        predicted: predicted.restricted_to(&gold_universe).deduplicated(),
        gold: gold.restricted_to(&predicted_universe).deduplicated(),
    }
}

/// Number of gold clusters sharing at least one candidate with `universe`.
///
/// Duplicates are counted; this is the weight used when aggregating per-word scores.
pub fn gold_length(gold: &SenseClustering, universe: &BTreeSet<String>) -> usize {
    gold.member_sets()
        .filter(|members| !members.is_disjoint(universe))
        .count()
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

    #[test]
    fn matching_universes_are_unchanged() {
        let gold = clustering(&[(1, &["a", "b"]), (2, &["c", "d"])]);
        let predicted = clustering(&[(0, &["a", "b", "c"]), (1, &["d"])]);
        let pair = reconcile(&predicted, &gold);
        assert_eq!(pair.predicted, predicted);
        assert_eq!(pair.gold, gold);
    }

    #[test]
    fn extra_gold_items_are_removed() {
        let gold = clustering(&[(1, &["a", "b", "e"]), (2, &["e"])]);
        let predicted = clustering(&[(0, &["a"]), (1, &["b"])]);
        let pair = reconcile(&predicted, &gold);
        assert_eq!(pair.gold, clustering(&[(1, &["a", "b"])]));
        assert!(!pair.gold.universe().contains("e"));
    }

    #[test]
    fn extra_predicted_items_are_removed() {
        let gold = clustering(&[(1, &["a", "b"])]);
        let predicted = clustering(&[(0, &["a", "x"]), (1, &["y"]), (2, &["b"])]);
        let pair = reconcile(&predicted, &gold);
        assert_eq!(pair.predicted, clustering(&[(0, &["a"]), (2, &["b"])]));
    }

    #[test]
    fn collapsed_duplicates_are_removed() {
        // Both gold senses shrink to {a} once "z" is dropped.
        let gold = clustering(&[(1, &["a", "z"]), (2, &["a"]), (3, &["b"])]);
        let predicted = clustering(&[(0, &["a", "b"])]);
        let pair = reconcile(&predicted, &gold);
        assert_eq!(pair.gold.len(), 2);
        assert_eq!(gold_length(&gold, &predicted.universe()), 3);
    }

    #[test]
    fn reconcile_is_idempotent() {
        let gold = clustering(&[(1, &["a", "b", "e"]), (2, &["c"]), (3, &["c", "q"])]);
        let predicted = clustering(&[(0, &["a", "c", "x"]), (1, &["b"])]);
        let once = reconcile(&predicted, &gold);
        let twice = reconcile(&once.predicted, &once.gold);
        assert_eq!(once, twice);
    }

    #[test]
    fn inputs_are_not_mutated() {
        let gold = clustering(&[(1, &["a", "e"])]);
        let predicted = clustering(&[(0, &["a"])]);
        let before = gold.clone();
        let _ = reconcile(&predicted, &gold);
        assert_eq!(gold, before);
    }
}
