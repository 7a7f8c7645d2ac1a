//! Sense-clustering strategies.
//!
//! Every strategy consumes a [`CandidateSet`] plus the shared [`Signals`] and returns a
//! [`SenseClustering`] that is a partition of exactly the set's candidates. Candidates a
//! strategy cannot place (for example, ones without a vector) come back as singletons;
//! none are dropped.
//!
//! ## Strategies
//!
//! ### Distributional baseline (`semclust`)
//!
//! Cosine similarity between candidate vectors, mixed with the paraphrase score, cut at
//! the set's average pairwise similarity; clusters are connected components. Needs at
//! least one candidate with a vector.
//!
//! ### Spectral clustering with local scaling (`spectral`)
//!
//! Vector-free. Builds an affinity graph from paraphrase and entailment scores, scales each
//! affinity by the two endpoints' neighbourhood radii, and picks the number of clusters from
//! the eigengap of the normalized affinity matrix.
//!
//! ### Hierarchical graph factorization clustering (`hgfc`)
//!
//! Vector-free. Repeatedly factorizes the similarity graph into a smaller graph of cluster
//! vertices and keeps the level whose hard assignment, polished by greedy modularity moves,
//! has the best modularity.
//!
//! ## Usage
//!
//! ```rust
//! use sensecluster::cluster::{Method, SenseClusterer, Strategy};
//! use sensecluster::{CandidateSet, ScoreTable, Signals, TargetWord};
//!
//! let set = CandidateSet::new(TargetWord::new("bug", "n"), ["insect", "beetle", "glitch"]);
//! let mut pp = ScoreTable::new();
//! pp.insert("insect", "beetle", 3.2);
//! let ent = ScoreTable::new();
//!
//! let strategy = Strategy::from("hgfc".parse::<Method>().unwrap());
//! let senses = strategy.cluster(&set, Signals::new(&pp, &ent)).unwrap();
//! assert!(senses.is_partition());
//! assert_eq!(&senses.universe(), set.candidates());
//! ```

mod graph;
mod hgfc;
mod kmeans;
mod method;
mod semclust;
mod spectral;
mod traits;
mod util;

pub use hgfc::{GraphFactorizationClustering, HgfcParams};
pub use kmeans::{Kmeans, KmeansFit};
pub use method::{Method, Strategy};
pub use semclust::{DistributionalBaseline, SemClustParams};
pub use spectral::{SpectralLocalScaling, SpectralParams};
pub use traits::{Clustering, SenseClusterer};

use crate::candidates::CandidateSet;
use crate::sense::SenseClustering;

/// Turn per-word labels into a clustering over all of `set`'s candidates.
///
/// Candidates missing from `words` get fresh singleton clusters after the highest label.
pub(crate) fn complete_partition(
    set: &CandidateSet,
    words: &[String],
    labels: &[usize],
) -> SenseClustering {
    let mut out = SenseClustering::from_labels(words, labels);
    let mut next = labels.iter().max().map_or(0, |m| m + 1);
    let placed: std::collections::HashSet<&str> = words.iter().map(String::as_str).collect();
    for c in set.candidates() {
        if !placed.contains(c.as_str()) {
            out.insert(next, c.clone());
            next += 1;
        }
    }
    out
}
