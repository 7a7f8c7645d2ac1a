use crate::candidates::CandidateSet;
use crate::error::Result;
use crate::sense::SenseClustering;
use crate::signals::Signals;

/// Common interface for hard clustering of dense rows (one label per row).
pub trait Clustering {
    /// Fit the model (if needed) and return one cluster label per input row.
    fn fit_predict(&self, data: &[Vec<f32>]) -> Result<Vec<usize>>;

    /// The configured number of clusters (if applicable).
    ///
    /// For algorithms that discover the number of clusters dynamically, this returns 0.
    fn n_clusters(&self) -> usize;
}

/// A strategy that partitions a target word's candidates into sense clusters.
///
/// Implementations must return a partition covering exactly `set.candidates()`:
/// every candidate in one cluster, unclustered candidates as singletons.
pub trait SenseClusterer {
    /// Short name used to select the strategy at run time.
    fn name(&self) -> &'static str;

    /// Cluster the candidates of `set`.
    fn cluster(&self, set: &CandidateSet, signals: Signals<'_>) -> Result<SenseClustering>;
}
