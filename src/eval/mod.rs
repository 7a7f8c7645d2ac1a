//! Evaluation harness: reconcile predicted and gold clusterings, score them, compare
//! against baselines and aggregate over the corpus.
//!
//! ## Reconciliation
//!
//! Gold senses are often annotated over a different candidate list than the one a
//! strategy clustered. [`reconcile`] restricts each side to the other's candidates and
//! drops clusters that end up empty or identical, so both clusterings cover the same
//! items before scoring.
//!
//! ## Baselines
//!
//! [`BaselineGenerator`] produces the most-frequent-sense, one-cluster-per-item and random
//! clusterings. They go through the same [`Scorer`] as the real output.
//!
//! ## Aggregation
//!
//! Corpus-level numbers are averages weighted by each word's gold cluster count, so words
//! with richer gold solutions weigh more ([`weighted_average`], [`Summary`]).

mod baseline;
mod reconcile;
mod report;
mod score;

pub use baseline::{chunk, BaselineGenerator, BaselineScores, RAND_ITER};
pub use reconcile::{gold_length, reconcile, ReconciledPair};
pub use report::{
    weighted_average, write_csv, write_summary_json, Failure, Field, ScoreRecord, Stage, Summary,
    CSV_HEADERS,
};
pub use score::{ClusterScores, PairedScorer, Scorer};
